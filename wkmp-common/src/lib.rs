//! # WKMP Common Library
//!
//! Shared code for WKMP services including:
//! - Common error type
//! - TOML configuration file discovery and loading
//! - Tracing subscriber initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
