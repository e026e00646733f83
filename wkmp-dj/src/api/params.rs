//! Query parameter parsing
//!
//! Parameters arrive as strings so that malformed numbers become in-band
//! input errors instead of axum rejections.

use serde::Deserialize;
use std::str::FromStr;

use crate::dispatcher::{Selection, MAX_LIMIT};
use crate::intent::parse_volume_change;

/// Default page size for library listings
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest offset whose page can still be numbered within `u32`
pub const MAX_OFFSET: u32 = u32::MAX - MAX_LIMIT;

/// Parse an optional numeric parameter; blank counts as absent
pub fn parse_number<T: FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid {}: {}", name, text)),
    }
}

/// `num` / `uri` for play, queue and next
#[derive(Debug, Default, Deserialize)]
pub struct SelectionParams {
    pub num: Option<String>,
    pub uri: Option<String>,
}

impl SelectionParams {
    pub fn selection(&self) -> Result<Selection, String> {
        Ok(Selection {
            num: parse_number("num", self.num.as_deref())?,
            uri: self.uri.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VolumeParams {
    pub level: Option<String>,
    pub change: Option<String>,
}

impl VolumeParams {
    pub fn level(&self) -> Result<Option<u32>, String> {
        match self.level.as_deref().map(str::trim) {
            Some(text) if text.starts_with('-') => {
                Err("Volume must be between 0 and 100".to_string())
            }
            other => parse_number("level", other),
        }
    }

    pub fn change(&self) -> Result<Option<i32>, String> {
        match self.change.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_volume_change(text)
                .map(Some)
                .ok_or_else(|| format!("Invalid change: {}", text)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageParams {
    pub fn limit(&self) -> Result<u32, String> {
        Ok(parse_number("limit", self.limit.as_deref())?.unwrap_or(DEFAULT_PAGE_LIMIT))
    }

    pub fn offset(&self) -> Result<u32, String> {
        match parse_number("offset", self.offset.as_deref())? {
            Some(offset) if offset > MAX_OFFSET => {
                Err(format!("Offset must be at most {}", MAX_OFFSET))
            }
            offset => Ok(offset.unwrap_or(0)),
        }
    }
}
