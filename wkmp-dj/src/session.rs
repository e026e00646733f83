//! Session boundary
//!
//! Maps an inbound request to the key its candidate registry lives under.
//! Callers that send no session id all share the `global` lane.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

/// Key shared by every caller that omits a session id
pub const GLOBAL_SESSION: &str = "global";

/// Header checked when the query string carries no `session_id`
pub const SESSION_HEADER: &str = "x-session-id";

/// Identifies one conversation lane
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn global() -> Self {
        Self(GLOBAL_SESSION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_SESSION
    }
}

impl From<&str> for SessionKey {
    fn from(value: &str) -> Self {
        session_key_of(Some(value))
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a caller-supplied session id. Absent or blank ids map to global.
pub fn session_key_of(session_id: Option<&str>) -> SessionKey {
    match session_id.map(str::trim) {
        Some(id) if !id.is_empty() => SessionKey(id.to_string()),
        _ => SessionKey::global(),
    }
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

/// Extractor yielding the request's session key
///
/// Looks at the `session_id` query parameter first, then the `X-Session-Id`
/// header. Never rejects.
#[derive(Debug, Clone)]
pub struct Session(pub SessionKey);

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<SessionQuery>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Query(q)| q.session_id);

        let from_header = || {
            parts
                .headers
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let id = from_query
            .filter(|id| !id.trim().is_empty())
            .or_else(from_header);

        Ok(Session(session_key_of(id.as_deref())))
    }
}
