//! Catalog locator parsing
//!
//! The playback backend reports what it is playing as an opaque, often
//! URL-encoded locator such as
//! `x-sonos-spotify:spotify%3atrack%3a4uLU6hMCjMI75M1A2tKUQC?sid=9&flags=8224`.
//! Features that act on the current track (like, recommend, album) need the
//! catalog ID inside it. This module is the only place that looks inside a
//! locator; everything else passes locators through untouched.

use thiserror::Error;

use crate::registry::CandidateKind;

/// Substring that marks a locator as belonging to the catalog provider
const CATALOG_MARKER: &str = "spotify";

/// URI form: `spotify:<kind>:<id>`
const URI_PREFIX: &str = "spotify:";

/// Web link form: `open.spotify.com/<kind>/<id>`
const LINK_PREFIX: &str = "open.spotify.com/";

/// Why a locator could not be turned into a catalog reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// Locator belongs to some other source (radio stream, line-in, library)
    #[error("Locator is not from the Spotify catalog: {0}")]
    NotFromCatalog(String),

    /// Locator claims to be a catalog locator but has no usable ID
    #[error("Could not parse locator {locator}: {reason}")]
    Malformed { locator: String, reason: String },
}

/// Catalog entity referenced by a locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRef {
    pub kind: CandidateKind,
    pub id: String,
}

/// Parse a backend-reported locator into a catalog reference.
///
/// Fails with [`LocatorError::NotFromCatalog`] when the locator does not
/// mention the catalog at all, and [`LocatorError::Malformed`] when it does
/// but cannot be decoded or carries no recognizable `kind`/`id` pair.
pub fn parse_locator(locator: &str) -> Result<CatalogRef, LocatorError> {
    if !locator.to_ascii_lowercase().contains(CATALOG_MARKER) {
        return Err(LocatorError::NotFromCatalog(locator.to_string()));
    }

    let malformed = |reason: &str| LocatorError::Malformed {
        locator: locator.to_string(),
        reason: reason.to_string(),
    };

    let decoded = urlencoding::decode(locator).map_err(|_| malformed("invalid percent-encoding"))?;
    let lowered = decoded.to_ascii_lowercase();

    let (kind, rest) = find_kind_and_rest(&decoded, &lowered, URI_PREFIX, ':')
        .or_else(|| find_kind_and_rest(&decoded, &lowered, LINK_PREFIX, '/'))
        .ok_or_else(|| malformed("no track/album/artist/playlist marker"))?;

    let id: String = rest
        .chars()
        .take_while(|c| !matches!(c, '?' | '&' | ':' | '/' | '#' | ';'))
        .collect();

    if id.is_empty() {
        return Err(malformed("empty ID"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(malformed("ID is not base-62"));
    }

    Ok(CatalogRef { kind, id })
}

/// Parse a locator that must reference a track
pub fn parse_track_locator(locator: &str) -> Result<String, LocatorError> {
    let catalog_ref = parse_locator(locator)?;
    if catalog_ref.kind != CandidateKind::Track {
        return Err(LocatorError::Malformed {
            locator: locator.to_string(),
            reason: format!("expected a track, found a {}", catalog_ref.kind),
        });
    }
    Ok(catalog_ref.id)
}

/// Find `<prefix><kind><sep>` and return the kind plus the text after it.
/// Matching is case-insensitive (Sonos lowercases the escaped colons but
/// not always the kind), the returned remainder keeps original case.
fn find_kind_and_rest<'a>(
    decoded: &'a str,
    lowered: &str,
    prefix: &str,
    sep: char,
) -> Option<(CandidateKind, &'a str)> {
    const KINDS: [CandidateKind; 4] = [
        CandidateKind::Track,
        CandidateKind::Album,
        CandidateKind::Artist,
        CandidateKind::Playlist,
    ];

    KINDS.iter().find_map(|kind| {
        let marker = format!("{}{}{}", prefix, kind.as_str(), sep);
        lowered
            .find(&marker)
            .map(|pos| (*kind, &decoded[pos + marker.len()..]))
    })
}
