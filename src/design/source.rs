//! Where design markup comes from
//!
//! The backend hands designs over either inline, as base64 payloads, or as
//! URLs to `.svg` resources. The first two decode synchronously; URLs go
//! through a [`DesignFetcher`](crate::load::DesignFetcher).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ParseError;
use crate::hash::StableHasher;

/// One design's markup source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DesignSource {
    /// Raw SVG text
    Inline(String),
    /// Base64-encoded SVG text, optionally as a `data:` URI
    Base64(String),
    /// Remote `.svg` resource
    Url(String),
}

impl DesignSource {
    /// Decode inline or base64 sources into SVG text.
    ///
    /// Returns `Ok(None)` for URL sources, which need fetching.
    ///
    /// # Errors
    ///
    /// `ParseError::Decode` when the payload is not valid base64 or not UTF-8.
    pub fn decode(&self) -> Result<Option<String>, ParseError> {
        match self {
            Self::Inline(text) => Ok(Some(text.clone())),
            Self::Base64(payload) => decode_base64(payload).map(Some),
            Self::Url(_) => Ok(None),
        }
    }

    /// Check if this source needs a network fetch
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Stable fingerprint of the source, used for logging and cache lookups
    pub fn fingerprint(&self) -> u64 {
        let (tag, body) = match self {
            Self::Inline(s) => ("inline", s),
            Self::Base64(s) => ("base64", s),
            Self::Url(s) => ("url", s),
        };
        StableHasher::new().update_str(tag).update_str(body).finish()
    }
}

fn decode_base64(payload: &str) -> Result<String, ParseError> {
    let data = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned.as_bytes())?;
    String::from_utf8(bytes).map_err(|e| ParseError::Decode(e.to_string()))
}
