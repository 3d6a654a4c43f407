//! Identifiers used across the engine
//!
//! - `TileId` / `DesignId`: opaque backend identifiers
//! - `PatternId`: `<pattern>` element ids, unique per path, surface, cell and slot
//! - `SelectionToken`: monotonically increasing token used to drop stale loads
//! - `link_key_of`: the id-suffix grouping used for linked-path recoloring

use std::fmt::{self, Write as _};

use compact_str::{CompactString, format_compact};
use serde::{Deserialize, Serialize};

// =============================================================================
// TileId / DesignId
// =============================================================================

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(CompactString);

        impl $name {
            /// Create an id from any string-like value
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(CompactString::from(id.as_ref()))
            }

            /// Get the id as a string slice
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(format_compact!("{id}"))
            }
        }
    };
}

opaque_id!(
    /// Identifier of a tile product (one or four designs)
    TileId
);

opaque_id!(
    /// Identifier of one design
    DesignId
);

// =============================================================================
// Link keys
// =============================================================================

/// Maps a path id to the key used to group linked paths.
///
/// Plain function pointer so sessions can swap the heuristic without
/// boxing.
pub type LinkKeyFn = fn(&str) -> &str;

/// Default link key: the token after the final `-`, or the whole id.
///
/// Two paths whose ids end in the same token are recolored together, even
/// when the match is accidental.
///
/// ```
/// use tilegrid::id::link_key_of;
///
/// assert_eq!(link_key_of("12-0-3"), "3");
/// assert_eq!(link_key_of("outline"), "outline");
/// ```
pub fn link_key_of(path_id: &str) -> &str {
    match path_id.rfind('-') {
        Some(pos) => &path_id[pos + 1..],
        None => path_id,
    }
}

// =============================================================================
// PatternId
// =============================================================================

/// Id of a `<pattern>` definition backing one image-filled path in one cell
///
/// Format: `pattern-{path_id}-{scope}-{row}-{col}-{slot}`. The scope keeps
/// ids from different surfaces apart when they share a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternId(CompactString);

impl PatternId {
    /// Build the id for a path placed at `(row, col)` in quad slot `slot`
    pub fn new(path_id: &str, scope: &str, row: usize, col: usize, slot: usize) -> Self {
        let path_id = sanitize_id(path_id);
        Self(format_compact!("pattern-{path_id}-{scope}-{row}-{col}-{slot}"))
    }

    /// Get the id as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `url(#…)` paint reference for this pattern
    pub fn paint(&self) -> String {
        format!("url(#{})", self.0)
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape characters that would break an XML id or a `url(#…)` reference.
///
/// One-to-one: `_` doubles to `__` and any other unsafe char becomes
/// `_x{hex}_`, so distinct path ids never share a pattern id.
fn sanitize_id(raw: &str) -> CompactString {
    let mut out = CompactString::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '_' => out.push_str("__"),
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') => out.push(c),
            c => {
                let _ = write!(out, "_x{:x}_", u32::from(c));
            }
        }
    }
    out
}

// =============================================================================
// SelectionToken
// =============================================================================

/// Token captured when a selection starts loading
///
/// A result is applied only if its token still equals the session's current
/// token; anything older is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SelectionToken(u64);

impl SelectionToken {
    /// Token before any selection
    pub const fn initial() -> Self {
        Self(0)
    }

    /// The next token in sequence
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// Tests
// =============================================================================
