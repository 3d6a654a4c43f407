//! Error types for tilegrid.
//!
//! Parse failures are recovered locally (see [`crate::design::parse_or_fallback`]),
//! render target misses are skipped, and only export failures reach the user.

use thiserror::Error;

use crate::surface::SurfaceKind;

/// Errors raised while turning raw SVG text into a [`Design`](crate::design::Design).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input is not well-formed XML
    #[error("xml error at byte {position}: {message}")]
    Xml {
        /// Byte offset reported by the reader
        position: u64,
        /// Reader message
        message: String,
    },

    /// An attribute could not be read or unescaped
    #[error("malformed attribute: {0}")]
    Attribute(String),

    /// Input ended while elements were still open
    #[error("unexpected end of input: {depth} element(s) left open")]
    Unclosed {
        /// Number of open elements at end of input
        depth: usize,
    },

    /// No `<svg>` root element was found
    #[error("missing <svg> root element")]
    MissingSvgRoot,

    /// A `<path>` carried no `d` attribute
    #[error("path #{index} has no `d` attribute")]
    MissingPathData {
        /// Ordinal of the offending path
        index: usize,
    },

    /// Two paths of one design carry the same `id`
    #[error("duplicate path id `{id}`")]
    DuplicatePathId {
        /// The repeated id
        id: String,
    },

    /// The design payload could not be decoded into text
    #[error("cannot decode design payload: {0}")]
    Decode(String),
}

/// Errors surfaced by the export actions (download, share, email).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// Nothing is selected
    #[error("no tile data available")]
    NoTileData,

    /// Only 1 (single) or 4 (quad) designs can be exported
    #[error("cannot export a tile made of {count} designs")]
    UnsupportedLayout {
        /// Number of designs handed to the serializer
        count: usize,
    },

    /// The tile carries a different number of rotations than designs
    #[error("tile has {rotations} rotation(s) for {designs} design(s)")]
    RotationMismatch {
        /// Number of rotations on the tile
        rotations: usize,
        /// Number of designs
        designs: usize,
    },

    /// A sink rejected the artifact
    #[error("export sink failed: {0}")]
    Sink(String),
}

/// Errors that can occur in tilegrid operations.
#[derive(Debug, Error)]
pub enum TileError {
    /// Design text could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The requested surface is not attached yet
    #[error("render target `{surface}` is not available")]
    RenderTargetMissing {
        /// Surface that was requested
        surface: SurfaceKind,
    },

    /// Angle is not a multiple of 90 degrees
    #[error("rotation must be a multiple of 90 degrees, got {degrees}")]
    InvalidRotation {
        /// Rejected angle
        degrees: i32,
    },

    /// A tile must be made of exactly 1 or 4 designs
    #[error("unsupported design count {count}: expected 1 (single) or 4 (quad)")]
    UnsupportedDesignCount {
        /// Rejected design count
        count: usize,
    },

    /// Design index out of range for the active tile
    #[error("design index {index} out of range for {count} design(s)")]
    DesignIndex {
        /// Requested index
        index: usize,
        /// Number of designs
        count: usize,
    },

    /// An edit arrived before any tile was selected
    #[error("no tile selected")]
    NoSelection,

    /// Configuration could not be read or is invalid
    #[error("config error: {0}")]
    Config(String),

    /// A remote design could not be fetched
    #[error("fetch failed for {url}: {reason}")]
    Fetch {
        /// Requested URL
        url: String,
        /// Failure description
        reason: String,
    },
}

/// Result type alias for tilegrid operations.
pub type TileResult<T> = Result<T, TileError>;

impl TileError {
    /// Create a config error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error from any error type.
    pub fn fetch(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TileError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml {
            position: 0,
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Attribute(err.to_string())
    }
}

impl From<base64::DecodeError> for ParseError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}
