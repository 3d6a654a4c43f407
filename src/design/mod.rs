//! Parsed tile designs
//!
//! A [`Design`] is one parametric SVG tile graphic: an ordered list of paths
//! plus its view box. Designs are immutable once parsed; colors and
//! rotations live in separate state and designs are shared as `Arc<Design>`.

mod parse;
mod source;

pub use parse::{parse, parse_or_fallback};
pub use source::DesignSource;

use std::fmt;

use compact_str::{CompactString, format_compact};

use crate::id::DesignId;

/// View box used when the source SVG declares none.
pub const DEFAULT_VIEW_BOX: &str = "0 0 100 100";

/// Fill of the fallback design shown in place of an unreadable one.
pub const FALLBACK_FILL: &str = "#cccccc";

// =============================================================================
// ViewBox
// =============================================================================

/// SVG `viewBox`, kept verbatim as declared by the source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewBox(CompactString);

impl ViewBox {
    /// Wrap a raw `viewBox` value
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(CompactString::from(raw.as_ref().trim()))
    }

    /// The raw value, as it appears in the output `viewBox` attribute
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into `(min_x, min_y, width, height)`
    ///
    /// Accepts whitespace and/or comma separators. Returns `None` unless
    /// exactly four numbers are present.
    pub fn parse(&self) -> Option<(f64, f64, f64, f64)> {
        let parts: Vec<f64> = self
            .0
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [x, y, w, h] => Some((*x, *y, *w, *h)),
            _ => None,
        }
    }

    /// Rotation center. Falls back to the default box center.
    pub fn center(&self) -> (f64, f64) {
        match self.parse() {
            Some((x, y, w, h)) => (x + w / 2.0, y + h / 2.0),
            None => (50.0, 50.0),
        }
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_BOX)
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PathRecord
// =============================================================================

/// One `<path>` of a design
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    /// Unique within the design and stable across re-parses
    pub id: CompactString,
    /// Path geometry, passed through verbatim
    pub d: String,
    /// Fill declared by the source, if any
    pub fill: Option<CompactString>,
}

impl PathRecord {
    /// Create a path record
    pub fn new(id: impl AsRef<str>, d: impl Into<String>, fill: Option<&str>) -> Self {
        Self {
            id: CompactString::from(id.as_ref()),
            d: d.into(),
            fill: fill.map(CompactString::from),
        }
    }
}

// =============================================================================
// Design
// =============================================================================

/// One parsed SVG tile graphic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Design {
    pub id: DesignId,
    /// Display name, used by the layout offset table
    pub name: Option<CompactString>,
    pub view_box: ViewBox,
    /// Draw order: later paths paint over earlier ones
    pub paths: Vec<PathRecord>,
    /// Overlay text; only set on fallback designs
    pub label: Option<CompactString>,
}

impl Design {
    /// Create a design from already-parsed parts
    pub fn new(id: impl Into<DesignId>, view_box: ViewBox, paths: Vec<PathRecord>) -> Self {
        Self {
            id: id.into(),
            name: None,
            view_box,
            paths,
            label: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
        self.name = Some(CompactString::from(name.as_ref()));
        self
    }

    /// Deterministic stand-in for a design that could not be loaded
    ///
    /// A single gray square over the default view box, labelled "error".
    pub fn fallback(namespace_hint: &str) -> Self {
        Self {
            id: DesignId::new(format_compact!("{namespace_hint}-fallback")),
            name: None,
            view_box: ViewBox::default(),
            paths: vec![PathRecord::new(
                format_compact!("{namespace_hint}-fallback"),
                "M0 0H100V100H0Z",
                Some(FALLBACK_FILL),
            )],
            label: Some(CompactString::const_new("error")),
        }
    }

    /// Check if this is a fallback design
    pub fn is_fallback(&self) -> bool {
        self.label.as_deref() == Some("error")
    }

    /// Find a path by id
    pub fn path(&self, id: &str) -> Option<&PathRecord> {
        self.paths.iter().find(|p| p.id == id)
    }
}

impl AsRef<Design> for Design {
    fn as_ref(&self) -> &Design {
        self
    }
}
