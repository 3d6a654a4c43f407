//! Tile instance snapshot and grout styling
//!
//! [`TileInstance`] is what the pure layout, scene and export functions
//! receive. The session builds one from its own state before every redraw.

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::{TileError, TileResult};
use crate::fill::ColorAssignment;
use crate::id::TileId;
use crate::rotation::{Rotation, Rotations};

// =============================================================================
// Grout
// =============================================================================

/// Grout color choices offered by the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroutColor {
    Orange,
    Green,
    Turquoise,
    Blue,
    #[default]
    White,
    Gray,
    Black,
    Beige,
    Brown,
}

impl GroutColor {
    pub const ALL: [Self; 9] = [
        Self::Orange,
        Self::Green,
        Self::Turquoise,
        Self::Blue,
        Self::White,
        Self::Gray,
        Self::Black,
        Self::Beige,
        Self::Brown,
    ];

    /// CSS color keyword
    pub const fn css(self) -> &'static str {
        match self {
            Self::Orange => "orange",
            Self::Green => "green",
            Self::Turquoise => "turquoise",
            Self::Blue => "blue",
            Self::White => "white",
            Self::Gray => "gray",
            Self::Black => "black",
            Self::Beige => "beige",
            Self::Brown => "brown",
        }
    }
}

impl fmt::Display for GroutColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css())
    }
}

impl FromStr for GroutColor {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.css().eq_ignore_ascii_case(s))
            .ok_or_else(|| TileError::config(format!("unknown grout color `{s}`")))
    }
}

/// Grout line width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroutThickness {
    None,
    #[default]
    Thin,
    Thick,
}

impl GroutThickness {
    /// Gap width in CSS pixels
    pub const fn px(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Thin => 1,
            Self::Thick => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Thin => "thin",
            Self::Thick => "thick",
        }
    }
}

impl fmt::Display for GroutThickness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroutThickness {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "thin" => Ok(Self::Thin),
            "thick" => Ok(Self::Thick),
            other => Err(TileError::config(format!("unknown grout thickness `{other}`"))),
        }
    }
}

/// Grout styling of a tile instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Grout {
    pub color: GroutColor,
    pub thickness: GroutThickness,
}

impl Grout {
    pub const fn new(color: GroutColor, thickness: GroutThickness) -> Self {
        Self { color, thickness }
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Arrangement of designs inside one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One design per cell
    Single,
    /// Four designs in a 2×2 sub-grid per cell
    Quad,
}

impl Layout {
    /// Layout implied by the number of designs in a selection.
    ///
    /// # Errors
    ///
    /// `UnsupportedDesignCount` for anything but 1 or 4.
    pub fn for_count(design_count: usize) -> TileResult<Self> {
        match design_count {
            1 => Ok(Self::Single),
            4 => Ok(Self::Quad),
            count => Err(TileError::UnsupportedDesignCount { count }),
        }
    }

    /// Designs drawn per cell
    pub const fn slots(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Quad => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Quad => "quad",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TileInstance
// =============================================================================

/// Snapshot of one placed tile: its designs' rotations, colors and grout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInstance {
    pub id: TileId,
    /// Display name; drives the layout offset table
    pub name: CompactString,
    /// One entry per design
    pub rotations: Rotations,
    pub colors: ColorAssignment,
    pub grout: Grout,
    /// Outline every path with a thin black stroke
    pub show_borders: bool,
}

impl TileInstance {
    /// Create an instance with the given rotations and default styling
    pub fn new(id: impl Into<TileId>, name: impl AsRef<str>, rotations: Rotations) -> Self {
        Self {
            id: id.into(),
            name: CompactString::from(name.as_ref()),
            rotations,
            colors: ColorAssignment::new(),
            grout: Grout::default(),
            show_borders: false,
        }
    }

    pub fn with_colors(mut self, colors: ColorAssignment) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_grout(mut self, grout: Grout) -> Self {
        self.grout = grout;
        self
    }

    pub fn with_borders(mut self, show_borders: bool) -> Self {
        self.show_borders = show_borders;
        self
    }

    /// Layout implied by the rotation count
    pub fn layout(&self) -> TileResult<Layout> {
        Layout::for_count(self.rotations.len())
    }

    /// Rotation of design `index`, `R0` when out of range
    pub fn rotation(&self, index: usize) -> Rotation {
        self.rotations.get(index).copied().unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
