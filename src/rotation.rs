//! Per-tile rotation state
//!
//! Rotations are stored per tile id as one quarter-turn per design. The first
//! time a tile is referenced its array is seeded; a quad starts with the
//! asymmetric `[0, 90, 270, 180]` so that the four designs form a pinwheel.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{TileError, TileResult};
use crate::id::TileId;

/// Rotation array of one tile instance
pub type Rotations = SmallVec<[Rotation; 4]>;

/// Seed used for quad tiles, also truncated/padded for other counts.
pub const QUAD_SEED: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R270, Rotation::R180];

// =============================================================================
// Rotation
// =============================================================================

/// Quarter-turn rotation of one design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Build from any degree value that is a multiple of 90.
    ///
    /// Negative values and values beyond a full turn are normalized.
    ///
    /// # Errors
    ///
    /// `TileError::InvalidRotation` for non-multiples of 90.
    pub fn from_degrees(degrees: i32) -> TileResult<Self> {
        if degrees % 90 != 0 {
            return Err(TileError::InvalidRotation { degrees });
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Self::R0,
            90 => Self::R90,
            180 => Self::R180,
            _ => Self::R270,
        })
    }

    /// Angle in degrees, in `0..360`
    pub const fn degrees(self) -> i32 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }

    /// The next quarter turn clockwise
    #[must_use]
    pub const fn turned(self) -> Self {
        match self {
            Self::R0 => Self::R90,
            Self::R90 => Self::R180,
            Self::R180 => Self::R270,
            Self::R270 => Self::R0,
        }
    }

    #[inline]
    pub const fn is_identity(self) -> bool {
        matches!(self, Self::R0)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = TileError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}deg", self.degrees())
    }
}

/// Initial rotations for a tile with `design_count` designs.
pub fn seed(design_count: usize) -> Rotations {
    (0..design_count)
        .map(|i| QUAD_SEED.get(i).copied().unwrap_or_default())
        .collect()
}

// =============================================================================
// RotationStore
// =============================================================================

/// Rotation arrays keyed by tile id
///
/// Switching to another tile and back restores the stored rotations.
#[derive(Debug, Clone, Default)]
pub struct RotationStore {
    entries: FxHashMap<TileId, Rotations>,
}

impl RotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotation of design `index`, seeding the tile on first reference.
    ///
    /// Out-of-range indices read as `R0`.
    pub fn get_rotation(&mut self, tile_id: &TileId, design_count: usize, index: usize) -> Rotation {
        self.entry(tile_id, design_count)
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    /// Store an absolute angle for design `index`.
    ///
    /// # Errors
    ///
    /// `InvalidRotation` for angles that are not quarter turns, `DesignIndex`
    /// when `index` is out of range.
    pub fn set_rotation(
        &mut self,
        tile_id: &TileId,
        design_count: usize,
        index: usize,
        degrees: i32,
    ) -> TileResult<Rotation> {
        let rotation = Rotation::from_degrees(degrees)?;
        let slot = self
            .entry(tile_id, design_count)
            .get_mut(index)
            .ok_or(TileError::DesignIndex { index, count: design_count })?;
        *slot = rotation;
        Ok(rotation)
    }

    /// Turn design `index` a further 90°.
    ///
    /// # Errors
    ///
    /// `DesignIndex` when `index` is out of range.
    pub fn rotate(&mut self, tile_id: &TileId, design_count: usize, index: usize) -> TileResult<Rotation> {
        let slot = self
            .entry(tile_id, design_count)
            .get_mut(index)
            .ok_or(TileError::DesignIndex { index, count: design_count })?;
        *slot = slot.turned();
        Ok(*slot)
    }

    /// The full rotation array, seeded if needed
    pub fn snapshot(&mut self, tile_id: &TileId, design_count: usize) -> Rotations {
        self.entry(tile_id, design_count).clone()
    }

    /// Drop the stored state of one tile
    pub fn forget(&mut self, tile_id: &TileId) -> bool {
        self.entries.remove(tile_id).is_some()
    }

    /// Check if a tile has been seeded
    pub fn contains(&self, tile_id: &TileId) -> bool {
        self.entries.contains_key(tile_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored array for `tile_id`, reseeded when the design count changed.
    fn entry(&mut self, tile_id: &TileId, design_count: usize) -> &mut Rotations {
        let rotations = self
            .entries
            .entry(tile_id.clone())
            .or_insert_with(|| seed(design_count));
        if rotations.len() != design_count {
            tracing::debug!(tile = %tile_id, design_count, "design count changed, reseeding rotations");
            *rotations = seed(design_count);
        }
        rotations
    }
}

// =============================================================================
// Tests
// =============================================================================
