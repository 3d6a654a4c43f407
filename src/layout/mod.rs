//! Cell placement
//!
//! Decides, for one grid cell, which design goes in which slot, at which
//! rotation, and how far the cell is shifted.
//!
//! - Quad: four slots in a 2×2 sub-grid, each with its own rotation, never
//!   shifted
//! - Single: one slot, shifted per the [`offset`] table of the tile's name

pub mod offset;

use smallvec::SmallVec;

use crate::error::TileResult;
use crate::rotation::Rotation;
use crate::surface::SurfaceKind;
use crate::tile::{Layout, TileInstance};

pub use offset::{OFFSET_RULES, OffsetRule, rule_for};

/// One design drawn inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPlacement {
    pub design_index: usize,
    pub rotation: Rotation,
}

impl SlotPlacement {
    /// `(row, col)` inside the quad sub-grid
    pub const fn quad_position(&self) -> (usize, usize) {
        (self.design_index / 2, self.design_index % 2)
    }
}

/// Inline shift of a cell
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CellOffset {
    pub margin_left: f64,
    pub margin_top: f64,
    pub transform: Option<&'static str>,
}

impl CellOffset {
    pub const ZERO: Self = Self { margin_left: 0.0, margin_top: 0.0, transform: None };

    /// Check if the cell stays in place
    pub fn is_zero(&self) -> bool {
        self.margin_left == 0.0 && self.margin_top == 0.0 && self.transform.is_none()
    }
}

/// Everything the scene builder needs for one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellPlacement {
    pub layout: Layout,
    pub slots: SmallVec<[SlotPlacement; 4]>,
    pub offset: CellOffset,
}

/// Place cell `(row, col)` of a grid `cols` wide.
///
/// # Errors
///
/// `UnsupportedDesignCount` unless `design_count` is 1 or 4.
pub fn compute_cell_placement(
    row: usize,
    col: usize,
    cols: usize,
    tile: &TileInstance,
    design_count: usize,
    surface: SurfaceKind,
) -> TileResult<CellPlacement> {
    let layout = Layout::for_count(design_count)?;
    let placement = match layout {
        Layout::Quad => CellPlacement {
            layout,
            slots: (0..design_count)
                .map(|design_index| SlotPlacement {
                    design_index,
                    rotation: tile.rotation(design_index),
                })
                .collect(),
            offset: CellOffset::ZERO,
        },
        Layout::Single => {
            let design_index = (row * cols.max(1) + col) % design_count;
            let rule = rule_for(&tile.name);
            let shift = rule.shift(surface, row);
            let mut slots = SmallVec::new();
            slots.push(SlotPlacement { design_index, rotation: tile.rotation(design_index) });
            CellPlacement {
                layout,
                slots,
                offset: CellOffset {
                    margin_left: shift.left,
                    margin_top: shift.top,
                    transform: rule.transform(row),
                },
            }
        }
    };
    Ok(placement)
}
