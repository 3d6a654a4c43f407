//! Prelude module for common imports.
//!
//! ```ignore
//! use tilegrid::prelude::*;
//! ```

// Designs
pub use crate::design::{Design, DesignSource, PathRecord, ViewBox, parse, parse_or_fallback};

// Identity
pub use crate::id::{DesignId, LinkKeyFn, PatternId, SelectionToken, TileId, link_key_of};

// Tile state
pub use crate::fill::{ColorAssignment, FillRef, resolve_fill};
pub use crate::rotation::{Rotation, RotationStore, Rotations};
pub use crate::tile::{Grout, GroutColor, GroutThickness, Layout, TileInstance};

// Layout
pub use crate::layout::{CellOffset, CellPlacement, SlotPlacement, compute_cell_placement, rule_for};

// Node types
pub use crate::node::{Children, Document, Element, ElementKind, Node, Text, TextKind};

// Scene, surfaces and rendering
pub use crate::render::{render_document, render_html_page};
pub use crate::scene::{MAX_GRID_SIZE, SceneOptions, build_grid, clamp_grid};
pub use crate::surface::{
    RenderOutcome, RetainedSurface, SkipReason, Surface, SurfaceKind, SurfaceSet, render_grid,
};

// Export
pub use crate::export::{ExportArtifact, ExportFormat, ExportOptions, serialize, serialize_with};
pub use crate::sink::{DeliveryReceipt, EmailRequest, ExportAction, ExportSink};

// Loading
pub use crate::cache::{CacheKey, SharedDesignCache};
pub use crate::load::{DesignRequest, PendingSelection, ResolvedSelection, SelectionRequest};

#[cfg(feature = "async")]
pub use crate::load::DesignFetcher;

// Session
pub use crate::config::EngineConfig;
pub use crate::session::{RedrawReport, TileSession};

// Error
pub use crate::error::{ExportError, ParseError, TileError, TileResult};
