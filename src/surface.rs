//! Live render targets
//!
//! A [`Surface`] is the thin adapter between a built scene and whatever
//! actually displays it. The engine ships [`RetainedSurface`], which keeps
//! the latest scene and hands out its markup; hosts with a real graphics
//! API implement the trait themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::design::Design;
use crate::error::{TileError, TileResult};
use crate::node::{Document, ElementKind};
use crate::render::render_document;
use crate::scene::{SceneOptions, build_grid};
use crate::tile::TileInstance;

// =============================================================================
// SurfaceKind
// =============================================================================

/// The three live previews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// 1×1 single tile preview
    Single,
    /// Small pattern swatch
    Swatch,
    /// Room / floor simulation under a background photo
    Room,
}

impl SurfaceKind {
    pub const ALL: [Self; 3] = [Self::Single, Self::Swatch, Self::Room];

    /// Name used in CSS classes and pattern id scopes
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Swatch => "swatch",
            Self::Room => "room",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Single => 0,
            Self::Swatch => 1,
            Self::Room => 2,
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Surface
// =============================================================================

/// A render target that can display a scene
pub trait Surface {
    /// Which preview this is
    fn kind(&self) -> SurfaceKind;

    /// Drop the current contents and show `scene` instead
    fn replace_scene(&mut self, scene: Document);

    /// Latest scene, for surfaces that keep it around
    fn scene(&self) -> Option<&Document> {
        None
    }
}

/// Surface that retains the latest scene in memory
#[derive(Debug, Clone)]
pub struct RetainedSurface {
    kind: SurfaceKind,
    scene: Option<Document>,
    generation: u64,
}

impl RetainedSurface {
    pub fn new(kind: SurfaceKind) -> Self {
        Self { kind, scene: None, generation: 0 }
    }

    /// Latest scene, if one was rendered
    pub fn scene(&self) -> Option<&Document> {
        self.scene.as_ref()
    }

    /// Number of scenes received so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Markup of the latest scene
    pub fn markup(&self) -> Option<String> {
        self.scene.as_ref().map(render_document)
    }

    /// Number of grid cells in the latest scene
    pub fn cell_count(&self) -> usize {
        self.scene.as_ref().map_or(0, |s| s.count_kind(ElementKind::Cell))
    }
}

impl Surface for RetainedSurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn replace_scene(&mut self, scene: Document) {
        self.scene = Some(scene);
        self.generation += 1;
    }

    fn scene(&self) -> Option<&Document> {
        RetainedSurface::scene(self)
    }
}

// =============================================================================
// render_grid
// =============================================================================

/// Why a render did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target surface is not attached yet
    TargetMissing,
    /// No design is selected
    NoDesigns,
}

/// Result of one [`render_grid`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { cells: usize },
    Skipped(SkipReason),
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// Rebuild a surface's scene from scratch.
///
/// A missing target or an empty selection is a no-op, not an error.
///
/// # Errors
///
/// `UnsupportedDesignCount` when the selection is neither 1 nor 4 designs.
pub fn render_grid<D: AsRef<Design>>(
    target: Option<&mut dyn Surface>,
    rows: usize,
    cols: usize,
    tile: &TileInstance,
    designs: &[D],
    options: &SceneOptions,
) -> TileResult<RenderOutcome> {
    let Some(target) = target else {
        tracing::debug!(tile = %tile.id, "render target missing, skipping");
        return Ok(RenderOutcome::Skipped(SkipReason::TargetMissing));
    };
    if designs.is_empty() {
        tracing::debug!(surface = %target.kind(), "nothing selected, skipping");
        return Ok(RenderOutcome::Skipped(SkipReason::NoDesigns));
    }

    let scene = build_grid(target.kind(), rows, cols, tile, designs, options)?;
    let cells = scene.count_kind(ElementKind::Cell);
    target.replace_scene(scene);
    Ok(RenderOutcome::Rendered { cells })
}

// =============================================================================
// SurfaceSet
// =============================================================================

/// Up to one attached surface per [`SurfaceKind`]
#[derive(Default)]
pub struct SurfaceSet {
    slots: [Option<Box<dyn Surface + Send>>; 3],
}

impl SurfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a surface, returning the one it replaces
    pub fn attach(&mut self, surface: Box<dyn Surface + Send>) -> Option<Box<dyn Surface + Send>> {
        let index = surface.kind().index();
        self.slots[index].replace(surface)
    }

    /// Detach the surface of one kind
    pub fn detach(&mut self, kind: SurfaceKind) -> Option<Box<dyn Surface + Send>> {
        self.slots[kind.index()].take()
    }

    pub fn is_attached(&self, kind: SurfaceKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Attached surface of one kind, if any
    pub fn get(&self, kind: SurfaceKind) -> Option<&(dyn Surface + Send + 'static)> {
        self.slots[kind.index()].as_deref()
    }

    pub fn get_mut(&mut self, kind: SurfaceKind) -> Option<&mut (dyn Surface + Send + 'static)> {
        self.slots[kind.index()].as_deref_mut()
    }

    /// Attached surface of one kind.
    ///
    /// # Errors
    ///
    /// `RenderTargetMissing` when nothing is attached for `kind`.
    pub fn require(&mut self, kind: SurfaceKind) -> TileResult<&mut (dyn Surface + Send + 'static)> {
        self.get_mut(kind)
            .ok_or(TileError::RenderTargetMissing { surface: kind })
    }

    /// Kinds with an attached surface
    pub fn attached(&self) -> impl Iterator<Item = SurfaceKind> + '_ {
        SurfaceKind::ALL.into_iter().filter(|k| self.is_attached(*k))
    }
}

impl fmt::Debug for SurfaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceSet")
            .field("attached", &self.attached().collect::<Vec<_>>())
            .finish()
    }
}
