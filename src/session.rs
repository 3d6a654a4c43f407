//! Tile session
//!
//! [`TileSession`] owns every piece of mutable state of one customization
//! session (rotations, colors, grout, attached surfaces and the selection
//! token) and redraws all attached surfaces after each change. Layout, scene
//! and export code only ever see [`TileInstance`] snapshots.

use std::sync::Arc;

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cache::SharedDesignCache;
use crate::config::EngineConfig;
use crate::design::Design;
use crate::error::{ExportError, TileError, TileResult};
use crate::export::{ExportArtifact, ExportFormat, serialize_with};
use crate::fill::{ColorAssignment, FillRef};
use crate::id::{LinkKeyFn, SelectionToken, TileId, link_key_of};
use crate::load::{PendingSelection, ResolvedSelection, SelectionRequest};
use crate::rotation::{Rotation, RotationStore};
use crate::scene::clamp_grid;
use crate::sink::{DeliveryReceipt, ExportAction, ExportSink, deliver_artifact};
use crate::surface::{RenderOutcome, SkipReason, Surface, SurfaceKind, SurfaceSet, render_grid};
use crate::tile::{Grout, GroutColor, GroutThickness, Layout, TileInstance};

/// Per-surface result of a redraw
pub type RedrawReport = SmallVec<[(SurfaceKind, RenderOutcome); 3]>;

/// The currently displayed tile
#[derive(Debug, Clone)]
struct Active {
    tile_id: TileId,
    name: CompactString,
    designs: SmallVec<[Arc<Design>; 4]>,
}

/// State owner of one customization session
pub struct TileSession {
    config: EngineConfig,
    cache: SharedDesignCache,
    rotations: RotationStore,
    colors: FxHashMap<TileId, ColorAssignment>,
    grout: Grout,
    show_borders: bool,
    surfaces: SurfaceSet,
    token: SelectionToken,
    link_key: LinkKeyFn,
    active: Option<Active>,
}

impl TileSession {
    /// Create a session with its own design cache
    pub fn new(config: EngineConfig) -> Self {
        let cache = SharedDesignCache::with_capacity(config.cache_capacity);
        Self::with_cache(config, cache)
    }

    /// Create a session sharing a design cache
    pub fn with_cache(config: EngineConfig, cache: SharedDesignCache) -> Self {
        Self {
            config,
            cache,
            rotations: RotationStore::new(),
            colors: FxHashMap::default(),
            grout: Grout::default(),
            show_borders: false,
            surfaces: SurfaceSet::new(),
            token: SelectionToken::initial(),
            link_key: link_key_of,
            active: None,
        }
    }

    /// Replace the linked-path grouping
    pub fn with_link_key(mut self, link_key: LinkKeyFn) -> Self {
        self.link_key = link_key;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &SharedDesignCache {
        &self.cache
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    pub fn surfaces_mut(&mut self) -> &mut SurfaceSet {
        &mut self.surfaces
    }

    pub fn grout(&self) -> Grout {
        self.grout
    }

    pub fn token(&self) -> SelectionToken {
        self.token
    }

    /// Designs of the displayed tile, empty before any selection
    pub fn designs(&self) -> &[Arc<Design>] {
        self.active.as_ref().map_or(&[][..], |a| a.designs.as_slice())
    }

    pub fn active_tile(&self) -> Option<&TileId> {
        self.active.as_ref().map(|a| &a.tile_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Surfaces
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach a surface and draw the current tile on it
    pub fn attach_surface(&mut self, surface: Box<dyn Surface + Send>) -> TileResult<RenderOutcome> {
        let kind = surface.kind();
        self.surfaces.attach(surface);
        self.redraw_one(kind)
    }

    /// Change a surface's grid size (clamped to `1..=75`) and redraw it
    pub fn set_grid_size(&mut self, kind: SurfaceKind, rows: usize, cols: usize) -> TileResult<RenderOutcome> {
        let grid = self.config.surfaces.get_mut(kind);
        grid.rows = clamp_grid(rows);
        grid.cols = clamp_grid(cols);
        self.redraw_one(kind)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Start loading a tile; any earlier pending selection becomes stale
    pub fn begin_selection(&mut self, request: SelectionRequest) -> PendingSelection {
        self.token = self.token.next();
        tracing::debug!(tile = %request.tile_id, token = self.token.as_u64(), "selection started");
        PendingSelection::new(self.token, request)
    }

    /// Install loaded designs and redraw.
    ///
    /// Returns `Ok(false)` without touching any state when a newer selection
    /// has started since `resolved` was requested.
    ///
    /// # Errors
    ///
    /// `UnsupportedDesignCount` unless the selection holds 1 or 4 designs.
    pub fn apply(&mut self, resolved: ResolvedSelection) -> TileResult<bool> {
        if resolved.token != self.token {
            tracing::debug!(
                tile = %resolved.tile_id,
                stale = resolved.token.as_u64(),
                current = self.token.as_u64(),
                "discarding stale selection"
            );
            return Ok(false);
        }
        Layout::for_count(resolved.designs.len())?;

        let name = if resolved.tile_name.is_empty() {
            resolved
                .designs
                .iter()
                .find_map(|d| d.name.clone())
                .unwrap_or_default()
        } else {
            resolved.tile_name
        };
        self.active = Some(Active {
            tile_id: resolved.tile_id,
            name,
            designs: resolved.designs.into_iter().collect(),
        });
        self.redraw()?;
        Ok(true)
    }

    /// Select a tile whose designs are all inline or base64
    pub fn select_local(&mut self, request: SelectionRequest) -> TileResult<bool> {
        let resolved = self.begin_selection(request).resolve_local(&self.cache);
        self.apply(resolved)
    }

    /// Select a tile, fetching URL sources
    #[cfg(feature = "async")]
    pub async fn select<F: crate::load::DesignFetcher>(
        &mut self,
        request: SelectionRequest,
        fetcher: &F,
    ) -> TileResult<bool> {
        let cache = self.cache.clone();
        let resolved = self.begin_selection(request).resolve(fetcher, &cache).await;
        self.apply(resolved)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of the displayed tile
    pub fn tile_instance(&mut self) -> Option<TileInstance> {
        let active = self.active.as_ref()?;
        let count = active.designs.len();
        Some(TileInstance {
            id: active.tile_id.clone(),
            name: active.name.clone(),
            rotations: self.rotations.snapshot(&active.tile_id, count),
            colors: self.colors.get(&active.tile_id).cloned().unwrap_or_default(),
            grout: self.grout,
            show_borders: self.show_borders,
        })
    }

    /// Recolor a path and its linked paths, then redraw.
    ///
    /// Returns the number of paths recolored; 0 when nothing is selected.
    pub fn recolor(&mut self, path_id: &str, fill: FillRef) -> TileResult<usize> {
        let Some(active) = &self.active else {
            return Ok(0);
        };
        let written = self
            .colors
            .entry(active.tile_id.clone())
            .or_default()
            .recolor(path_id, fill, active.designs.as_slice(), self.link_key);
        self.redraw()?;
        Ok(written)
    }

    /// Drop a path's explicit fill, then redraw
    pub fn clear_color(&mut self, path_id: &str) -> TileResult<bool> {
        let Some(active) = &self.active else {
            return Ok(false);
        };
        let removed = self
            .colors
            .get_mut(&active.tile_id)
            .and_then(|c| c.clear(path_id))
            .is_some();
        if removed {
            self.redraw()?;
        }
        Ok(removed)
    }

    /// Image fill for an uploaded file, relative to the configured base URL
    pub fn image_fill(&self, path: &str) -> FillRef {
        FillRef::image(self.config.image_url(path))
    }

    /// Turn one design a further 90°, then redraw
    pub fn rotate(&mut self, index: usize) -> TileResult<Rotation> {
        let (tile_id, count) = self.active_key()?;
        let rotation = self.rotations.rotate(&tile_id, count, index)?;
        self.redraw()?;
        Ok(rotation)
    }

    /// Set one design's absolute angle, then redraw
    pub fn set_rotation(&mut self, index: usize, degrees: i32) -> TileResult<Rotation> {
        let (tile_id, count) = self.active_key()?;
        let rotation = self.rotations.set_rotation(&tile_id, count, index, degrees)?;
        self.redraw()?;
        Ok(rotation)
    }

    pub fn set_grout(&mut self, grout: Grout) -> TileResult<RedrawReport> {
        self.grout = grout;
        self.redraw()
    }

    pub fn set_grout_color(&mut self, color: GroutColor) -> TileResult<RedrawReport> {
        self.set_grout(Grout { color, ..self.grout })
    }

    pub fn set_grout_thickness(&mut self, thickness: GroutThickness) -> TileResult<RedrawReport> {
        self.set_grout(Grout { thickness, ..self.grout })
    }

    pub fn set_show_borders(&mut self, show_borders: bool) -> TileResult<RedrawReport> {
        self.show_borders = show_borders;
        self.redraw()
    }

    fn active_key(&self) -> TileResult<(TileId, usize)> {
        let active = self.active.as_ref().ok_or(TileError::NoSelection)?;
        Ok((active.tile_id.clone(), active.designs.len()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Rebuild every surface from the same snapshot
    pub fn redraw(&mut self) -> TileResult<RedrawReport> {
        let mut report = RedrawReport::new();
        for kind in SurfaceKind::ALL {
            report.push((kind, self.redraw_one(kind)?));
        }
        Ok(report)
    }

    fn redraw_one(&mut self, kind: SurfaceKind) -> TileResult<RenderOutcome> {
        let Some(tile) = self.tile_instance() else {
            return Ok(RenderOutcome::Skipped(SkipReason::NoDesigns));
        };
        let grid = *self.config.surfaces.get(kind);
        let options = self.config.scene_options(kind);
        let designs = self.active.as_ref().map_or(&[][..], |a| a.designs.as_slice());
        let target = self.surfaces.get_mut(kind).map(|s| s as &mut dyn Surface);
        render_grid(target, grid.rows, grid.cols, &tile, designs, &options)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize the displayed tile.
    ///
    /// # Errors
    ///
    /// `NoTileData` before any selection; see [`serialize_with`].
    pub fn export(&mut self, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
        let tile = self.tile_instance().ok_or(ExportError::NoTileData)?;
        serialize_with(&tile, self.designs(), format, &self.config.export.options())
    }

    /// Serialize and hand the result to a sink.
    ///
    /// Serialization errors abort before any sink method is called.
    pub fn deliver<S: ExportSink + ?Sized>(
        &mut self,
        sink: &mut S,
        action: &ExportAction,
        format: ExportFormat,
    ) -> Result<DeliveryReceipt, ExportError> {
        let artifact = self.export(format)?;
        deliver_artifact(sink, action, &artifact)
    }
}

impl std::fmt::Debug for TileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileSession")
            .field("token", &self.token)
            .field("active", &self.active.as_ref().map(|a| &a.tile_id))
            .field("grout", &self.grout)
            .field("surfaces", &self.surfaces)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignSource;
    use crate::load::DesignRequest;
    use crate::sink::tests::RecordingSink;
    use crate::render::render_element_to_string;
    use crate::surface::RetainedSurface;

    const SVG: &str = r##"<svg viewBox="0 0 100 100"><path d="M0 0H100V100H0Z" fill="#ff0000"/><path d="M0 0L100 100"/></svg>"##;

    fn request(tile: &str, count: usize) -> SelectionRequest {
        (0..count).fold(SelectionRequest::new(tile, "Lola"), |req, i| {
            req.design(DesignRequest::new(format!("{tile}-{i}").as_str(), DesignSource::Inline(SVG.into())))
        })
    }

    fn session_with_surfaces() -> TileSession {
        let mut session = TileSession::new(EngineConfig::default());
        for kind in SurfaceKind::ALL {
            session.attach_surface(Box::new(RetainedSurface::new(kind))).unwrap();
        }
        session
    }

    #[test]
    fn test_stale_selection_is_discarded() {
        let mut session = TileSession::new(EngineConfig::default());
        let first = session.begin_selection(request("a", 1)).resolve_local(session.cache());
        let second = session.begin_selection(request("b", 4)).resolve_local(session.cache());

        assert!(session.apply(second).unwrap());
        assert!(!session.apply(first).unwrap());
        assert_eq!(session.active_tile().map(TileId::as_str), Some("b"));
        assert_eq!(session.designs().len(), 4);
    }

    #[test]
    fn test_unsupported_selection() {
        let mut session = TileSession::new(EngineConfig::default());
        assert!(matches!(
            session.select_local(request("x", 2)),
            Err(TileError::UnsupportedDesignCount { count: 2 })
        ));
        assert!(session.active_tile().is_none());
    }

    #[test]
    fn test_edits_redraw_every_surface() {
        let mut session = session_with_surfaces();
        session.select_local(request("t", 4)).unwrap();

        let report = session.set_grout_color(GroutColor::Orange).unwrap();
        assert_eq!(report.len(), 3);
        assert!(report.iter().all(|(_, outcome)| outcome.is_rendered()));

        // Linked: every design's second path
        assert_eq!(session.recolor("t-0-1", FillRef::solid("teal")).unwrap(), 4);
        assert_eq!(session.rotate(0).unwrap(), Rotation::R90);
    }

    /// Markup of cell (0, 0) of one surface, pattern scope blanked out
    fn first_cell_content(session: &TileSession, kind: SurfaceKind) -> String {
        let scene = session.surfaces().get(kind).and_then(|s| s.scene()).unwrap();
        let cell = scene
            .find_element(|e| e.get_attr("data-row") == Some("0") && e.get_attr("data-col") == Some("0"))
            .unwrap();
        let markup: String = cell.children_elements().map(render_element_to_string).collect();
        markup.replace(&format!("-{}-", kind.as_str()), "-*-")
    }

    #[test]
    fn test_surfaces_agree_after_edits() {
        let mut session = session_with_surfaces();
        session.select_local(request("s", 4)).unwrap();
        session.recolor("s-0-0", FillRef::solid("#2e8b57")).unwrap();
        session
            .recolor("s-2-1", session.image_fill("https://cdn.example.com/uploads/marble.png"))
            .unwrap();
        assert_eq!(session.rotate(3).unwrap(), Rotation::R270);

        let single = first_cell_content(&session, SurfaceKind::Single);
        assert!(single.contains(r##"fill="#2e8b57""##));
        assert!(single.contains(r#"href="https://cdn.example.com/uploads/marble.png""#));
        assert!(single.contains("url(#pattern-s-0-1-*-0-0-0)"));
        assert!(single.contains("rotate(90 50 50)"));
        assert_eq!(single.matches("rotate(270 50 50)").count(), 2);
        assert!(!single.contains("rotate(180 50 50)"));

        for kind in [SurfaceKind::Swatch, SurfaceKind::Room] {
            assert_eq!(first_cell_content(&session, kind), single, "{kind} differs from single");
        }
    }

    #[test]
    fn test_rotations_survive_switching_tiles() {
        let mut session = TileSession::new(EngineConfig::default());
        session.select_local(request("a", 1)).unwrap();
        session.set_rotation(0, 270).unwrap();
        session.select_local(request("b", 1)).unwrap();
        session.select_local(request("a", 1)).unwrap();
        assert_eq!(session.tile_instance().unwrap().rotations[0], Rotation::R270);
    }

    #[test]
    fn test_rotate_without_selection_fails() {
        let mut session = TileSession::new(EngineConfig::default());
        assert!(matches!(session.rotate(0), Err(TileError::NoSelection)));
        assert_eq!(session.recolor("p", FillRef::solid("red")).unwrap(), 0);
    }

    #[test]
    fn test_image_fill_uses_base_url() {
        let mut config = EngineConfig::default();
        config.image_base_url = "https://cdn.example.com".into();
        let session = TileSession::new(config);
        assert_eq!(
            session.image_fill("uploads/marble.png"),
            FillRef::image("https://cdn.example.com/uploads/marble.png")
        );
    }

    #[test]
    fn test_deliver_without_tile_never_calls_sink() {
        let mut session = TileSession::new(EngineConfig::default());
        let mut sink = RecordingSink::default();
        for action in [
            ExportAction::Download,
            ExportAction::Share,
            ExportAction::Email { to: "kim@example.com".into() },
        ] {
            let err = session.deliver(&mut sink, &action, ExportFormat::Document).unwrap_err();
            assert_eq!(err, ExportError::NoTileData);
        }
        assert!(sink.downloads.is_empty());
        assert_eq!(sink.shares, 0);
        assert!(sink.emails.is_empty());
    }

    #[test]
    fn test_deliver_email_shares_then_mails() {
        let mut session = TileSession::new(EngineConfig::default());
        session.select_local(request("m", 1)).unwrap();
        let mut sink = RecordingSink::default();

        let receipt = session
            .deliver(&mut sink, &ExportAction::Email { to: "kim@example.com".into() }, ExportFormat::Document)
            .unwrap();
        let DeliveryReceipt::Emailed { to, file_url } = receipt else {
            panic!("expected email receipt");
        };
        assert_eq!(to, "kim@example.com");
        assert!(file_url.starts_with("https://share.example.com/"));
        assert_eq!(sink.shares, 1);
        assert_eq!(sink.emails.len(), 1);
    }

    #[test]
    fn test_grid_size_is_clamped() {
        let mut session = session_with_surfaces();
        session.select_local(request("g", 1)).unwrap();
        let outcome = session.set_grid_size(SurfaceKind::Room, 0, 100).unwrap();
        assert_eq!(outcome, RenderOutcome::Rendered { cells: 75 });
    }
}
