//! tilegrid - SVG tile-pattern compositing
//!
//! ## Core Concepts
//!
//! A **design** is a parsed SVG: a viewBox plus an ordered list of paths,
//! each with a stable id. A **tile** is one design (single layout) or four
//! designs arranged 2×2 (quad layout), each turned by a quarter-turn angle
//! and painted with per-path fills that can be solid colors or images.
//!
//! Tiles are composed into grids on three **surfaces** (single preview,
//! swatch, room mockup) separated by grout, and can be exported as a
//! standalone SVG or HTML artifact.
//!
//! ## Modules
//! - `design`: SVG sources and the design parser
//! - `fill`, `rotation`, `tile`: per-tile customization state
//! - `layout`: per-cell placement and the named offset table
//! - `scene`, `node`, `render`: scene tree construction and markup output
//! - `surface`: render targets
//! - `export`, `sink`: static artifacts and their delivery
//! - `load`, `cache`: design loading with stale-selection protection
//! - `session`: the state owner tying everything together
//!
//! ## Usage
//!
//! ```ignore
//! use tilegrid::prelude::*;
//!
//! let mut session = TileSession::new(EngineConfig::default());
//! session.attach_surface(Box::new(RetainedSurface::new(SurfaceKind::Swatch)))?;
//!
//! let request = SelectionRequest::new("42", "Lola")
//!     .design(DesignRequest::new("42-0", DesignSource::Inline(svg)));
//! session.select_local(request)?;
//!
//! session.recolor("42-0-1", FillRef::solid("#1e90ff"))?;
//! session.rotate(0)?;
//! let artifact = session.export(ExportFormat::Document)?;
//! ```

mod macros;

// =============================================================================
// Core modules
// =============================================================================

/// Attribute storage and inline style builder
pub mod attr;

/// Stable content hashing
pub mod hash;

/// Identifier types
pub mod id;

/// Error types
pub mod error;

/// Engine configuration
pub mod config;

/// Designs and the SVG parser
pub mod design;

/// Parsed-design cache
pub mod cache;

/// Design loading and stale-selection guard
pub mod load;

// =============================================================================
// Tile state
// =============================================================================

/// Path fills and linked recoloring
pub mod fill;

/// Quarter-turn rotations
pub mod rotation;

/// Tile snapshot, grout and layout
pub mod tile;

/// Cell placement and offset rules
pub mod layout;

// =============================================================================
// Output
// =============================================================================

/// Scene tree: Document, Element, Node, Text
pub mod node;

/// Scene construction
pub mod scene;

/// HTML/SVG rendering
pub mod render;

/// Render targets
pub mod surface;

/// Static export
pub mod export;

/// Export delivery
pub mod sink;

/// Session state owner
pub mod session;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Designs
pub use design::{Design, DesignSource, PathRecord, ViewBox, parse, parse_or_fallback};

// Identity
pub use id::{DesignId, PatternId, SelectionToken, TileId};

// Tile state
pub use fill::{ColorAssignment, FillRef};
pub use rotation::{Rotation, RotationStore};
pub use tile::{Grout, GroutColor, GroutThickness, Layout, TileInstance};

// Layout
pub use layout::{CellPlacement, compute_cell_placement};

// Node types
pub use node::{Document, Element, Node, Text, TextKind, Children};

// Scene and surfaces
pub use scene::{SceneOptions, build_grid};
pub use surface::{RenderOutcome, RetainedSurface, Surface, SurfaceKind, render_grid};

// Export
pub use export::{ExportArtifact, ExportFormat, ExportOptions, serialize};
pub use sink::{ExportAction, ExportSink};

// Loading
pub use cache::{CacheKey, SharedDesignCache};
pub use load::{DesignRequest, PendingSelection, ResolvedSelection, SelectionRequest};

#[cfg(feature = "async")]
pub use load::DesignFetcher;

// Session
pub use config::EngineConfig;
pub use session::TileSession;

// Error types
pub use error::{ExportError, ParseError, TileError, TileResult};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ElementKind;

    const SQUARE: &str = r##"<svg viewBox="0 0 100 100">
        <path d="M0 0H100V100H0Z" fill="#d2b48c"/>
        <path d="M50 0L100 50L50 100L0 50Z" fill="#8b4513"/>
    </svg>"##;

    fn single_request(tile: &str) -> SelectionRequest {
        SelectionRequest::new(tile, "Fiori")
            .design(DesignRequest::new(format!("{tile}-0").as_str(), DesignSource::Inline(SQUARE.into())))
    }

    fn quad_request(tile: &str) -> SelectionRequest {
        let marked = SQUARE.replacen("<path d=\"M50", "<path id=\"p-42\" d=\"M50", 1);
        (0..4).fold(SelectionRequest::new(tile, "Lola"), |req, i| {
            let svg = if i == 2 { marked.clone() } else { SQUARE.to_string() };
            req.design(DesignRequest::new(format!("{tile}-{i}").as_str(), DesignSource::Inline(svg)))
        })
    }

    fn swatch_session() -> TileSession {
        let mut session = TileSession::new(EngineConfig::default());
        session
            .attach_surface(Box::new(RetainedSurface::new(SurfaceKind::Swatch)))
            .unwrap();
        session
    }

    fn swatch_scene(session: &TileSession) -> &Document {
        session.surfaces().get(SurfaceKind::Swatch).and_then(|s| s.scene()).unwrap()
    }

    #[test]
    fn test_single_tile_thin_blue_grout() {
        let mut session = swatch_session();
        session.set_grid_size(SurfaceKind::Swatch, 2, 2).unwrap();
        session.select_local(single_request("1")).unwrap();
        session.set_grout(Grout::new(GroutColor::Blue, GroutThickness::Thin)).unwrap();

        let doc = swatch_scene(&session);
        assert_eq!(doc.count_kind(ElementKind::Cell), 4);
        assert_eq!(doc.count_kind(ElementKind::Svg), 4);
        assert_eq!(doc.count_kind(ElementKind::Pattern), 0);

        let grid_style = doc.root.get_attr("style").unwrap();
        assert!(grid_style.contains("gap:1px"));
        assert!(grid_style.contains("background-color:blue"));

        let fills: Vec<_> = doc
            .find_all(|e| e.kind == ElementKind::Path)
            .into_iter()
            .filter_map(|e| e.get_attr("fill"))
            .collect();
        assert_eq!(fills.len(), 8);
        assert_eq!(fills.iter().filter(|f| **f == "#d2b48c").count(), 4);
    }

    #[test]
    fn test_quad_tile_image_fill() {
        let mut session = swatch_session();
        session.set_grid_size(SurfaceKind::Swatch, 1, 1).unwrap();
        session.select_local(quad_request("2")).unwrap();

        let fill = FillRef::image("https://cdn.example.com/uploads/marble.png");
        assert_eq!(session.recolor("p-42", fill).unwrap(), 1);

        let doc = swatch_scene(&session);
        assert_eq!(doc.count_kind(ElementKind::Quad), 1);
        assert_eq!(doc.count_kind(ElementKind::Svg), 4);

        let patterns = doc.find_all(|e| e.kind == ElementKind::Pattern);
        assert_eq!(patterns.len(), 1);
        let image = patterns[0].first_child().unwrap();
        assert_eq!(image.get_attr("href"), Some("https://cdn.example.com/uploads/marble.png"));

        let path = doc.find_element(|e| e.get_attr("data-path-id") == Some("p-42")).unwrap();
        let paint = path.get_attr("fill").unwrap();
        assert!(paint.starts_with("url(#pattern-p-42-"));
        assert_eq!(paint, format!("url(#{})", patterns[0].id().unwrap()));
    }

    #[test]
    fn test_single_tile_solid_override() {
        let svg = r##"<svg viewBox="0 0 100 100"><path id="face" d="M0 0H100V100H0Z" fill="#ffffff"/></svg>"##;
        let mut session = TileSession::new(EngineConfig::default());
        session
            .attach_surface(Box::new(RetainedSurface::new(SurfaceKind::Single)))
            .unwrap();
        let request = SelectionRequest::new("3", "Tiffany")
            .design(DesignRequest::new("3-0", DesignSource::Inline(svg.into())));
        session.select_local(request).unwrap();
        assert_eq!(session.recolor("face", FillRef::solid("#ff6347")).unwrap(), 1);

        let doc = session.surfaces().get(SurfaceKind::Single).and_then(|s| s.scene()).unwrap();
        assert_eq!(doc.count_kind(ElementKind::Path), 1);
        assert_eq!(doc.count_kind(ElementKind::Pattern), 0);

        let path = doc.find_kind(ElementKind::Path)[0];
        assert_eq!(path.get_attr("fill"), Some("#ff6347"));
        assert_eq!(path.get_attr("data-path-id"), Some("face"));
    }

    #[test]
    fn test_export_is_idempotent() {
        let mut session = TileSession::new(EngineConfig::default());
        session.select_local(quad_request("4")).unwrap();
        session.rotate(1).unwrap();

        let first = session.export(ExportFormat::Document).unwrap();
        let second = session.export(ExportFormat::Document).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.file_name(), second.file_name());
    }

    #[test]
    fn test_unreadable_design_renders_fallback() {
        let mut session = swatch_session();
        session.set_grid_size(SurfaceKind::Swatch, 1, 1).unwrap();
        let request = SelectionRequest::new("5", "Indie")
            .design(DesignRequest::new("5-0", DesignSource::Inline("<not-svg>".into())));
        assert!(session.select_local(request).unwrap());

        assert!(session.designs()[0].is_fallback());
        assert_eq!(swatch_scene(&session).count_kind(ElementKind::Svg), 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_select() {
        struct Cdn;

        impl DesignFetcher for Cdn {
            type Error = String;

            async fn fetch(&self, _url: &str) -> Result<String, Self::Error> {
                Ok(SQUARE.to_string())
            }
        }

        let mut session = swatch_session();
        let request = SelectionRequest::new("6", "Gio").design(DesignRequest::new(
            "6-0",
            DesignSource::Url("https://cdn.example.com/6-0.svg".into()),
        ));
        assert!(session.select(request, &Cdn).await.unwrap());
        assert!(!session.designs()[0].is_fallback());
        assert_eq!(session.designs()[0].paths.len(), 2);
    }
}
