//! Static export
//!
//! Regenerates one tile as a portable artifact for download, sharing and
//! email. Cells are built by the same [`crate::scene`] functions the live
//! surfaces use, with the `export` pattern scope, so the file matches what
//! the user saw.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attr::{Style, fmt_num};
use crate::design::Design;
use crate::error::ExportError;
use crate::hash::StableHasher;
use crate::layout::compute_cell_placement;
use crate::node::{Document, Element, ElementKind};
use crate::render::{render_document, render_html_page};
use crate::scene::{CellContext, DEFAULT_CELL_PX, EXPORT_SCOPE, placement_svgs};
use crate::surface::SurfaceKind;
use crate::tile::{Layout, TileInstance};

/// Output shape of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Bare markup: one `<svg>`, or a `<div>` of four for quad tiles
    #[default]
    Fragment,
    /// Complete HTML page
    Document,
}

/// Export knobs, usually taken from [`crate::config::ExportConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Edge length of the exported tile in CSS pixels
    pub cell_px: f64,
    /// Appended to the tile name in the page title
    pub title_suffix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { cell_px: DEFAULT_CELL_PX * 5.0, title_suffix: String::from("Custom Tile") }
    }
}

/// A serialized tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub markup: String,
    /// Hex digest of `markup`
    pub digest: String,
}

impl ExportArtifact {
    fn new(format: ExportFormat, markup: String) -> Self {
        let digest = StableHasher::new().update_str(&markup).finish_hex();
        Self { format, markup, digest }
    }

    /// Check if the markup is a standalone SVG file
    pub fn is_svg(&self) -> bool {
        self.markup.starts_with("<svg")
    }

    /// Suggested download name
    pub fn file_name(&self) -> String {
        let ext = if self.is_svg() { "svg" } else { "html" };
        format!("tile-{}.{ext}", self.digest)
    }

    pub fn mime_type(&self) -> &'static str {
        if self.is_svg() { "image/svg+xml" } else { "text/html" }
    }

    pub fn len(&self) -> usize {
        self.markup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }
}

impl fmt::Display for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup)
    }
}

/// Serialize a tile with default options.
///
/// # Errors
///
/// See [`serialize_with`].
pub fn serialize<D: AsRef<Design>>(
    tile: &TileInstance,
    designs: &[D],
    format: ExportFormat,
) -> Result<ExportArtifact, ExportError> {
    serialize_with(tile, designs, format, &ExportOptions::default())
}

/// Serialize a tile.
///
/// Output is byte-identical for identical input.
///
/// # Errors
///
/// - `NoTileData` when `designs` is empty
/// - `UnsupportedLayout` unless there are 1 or 4 designs
/// - `RotationMismatch` when the tile's rotation count differs
pub fn serialize_with<D: AsRef<Design>>(
    tile: &TileInstance,
    designs: &[D],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact, ExportError> {
    let fragment = build_fragment(tile, designs, options)?;
    let artifact = match format {
        ExportFormat::Fragment => ExportArtifact::new(format, render_document(&Document::new(fragment))),
        ExportFormat::Document => {
            let page = build_page(tile, designs, fragment, options);
            ExportArtifact::new(format, render_html_page(&Document::new(page)))
        }
    };
    tracing::info!(
        tile = %tile.id,
        format = ?artifact.format,
        bytes = artifact.len(),
        digest = %artifact.digest,
        "tile exported"
    );
    Ok(artifact)
}

fn build_fragment<D: AsRef<Design>>(
    tile: &TileInstance,
    designs: &[D],
    options: &ExportOptions,
) -> Result<Element, ExportError> {
    let count = designs.len();
    if count == 0 {
        return Err(ExportError::NoTileData);
    }
    let layout = Layout::for_count(count).map_err(|_| ExportError::UnsupportedLayout { count })?;
    if tile.rotations.len() != count {
        return Err(ExportError::RotationMismatch { rotations: tile.rotations.len(), designs: count });
    }

    let placement = compute_cell_placement(0, 0, 1, tile, count, SurfaceKind::Single)
        .map_err(|_| ExportError::UnsupportedLayout { count })?;
    let ctx = CellContext { scope: EXPORT_SCOPE, row: 0, col: 0, slot: 0 };
    let mut svgs = placement_svgs(&placement, tile, designs, ctx);
    let size = fmt_num(options.cell_px);

    match layout {
        Layout::Single => {
            let mut svg = svgs.pop().ok_or(ExportError::NoTileData)?;
            svg.set_attr("width", size.as_str());
            svg.set_attr("height", size);
            // Margins only position cells within a grid; the turn is part of the look
            if let Some(transform) = placement.offset.transform {
                svg.set_attr("style", Style::new().decl("transform", transform).to_string());
            }
            Ok(svg)
        }
        Layout::Quad => {
            let half = fmt_num(options.cell_px / 2.0);
            let style = Style::new()
                .decl("display", "grid")
                .decl("grid-template-columns", format!("repeat(2,{half}px)"))
                .decl("grid-template-rows", format!("repeat(2,{half}px)"))
                .decl("gap", "0px")
                .decl("width", format!("{size}px"))
                .decl("height", format!("{size}px"));
            Ok(Element::new("div", ElementKind::Quad)
                .with_class("tile-export")
                .with_style(&style)
                .children(svgs))
        }
    }
}

fn build_page<D: AsRef<Design>>(
    tile: &TileInstance,
    designs: &[D],
    fragment: Element,
    options: &ExportOptions,
) -> Element {
    let title = match (tile.name.is_empty(), options.title_suffix.is_empty()) {
        (true, true) => String::from("Tile"),
        (true, false) => options.title_suffix.clone(),
        (false, true) => tile.name.to_string(),
        (false, false) => format!("{} {}", tile.name, options.title_suffix),
    };
    let design_ids = designs
        .iter()
        .map(|d| d.as_ref().id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let layout = match designs.len() {
        4 => Layout::Quad,
        _ => Layout::Single,
    };

    let gap = tile.grout.thickness.px();
    let size = fmt_num(options.cell_px);
    let css = format!(
        "body{{margin:0;padding:16px}}\
         .tile-frame{{display:inline-block;line-height:0;padding:{gap}px;background-color:{color}}}\
         .tile-frame>svg,.tile-frame>.tile-export{{width:{size}px;height:{size}px}}",
        color = tile.grout.color.css(),
    );

    let meta = |name: &str, content: String| {
        Element::new("meta", ElementKind::Other)
            .attr("name", name)
            .attr("content", content)
    };

    let head = Element::new("head", ElementKind::Other)
        .child(Element::new("meta", ElementKind::Other).attr("charset", "utf-8"))
        .child(Element::new("title", ElementKind::Other).text(title))
        .child(meta("tile-design", design_ids))
        .child(meta("grout-color", tile.grout.color.css().to_string()))
        .child(meta("grout-thickness", tile.grout.thickness.as_str().to_string()))
        .child(meta("tile-layout", layout.as_str().to_string()))
        .child(Element::new("style", ElementKind::Other).raw_text(css));

    let body = Element::new("body", ElementKind::Other).child(
        Element::new("div", ElementKind::Other)
            .with_class("tile-frame")
            .child(fragment),
    );

    Element::new("html", ElementKind::Other)
        .attr("lang", "en")
        .child(head)
        .child(body)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{PathRecord, ViewBox};
    use crate::fill::{ColorAssignment, FillRef};
    use crate::rotation::seed;
    use crate::tile::{Grout, GroutColor, GroutThickness};

    fn design(id: &str) -> Design {
        Design::new(
            id,
            ViewBox::default(),
            vec![PathRecord::new(format!("{id}-p"), "M0 0H100V100H0Z", Some("#abcdef"))],
        )
    }

    #[test]
    fn test_no_designs() {
        let tile = TileInstance::new("t", "", seed(0));
        let none: Vec<Design> = Vec::new();
        let err = serialize(&tile, &none, ExportFormat::Fragment).unwrap_err();
        assert_eq!(err, ExportError::NoTileData);
        assert_eq!(err.to_string(), "no tile data available");
    }

    #[test]
    fn test_unsupported_and_mismatch() {
        let designs = vec![design("a"), design("b")];
        let tile = TileInstance::new("t", "", seed(2));
        assert_eq!(
            serialize(&tile, &designs, ExportFormat::Fragment).unwrap_err(),
            ExportError::UnsupportedLayout { count: 2 }
        );

        let tile = TileInstance::new("t", "", seed(4));
        assert_eq!(
            serialize(&tile, &[design("a")], ExportFormat::Fragment).unwrap_err(),
            ExportError::RotationMismatch { rotations: 4, designs: 1 }
        );
    }

    #[test]
    fn test_single_fragment_is_standalone_svg() {
        let tile = TileInstance::new("t", "", seed(1));
        let artifact = serialize(&tile, &[design("a")], ExportFormat::Fragment).unwrap();
        assert!(artifact.is_svg());
        assert!(artifact.markup.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100" width="300" height="300""#));
        assert_eq!(artifact.file_name(), format!("tile-{}.svg", artifact.digest));
        assert_eq!(artifact.mime_type(), "image/svg+xml");
    }

    #[test]
    fn test_quad_fragment() {
        let designs: Vec<Design> = ["a", "b", "c", "d"].into_iter().map(design).collect();
        let tile = TileInstance::new("q", "", seed(4));
        let artifact = serialize(&tile, &designs, ExportFormat::Fragment).unwrap();

        assert!(artifact.markup.starts_with(r#"<div class="tile-export""#));
        assert_eq!(artifact.markup.matches("<svg").count(), 4);
        assert!(artifact.markup.contains("rotate(270 50 50)"));
        assert!(artifact.file_name().ends_with(".html"));
    }

    #[test]
    fn test_document_metadata() {
        let tile = TileInstance::new("t", "Gio", seed(1))
            .with_grout(Grout::new(GroutColor::Green, GroutThickness::Thick));
        let artifact = serialize(&tile, &[design("a")], ExportFormat::Document).unwrap();
        let html = &artifact.markup;

        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\" />"));
        assert!(html.contains("<title>Gio Custom Tile</title>"));
        assert!(html.contains(r#"<meta name="tile-design" content="a" />"#));
        assert!(html.contains(r#"<meta name="grout-color" content="green" />"#));
        assert!(html.contains(r#"<meta name="grout-thickness" content="thick" />"#));
        assert!(html.contains(r#"<meta name="tile-layout" content="single" />"#));
        assert!(html.contains("padding:2px;background-color:green"));
        assert!(html.contains(r#"<div class="tile-frame"><svg"#));
    }

    #[test]
    fn test_export_patterns_use_export_scope() {
        let mut colors = ColorAssignment::new();
        colors.set("a-p", FillRef::image("https://cdn.example.com/uploads/slate.png"));
        let tile = TileInstance::new("t", "", seed(1)).with_colors(colors);
        let artifact = serialize(&tile, &[design("a")], ExportFormat::Fragment).unwrap();

        let defs = artifact.markup.find("<defs>").unwrap();
        let path = artifact.markup.find("<path").unwrap();
        assert!(defs < path);
        assert!(artifact.markup.contains(r#"fill="url(#pattern-a-p-export-0-0-0)""#));
    }

    #[test]
    fn test_row_transform_matches_live_cell() {
        let tile = TileInstance::new("t", "Gio", seed(1));
        let live = compute_cell_placement(0, 0, 1, &tile, 1, SurfaceKind::Single).unwrap();
        assert_eq!(live.offset.transform, Some("rotate(30deg)"));

        for format in [ExportFormat::Fragment, ExportFormat::Document] {
            let artifact = serialize(&tile, &[design("a")], format).unwrap();
            assert!(artifact.markup.contains(r#"style="transform:rotate(30deg)""#));
        }

        // Odd-row-only rules leave the exported row 0 untouched
        let tile = TileInstance::new("t", "Indie", seed(1));
        let artifact = serialize(&tile, &[design("a")], ExportFormat::Fragment).unwrap();
        assert!(!artifact.markup.contains("transform:"));
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let tile = TileInstance::new("t", "Fiori", seed(1));
        let a = serialize(&tile, &[design("a")], ExportFormat::Document).unwrap();
        let b = serialize(&tile, &[design("a")], ExportFormat::Document).unwrap();
        assert_eq!(a, b);
    }
}
