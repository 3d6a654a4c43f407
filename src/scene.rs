//! Scene construction
//!
//! Pure functions from (tile snapshot, designs) to a [`Document`]. Nothing
//! here touches a surface; [`crate::surface::render_grid`] hands the result
//! to one and [`crate::export`] renders it to a file.
//!
//! Layout of a live grid:
//!
//! ```text
//! div.tile-grid.tile-grid--{surface}      (CSS grid, gap = grout)
//! └─ div.tile-cell[data-row][data-col]    (offset as margin/transform)
//!    ├─ svg                               single layout
//!    └─ div.tile-quad                     quad layout, 2×2
//!       └─ svg × 4
//! ```

use smallvec::SmallVec;

use crate::attr::{Style, fmt_num};
use crate::design::Design;
use crate::error::TileResult;
use crate::fill::{FillRef, resolve_fill};
use crate::id::PatternId;
use crate::layout::{CellOffset, CellPlacement, compute_cell_placement};
use crate::node::{Document, Element, ElementKind};
use crate::rotation::Rotation;
use crate::surface::SurfaceKind;
use crate::tile::{Layout, TileInstance};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Largest accepted row or column count
pub const MAX_GRID_SIZE: usize = 75;

/// Pattern id scope of exported markup
pub const EXPORT_SCOPE: &str = "export";

/// Default cell edge length in CSS pixels
pub const DEFAULT_CELL_PX: f64 = 60.0;

/// Clamp a requested row/column count into `1..=MAX_GRID_SIZE`.
pub fn clamp_grid(n: usize) -> usize {
    n.clamp(1, MAX_GRID_SIZE)
}

// =============================================================================
// Options
// =============================================================================

/// Presentation knobs that are not part of the tile state
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    /// Cell edge length in CSS pixels
    pub cell_px: f64,
    /// Background photo of the room surface
    pub room_photo_url: Option<String>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self { cell_px: DEFAULT_CELL_PX, room_photo_url: None }
    }
}

/// Where a cell's `<svg>` sits, for pattern id uniqueness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellContext<'a> {
    pub scope: &'a str,
    pub row: usize,
    pub col: usize,
    pub slot: usize,
}

// =============================================================================
// Grid
// =============================================================================

/// Build the full scene of one surface.
///
/// Row and column counts are clamped to `1..=75`.
///
/// # Errors
///
/// `UnsupportedDesignCount` unless `designs` holds 1 or 4 designs.
pub fn build_grid<D: AsRef<Design>>(
    surface: SurfaceKind,
    rows: usize,
    cols: usize,
    tile: &TileInstance,
    designs: &[D],
    options: &SceneOptions,
) -> TileResult<Document> {
    let (rows, cols) = (clamp_grid(rows), clamp_grid(cols));
    let gap = tile.grout.thickness.px();

    let grid_style = Style::new()
        .decl("display", "grid")
        .decl("grid-template-columns", format!("repeat({cols},{}px)", fmt_num(options.cell_px)))
        .px("grid-auto-rows", options.cell_px)
        .decl("gap", format!("{gap}px"))
        .decl("background-color", tile.grout.color.css());

    let mut grid = Element::new("div", ElementKind::Grid)
        .with_class(format!("tile-grid tile-grid--{}", surface.as_str()))
        .with_style(&grid_style);

    for row in 0..rows {
        for col in 0..cols {
            let placement = compute_cell_placement(row, col, cols, tile, designs.len(), surface)?;
            let ctx = CellContext { scope: surface.as_str(), row, col, slot: 0 };
            grid.push_elem(build_cell(&placement, tile, designs, ctx));
        }
    }

    let root = match (surface, options.room_photo_url.as_deref()) {
        (SurfaceKind::Room, Some(photo)) => room_wrapper(grid, photo),
        _ => grid,
    };
    Ok(Document::new(root))
}

/// One `div.tile-cell` with its offset and content
fn build_cell<D: AsRef<Design>>(
    placement: &CellPlacement,
    tile: &TileInstance,
    designs: &[D],
    ctx: CellContext<'_>,
) -> Element {
    let cell = Element::new("div", ElementKind::Cell)
        .with_class("tile-cell")
        .attr("data-row", ctx.row.to_string())
        .attr("data-col", ctx.col.to_string())
        .with_style(&offset_style(&placement.offset));

    let svgs = placement_svgs(placement, tile, designs, ctx);
    match placement.layout {
        Layout::Single => cell.children(svgs),
        Layout::Quad => cell.child(quad_grid("tile-quad", 0).children(svgs)),
    }
}

/// The `<svg>` of every slot of a placement, in slot order
pub fn placement_svgs<D: AsRef<Design>>(
    placement: &CellPlacement,
    tile: &TileInstance,
    designs: &[D],
    ctx: CellContext<'_>,
) -> SmallVec<[Element; 4]> {
    placement
        .slots
        .iter()
        .enumerate()
        .filter_map(|(slot, placed)| {
            let design = designs.get(placed.design_index)?.as_ref();
            Some(cell_svg(design, placed.rotation, tile, CellContext { slot, ..ctx }))
        })
        .collect()
}

/// 2×2 CSS grid container used for quad cells and quad exports
pub fn quad_grid(class: &str, gap_px: u32) -> Element {
    let style = Style::new()
        .decl("display", "grid")
        .decl("grid-template-columns", "repeat(2,1fr)")
        .decl("grid-template-rows", "repeat(2,1fr)")
        .decl("gap", format!("{gap_px}px"))
        .decl("width", "100%")
        .decl("height", "100%");
    Element::new("div", ElementKind::Quad)
        .with_class(class)
        .with_style(&style)
}

fn offset_style(offset: &CellOffset) -> Style {
    if offset.is_zero() {
        return Style::new();
    }
    Style::new()
        .px("margin-left", offset.margin_left)
        .px("margin-top", offset.margin_top)
        .decl_opt("transform", offset.transform)
}

fn room_wrapper(grid: Element, photo_url: &str) -> Element {
    let photo_style = Style::new()
        .decl("position", "absolute")
        .decl("inset", "0")
        .decl("width", "100%")
        .decl("height", "100%")
        .decl("object-fit", "cover")
        .decl("pointer-events", "none")
        .decl("mix-blend-mode", "multiply");
    Element::new("div", ElementKind::Other)
        .with_class("tile-room")
        .with_style(&Style::new().decl("position", "relative"))
        .child(grid)
        .child(
            Element::new("img", ElementKind::Other)
                .with_class("tile-room-photo")
                .attr("src", photo_url)
                .attr("alt", "")
                .with_style(&photo_style),
        )
}

// =============================================================================
// Cell SVG
// =============================================================================

/// One design drawn at one rotation with the tile's fills.
///
/// Image fills become `<pattern>` definitions placed in `<defs>` ahead of
/// every path. The rotation group is left out at 0°.
pub fn cell_svg(design: &Design, rotation: Rotation, tile: &TileInstance, ctx: CellContext<'_>) -> Element {
    let mut defs = Element::new("defs", ElementKind::Defs);
    let mut paths = SmallVec::<[Element; 8]>::new();

    for path in &design.paths {
        let paint = match resolve_fill(path, &tile.colors) {
            FillRef::Solid(color) => color.to_string(),
            FillRef::ImagePattern(url) => {
                let id = PatternId::new(&path.id, ctx.scope, ctx.row, ctx.col, ctx.slot);
                let paint = id.paint();
                defs.push_elem(pattern_def(&id, &url));
                paint
            }
        };
        let mut elem = Element::new("path", ElementKind::Path)
            .attr("d", path.d.as_str())
            .attr("fill", paint)
            .attr("data-path-id", path.id.as_str());
        if tile.show_borders {
            elem = elem
                .attr("stroke", "black")
                .attr("stroke-width", "1")
                .attr("vector-effect", "non-scaling-stroke");
        }
        paths.push(elem);
    }

    let mut svg = Element::new("svg", ElementKind::Svg)
        .attr("xmlns", SVG_NS)
        .attr("viewBox", design.view_box.as_str())
        .attr("width", "100%")
        .attr("height", "100%")
        .attr("data-design-id", design.id.as_str());

    if !defs.is_empty() {
        svg.push_elem(defs);
    }

    if rotation.is_identity() {
        svg = svg.children(paths);
    } else {
        let (cx, cy) = design.view_box.center();
        let transform = format!("rotate({} {} {})", rotation.degrees(), fmt_num(cx), fmt_num(cy));
        svg.push_elem(
            Element::new("g", ElementKind::Group)
                .attr("transform", transform)
                .children(paths),
        );
    }

    if let Some(label) = &design.label {
        let (cx, cy) = design.view_box.center();
        svg.push_elem(
            Element::new("text", ElementKind::Label)
                .attr("x", fmt_num(cx))
                .attr("y", fmt_num(cy))
                .attr("text-anchor", "middle")
                .attr("dominant-baseline", "middle")
                .attr("font-size", "12")
                .attr("fill", "#555555")
                .text(label.as_str()),
        );
    }
    svg
}

/// `<pattern>` stretching an image over the whole path
pub fn pattern_def(id: &PatternId, href: &str) -> Element {
    Element::new("pattern", ElementKind::Pattern)
        .with_id(id.as_str())
        .attr("patternUnits", "userSpaceOnUse")
        .attr("width", "100%")
        .attr("height", "100%")
        .child(
            Element::new("image", ElementKind::Image)
                .attr("href", href)
                .attr("width", "100%")
                .attr("height", "100%")
                .attr("preserveAspectRatio", "xMidYMid slice"),
        )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{PathRecord, ViewBox};
    use crate::fill::ColorAssignment;
    use crate::render::{render_document, render_element_to_string};
    use crate::rotation::seed;
    use crate::tile::{Grout, GroutColor, GroutThickness};

    fn square(id: &str) -> Design {
        Design::new(
            id,
            ViewBox::default(),
            vec![
                PathRecord::new(format!("{id}-0"), "M0 0H100V100H0Z", Some("#eeeeee")),
                PathRecord::new(format!("{id}-1"), "M0 0L100 100", None),
            ],
        )
    }

    fn ctx() -> CellContext<'static> {
        CellContext { scope: "single", row: 0, col: 0, slot: 0 }
    }

    #[test]
    fn test_cell_svg_identity_rotation_has_no_group() {
        let tile = TileInstance::new("t", "", seed(1));
        let svg = cell_svg(&square("a"), Rotation::R0, &tile, ctx());
        let markup = render_element_to_string(&svg);

        assert!(!markup.contains("<g"));
        assert!(!markup.contains("<defs"));
        assert!(markup.contains(r##"fill="#eeeeee""##));
        assert!(markup.contains(r##"fill="#000000""##));
        assert!(markup.contains(r#"data-path-id="a-1""#));
    }

    #[test]
    fn test_cell_svg_rotation_group() {
        let tile = TileInstance::new("t", "", seed(1));
        let svg = cell_svg(&square("a"), Rotation::R270, &tile, ctx());
        let group = svg.first_child().unwrap();
        assert_eq!(group.kind, ElementKind::Group);
        assert_eq!(group.get_attr("transform"), Some("rotate(270 50 50)"));
        assert_eq!(group.element_count(), 2);
    }

    #[test]
    fn test_defs_come_before_paths() {
        let mut colors = ColorAssignment::new();
        colors.set("a-1", FillRef::image("https://cdn.example.com/uploads/oak.png"));
        let tile = TileInstance::new("t", "", seed(1)).with_colors(colors);

        let svg = cell_svg(&square("a"), Rotation::R90, &tile, CellContext { scope: "room", row: 2, col: 3, slot: 0 });
        let first = svg.first_child().unwrap();
        assert_eq!(first.kind, ElementKind::Defs);
        assert_eq!(first.element_count(), 1);

        let markup = render_element_to_string(&svg);
        assert!(markup.contains(r#"<pattern id="pattern-a-1-room-2-3-0" patternUnits="userSpaceOnUse""#));
        assert!(markup.contains(r#"fill="url(#pattern-a-1-room-2-3-0)""#));
        assert!(markup.contains(r#"preserveAspectRatio="xMidYMid slice""#));
    }

    #[test]
    fn test_lookalike_path_ids_get_their_own_patterns() {
        let design = Design::new(
            "d",
            ViewBox::default(),
            vec![
                PathRecord::new("a b", "M0 0H50V50Z", None),
                PathRecord::new("a_b", "M50 50H100V100Z", None),
            ],
        );
        let mut colors = ColorAssignment::new();
        colors.set("a b", FillRef::image("https://cdn.example.com/uploads/oak.png"));
        colors.set("a_b", FillRef::image("https://cdn.example.com/uploads/slate.png"));
        let tile = TileInstance::new("t", "", seed(1)).with_colors(colors);

        let svg = cell_svg(&design, Rotation::R0, &tile, ctx());
        let defs = svg.first_child().unwrap();
        let ids: Vec<&str> = defs.children_elements().filter_map(Element::id).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let fills: Vec<&str> = svg
            .children_elements()
            .filter(|e| e.kind == ElementKind::Path)
            .filter_map(|e| e.get_attr("fill"))
            .collect();
        assert_eq!(fills, vec![format!("url(#{})", ids[0]), format!("url(#{})", ids[1])]);
    }

    #[test]
    fn test_borders() {
        let tile = TileInstance::new("t", "", seed(1)).with_borders(true);
        let markup = render_element_to_string(&cell_svg(&square("a"), Rotation::R0, &tile, ctx()));
        assert_eq!(markup.matches(r#"stroke="black""#).count(), 2);
        assert!(markup.contains(r#"vector-effect="non-scaling-stroke""#));
    }

    #[test]
    fn test_fallback_label() {
        let tile = TileInstance::new("t", "", seed(1));
        let svg = cell_svg(&Design::fallback("x"), Rotation::R0, &tile, ctx());
        let label = svg.children_elements().find(|e| e.kind == ElementKind::Label).unwrap();
        assert_eq!(label.text_content(), "error");
    }

    #[test]
    fn test_grid_style_and_clamp() {
        let tile = TileInstance::new("t", "", seed(1))
            .with_grout(Grout::new(GroutColor::Brown, GroutThickness::Thick));
        let doc = build_grid(SurfaceKind::Swatch, 0, 500, &tile, &[square("a")], &SceneOptions::default()).unwrap();

        assert_eq!(doc.count_kind(ElementKind::Cell), MAX_GRID_SIZE);
        let style = doc.root.get_attr("style").unwrap();
        assert!(style.contains("grid-template-columns:repeat(75,60px)"));
        assert!(style.contains("gap:2px"));
        assert!(style.contains("background-color:brown"));
    }

    #[test]
    fn test_quad_cells_nest_four_svgs() {
        let designs: Vec<Design> = ["a", "b", "c", "d"].into_iter().map(square).collect();
        let tile = TileInstance::new("q", "", seed(4));
        let doc = build_grid(SurfaceKind::Swatch, 2, 3, &tile, &designs, &SceneOptions::default()).unwrap();

        assert_eq!(doc.count_kind(ElementKind::Cell), 6);
        assert_eq!(doc.count_kind(ElementKind::Quad), 6);
        assert_eq!(doc.count_kind(ElementKind::Svg), 24);
        // Quad cells are never shifted
        assert!(doc.find_kind(ElementKind::Cell).iter().all(|c| !c.has_attr("style")));
    }

    #[test]
    fn test_single_odd_rows_shift() {
        let tile = TileInstance::new("t", "Tiffany", seed(1));
        let doc = build_grid(SurfaceKind::Swatch, 2, 1, &tile, &[square("a")], &SceneOptions::default()).unwrap();
        let cells = doc.find_kind(ElementKind::Cell);
        assert_eq!(cells[0].get_attr("style"), None);
        assert_eq!(cells[1].get_attr("style"), Some("margin-left:18px;margin-top:-16px"));
    }

    #[test]
    fn test_room_photo_overlay() {
        let tile = TileInstance::new("t", "", seed(1));
        let options = SceneOptions {
            room_photo_url: Some("https://cdn.example.com/room.jpg".into()),
            ..SceneOptions::default()
        };
        let doc = build_grid(SurfaceKind::Room, 1, 1, &tile, &[square("a")], &options).unwrap();
        assert_eq!(doc.root.class(), Some("tile-room"));
        let markup = render_document(&doc);
        assert!(markup.contains(r#"<img class="tile-room-photo" src="https://cdn.example.com/room.jpg""#));
        assert!(markup.contains("mix-blend-mode:multiply"));

        // Other surfaces ignore the photo
        let doc = build_grid(SurfaceKind::Swatch, 1, 1, &tile, &[square("a")], &options).unwrap();
        assert_eq!(doc.root.kind, ElementKind::Grid);
    }

    #[test]
    fn test_build_is_deterministic() {
        let tile = TileInstance::new("t", "Fiori", seed(1));
        let a = build_grid(SurfaceKind::Room, 4, 4, &tile, &[square("a")], &SceneOptions::default()).unwrap();
        let b = build_grid(SurfaceKind::Room, 4, 4, &tile, &[square("a")], &SceneOptions::default()).unwrap();
        assert_eq!(render_document(&a), render_document(&b));
    }
}
