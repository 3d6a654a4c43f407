//! Per-design-name cell offsets
//!
//! Some tile shapes only interlock when alternate rows are shifted (and, for
//! a few, rotated). The shift is looked up by tile name; unknown names use
//! the `default` rule. Swatch and room surfaces render at different scales,
//! so each rule carries one column of magnitudes per surface.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::surface::SurfaceKind;

/// Key of the fallback rule
pub const DEFAULT_RULE: &str = "default";

/// Shift of one row parity, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shift {
    pub left: f64,
    pub top: f64,
}

impl Shift {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Odd/even row shifts for one surface scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowShifts {
    pub odd: Shift,
    pub even: Shift,
}

impl RowShifts {
    const fn odd_only(left: f64, top: f64) -> Self {
        Self { odd: Shift::new(left, top), even: Shift::ZERO }
    }

    const fn both(odd: Shift, even: Shift) -> Self {
        Self { odd, even }
    }

    /// Shift for a row
    pub const fn for_row(&self, row: usize) -> Shift {
        if row % 2 != 0 { self.odd } else { self.even }
    }
}

/// Which rows receive the rule's CSS transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformRows {
    Every,
    OddOnly,
}

/// Extra CSS transform applied to cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowTransform {
    pub css: &'static str,
    pub rows: TransformRows,
}

/// Offset rule of one tile shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetRule {
    /// Swatch scale, also used by the single-tile surface
    pub swatch: RowShifts,
    pub room: RowShifts,
    pub transform: Option<RowTransform>,
}

impl OffsetRule {
    const fn plain(swatch: RowShifts, room: RowShifts) -> Self {
        Self { swatch, room, transform: None }
    }

    const fn transformed(swatch: RowShifts, room: RowShifts, transform: RowTransform) -> Self {
        Self { swatch, room, transform: Some(transform) }
    }

    /// Shift for a cell in `row` on `surface`
    pub fn shift(&self, surface: SurfaceKind, row: usize) -> Shift {
        let column = match surface {
            SurfaceKind::Room => &self.room,
            SurfaceKind::Single | SurfaceKind::Swatch => &self.swatch,
        };
        column.for_row(row)
    }

    /// Transform for a cell in `row`, if any
    pub fn transform(&self, row: usize) -> Option<&'static str> {
        let t = self.transform?;
        match t.rows {
            TransformRows::Every => Some(t.css),
            TransformRows::OddOnly if row % 2 != 0 => Some(t.css),
            TransformRows::OddOnly => None,
        }
    }
}

const DEFAULT: OffsetRule = OffsetRule::plain(
    RowShifts::odd_only(25.0, -10.0),
    RowShifts::odd_only(20.0, -8.0),
);

const RECTANGLE: OffsetRule = OffsetRule::plain(
    RowShifts::odd_only(12.0, -2.0),
    RowShifts::odd_only(10.0, -1.0),
);

const TRIANGLE: OffsetRule = OffsetRule::transformed(
    RowShifts::odd_only(25.0, 0.0),
    RowShifts::odd_only(20.0, 0.0),
    RowTransform { css: "rotate(180deg)", rows: TransformRows::OddOnly },
);

/// Offset rules by lowercase tile name
pub static OFFSET_RULES: LazyLock<FxHashMap<&'static str, OffsetRule>> = LazyLock::new(|| {
    let mut rules = FxHashMap::default();
    rules.insert(DEFAULT_RULE, DEFAULT);
    rules.insert("rectangle2x8", RECTANGLE);
    rules.insert("rectangle4x8", RECTANGLE);
    rules.insert(
        "tiffany",
        OffsetRule::plain(RowShifts::odd_only(18.0, -16.0), RowShifts::odd_only(15.0, -13.0)),
    );
    rules.insert(
        "fiori",
        OffsetRule::plain(
            RowShifts::both(Shift::new(30.0, -12.0), Shift::new(6.0, 0.0)),
            RowShifts::both(Shift::new(25.0, -10.0), Shift::new(5.0, 0.0)),
        ),
    );
    rules.insert(
        "gio",
        OffsetRule::transformed(
            DEFAULT.swatch,
            DEFAULT.room,
            RowTransform { css: "rotate(30deg)", rows: TransformRows::Every },
        ),
    );
    rules.insert("indie", TRIANGLE);
    rules.insert("triangle", TRIANGLE);
    rules.insert(
        "lola",
        OffsetRule::plain(
            RowShifts::both(Shift::new(25.0, -10.0), Shift::new(0.0, -5.0)),
            RowShifts::both(Shift::new(20.0, -8.0), Shift::new(0.0, -4.0)),
        ),
    );
    rules
});

/// Rule for a tile name, falling back to `default`.
///
/// Matching ignores ASCII case and surrounding whitespace.
pub fn rule_for(name: &str) -> &'static OffsetRule {
    let key = name.trim().to_ascii_lowercase();
    OFFSET_RULES
        .get(key.as_str())
        .unwrap_or(&DEFAULT)
}
