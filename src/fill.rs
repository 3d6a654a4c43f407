//! Path color resolution
//!
//! A path's effective fill is, in order of precedence:
//! 1. the explicit entry in the [`ColorAssignment`]
//! 2. the fill declared by the source SVG
//! 3. black
//!
//! Recoloring in a multi-design selection also recolors every *linked* path,
//! i.e. every path whose link key (by default the id token after the final
//! `-`) matches. The grouping is purely textual: accidental suffix matches
//! are linked too.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::design::{Design, PathRecord};
use crate::id::LinkKeyFn;

/// Fill used when neither an assignment nor the source declares one.
pub const DEFAULT_FILL: &str = "#000000";

// =============================================================================
// FillRef
// =============================================================================

/// What a path is painted with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FillRef {
    /// Hex or named CSS color
    Solid(CompactString),
    /// Absolute URL of an image, realized as a `<pattern>`
    ImagePattern(String),
}

impl FillRef {
    /// Solid color fill
    pub fn solid(color: impl AsRef<str>) -> Self {
        Self::Solid(CompactString::from(color.as_ref()))
    }

    /// Image pattern fill
    pub fn image(url: impl Into<String>) -> Self {
        Self::ImagePattern(url.into())
    }

    // Generates is_solid / as_solid / as_solid_mut and the image_pattern trio
    crate::impl_enum_accessors!(solid: CompactString, image_pattern: String);
}

// =============================================================================
// ColorAssignment
// =============================================================================

/// Path id → fill, for one tile instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorAssignment {
    fills: FxHashMap<CompactString, FillRef>,
}

impl ColorAssignment {
    /// Create an empty assignment
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit fill for a path, if any
    pub fn get(&self, path_id: &str) -> Option<&FillRef> {
        self.fills.get(path_id)
    }

    /// Set one path's fill, without link propagation
    pub fn set(&mut self, path_id: &str, fill: FillRef) {
        self.fills.insert(CompactString::from(path_id), fill);
    }

    /// Drop one path's explicit fill
    pub fn clear(&mut self, path_id: &str) -> Option<FillRef> {
        self.fills.remove(path_id)
    }

    /// Number of explicit entries
    pub fn len(&self) -> usize {
        self.fills.len()
    }

    /// Check if there are no explicit entries
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Check if any entry is an image pattern
    pub fn has_image_fills(&self) -> bool {
        self.fills.values().any(FillRef::is_image_pattern)
    }

    /// Recolor a path and every path linked to it.
    ///
    /// Linking only applies when the selection holds more than one design.
    /// Returns the number of entries written (at least 1).
    pub fn recolor<D: AsRef<Design>>(
        &mut self,
        path_id: &str,
        fill: FillRef,
        designs: &[D],
        link_key: LinkKeyFn,
    ) -> usize {
        let mut targets = vec![CompactString::from(path_id)];
        if designs.len() > 1 {
            for linked in linked_paths(path_id, designs, link_key) {
                if !targets.contains(&linked) {
                    targets.push(linked);
                }
            }
        }
        let written = targets.len();
        for target in targets {
            self.fills.insert(target, fill.clone());
        }
        written
    }
}

/// Effective fill of a path under an assignment.
pub fn resolve_fill(path: &PathRecord, assignment: &ColorAssignment) -> FillRef {
    if let Some(fill) = assignment.get(&path.id) {
        return fill.clone();
    }
    match &path.fill {
        Some(fill) => FillRef::Solid(fill.clone()),
        None => FillRef::solid(DEFAULT_FILL),
    }
}

/// Ids of the paths linked to `path_id`, in design and path order.
///
/// A path links to paths of the *other* designs sharing its link key;
/// siblings inside its own design stay independent. Includes `path_id`
/// itself when present.
pub fn linked_paths<D: AsRef<Design>>(
    path_id: &str,
    designs: &[D],
    link_key: LinkKeyFn,
) -> Vec<CompactString> {
    let key = link_key(path_id);
    let owner = designs.iter().position(|d| d.as_ref().path(path_id).is_some());
    designs
        .iter()
        .enumerate()
        .flat_map(|(index, d)| d.as_ref().paths.iter().map(move |p| (index, p)))
        .filter(|(index, p)| {
            p.id == path_id || (Some(*index) != owner && link_key(&p.id) == key)
        })
        .map(|(_, p)| p.id.clone())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
