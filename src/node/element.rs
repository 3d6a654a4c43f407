//! Element type
//!
//! The building block of the scene tree.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::attr::{Attrs, AttrsExt, Style};

use super::{Children, Node, Text};

// =============================================================================
// ElementKind
// =============================================================================

/// Role of an element in a tile scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Outer CSS grid of a surface
    Grid,
    /// One grid cell
    Cell,
    /// 2×2 sub-grid holding a quad tile's designs
    Quad,
    /// One design's `<svg>`
    Svg,
    Defs,
    Pattern,
    Image,
    /// Rotation group wrapping a design's paths
    Group,
    Path,
    /// Overlay text on fallback designs
    Label,
    /// Anything else (document head, wrappers, photo overlays)
    Other,
}

impl ElementKind {
    /// Check if elements of this kind live in the SVG namespace
    pub const fn is_svg(self) -> bool {
        matches!(
            self,
            Self::Svg | Self::Defs | Self::Pattern | Self::Image | Self::Group | Self::Path | Self::Label
        )
    }
}

// =============================================================================
// Element
// =============================================================================

/// Element with attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: CompactString,
    pub attrs: Attrs,
    pub children: Children,
    pub kind: ElementKind,
}

impl Element {
    /// Create an element of the given kind
    pub fn new(tag: &str, kind: ElementKind) -> Self {
        Self {
            tag: CompactString::from(tag),
            attrs: Attrs::new(),
            children: SmallVec::new(),
            kind,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder
    // ─────────────────────────────────────────────────────────────────────────

    /// Add an attribute
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.set_attr(name, value);
        self
    }

    /// Add an attribute only when `value` is present
    pub fn attr_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    /// Set the inline style; an empty style adds nothing
    pub fn with_style(self, style: &Style) -> Self {
        if style.is_empty() {
            self
        } else {
            self.attr("style", style.to_string())
        }
    }

    /// Append a child element
    pub fn child(mut self, elem: Element) -> Self {
        self.push_elem(elem);
        self
    }

    /// Append several child elements
    pub fn children(mut self, elems: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(elems.into_iter().map(Node::from));
        self
    }

    /// Append a text child
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.push_text(content);
        self
    }

    /// Append an unescaped text child (inline `<style>` bodies)
    pub fn raw_text(mut self, content: impl Into<String>) -> Self {
        self.children.push(Node::Text(Text::raw(content)));
        self
    }

    pub fn push_elem(&mut self, elem: Element) {
        self.children.push(Node::from(elem));
    }

    pub fn push_text(&mut self, content: impl Into<String>) {
        self.children.push(Node::Text(Text::new(content)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Attribute access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attr(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.set_attr(name, value);
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.remove_attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.has_attr(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn class(&self) -> Option<&str> {
        self.get_attr("class")
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Children
    // ─────────────────────────────────────────────────────────────────────────

    /// Check if element has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children (all node types)
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of direct child elements
    pub fn element_count(&self) -> usize {
        self.children.iter().filter(|n| n.is_element()).count()
    }

    /// Iterate over child elements
    pub fn children_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element
    pub fn first_child(&self) -> Option<&Element> {
        self.children_elements().next()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => buf.push_str(&t.content),
                Node::Element(e) => e.collect_text(buf),
            }
        }
    }
}
