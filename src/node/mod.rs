//! Scene graph node types
//!
//! The live surfaces and the static export both describe their output as a
//! [`Document`] of typed [`Element`]s. Rendering that tree to markup happens
//! in one place ([`crate::render`]), which keeps the two outputs identical.
//!
//! Every element carries an [`ElementKind`] so adapters and tests can query
//! the scene (find every `Path`, count `Pattern`s) without string matching on
//! tags or classes.

mod document;
mod element;
mod text;

pub use document::{Document, ElementIterator, SceneStats};
pub use element::{Element, ElementKind};
pub use text::{Text, TextKind};

use smallvec::SmallVec;

/// Node in a scene tree: either an element or text
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Box<Element>),
    Text(Text),
}

impl Node {
    crate::impl_enum_accessors!(element: Element, text: Text);
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Node::Element(Box::new(elem))
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

/// Children collection
pub type Children = SmallVec<[Node; 8]>;
