//! Scene document
//!
//! The root container of a scene tree, with query and traversal APIs.

use super::{Element, ElementKind, Node};

// =============================================================================
// Document
// =============================================================================

/// Root scene container
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element (the surface grid, or an export wrapper)
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query API
    // ─────────────────────────────────────────────────────────────────────────

    /// Find first element matching predicate (depth-first search)
    pub fn find_element<F>(&self, predicate: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        self.iter_elements().find(|e| predicate(e))
    }

    /// Find all elements matching predicate, in document order
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        self.iter_elements().filter(|e| predicate(e)).collect()
    }

    /// All elements of one kind, in document order
    pub fn find_kind(&self, kind: ElementKind) -> Vec<&Element> {
        self.find_all(|e| e.kind == kind)
    }

    /// Number of elements of one kind
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.iter_elements().filter(|e| e.kind == kind).count()
    }

    /// Check if any element matches predicate
    pub fn has_element<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Element) -> bool,
    {
        self.find_element(predicate).is_some()
    }

    /// Count total elements in document
    pub fn element_count(&self) -> usize {
        self.iter_elements().count()
    }

    /// Iterate over all elements (depth-first, document order)
    pub fn iter_elements(&self) -> ElementIterator<'_> {
        ElementIterator::new(&self.root)
    }

    /// Visit all elements mutably
    pub fn for_each_element_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Element),
    {
        fn visit<F: FnMut(&mut Element)>(elem: &mut Element, f: &mut F) {
            f(elem);
            for child in &mut elem.children {
                if let Some(child_elem) = child.as_element_mut() {
                    visit(child_elem, f);
                }
            }
        }
        visit(&mut self.root, &mut f);
    }

    /// Collect statistics about the scene
    pub fn collect_stats(&self) -> SceneStats {
        let mut stats = SceneStats::default();
        for elem in self.iter_elements() {
            stats.element_count += 1;
            match elem.kind {
                ElementKind::Cell => stats.cell_count += 1,
                ElementKind::Svg => stats.svg_count += 1,
                ElementKind::Path => stats.path_count += 1,
                ElementKind::Pattern => stats.pattern_count += 1,
                _ => {}
            }
            stats.text_count += elem.children.iter().filter(|n| matches!(n, Node::Text(_))).count();
        }
        stats
    }
}

// =============================================================================
// ElementIterator
// =============================================================================

/// Depth-first iterator over elements
pub struct ElementIterator<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> ElementIterator<'a> {
    fn new(root: &'a Element) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for ElementIterator<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.stack.pop()?;
        // Reverse push so children come out left to right
        for child in elem.children.iter().rev() {
            if let Some(child_elem) = child.as_element() {
                self.stack.push(child_elem);
            }
        }
        Some(elem)
    }
}

// =============================================================================
// SceneStats
// =============================================================================

/// Element counts of a scene
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SceneStats {
    pub element_count: usize,
    pub cell_count: usize,
    pub svg_count: usize,
    pub path_count: usize,
    pub pattern_count: usize,
    pub text_count: usize,
}

impl SceneStats {
    /// Check if the scene uses any image pattern
    pub fn has_patterns(&self) -> bool {
        self.pattern_count > 0
    }
}
