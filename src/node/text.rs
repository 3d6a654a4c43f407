//! Text node type

// =============================================================================
// Text
// =============================================================================

/// How text content is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKind {
    /// Escaped on output
    #[default]
    Normal,
    /// Written verbatim (inline stylesheets)
    Raw,
}

/// Text content node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub content: String,
    pub kind: TextKind,
}

impl Text {
    /// Create an escaped text node
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), kind: TextKind::Normal }
    }

    /// Create a verbatim text node
    pub fn raw(content: impl Into<String>) -> Self {
        Self { content: content.into(), kind: TextKind::Raw }
    }

    #[inline]
    pub fn is_raw(&self) -> bool {
        self.kind == TextKind::Raw
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }
}
