//! Attribute and inline-style helpers for scene elements
//!
//! - `Attrs`: ordered key-value pairs, emitted in insertion order so that
//!   rendering stays byte-stable
//! - `Style`: ordered CSS declarations rendered into a `style` attribute

use compact_str::CompactString;
use smallvec::SmallVec;

/// Element attributes as ordered key-value pairs
///
/// Insertion order is preserved on output. Most scene elements carry fewer
/// than six attributes, so they stay inline.
pub type Attrs = SmallVec<[(CompactString, String); 6]>;

/// Extension trait for attribute operations on Attrs
pub trait AttrsExt {
    /// Get an attribute value by name
    fn get_attr(&self, name: &str) -> Option<&str>;

    /// Check if an attribute exists
    fn has_attr(&self, name: &str) -> bool;

    /// Set an attribute value (insert or update in place)
    fn set_attr(&mut self, name: &str, value: impl Into<String>);

    /// Remove an attribute by name, returning the old value if present
    fn remove_attr(&mut self, name: &str) -> Option<String>;
}

impl AttrsExt for Attrs {
    fn get_attr(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_attr(&self, name: &str) -> bool {
        self.iter().any(|(k, _)| k == name)
    }

    fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self.iter_mut().find(|(k, _)| k == name) {
            attr.1 = value;
        } else {
            self.push((CompactString::from(name), value));
        }
    }

    fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.iter()
            .position(|(k, _)| k == name)
            .map(|pos| self.remove(pos).1)
    }
}

// =============================================================================
// Style
// =============================================================================

/// Ordered CSS declarations for an inline `style` attribute
///
/// ```
/// use tilegrid::attr::Style;
///
/// let style = Style::new().decl("display", "grid").px("gap", 1.0);
/// assert_eq!(style.to_string(), "display:grid;gap:1px");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    decls: SmallVec<[(&'static str, String); 8]>,
}

impl Style {
    /// Create an empty style
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration
    pub fn decl(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.decls.push((property, value.into()));
        self
    }

    /// Append a pixel-valued declaration
    pub fn px(self, property: &'static str, value: f64) -> Self {
        self.decl(property, format!("{}px", fmt_num(value)))
    }

    /// Append a declaration only when `value` is present
    pub fn decl_opt(self, property: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.decl(property, v),
            None => self,
        }
    }

    /// Check if no declaration was added
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Get a declaration value by property name
    pub fn get(&self, property: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(k, _)| *k == property)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (k, v)) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{k}:{v}")?;
        }
        Ok(())
    }
}

/// Format a number without a trailing `.0` for whole values.
///
/// Keeps generated markup compact and identical between the live scene and
/// the exported artifact.
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{value:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
