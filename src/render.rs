//! Markup rendering for scene trees
//!
//! Both the live surfaces and the export serializer go through these
//! functions, so a cell looks the same wherever it ends up.
//!
//! - HTML void elements (`meta`, `img`, …) and childless SVG elements are
//!   self-closed
//! - Attributes are written in insertion order, which makes the output
//!   byte-stable for identical trees

use crate::attr::Attrs;
use crate::node::{Document, Element, Node};

/// Prefix of full HTML documents
pub const HTML_DOCTYPE: &str = "<!DOCTYPE html>";

// =============================================================================
// Document Rendering
// =============================================================================

/// Render a document to a markup string.
pub fn render_document(doc: &Document) -> String {
    render_element_to_string(&doc.root)
}

/// Render a document as a complete HTML page, doctype included.
pub fn render_html_page(doc: &Document) -> String {
    let mut output = String::from(HTML_DOCTYPE);
    output.push('\n');
    render_element(&doc.root, &mut output);
    output
}

/// Render a single element (and its subtree).
pub fn render_element_to_string(elem: &Element) -> String {
    let mut output = String::new();
    render_element(elem, &mut output);
    output
}

fn render_element(elem: &Element, output: &mut String) {
    output.push('<');
    output.push_str(&elem.tag);
    render_attrs(&elem.attrs, output);

    if is_void_element(&elem.tag) || (elem.kind.is_svg() && elem.is_empty()) {
        output.push_str(" />");
        return;
    }

    output.push('>');
    for child in &elem.children {
        render_node(child, output);
    }
    output.push_str("</");
    output.push_str(&elem.tag);
    output.push('>');
}

fn render_node(node: &Node, output: &mut String) {
    match node {
        Node::Element(elem) => render_element(elem, output),
        Node::Text(text) if text.is_raw() => output.push_str(&text.content),
        Node::Text(text) => escape_into(&text.content, false, output),
    }
}

fn render_attrs(attrs: &Attrs, output: &mut String) {
    for (name, value) in attrs {
        output.push(' ');
        output.push_str(name);
        output.push_str("=\"");
        escape_into(value, true, output);
        output.push('"');
    }
}

/// Escape text content.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, false, &mut out);
    out
}

/// Escape an attribute value (double quotes included).
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, true, &mut out);
    out
}

fn escape_into(s: &str, quotes: bool, out: &mut String) {
    let mut rest = s;
    while let Some(pos) = rest.find(|c| matches!(c, '&' | '<' | '>' | '"')) {
        out.push_str(&rest[..pos]);
        let entity = match rest.as_bytes()[pos] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ if quotes => "&quot;",
            _ => "\"",
        };
        out.push_str(entity);
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);
}

/// Check if element is an HTML void element.
fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "wbr"
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ElementKind;

    #[test]
    fn test_render_nested() {
        let root = Element::new("div", ElementKind::Cell)
            .with_class("tile-cell")
            .child(
                Element::new("svg", ElementKind::Svg)
                    .attr("viewBox", "0 0 100 100")
                    .child(Element::new("path", ElementKind::Path).attr("d", "M0 0Z")),
            );
        let html = render_document(&Document::new(root));
        assert_eq!(
            html,
            r#"<div class="tile-cell"><svg viewBox="0 0 100 100"><path d="M0 0Z" /></svg></div>"#
        );
    }

    #[test]
    fn test_empty_html_element_keeps_close_tag() {
        let html = render_element_to_string(&Element::new("div", ElementKind::Grid));
        assert_eq!(html, "<div></div>");
    }

    #[test]
    fn test_void_and_raw_text() {
        let head = Element::new("head", ElementKind::Other)
            .child(Element::new("meta", ElementKind::Other).attr("charset", "utf-8"))
            .child(Element::new("style", ElementKind::Other).raw_text(".a>.b{gap:1px}"));
        let html = render_element_to_string(&head);
        assert_eq!(
            html,
            r#"<head><meta charset="utf-8" /><style>.a>.b{gap:1px}</style></head>"#
        );
    }

    #[test]
    fn test_html_page_has_doctype() {
        let page = render_html_page(&Document::new(Element::new("html", ElementKind::Other)));
        assert!(page.starts_with("<!DOCTYPE html>\n<html>"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_attr(r#"say "hi""#), "say &quot;hi&quot;");

        let elem = Element::new("text", ElementKind::Label).attr("data-x", "a\"b").text("1 < 2");
        assert_eq!(
            render_element_to_string(&elem),
            r#"<text data-x="a&quot;b">1 &lt; 2</text>"#
        );
    }
}
