//! SVG text → [`Design`]
//!
//! Pull-parses the markup with `quick-xml`, keeps the root `viewBox` verbatim
//! and collects every `<path>` under the root in document order.

use compact_str::{CompactString, format_compact};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::FxHashSet;

use super::{Design, PathRecord, ViewBox};
use crate::error::ParseError;
use crate::id::DesignId;

/// Parse raw SVG markup into a design.
///
/// Paths without an `id` get `"{namespace_hint}-{index}"`, where `index` is
/// the ordinal among the design's paths. When an explicit id already uses
/// that name, the next free ordinal is taken instead. The same input and hint
/// always produce the same ids, so color assignments survive a reload.
///
/// # Errors
///
/// Fails on malformed XML, unclosed elements, a root element other than
/// `<svg>`, a `<path>` without `d`, or two paths sharing an explicit `id`.
pub fn parse(raw: &str, namespace_hint: &str) -> Result<Design, ParseError> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut state = ParseState::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) => {
                state.open(&elem, &reader, namespace_hint)?;
                state.depth += 1;
            }
            Ok(Event::Empty(elem)) => {
                state.open(&elem, &reader, namespace_hint)?;
                if state.depth == 0 {
                    state.closed = true;
                }
            }
            Ok(Event::End(_)) => {
                state.depth = state.depth.saturating_sub(1);
                if state.depth == 0 {
                    state.closed = true;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ParseError::Xml {
                    position: reader.error_position() as u64,
                    message: e.to_string(),
                });
            }
        }
    }

    if state.depth > 0 {
        return Err(ParseError::Unclosed { depth: state.depth });
    }

    let view_box = state.view_box.take().ok_or(ParseError::MissingSvgRoot)?;
    state.assign_ids(namespace_hint);
    Ok(Design {
        id: DesignId::new(namespace_hint),
        name: None,
        view_box,
        paths: state.paths,
        label: None,
    })
}

/// Parse, substituting [`Design::fallback`] on any failure.
///
/// The rendering pipeline always gets something to draw; the failure is
/// logged and otherwise swallowed.
pub fn parse_or_fallback(raw: &str, namespace_hint: &str) -> Design {
    match parse(raw, namespace_hint) {
        Ok(design) => design,
        Err(err) => {
            tracing::warn!(design = namespace_hint, %err, "unreadable design, using fallback");
            Design::fallback(namespace_hint)
        }
    }
}

// =============================================================================
// Parse state
// =============================================================================

#[derive(Default)]
struct ParseState {
    depth: usize,
    /// Root element has been closed; anything after it is ignored
    closed: bool,
    /// Set once the root `<svg>` has been seen
    view_box: Option<ViewBox>,
    paths: Vec<PathRecord>,
    /// Ids given in the markup
    explicit: FxHashSet<CompactString>,
    /// Paths still waiting for a generated id
    unnamed: Vec<usize>,
}

impl ParseState {
    fn open(
        &mut self,
        elem: &BytesStart<'_>,
        reader: &Reader<&[u8]>,
        namespace_hint: &str,
    ) -> Result<(), ParseError> {
        if self.closed {
            return Ok(());
        }
        let name = elem.local_name();

        if self.depth == 0 {
            if name.as_ref() != b"svg" {
                return Err(ParseError::MissingSvgRoot);
            }
            let attrs = read_attrs(elem, reader)?;
            self.view_box = Some(match attrs.view_box {
                Some(raw) => ViewBox::new(raw),
                None => ViewBox::default(),
            });
            return Ok(());
        }

        if name.as_ref() == b"path" {
            let index = self.paths.len();
            let attrs = read_attrs(elem, reader)?;
            let d = attrs.d.ok_or(ParseError::MissingPathData { index })?;
            let id = match attrs.id {
                Some(id) => {
                    if !self.explicit.insert(id.clone()) {
                        return Err(ParseError::DuplicatePathId { id: id.to_string() });
                    }
                    id
                }
                None => {
                    self.unnamed.push(index);
                    CompactString::default()
                }
            };
            let fill = attrs.fill.or_else(|| attrs.style.as_deref().and_then(style_fill));
            self.paths.push(PathRecord { id, d, fill });
        }
        Ok(())
    }

    /// Name id-less paths `{hint}-{ordinal}`, skipping names already taken
    fn assign_ids(&mut self, namespace_hint: &str) {
        let mut taken = std::mem::take(&mut self.explicit);
        for &index in &self.unnamed {
            let mut ordinal = index;
            let id = loop {
                let candidate = format_compact!("{namespace_hint}-{ordinal}");
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
                ordinal += 1;
            };
            self.paths[index].id = id;
        }
    }
}

/// The handful of attributes the parser cares about
#[derive(Default)]
struct ElementAttrs {
    id: Option<CompactString>,
    d: Option<String>,
    fill: Option<CompactString>,
    style: Option<String>,
    view_box: Option<String>,
}

fn read_attrs(elem: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<ElementAttrs, ParseError> {
    let mut out = ElementAttrs::default();
    for attr in elem.attributes() {
        let attr = attr?;
        let value = attr.decode_and_unescape_value(reader.decoder())?;
        match attr.key.as_ref() {
            b"id" => out.id = Some(CompactString::from(value.as_ref())),
            b"d" => out.d = Some(value.into_owned()),
            b"fill" => out.fill = Some(CompactString::from(value.trim())),
            b"style" => out.style = Some(value.into_owned()),
            b"viewBox" => out.view_box = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(out)
}

/// Extract `fill` from an inline `style="fill: …; …"` declaration list.
fn style_fill(style: &str) -> Option<CompactString> {
    style.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        (prop.trim() == "fill").then(|| CompactString::from(value.trim()))
    })
}

// =============================================================================
// Tests
// =============================================================================
