//! Fragment splitting and sub-entry extraction.
//!
//! The device API rejects very large `set` payloads, so a rendered fragment
//! whose serialized size reaches the threshold is decomposed into one
//! fragment per direct `<entry>` child - the natural unit of the device's
//! list containers (addresses, tags, rules). A fragment below the threshold
//! passes through untouched, and an oversized fragment with no entry
//! structure is unsendable: there is no defined smaller representation, so
//! that is a fatal error rather than a guess.
//!
//! Content is scanned with quick-xml inside a synthetic wrapper element, and
//! each child is carved out of the original string by byte span. Slicing
//! rather than re-serializing keeps namespaces, attribute order, entities,
//! and text exactly as rendered.

use std::ops::Range;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::collection::Fragment;
use crate::core::{Result, SnipstackError};

/// Canonical split threshold in bytes of rendered content.
///
/// Payloads at or above this size are split before pushing. Deployments that
/// need the raised 12000-byte limit of newer device releases configure it
/// through [`Splitter::with_threshold`] instead of editing this constant.
pub const DEFAULT_SPLIT_THRESHOLD: usize = 6000;

/// Splits oversized fragments and extracts named sub-entries.
#[derive(Debug, Clone, Copy)]
pub struct Splitter {
    threshold: usize,
}

impl Default for Splitter {
    fn default() -> Self {
        Self { threshold: DEFAULT_SPLIT_THRESHOLD }
    }
}

impl Splitter {
    /// Splitter with the canonical threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splitter with an explicit byte threshold.
    pub fn with_threshold(threshold: usize) -> Self {
        Self { threshold }
    }

    /// The configured byte threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Normalize one rendered fragment into the list of fragments to push.
    ///
    /// With `entry`: extract exactly the direct `<entry>` child whose `name`
    /// attribute equals `entry` (size is irrelevant on this path) and return
    /// a single copy of the fragment carrying only that element. The match
    /// is exact - a typo surfaces as [`SnipstackError::EntryNotFound`]
    /// instead of resolving to a near miss.
    ///
    /// Without `entry`: content below the threshold is returned unchanged;
    /// at or above it, return one copy per direct `<entry>` child, or
    /// [`SnipstackError::UnsplittableFragment`] when there are none.
    ///
    /// Returned copies are fully independent of the source fragment and of
    /// each other; only the read-only stack metadata is shared.
    pub fn split(&self, fragment: &Fragment, entry: Option<&str>) -> Result<Vec<Fragment>> {
        if let Some(entry_name) = entry {
            return self.extract_entry(fragment, entry_name).map(|f| vec![f]);
        }

        if fragment.rendered_xml.len() < self.threshold {
            return Ok(vec![fragment.clone()]);
        }

        let entries = entry_children(&fragment.name, &fragment.rendered_xml)?;
        if entries.is_empty() {
            return Err(SnipstackError::UnsplittableFragment {
                fragment: fragment.name.clone(),
                size: fragment.rendered_xml.len(),
            });
        }

        Ok(entries
            .into_iter()
            .map(|xml| {
                let mut copy = fragment.clone();
                copy.rendered_xml = xml;
                copy
            })
            .collect())
    }

    fn extract_entry(&self, fragment: &Fragment, entry_name: &str) -> Result<Fragment> {
        let children = direct_children(&fragment.name, &fragment.rendered_xml)?;
        let matched = children
            .iter()
            .find(|c| c.name == "entry" && c.name_attr.as_deref() == Some(entry_name));

        match matched {
            Some(child) => {
                let mut copy = fragment.clone();
                copy.rendered_xml = child.xml.clone();
                Ok(copy)
            }
            None => Err(SnipstackError::EntryNotFound {
                fragment: fragment.name.clone(),
                entry: entry_name.to_string(),
            }),
        }
    }
}

/// Names of the direct `<entry>` children of `content`, in document order.
///
/// Best-effort helper for listings; malformed content yields an empty list
/// rather than an error.
pub fn entry_names(content: &str) -> Vec<String> {
    direct_children("", content)
        .map(|children| {
            children
                .into_iter()
                .filter(|c| c.name == "entry")
                .filter_map(|c| c.name_attr)
                .collect()
        })
        .unwrap_or_default()
}

/// One direct child element of a fragment's content.
struct ChildElement {
    /// Element name (including any namespace prefix)
    name: String,
    /// Value of the `name` attribute, if present
    name_attr: Option<String>,
    /// Verbatim serialization sliced from the source
    xml: String,
}

/// Serializations of the direct `<entry>` children only.
fn entry_children(fragment: &str, content: &str) -> Result<Vec<String>> {
    Ok(direct_children(fragment, content)?
        .into_iter()
        .filter(|c| c.name == "entry")
        .map(|c| c.xml)
        .collect())
}

/// Scan `content` as an XML fragment and return its top-level elements.
///
/// The content is a forest, not a document, so it is parsed inside a
/// synthetic wrapper element. Each child's serialization is the byte span of
/// the source between the position before its opening `<` and the position
/// after its closing tag - the wrapper adds a constant prefix, so spans map
/// straight onto the wrapped string.
fn direct_children(fragment: &str, content: &str) -> Result<Vec<ChildElement>> {
    let wrapped = format!("<snippet-wrapper>{content}</snippet-wrapper>");
    let mut reader = Reader::from_str(&wrapped);

    let xml_err = |reason: String| SnipstackError::Xml {
        fragment: fragment.to_string(),
        reason,
    };

    let mut children = Vec::new();
    // Number of currently open elements, counting the wrapper. A Start at
    // depth 1 opens a direct child; its matching End brings depth back to 1.
    let mut depth = 0usize;
    let mut pending: Option<(String, Option<String>, usize)> = None;

    loop {
        let event_start = reader.buffer_position() as usize;
        match reader.read_event().map_err(|e| xml_err(e.to_string()))? {
            Event::Start(e) => {
                if depth == 1 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let name_attr = name_attribute(fragment, &e)?;
                    pending = Some((name, name_attr, event_start));
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 1 {
                    let end = reader.buffer_position() as usize;
                    children.push(ChildElement {
                        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        name_attr: name_attribute(fragment, &e)?,
                        xml: slice_span(&wrapped, event_start..end),
                    });
                }
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 1 {
                    let (name, name_attr, start) = pending
                        .take()
                        .ok_or_else(|| xml_err("unbalanced element nesting".to_string()))?;
                    let end = reader.buffer_position() as usize;
                    children.push(ChildElement {
                        name,
                        name_attr,
                        xml: slice_span(&wrapped, start..end),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(children)
}

fn slice_span(wrapped: &str, span: Range<usize>) -> String {
    wrapped[span].to_string()
}

/// Unescaped value of the `name` attribute of an element, if present.
fn name_attribute(
    fragment: &str,
    element: &quick_xml::events::BytesStart<'_>,
) -> Result<Option<String>> {
    let attr = element.try_get_attribute("name").map_err(|e| SnipstackError::Xml {
        fragment: fragment.to_string(),
        reason: e.to_string(),
    })?;
    match attr {
        Some(a) => {
            let value = a.unescape_value().map_err(|e| SnipstackError::Xml {
                fragment: fragment.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}
