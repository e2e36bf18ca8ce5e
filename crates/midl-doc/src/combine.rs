//! Cross-document combiner
//!
//! Merges two element trees describing the same entity, typically a document
//! already on disk and a freshly generated one. Children are matched by
//! identity so that repeated runs converge instead of duplicating content.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{DocError, Result};
use crate::xml::Element;

/// Leaf elements that may legitimately repeat; identified by their text
const REPEATABLE: &[&str] = &["syntax"];

#[derive(Debug, PartialEq, Eq)]
enum Identity {
    /// `name` attribute or `<name>` child
    Named(String, String),
    Text(String, String),
    /// Tag plus ordinal among unnamed siblings with the same tag
    Position(String, usize),
}

/// Identity carried by the element itself; `None` means it is matched by position
fn own_identity(el: &Element) -> Option<Identity> {
    let name = el
        .attr("name")
        .or_else(|| el.child_text("name"))
        .filter(|n| !n.is_empty());
    if let Some(name) = name {
        return Some(Identity::Named(el.name.clone(), name.to_string()));
    }
    if !el.has_structure() && REPEATABLE.contains(&el.name.as_str()) {
        return Some(Identity::Text(el.name.clone(), el.text.clone().unwrap_or_default()));
    }
    None
}

fn is_blank(el: &Element) -> bool {
    el.attributes.is_empty() && el.is_empty_leaf()
}

/// Combine two documents with the same root element. Attributes and text from
/// `b` win over `a`; elements carrying nothing are dropped.
pub fn combine(a: &Element, b: &Element) -> Result<Element> {
    if a.name != b.name {
        return Err(DocError::RootMismatch {
            left: a.name.clone(),
            right: b.name.clone(),
        });
    }
    Ok(merge(&a.name, &[a, b]))
}

fn merge(name: &str, parts: &[&Element]) -> Element {
    let mut out = Element::new(name);

    for part in parts {
        for (key, value) in &part.attributes {
            out.set_attr(key.as_str(), value.as_str());
        }
        if let Some(text) = part.text.as_deref().filter(|t| !t.is_empty()) {
            out.text = Some(text.to_string());
        }
    }

    let mut groups: Vec<(Identity, Vec<&Element>)> = Vec::new();
    for part in parts {
        let mut ordinals: HashMap<&str, usize> = HashMap::new();
        for child in part.children.iter().filter(|c| !is_blank(c)) {
            let id = own_identity(child).unwrap_or_else(|| {
                let n = ordinals.entry(child.name.as_str()).or_insert(0);
                *n += 1;
                Identity::Position(child.name.clone(), *n - 1)
            });
            match groups.iter_mut().find(|(key, _)| *key == id) {
                Some((_, members)) => members.push(child),
                None => groups.push((id, vec![child])),
            }
        }
    }

    for (id, members) in groups {
        let merged = merge(&members[0].name, &members);
        if is_blank(&merged) {
            trace!(?id, "dropping empty element");
            continue;
        }
        out.push(merged);
    }
    out
}
