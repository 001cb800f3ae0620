//! Positional path assignment over a parsed dump.
//!
//! Every element gets a path of the form `/tag[k]/tag[k]...` where `k` is the
//! 1-based occurrence of that tag among the direct children of the same
//! parent. Paths depend on structure and tag names only.

use std::collections::HashMap;
use std::slice;

use crate::reader::xml_reader::{Attributes, Document, Element};

/// An element annotated with its traversal-assigned path.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct PathedElement<'a,> {
    pub tag:        &'a str,
    pub attributes: &'a Attributes,
    pub xpath:      String,
}

impl<'a,> PathedElement<'a,> {
    pub fn attribute(&self, key: &str,) -> Option<&'a str,> {
        self.attributes.get(key,).map(String::as_str,)
    }

    pub fn has_attribute(&self, key: &str,) -> bool {
        self.attributes.contains_key(key,)
    }
}

/// One level of the walk: the remaining siblings and their own occurrence
/// counter. A frame is created per parent, so counters never leak between
/// levels or branches.
struct Frame<'a,> {
    parent_path: String,
    siblings:    slice::Iter<'a, Element,>,
    occurrences: HashMap<&'a str, usize,>,
}

impl<'a,> Frame<'a,> {
    fn new(parent_path: String, children: &'a [Element],) -> Self {
        Self {
            parent_path,
            siblings: children.iter(),
            occurrences: HashMap::new(),
        }
    }
}

/// Flattens `document` into pre-order (parents before children, siblings in
/// document order), one record per element. The synthetic root emits nothing.
pub fn assign_paths(document: &Document,) -> Vec<PathedElement<'_,>,> {
    let mut elements = Vec::with_capacity(document.element_count(),);
    let mut stack = vec![Frame::new(String::new(), &document.roots,)];

    while let Some(frame,) = stack.last_mut() {
        let Some(child,) = frame.siblings.next() else {
            stack.pop();
            continue;
        };

        let occurrence = frame.occurrences.entry(child.tag.as_str(),).or_insert(0,);
        *occurrence += 1;
        let xpath = format!("{}/{}[{}]", frame.parent_path, child.tag, occurrence);

        if !child.children.is_empty() {
            stack.push(Frame::new(xpath.clone(), &child.children,),);
        }
        elements.push(PathedElement {
            tag: &child.tag,
            attributes: &child.attributes,
            xpath,
        },);
    }

    elements
}
