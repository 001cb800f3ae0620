//! Classification of pathed elements and the summary handed to callers.
//!
//! Every attribute check here is a presence test on the key. An empty
//! `resource-id=""` still counts as an identifier and `focused="false"` still
//! counts as focused; this mirrors how UI dumps have been consumed so far.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DumpReaderError;
use crate::reader::xml_reader::parse_document;
use crate::traversal::{PathedElement, assign_paths};

pub const RESOURCE_ID_ATTR: &str = "resource-id";
pub const BOUNDS_ATTR: &str = "bounds";
pub const TEXT_ATTR: &str = "text";
pub const FOCUSED_ATTR: &str = "focused";

/// Per-element record. Optional fields are omitted when the source attribute
/// is absent; they are never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ElementDetail {
    pub xpath:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String,>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds:      Option<String,>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text:        Option<String,>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused:     Option<String,>,
}

impl ElementDetail {
    fn project(element: &PathedElement<'_,>,) -> Self {
        let owned = |key: &str| element.attribute(key,).map(str::to_owned,);
        Self {
            xpath:       element.xpath.clone(),
            resource_id: owned(RESOURCE_ID_ATTR,),
            bounds:      owned(BOUNDS_ATTR,),
            text:        owned(TEXT_ATTR,),
            focused:     owned(FOCUSED_ATTR,),
        }
    }
}

/// Field names and order are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize,)]
pub struct Summary {
    pub elements_with_resource_id:    usize,
    pub elements_without_resource_id: usize,
    pub with_resource_id_details:     Vec<ElementDetail,>,
    pub missing_resource_id_details:  Vec<ElementDetail,>,
    pub elements_focused:             usize,
    pub elements_not_focused:         usize,
}

impl Summary {
    pub fn total_elements(&self,) -> usize {
        self.elements_with_resource_id + self.elements_without_resource_id
    }
}

pub fn has_resource_id(element: &PathedElement<'_,>,) -> bool {
    element.has_attribute(RESOURCE_ID_ATTR,)
}

pub fn is_focused(element: &PathedElement<'_,>,) -> bool {
    element.has_attribute(FOCUSED_ATTR,)
}

/// Partitions `elements` by identifier presence and counts focus, keeping
/// traversal order inside each group.
pub fn classify(elements: &[PathedElement<'_,>],) -> Summary {
    let (with_resource_id, missing_resource_id,): (Vec<_,>, Vec<_,>,) =
        elements.iter().partition(|element| has_resource_id(element,),);
    let elements_focused = elements.iter().filter(|element| is_focused(element,),).count();

    Summary {
        elements_with_resource_id: with_resource_id.len(),
        elements_without_resource_id: missing_resource_id.len(),
        with_resource_id_details: with_resource_id
            .into_iter()
            .map(ElementDetail::project,)
            .collect(),
        missing_resource_id_details: missing_resource_id
            .into_iter()
            .map(ElementDetail::project,)
            .collect(),
        elements_focused,
        elements_not_focused: elements.len() - elements_focused,
    }
}

/// Parses a UI dump and summarizes every element in it.
///
/// Fails only with [`DumpReaderError::MalformedDocument`]. An empty document
/// produces an all-zero summary.
pub fn summarize(document_text: &str,) -> Result<Summary, DumpReaderError,> {
    let document = parse_document(document_text,)?;
    let elements = assign_paths(&document,);
    let summary = classify(&elements,);
    debug!(
        elements = elements.len(),
        with_resource_id = summary.elements_with_resource_id,
        focused = summary.elements_focused,
        "summarized UI dump"
    );
    Ok(summary,)
}
