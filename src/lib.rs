//! Summaries of UI-dump XML (uiautomator-style hierarchies).
//!
//! A dump is parsed into an element tree, every element receives a positional
//! path such as `/hierarchy[1]/node[2]/node[1]`, and elements are split by
//! whether they carry a `resource-id` attribute:
//!
//! ```
//! let summary = uidump_reader::summarize(
//!     r#"<root><node resource-id="x1" text="Hi"/><node/></root>"#,
//! )?;
//! assert_eq!(summary.elements_with_resource_id, 1);
//! assert_eq!(summary.with_resource_id_details[0].xpath, "/root[1]/node[1]");
//! # Ok::<(), uidump_reader::DumpReaderError>(())
//! ```
//!
//! The [`server`] module wraps this in a small HTTP job service and
//! [`source`] reads dumps from files, directories or URLs.

pub mod error;
pub mod output;
pub mod reader;
pub mod screenshot;
pub mod server;
pub mod source;
pub mod store;
pub mod summary;
pub mod traversal;

pub use error::DumpReaderError;
pub use summary::{ElementDetail, Summary, summarize};
