//! # Framecraft Records
//!
//! Data-record side of the page builder: flat `{id, path, value}` records
//! fetched from a table-shaped data source, and the pure builder that turns
//! them into the navigable tree the insert panel renders for drag-and-drop.

mod record;
mod source;
mod tree;

pub use record::RecordPath;
pub use source::{HttpRecordSource, RecordSource, SourceError, StaticRecordSource};
pub use tree::{build_tree, drag_payload, TreeError, TreeNode};
