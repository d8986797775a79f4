//! # Engine Contract
//!
//! The trait every editing surface implements for the nested-editing core.
//! One engine instance is bound to exactly one canvas and exclusively owned
//! by one editing context; suspended contexts keep their engine resident so
//! returning to them is lossless.

use crate::events::{Subscriber, SubscriptionId};
use crate::markup::MarkupError;
use crate::node::Node;
use framecraft_common::geometry::Rect;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("content export failed: {0}")]
    Export(String),

    #[error("content load failed: {0}")]
    Load(String),

    #[error("markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// Contract between the nested-editing core and a canvas engine.
///
/// Methods come in groups mirroring what the core needs: root component list,
/// stylesheet text, content export/load in each representation, per-node
/// reads and writes, rendered geometry, change events and named commands.
///
/// Export and load methods are fallible by design: on a real canvas each
/// representation can independently fail or come back empty, and the
/// recovery chain leans on that to pick the best surviving representation.
pub trait Engine {
    // --- root component list ---

    /// Live root component list. Content that is still settling after a
    /// load is not visible here yet.
    fn components(&self) -> &[Node];

    /// Replace the whole root component list.
    fn set_components(&mut self, nodes: Vec<Node>);

    // --- stylesheet ---

    fn css(&self) -> &str;

    fn set_css(&mut self, css: String);

    // --- structured (component tree) representation ---

    /// Export the whole document as a structured JSON component tree.
    fn export_structured(&self) -> Result<String, EngineError>;

    /// Export one node's children as a structured JSON component tree.
    fn export_node_structured(&self, node_id: &str) -> Result<String, EngineError>;

    /// Replace the document from a structured JSON export. Returns the
    /// number of top-level nodes loaded; they become visible once the
    /// surface settles.
    fn load_structured(&mut self, json: &str) -> Result<usize, EngineError>;

    // --- markup representation ---

    /// Export the whole document as flattened markup.
    fn export_markup(&self) -> Result<String, EngineError>;

    /// Export one node's children as flattened markup.
    fn export_node_markup(&self, node_id: &str) -> Result<String, EngineError>;

    /// Replace the document from markup. Returns the number of top-level
    /// nodes loaded.
    fn load_markup(&mut self, markup: &str) -> Result<usize, EngineError>;

    /// Parse markup into nodes without touching the document.
    fn parse_markup(&self, markup: &str) -> Result<Vec<Node>, EngineError>;

    // --- raw rendered document ---

    /// Markup of the live rendered document, read directly off the canvas.
    fn document_markup(&self) -> Result<String, EngineError>;

    /// Rendered inner markup of one node's subtree.
    fn rendered_node_markup(&self, node_id: &str) -> Result<String, EngineError>;

    // --- per-node reads and writes ---

    fn node(&self, node_id: &str) -> Option<&Node>;

    fn set_attribute(&mut self, node_id: &str, name: &str, value: &str)
        -> Result<(), EngineError>;

    /// Replace a node's whole attribute map.
    fn set_node_attributes(
        &mut self,
        node_id: &str,
        attributes: HashMap<String, String>,
    ) -> Result<(), EngineError>;

    fn set_style_property(
        &mut self,
        node_id: &str,
        property: &str,
        value: &str,
    ) -> Result<(), EngineError>;

    /// Replace a node's whole style map.
    fn set_node_style(
        &mut self,
        node_id: &str,
        style: HashMap<String, String>,
    ) -> Result<(), EngineError>;

    /// Replace a node's children. Returns the new child count.
    fn replace_children(
        &mut self,
        node_id: &str,
        children: Vec<Node>,
    ) -> Result<usize, EngineError>;

    // --- rendered geometry ---

    /// Rendered bounding box of one node, if it is currently rendered.
    fn rendered_bounds(&self, node_id: &str) -> Option<Rect>;

    /// Bounding box of all rendered content (the document's used extent).
    fn content_bounds(&self) -> Rect;

    /// Advance the rendering surface one step toward a settled state.
    /// Returns `true` once rendering has settled. The recovery chain calls
    /// this in a bounded retry loop; there is no true render-complete
    /// signal.
    fn poll_render(&mut self) -> bool;

    // --- events and commands ---

    fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Run a named engine command with a JSON options payload.
    fn run_command(
        &mut self,
        name: &str,
        options: serde_json::Value,
    ) -> Result<serde_json::Value, EngineError>;
}
