//! # Component Node Model
//!
//! A [`Node`] is one element of an engine's component tree. The `tag` is the
//! component type (`"text"`, `"container"`, `"image"`, `"frame"`, ...), not
//! an HTML tag name; the markup codec decides how a tag renders.
//!
//! Frames are ordinary nodes with `tag == "frame"` that carry a stable
//! identity in their attribute map. That identity is assigned once and must
//! survive every content round-trip: the stack manager uses it to find the
//! frame again when a nested edit returns to its parent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Component type of frame nodes.
pub const FRAME_TAG: &str = "frame";

/// Attribute holding a frame's stable identity.
pub const FRAME_ID_ATTR: &str = "data-frame-id";

/// Attribute holding a frame's auto-height flag (`"true"` / `"false"`).
pub const AUTO_HEIGHT_ATTR: &str = "data-auto-height";

/// One node of a component tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Engine-assigned node identity, unique within one engine instance.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Component type.
    #[serde(rename = "type")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub style: HashMap<String, String>,

    /// Inline text content, rendered before any children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub droppable: bool,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub draggable: bool,
}

fn default_true() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            tag: tag.into(),
            attributes: HashMap::new(),
            style: HashMap::new(),
            content: None,
            children: Vec::new(),
            droppable: true,
            draggable: true,
        }
    }

    /// Text node with inline content.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new("text").with_content(content)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is_frame(&self) -> bool {
        self.tag == FRAME_TAG
    }

    /// Stable frame identity, if one has been assigned.
    pub fn frame_id(&self) -> Option<&str> {
        self.attributes.get(FRAME_ID_ATTR).map(String::as_str)
    }

    pub fn set_frame_id(&mut self, frame_id: impl Into<String>) {
        self.attributes
            .insert(FRAME_ID_ATTR.to_string(), frame_id.into());
    }

    pub fn auto_height(&self) -> bool {
        self.attributes
            .get(AUTO_HEIGHT_ATTR)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Find a node by engine id in this subtree (including `self`).
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        find_node(&self.children, id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        find_node_mut(&mut self.children, id)
    }
}

/// Recursive-descent search by engine id over a forest.
pub fn find_node<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    for node in nodes {
        if let Some(found) = node.find(id) {
            return Some(found);
        }
    }
    None
}

pub fn find_node_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    for node in nodes {
        if let Some(found) = node.find_mut(id) {
            return Some(found);
        }
    }
    None
}

/// Recursive-descent search for a frame by its stable identity.
///
/// Traverses arbitrarily nested children: a frame may sit inside any number
/// of non-frame containers. Ownership makes the tree acyclic, so the
/// recursion is bounded by the tree itself.
pub fn find_by_frame_id<'a>(nodes: &'a [Node], frame_id: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.frame_id() == Some(frame_id) {
            return Some(node);
        }
        if let Some(found) = find_by_frame_id(&node.children, frame_id) {
            return Some(found);
        }
    }
    None
}

/// Total node count of a forest, all depths.
pub fn count_nodes(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + count_nodes(&n.children))
        .sum()
}

/// Root-to-target path of references, or `None` when `id` is absent.
pub fn path_to<'a>(nodes: &'a [Node], id: &str) -> Option<Vec<&'a Node>> {
    for node in nodes {
        if node.id == id {
            return Some(vec![node]);
        }
        if let Some(mut path) = path_to(&node.children, id) {
            path.insert(0, node);
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Vec<Node> {
        vec![
            Node::new("container").with_id("c1").with_child(
                Node::new(FRAME_TAG)
                    .with_id("f1")
                    .with_attr(FRAME_ID_ATTR, "frame-a")
                    .with_child(Node::text("inside").with_id("t1")),
            ),
            Node::text("after").with_id("t2"),
        ]
    }

    #[test]
    fn test_find_by_frame_id_traverses_nested_children() {
        let nodes = sample_tree();
        let frame = find_by_frame_id(&nodes, "frame-a").unwrap();
        assert_eq!(frame.id, "f1");

        assert!(find_by_frame_id(&nodes, "frame-missing").is_none());
    }

    #[test]
    fn test_path_to_returns_root_first() {
        let nodes = sample_tree();
        let path = path_to(&nodes, "t1").unwrap();
        let ids: Vec<&str> = path.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "f1", "t1"]);
    }

    #[test]
    fn test_count_nodes_all_depths() {
        let nodes = sample_tree();
        assert_eq!(count_nodes(&nodes), 4);
    }

    #[test]
    fn test_serde_roundtrip_preserves_frame_identity() {
        let node = Node::new(FRAME_TAG)
            .with_id("f9")
            .with_attr(FRAME_ID_ATTR, "frame-9")
            .with_style("height", "200px");

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();

        assert_eq!(back, node);
        assert_eq!(back.frame_id(), Some("frame-9"));
        assert!(back.droppable && back.draggable);
    }

    #[test]
    fn test_type_field_serializes_as_type() {
        let json = serde_json::to_string(&Node::new("text")).unwrap();
        assert!(json.contains("\"type\":\"text\""));
    }
}
