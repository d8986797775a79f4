//! # Headless Engine
//!
//! Complete in-memory implementation of the [`Engine`] contract. Used by the
//! editor core's tests and by hosts that drive the nested-editing machinery
//! without a browser canvas.
//!
//! Geometry is synthesized from the style map: a node's height is its
//! declared `height`, else the larger of its `min-height` (or a per-type
//! default) and the summed heights of its children plus padding. That is
//! enough for the dimension tracker's growth-only policy to behave the way
//! it does against a real canvas.
//!
//! Loads can be made to settle lazily (`set_settle_delay`) and individual
//! representations can be failed ([`Faults`]) so the recovery chain's
//! fallback order is testable.

use crate::engine::{Engine, EngineError};
use crate::events::{ChangeEvent, Subscriber, SubscriptionId};
use crate::ids::IdGenerator;
use crate::markup;
use crate::node::{find_node, find_node_mut, Node};
use framecraft_common::geometry::Rect;
use framecraft_common::units::parse_px;
use serde_json::json;
use std::collections::HashMap;

/// Failure injection for recovery-chain tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub fail_structured_export: bool,
    pub fail_markup_export: bool,
    pub fail_structured_load: bool,
    pub fail_markup_load: bool,
    pub fail_document_markup: bool,
}

struct Staged {
    nodes: Vec<Node>,
    polls_remaining: u32,
}

pub struct HeadlessEngine {
    components: Vec<Node>,
    css: String,
    staged: Option<Staged>,
    settle_delay_polls: u32,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    ids: IdGenerator,
    pub faults: Faults,
}

impl HeadlessEngine {
    pub fn new(canvas_name: &str) -> Self {
        Self {
            components: Vec::new(),
            css: String::new(),
            staged: None,
            settle_delay_polls: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
            ids: IdGenerator::new(canvas_name),
            faults: Faults::default(),
        }
    }

    pub fn with_components(mut self, nodes: Vec<Node>) -> Self {
        self.set_components(nodes);
        self
    }

    /// Number of `poll_render` calls a load needs before its content
    /// becomes live. Zero (the default) commits immediately.
    pub fn set_settle_delay(&mut self, polls: u32) {
        self.settle_delay_polls = polls;
    }

    fn adopt_ids(ids: &mut IdGenerator, nodes: &mut [Node]) {
        for node in nodes {
            if node.id.is_empty() {
                node.id = ids.new_id();
            }
            Self::adopt_ids(ids, &mut node.children);
        }
    }

    fn commit(&mut self, nodes: Vec<Node>) {
        self.components = nodes;
        let added: Vec<String> = self.components.iter().map(|n| n.id.clone()).collect();
        for id in added {
            self.dispatch(ChangeEvent::NodeAdded { id });
        }
    }

    fn stage_or_commit(&mut self, mut nodes: Vec<Node>) -> usize {
        Self::adopt_ids(&mut self.ids, &mut nodes);
        let count = nodes.len();
        if self.settle_delay_polls > 0 {
            tracing::debug!(count, polls = self.settle_delay_polls, "load staged until surface settles");
            self.components.clear();
            self.staged = Some(Staged {
                nodes,
                polls_remaining: self.settle_delay_polls,
            });
        } else {
            self.commit(nodes);
        }
        count
    }

    fn dispatch(&mut self, event: ChangeEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
    }

    fn find_mut_or_err(&mut self, node_id: &str) -> Result<&mut Node, EngineError> {
        find_node_mut(&mut self.components, node_id)
            .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))
    }

    fn measured_height(node: &Node) -> f64 {
        if let Some(height) = node.style.get("height").and_then(|v| parse_px(v)) {
            return height;
        }
        let base = node
            .style
            .get("min-height")
            .and_then(|v| parse_px(v))
            .unwrap_or_else(|| default_height(&node.tag));
        let padding = node
            .style
            .get("padding")
            .and_then(|v| parse_px(v))
            .unwrap_or(0.0);
        let content: f64 = node.children.iter().map(Self::measured_height).sum();
        base.max(content + padding * 2.0)
    }

    fn measured_width(node: &Node) -> f64 {
        node.style
            .get("width")
            .and_then(|v| parse_px(v))
            .unwrap_or(600.0)
    }
}

fn default_height(tag: &str) -> f64 {
    match tag {
        "frame" => 200.0,
        "image" => 150.0,
        "container" => 100.0,
        _ => 50.0,
    }
}

impl Engine for HeadlessEngine {
    fn components(&self) -> &[Node] {
        &self.components
    }

    fn set_components(&mut self, mut nodes: Vec<Node>) {
        Self::adopt_ids(&mut self.ids, &mut nodes);
        self.staged = None;
        self.commit(nodes);
    }

    fn css(&self) -> &str {
        &self.css
    }

    fn set_css(&mut self, css: String) {
        self.css = css;
        self.dispatch(ChangeEvent::CssChanged);
    }

    fn export_structured(&self) -> Result<String, EngineError> {
        if self.faults.fail_structured_export {
            return Err(EngineError::Export("structured export unavailable".into()));
        }
        Ok(serde_json::to_string(&self.components)?)
    }

    fn export_node_structured(&self, node_id: &str) -> Result<String, EngineError> {
        if self.faults.fail_structured_export {
            return Err(EngineError::Export("structured export unavailable".into()));
        }
        let node = self
            .node(node_id)
            .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;
        Ok(serde_json::to_string(&node.children)?)
    }

    fn load_structured(&mut self, json: &str) -> Result<usize, EngineError> {
        if self.faults.fail_structured_load {
            return Err(EngineError::Load("structured load unavailable".into()));
        }
        let nodes: Vec<Node> = serde_json::from_str(json)?;
        Ok(self.stage_or_commit(nodes))
    }

    fn export_markup(&self) -> Result<String, EngineError> {
        if self.faults.fail_markup_export {
            return Err(EngineError::Export("markup export unavailable".into()));
        }
        Ok(markup::write_nodes(&self.components))
    }

    fn export_node_markup(&self, node_id: &str) -> Result<String, EngineError> {
        if self.faults.fail_markup_export {
            return Err(EngineError::Export("markup export unavailable".into()));
        }
        let node = self
            .node(node_id)
            .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;
        Ok(markup::write_nodes(&node.children))
    }

    fn load_markup(&mut self, text: &str) -> Result<usize, EngineError> {
        if self.faults.fail_markup_load {
            return Err(EngineError::Load("markup load unavailable".into()));
        }
        let nodes = markup::read_nodes(text)?;
        Ok(self.stage_or_commit(nodes))
    }

    fn parse_markup(&self, text: &str) -> Result<Vec<Node>, EngineError> {
        Ok(markup::read_nodes(text)?)
    }

    fn document_markup(&self) -> Result<String, EngineError> {
        if self.faults.fail_document_markup {
            return Err(EngineError::Export("canvas document unavailable".into()));
        }
        Ok(markup::write_nodes(&self.components))
    }

    fn rendered_node_markup(&self, node_id: &str) -> Result<String, EngineError> {
        if self.faults.fail_document_markup {
            return Err(EngineError::Export("canvas document unavailable".into()));
        }
        let node = self
            .node(node_id)
            .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;
        Ok(markup::write_nodes(&node.children))
    }

    fn node(&self, node_id: &str) -> Option<&Node> {
        find_node(&self.components, node_id)
    }

    fn set_attribute(
        &mut self,
        node_id: &str,
        name: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        let node = self.find_mut_or_err(node_id)?;
        node.attributes.insert(name.to_string(), value.to_string());
        self.dispatch(ChangeEvent::AttributeChanged {
            id: node_id.to_string(),
        });
        Ok(())
    }

    fn set_node_attributes(
        &mut self,
        node_id: &str,
        attributes: HashMap<String, String>,
    ) -> Result<(), EngineError> {
        let node = self.find_mut_or_err(node_id)?;
        node.attributes = attributes;
        self.dispatch(ChangeEvent::AttributeChanged {
            id: node_id.to_string(),
        });
        Ok(())
    }

    fn set_style_property(
        &mut self,
        node_id: &str,
        property: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        let node = self.find_mut_or_err(node_id)?;
        node.style.insert(property.to_string(), value.to_string());
        self.dispatch(ChangeEvent::StyleChanged {
            id: node_id.to_string(),
        });
        Ok(())
    }

    fn set_node_style(
        &mut self,
        node_id: &str,
        style: HashMap<String, String>,
    ) -> Result<(), EngineError> {
        let node = self.find_mut_or_err(node_id)?;
        node.style = style;
        self.dispatch(ChangeEvent::StyleChanged {
            id: node_id.to_string(),
        });
        Ok(())
    }

    fn replace_children(
        &mut self,
        node_id: &str,
        mut children: Vec<Node>,
    ) -> Result<usize, EngineError> {
        let mut ids = self.ids.clone();
        let node = find_node_mut(&mut self.components, node_id)
            .ok_or_else(|| EngineError::NodeNotFound(node_id.to_string()))?;
        Self::adopt_ids(&mut ids, &mut children);
        let count = children.len();
        node.children = children;
        self.ids = ids;
        self.dispatch(ChangeEvent::ContentChanged {
            id: node_id.to_string(),
        });
        Ok(count)
    }

    fn rendered_bounds(&self, node_id: &str) -> Option<Rect> {
        let node = self.node(node_id)?;
        Some(Rect::new(
            0.0,
            0.0,
            Self::measured_width(node),
            Self::measured_height(node),
        ))
    }

    fn content_bounds(&self) -> Rect {
        let width = self
            .components
            .iter()
            .map(|n| Self::measured_width(n))
            .fold(0.0, f64::max);
        let height: f64 = self.components.iter().map(Self::measured_height).sum();
        Rect::new(0.0, 0.0, width, height)
    }

    fn poll_render(&mut self) -> bool {
        match self.staged.take() {
            None => true,
            Some(mut staged) => {
                staged.polls_remaining -= 1;
                if staged.polls_remaining == 0 {
                    self.commit(staged.nodes);
                    true
                } else {
                    self.staged = Some(staged);
                    false
                }
            }
        }
    }

    fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, subscriber));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn run_command(
        &mut self,
        name: &str,
        _options: serde_json::Value,
    ) -> Result<serde_json::Value, EngineError> {
        match name {
            "save-page" => {
                let html = self.document_markup()?;
                Ok(json!({ "html": html, "css": self.css }))
            }
            _ => Err(EngineError::UnknownCommand(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{FRAME_ID_ATTR, FRAME_TAG};
    use std::cell::Cell;
    use std::rc::Rc;

    fn frame_with_text() -> Vec<Node> {
        vec![Node::new(FRAME_TAG)
            .with_attr(FRAME_ID_ATTR, "frame-1")
            .with_style("padding", "10px")
            .with_child(Node::text("inside"))]
    }

    #[test]
    fn test_adopts_ids_on_set() {
        let engine = HeadlessEngine::new("main").with_components(frame_with_text());
        let frame = &engine.components()[0];
        assert!(!frame.id.is_empty());
        assert!(!frame.children[0].id.is_empty());
        assert_ne!(frame.id, frame.children[0].id);
    }

    #[test]
    fn test_structured_roundtrip() {
        let mut engine = HeadlessEngine::new("main").with_components(frame_with_text());
        let exported = engine.export_structured().unwrap();

        let mut fresh = HeadlessEngine::new("copy");
        fresh.load_structured(&exported).unwrap();

        assert_eq!(fresh.components(), engine.components());
    }

    #[test]
    fn test_staged_load_settles_after_polls() {
        let mut engine = HeadlessEngine::new("main");
        engine.set_settle_delay(2);
        let count = engine
            .load_markup("<div data-node-type=\"text\">hi</div>")
            .unwrap();
        assert_eq!(count, 1);
        assert!(engine.components().is_empty());

        assert!(!engine.poll_render());
        assert!(engine.components().is_empty());
        assert!(engine.poll_render());
        assert_eq!(engine.components().len(), 1);
    }

    #[test]
    fn test_faults_fail_single_representation() {
        let mut engine = HeadlessEngine::new("main").with_components(frame_with_text());
        engine.faults.fail_structured_export = true;

        assert!(engine.export_structured().is_err());
        assert!(engine.export_markup().is_ok());
    }

    #[test]
    fn test_change_events_reach_subscribers() {
        let mut engine = HeadlessEngine::new("main").with_components(frame_with_text());
        let frame_id = engine.components()[0].id.clone();

        let seen = Rc::new(Cell::new(0u32));
        let seen_in_cb = seen.clone();
        engine.subscribe(Box::new(move |_| seen_in_cb.set(seen_in_cb.get() + 1)));

        engine
            .set_style_property(&frame_id, "height", "300px")
            .unwrap();
        engine.replace_children(&frame_id, vec![Node::text("new")]).unwrap();

        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut engine = HeadlessEngine::new("main").with_components(frame_with_text());
        let frame_id = engine.components()[0].id.clone();

        let seen = Rc::new(Cell::new(0u32));
        let seen_in_cb = seen.clone();
        let sub = engine.subscribe(Box::new(move |_| seen_in_cb.set(seen_in_cb.get() + 1)));
        engine.unsubscribe(sub);

        engine
            .set_style_property(&frame_id, "height", "300px")
            .unwrap();
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn test_content_height_grows_with_children() {
        let mut engine = HeadlessEngine::new("main").with_components(frame_with_text());
        let before = engine.content_bounds().height;

        let frame_id = engine.components()[0].id.clone();
        engine
            .replace_children(
                &frame_id,
                vec![
                    Node::text("a").with_style("height", "120px"),
                    Node::text("b").with_style("height", "150px"),
                ],
            )
            .unwrap();

        let after = engine.content_bounds().height;
        assert!(after > before);
        // 120 + 150 + 2 * 10 padding
        assert_eq!(after, 290.0);
    }

    #[test]
    fn test_save_page_command() {
        let mut engine = HeadlessEngine::new("main").with_components(frame_with_text());
        engine.set_css(".frame { color: red }".to_string());

        let result = engine.run_command("save-page", json!({})).unwrap();
        assert!(result["html"].as_str().unwrap().contains("data-frame-id"));
        assert_eq!(result["css"], ".frame { color: red }");

        assert!(matches!(
            engine.run_command("no-such-command", json!({})),
            Err(EngineError::UnknownCommand(_))
        ));
    }
}
