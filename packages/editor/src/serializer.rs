//! # Content Serializer / Recovery Chain
//!
//! Moves a context's visual content between representations without silent
//! loss. Extraction runs an explicit ordered strategy list rather than
//! exception fallthrough: each representation is attempted in priority order
//! and the next is tried only when the previous one errored or came back
//! empty. Restore walks the same order and falls through on a zero live-node
//! count; when every representation is exhausted it installs a placeholder
//! node instead of leaving the target with zero children, and reports that
//! so callers can surface a warning.

use crate::content::{Representation, SerializedContent};
use crate::errors::EditorError;
use crate::options::SettlePolicy;
use framecraft_engine::{Engine, EngineError, Node};

/// What a restore ended up applying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// One of the captured representations produced live nodes.
    Applied(Representation),
    /// All representations were empty or failed; a placeholder node was
    /// installed.
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub outcome: RestoreOutcome,
    pub live_nodes: usize,
}

impl RestoreReport {
    pub fn used_placeholder(&self) -> bool {
        self.outcome == RestoreOutcome::Placeholder
    }
}

/// Capture a whole context's content.
///
/// Never fails: an engine where every representation errors simply yields an
/// empty capture, which downstream code refuses to persist over saved
/// content.
pub fn capture<E: Engine>(engine: &E) -> SerializedContent {
    let mut content = SerializedContent {
        css: engine.css().to_string(),
        node_count: engine.components().len(),
        ..Default::default()
    };

    for kind in Representation::PRIORITY {
        match export(engine, kind) {
            Ok(text) if !is_blank(kind, &text) => {
                tracing::debug!(
                    representation = kind.as_str(),
                    top_level = content.node_count,
                    "captured content"
                );
                content.set_representation(kind, text);
                break;
            }
            Ok(_) => {
                tracing::debug!(representation = kind.as_str(), "capture empty, falling back");
            }
            Err(error) => {
                tracing::debug!(
                    representation = kind.as_str(),
                    %error,
                    "capture failed, falling back"
                );
            }
        }
    }

    content
}

/// Capture one frame node's content (its children) from within a context.
pub fn capture_node<E: Engine>(engine: &E, node_id: &str) -> Result<SerializedContent, EditorError> {
    let node = engine
        .node(node_id)
        .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;

    let mut content = SerializedContent {
        css: engine.css().to_string(),
        node_count: node.children.len(),
        ..Default::default()
    };

    for kind in Representation::PRIORITY {
        match export_node(engine, node_id, kind) {
            Ok(text) if !is_blank(kind, &text) => {
                tracing::debug!(
                    representation = kind.as_str(),
                    node_id,
                    top_level = content.node_count,
                    "captured frame content"
                );
                content.set_representation(kind, text);
                break;
            }
            Ok(_) => {
                tracing::debug!(representation = kind.as_str(), node_id, "capture empty, falling back");
            }
            Err(error) => {
                tracing::debug!(representation = kind.as_str(), node_id, %error, "capture failed, falling back");
            }
        }
    }

    Ok(content)
}

/// Restore captured content into a whole (usually fresh) context.
///
/// Degrades through the representations in priority order; never fails for
/// a merely missing representation. The report says whether the placeholder
/// had to be used.
pub fn restore<E: Engine>(
    engine: &mut E,
    content: &SerializedContent,
    policy: &SettlePolicy,
    placeholder_text: &str,
) -> RestoreReport {
    for kind in Representation::PRIORITY {
        let Some(text) = content.representation(kind) else {
            continue;
        };
        match load(engine, kind, text) {
            Ok(_) => {
                settle(engine, policy);
                let live = engine.components().len();
                if live > 0 {
                    tracing::debug!(representation = kind.as_str(), live, "restored content");
                    return RestoreReport {
                        outcome: RestoreOutcome::Applied(kind),
                        live_nodes: live,
                    };
                }
                tracing::debug!(
                    representation = kind.as_str(),
                    "restore produced no live nodes, falling back"
                );
            }
            Err(error) => {
                tracing::debug!(representation = kind.as_str(), %error, "restore failed, falling back");
            }
        }
    }

    tracing::warn!("all content representations exhausted; installing placeholder");
    engine.set_components(vec![placeholder_node(placeholder_text)]);
    RestoreReport {
        outcome: RestoreOutcome::Placeholder,
        live_nodes: 1,
    }
}

/// Restore captured content into one node's subtree inside an existing
/// context, replacing its children. The target's own style and attributes
/// are not touched here; the stack manager re-applies its snapshot on top.
pub fn restore_into<E: Engine>(
    engine: &mut E,
    node_id: &str,
    content: &SerializedContent,
    policy: &SettlePolicy,
    placeholder_text: &str,
) -> Result<RestoreReport, EditorError> {
    for kind in Representation::PRIORITY {
        let Some(text) = content.representation(kind) else {
            continue;
        };
        // Build nodes before mutating so a failed parse leaves the target
        // untouched.
        let nodes = match build_nodes(engine, kind, text) {
            Ok(nodes) if !nodes.is_empty() => nodes,
            Ok(_) => {
                tracing::debug!(representation = kind.as_str(), node_id, "no nodes to restore, falling back");
                continue;
            }
            Err(error) => {
                tracing::debug!(representation = kind.as_str(), node_id, %error, "restore failed, falling back");
                continue;
            }
        };

        engine.replace_children(node_id, nodes)?;
        settle(engine, policy);
        let live = engine.node(node_id).map(|n| n.children.len()).unwrap_or(0);
        if live > 0 {
            tracing::debug!(representation = kind.as_str(), node_id, live, "restored frame content");
            return Ok(RestoreReport {
                outcome: RestoreOutcome::Applied(kind),
                live_nodes: live,
            });
        }
    }

    tracing::warn!(node_id, "all content representations exhausted; installing placeholder");
    engine.replace_children(node_id, vec![placeholder_node(placeholder_text)])?;
    Ok(RestoreReport {
        outcome: RestoreOutcome::Placeholder,
        live_nodes: 1,
    })
}

/// Bounded settle loop over the rendering surface. A coarse synchronization
/// point, not a render-complete signal; the residual race is accepted.
pub(crate) fn settle<E: Engine>(engine: &mut E, policy: &SettlePolicy) {
    for _ in 0..policy.max_attempts.max(1) {
        if engine.poll_render() {
            return;
        }
    }
    tracing::debug!(
        attempts = policy.max_attempts,
        "surface did not settle within the retry budget"
    );
}

fn export<E: Engine>(engine: &E, kind: Representation) -> Result<String, EngineError> {
    match kind {
        Representation::Structured => engine.export_structured(),
        Representation::Markup => engine.export_markup(),
        Representation::RawCanvas => engine.document_markup(),
    }
}

fn export_node<E: Engine>(
    engine: &E,
    node_id: &str,
    kind: Representation,
) -> Result<String, EngineError> {
    match kind {
        Representation::Structured => engine.export_node_structured(node_id),
        Representation::Markup => engine.export_node_markup(node_id),
        Representation::RawCanvas => engine.rendered_node_markup(node_id),
    }
}

fn load<E: Engine>(engine: &mut E, kind: Representation, text: &str) -> Result<usize, EngineError> {
    match kind {
        Representation::Structured => engine.load_structured(text),
        Representation::Markup | Representation::RawCanvas => engine.load_markup(text),
    }
}

fn build_nodes<E: Engine>(
    engine: &E,
    kind: Representation,
    text: &str,
) -> Result<Vec<Node>, EditorError> {
    match kind {
        Representation::Structured => {
            let nodes: Vec<Node> =
                serde_json::from_str(text).map_err(|e| EditorError::Engine(EngineError::Json(e)))?;
            Ok(nodes)
        }
        Representation::Markup | Representation::RawCanvas => Ok(engine.parse_markup(text)?),
    }
}

/// A structured export of zero nodes is as empty as no export at all.
fn is_blank(kind: Representation, text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    if kind == Representation::Structured {
        return serde_json::from_str::<Vec<serde_json::Value>>(text)
            .map(|nodes| nodes.is_empty())
            .unwrap_or(false);
    }
    false
}

fn placeholder_node(text: &str) -> Node {
    Node::text(text)
        .with_style("padding", "10px")
        .with_style("min-height", "50px")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::EditorOptions;
    use framecraft_engine::{count_nodes, HeadlessEngine, Node, FRAME_ID_ATTR, FRAME_TAG};

    fn sample_components() -> Vec<Node> {
        vec![
            Node::new("container")
                .with_style("padding", "20px")
                .with_child(Node::text("hello")),
            Node::new(FRAME_TAG).with_attr(FRAME_ID_ATTR, "frame-1"),
        ]
    }

    fn options() -> EditorOptions {
        EditorOptions::default()
    }

    #[test]
    fn test_capture_prefers_structured() {
        let engine = HeadlessEngine::new("main").with_components(sample_components());
        let content = capture(&engine);

        assert_eq!(content.first_available(), Some(Representation::Structured));
        assert_eq!(content.node_count, 2);
        assert!(content.markup.is_none());
    }

    #[test]
    fn test_capture_falls_back_per_failed_representation() {
        let mut engine = HeadlessEngine::new("main").with_components(sample_components());
        engine.faults.fail_structured_export = true;
        let content = capture(&engine);
        assert_eq!(content.first_available(), Some(Representation::Markup));

        engine.faults.fail_markup_export = true;
        let content = capture(&engine);
        assert_eq!(content.first_available(), Some(Representation::RawCanvas));

        engine.faults.fail_document_markup = true;
        let content = capture(&engine);
        assert!(content.is_empty());
        assert_eq!(content.css, "");
    }

    #[test]
    fn test_roundtrip_preserves_live_node_count() {
        let engine = HeadlessEngine::new("main").with_components(sample_components());
        let before = engine.components().len();
        let content = capture(&engine);

        let mut fresh = HeadlessEngine::new("fresh");
        let report = restore(&mut fresh, &content, &options().settle, "placeholder");

        assert_eq!(report.outcome, RestoreOutcome::Applied(Representation::Structured));
        assert_eq!(fresh.components().len(), before);
        assert_eq!(count_nodes(fresh.components()), count_nodes(engine.components()));
    }

    #[test]
    fn test_restore_falls_back_to_markup() {
        let engine = HeadlessEngine::new("main").with_components(sample_components());
        let mut content = capture(&engine);
        // poison the structured representation; markup entry from an earlier
        // save is still good
        content.structured = Some("{not json".to_string());
        content.markup = Some(engine.export_markup().unwrap());

        let mut fresh = HeadlessEngine::new("fresh");
        let report = restore(&mut fresh, &content, &options().settle, "placeholder");

        assert_eq!(report.outcome, RestoreOutcome::Applied(Representation::Markup));
        assert_eq!(fresh.components().len(), 2);
    }

    #[test]
    fn test_restore_installs_placeholder_when_exhausted() {
        let mut fresh = HeadlessEngine::new("fresh");
        let report = restore(
            &mut fresh,
            &SerializedContent::default(),
            &options().settle,
            "Insert your text here",
        );

        assert!(report.used_placeholder());
        assert_eq!(fresh.components().len(), 1);
        assert_eq!(
            fresh.components()[0].content.as_deref(),
            Some("Insert your text here")
        );
    }

    #[test]
    fn test_restore_waits_for_settling_surface() {
        let engine = HeadlessEngine::new("main").with_components(sample_components());
        let content = capture(&engine);

        let mut fresh = HeadlessEngine::new("fresh");
        // needs three polls; the default budget of five covers it
        fresh.set_settle_delay(3);
        let report = restore(&mut fresh, &content, &options().settle, "placeholder");

        assert_eq!(report.outcome, RestoreOutcome::Applied(Representation::Structured));
        assert_eq!(fresh.components().len(), 2);
    }

    #[test]
    fn test_capture_node_scopes_to_children() {
        let engine = HeadlessEngine::new("main").with_components(vec![Node::new(FRAME_TAG)
            .with_attr(FRAME_ID_ATTR, "frame-1")
            .with_child(Node::text("a"))
            .with_child(Node::text("b"))]);
        let frame_node_id = engine.components()[0].id.clone();

        let content = capture_node(&engine, &frame_node_id).unwrap();
        assert_eq!(content.node_count, 2);

        let nodes: Vec<Node> = serde_json::from_str(content.structured.as_deref().unwrap()).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.tag == "text"));
    }

    #[test]
    fn test_capture_node_missing_target_errors() {
        let engine = HeadlessEngine::new("main");
        assert!(matches!(
            capture_node(&engine, "nope"),
            Err(EditorError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_restore_into_replaces_children_only() {
        let mut engine = HeadlessEngine::new("main").with_components(vec![Node::new(FRAME_TAG)
            .with_attr(FRAME_ID_ATTR, "frame-1")
            .with_style("height", "200px")
            .with_child(Node::text("old"))]);
        let frame_node_id = engine.components()[0].id.clone();

        let mut content = SerializedContent::default();
        content.set_representation(
            Representation::Structured,
            serde_json::to_string(&vec![Node::text("new-a"), Node::text("new-b")]).unwrap(),
        );

        let report = restore_into(&mut engine, &frame_node_id, &content, &options().settle, "ph")
            .unwrap();

        assert_eq!(report.live_nodes, 2);
        let frame = engine.node(&frame_node_id).unwrap();
        assert_eq!(frame.children.len(), 2);
        // the frame node itself is untouched
        assert_eq!(frame.frame_id(), Some("frame-1"));
        assert_eq!(frame.style.get("height").map(String::as_str), Some("200px"));
    }

    #[test]
    fn test_restore_into_placeholder_protects_against_collapse() {
        let mut engine = HeadlessEngine::new("main").with_components(vec![Node::new(FRAME_TAG)
            .with_attr(FRAME_ID_ATTR, "frame-1")
            .with_child(Node::text("old"))]);
        let frame_node_id = engine.components()[0].id.clone();

        let report = restore_into(
            &mut engine,
            &frame_node_id,
            &SerializedContent::default(),
            &options().settle,
            "ph",
        )
        .unwrap();

        assert!(report.used_placeholder());
        let frame = engine.node(&frame_node_id).unwrap();
        assert_eq!(frame.children.len(), 1);
        assert_eq!(frame.children[0].content.as_deref(), Some("ph"));
    }
}
