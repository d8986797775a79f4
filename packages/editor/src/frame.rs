//! # Frame Component Contract
//!
//! A frame is a droppable, draggable node carrying a stable identity and an
//! auto-height flag. While a frame is edited from an ancestor context its
//! rendered subtree is sealed: pointer interaction inside it is redirected
//! to the frame itself, and a double-click anywhere in it drills in.
//! Internal edits are only possible inside the frame's own nested context,
//! where the content sits at the root with no frame wrapping it, so
//! everything forwards naturally there.
//!
//! Also home to the canonical component defaults the insert palette seeds
//! new nodes from.

use framecraft_engine::{path_to, Node, FRAME_TAG};

/// Canonical frame node: droppable and draggable, dashed drop target box.
pub fn frame_defaults() -> Node {
    Node::new(FRAME_TAG)
        .with_style("position", "relative")
        .with_style("padding", "10px")
        .with_style("min-height", "200px")
        .with_style("border", "2px dashed #ccc")
}

/// Canonical text node.
pub fn text_defaults() -> Node {
    Node::text("Insert your text here")
        .with_style("padding", "10px")
        .with_style("min-height", "50px")
}

/// Canonical container node.
pub fn container_defaults() -> Node {
    Node::new("container")
        .with_style("padding", "20px")
        .with_style("min-height", "100px")
        .with_style("background-color", "#f7f7f7")
}

/// Canonical image node.
pub fn image_defaults() -> Node {
    Node::new("image")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Click,
    DoubleClick,
}

/// Where a pointer event should go after frame interception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerDisposition {
    /// Select the named frame node instead of the event target.
    SelectFrame { node_id: String },
    /// Open a nested editing context for the named frame node.
    DrillIn { node_id: String },
    /// Not inside any frame; let the editing surface handle it.
    Forward,
}

/// Decide what a pointer event landing on `target_node_id` should do.
///
/// The innermost frame on the root-to-target path wins, matching how the
/// rendered event would bubble: a click inside a frame's subtree selects
/// that frame rather than descending into its internals, and a double-click
/// drills into it.
pub fn intercept_pointer(
    components: &[Node],
    target_node_id: &str,
    kind: PointerKind,
) -> PointerDisposition {
    let Some(path) = path_to(components, target_node_id) else {
        return PointerDisposition::Forward;
    };

    match path.iter().rev().find(|node| node.is_frame()) {
        None => PointerDisposition::Forward,
        Some(frame) => {
            let node_id = frame.id.clone();
            match kind {
                PointerKind::Click => PointerDisposition::SelectFrame { node_id },
                PointerKind::DoubleClick => PointerDisposition::DrillIn { node_id },
            }
        }
    }
}
