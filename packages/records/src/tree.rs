//! # Record Tree Builder
//!
//! Pure function from a flat record list to the hierarchical tree the insert
//! panel renders. One tree node exists per distinct path prefix; the `[n]`
//! array index is stripped from the display label but stays part of the key,
//! so repeated siblings remain distinct nodes.
//!
//! Records are sorted by path before the walk, which makes construction
//! deterministic and guarantees a parent prefix is visited before or
//! alongside its children.
//!
//! ## Conflicts
//!
//! Two records can disagree about a path: one may address `/a` as a value
//! while another addresses `/a/b`, or the same full path may appear with two
//! different values. Construction rejects both cases with [`TreeError`]
//! rather than guessing a precedence. Exact duplicates (same path, same
//! value) are accepted as idempotent.

use crate::record::RecordPath;
use std::collections::HashMap;

/// One node of the derived record hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Unique key: the full path prefix, array indices included.
    pub key: String,
    /// Display label: the segment with any trailing `[n]` stripped.
    pub label: String,
    pub path: String,
    /// Populated only on the terminal node of a record's full path.
    pub value: Option<String>,
    pub children: Vec<TreeNode>,
    pub is_leaf: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("path {path} is addressed both as a value and as a branch")]
    LeafConflict { path: String },

    #[error("path {path} carries two different values")]
    ValueConflict { path: String },
}

struct Prefix {
    label: String,
    path: String,
    value: Option<String>,
    is_leaf: bool,
    children: Vec<usize>,
}

/// Build the record hierarchy. Pure and deterministic; the input slice is
/// not modified.
pub fn build_tree(records: &[RecordPath]) -> Result<Vec<TreeNode>, TreeError> {
    let mut arena: Vec<Prefix> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    let mut sorted: Vec<&RecordPath> = records.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    for record in sorted {
        // Empty segments (consecutive slashes) create no nodes.
        let segments: Vec<&str> = record.path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            continue;
        }

        let mut current_path = String::new();
        let mut parent: Option<usize> = None;
        let last = segments.len() - 1;

        for (i, segment) in segments.iter().enumerate() {
            current_path.push('/');
            current_path.push_str(segment);
            let terminal = i == last;

            let idx = match index.get(current_path.as_str()) {
                Some(&existing) => {
                    if terminal != arena[existing].is_leaf {
                        return Err(TreeError::LeafConflict { path: current_path });
                    }
                    existing
                }
                None => {
                    let idx = arena.len();
                    arena.push(Prefix {
                        label: strip_index(segment),
                        path: current_path.clone(),
                        value: None,
                        is_leaf: terminal,
                        children: Vec::new(),
                    });
                    index.insert(current_path.clone(), idx);
                    match parent {
                        Some(p) => arena[p].children.push(idx),
                        None => roots.push(idx),
                    }
                    idx
                }
            };

            if terminal {
                match &arena[idx].value {
                    Some(existing) if existing != &record.value => {
                        return Err(TreeError::ValueConflict { path: current_path });
                    }
                    _ => arena[idx].value = Some(record.value.clone()),
                }
            }

            parent = Some(idx);
        }
    }

    Ok(roots.iter().map(|&r| materialize(r, &arena)).collect())
}

fn materialize(idx: usize, arena: &[Prefix]) -> TreeNode {
    let prefix = &arena[idx];
    TreeNode {
        key: prefix.path.clone(),
        label: prefix.label.clone(),
        path: prefix.path.clone(),
        value: prefix.value.clone(),
        children: prefix
            .children
            .iter()
            .map(|&child| materialize(child, arena))
            .collect(),
        is_leaf: prefix.is_leaf,
    }
}

/// Strip a trailing `[n]` array index from a segment.
fn strip_index(segment: &str) -> String {
    if let Some(open) = segment.rfind('[') {
        let inner = &segment[open + 1..];
        if let Some(stripped) = inner.strip_suffix(']') {
            if !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit()) {
                return segment[..open].to_string();
            }
        }
    }
    segment.to_string()
}

/// Drag payload for drop-into-text insertion: leaves expose their value.
pub fn drag_payload(node: &TreeNode) -> Option<&str> {
    if node.is_leaf {
        node.value.as_deref()
    } else {
        None
    }
}
