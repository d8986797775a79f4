//! Error types for the editor core.
//!
//! Hard errors ([`EditorError`]) abort a transition before it mutates
//! anything. Everything that can go wrong *during* a transition degrades
//! into an [`EditorWarning`] on the [`TransitionReport`] instead: the stack
//! transition always completes its bookkeeping, favoring forward progress
//! over stranding the UI.

use crate::cache::StoreError;
use framecraft_engine::EngineError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node {0} is not a frame")]
    NotAFrame(String),

    #[error("already at the root context")]
    AtRoot,

    #[error("invalid ancestor index {target}; active context is {active}")]
    InvalidAncestor { target: usize, active: usize },

    #[error("a stack transition is already in flight")]
    TransitionInFlight,

    #[error("context stack corrupted: {0}")]
    Corrupted(&'static str),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),
}

/// Non-fatal problem surfaced to the user after a completed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorWarning {
    /// The frame could not be located in the parent tree on return. The
    /// parent was left untouched; the nested edit is lost.
    ReconciliationFailed { frame_id: String },

    /// Every content representation was empty; a placeholder node was
    /// installed so the frame does not collapse to zero height.
    PlaceholderInstalled { frame_id: Option<String> },

    /// A store read or write failed; the operation continued without it.
    PersistenceFailed { frame_id: String, detail: String },
}

impl fmt::Display for EditorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorWarning::ReconciliationFailed { frame_id } => {
                write!(f, "frame {} was not found in its parent; changes were discarded", frame_id)
            }
            EditorWarning::PlaceholderInstalled { frame_id: Some(frame_id) } => {
                write!(f, "no content could be recovered for frame {}; a placeholder was inserted", frame_id)
            }
            EditorWarning::PlaceholderInstalled { frame_id: None } => {
                write!(f, "no content could be recovered; a placeholder was inserted")
            }
            EditorWarning::PersistenceFailed { frame_id, detail } => {
                write!(f, "saving frame {} failed: {}", frame_id, detail)
            }
        }
    }
}

/// Outcome of a completed stack transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionReport {
    /// The context that is active after the transition.
    pub context_id: String,
    pub warnings: Vec<EditorWarning>,
}

impl TransitionReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
