//! # Editing Context
//!
//! One live editing session: an exclusively owned engine instance plus the
//! bookkeeping that ties it to the frame it edits. The root context has no
//! binding; nested contexts carry the frame identity, the dimension tracker
//! and the auto-save timer, all of which die with the context.

use crate::autosave::AutoSaveTimer;
use crate::dimensions::{DimensionTracker, FrameDimensions};
use framecraft_engine::Engine;

/// Frame-side bookkeeping of a nested context.
#[derive(Debug)]
pub(crate) struct FrameBinding {
    /// Identity of the frame node in the parent context.
    pub frame_id: String,
    pub tracker: DimensionTracker,
    pub autosave: AutoSaveTimer,
}

/// One open editing session, root or nested.
pub struct EditingContext<E: Engine> {
    pub id: String,
    /// Exclusively owned engine bound to this context's canvas. Disposed
    /// with the context.
    pub engine: E,
    pub(crate) binding: Option<FrameBinding>,
}

impl<E: Engine> EditingContext<E> {
    pub(crate) fn root(id: String, engine: E) -> Self {
        Self {
            id,
            engine,
            binding: None,
        }
    }

    pub(crate) fn nested(id: String, engine: E, binding: FrameBinding) -> Self {
        Self {
            id,
            engine,
            binding: Some(binding),
        }
    }

    pub fn is_root(&self) -> bool {
        self.binding.is_none()
    }

    /// Identity of the frame in the parent context this content came from.
    pub fn parent_frame_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.frame_id.as_str())
    }

    /// Last known dimensions of the bound frame; `None` at root.
    pub fn dimensions(&self) -> Option<&FrameDimensions> {
        self.binding.as_ref().map(|b| b.tracker.dimensions())
    }
}
