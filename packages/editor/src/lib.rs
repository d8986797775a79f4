//! # Framecraft Editor
//!
//! Nested-editing core of the Framecraft page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host UI: canvas, palette, breadcrumb bar    │
//! └─────────────────────────────────────────────┘
//!                     ↓ events / ticks
//! ┌─────────────────────────────────────────────┐
//! │ editor: ContextStackManager                 │
//! │  - DrillIn / ReturnToParent / JumpToAncestor│
//! │  - serializer: capture/restore chain        │
//! │  - dimensions: growth-only height tracking  │
//! │  - cache: keyed content persistence         │
//! │  - frame: pointer interception contract     │
//! └─────────────────────────────────────────────┘
//!                     ↓ Engine trait
//! ┌─────────────────────────────────────────────┐
//! │ engine: component tree + markup + geometry  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **Identity over position**: a frame is found again by its stable
//!    `data-frame-id`, never by index, so reconciliation survives moves.
//! 2. **Degrade, don't lose**: content moves between structured, markup and
//!    raw representations; the chain falls through until something survives
//!    and installs a placeholder as the last resort.
//! 3. **Growth-only height**: automatic measurement may only grow a frame;
//!    only an explicit resize gesture may shrink it.
//! 4. **Bookkeeping always completes**: no failure leaves the stack with a
//!    bad index, a dangling timer or a half-popped context.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use framecraft_editor::{ContentCache, ContextStackManager, EditorOptions, SessionStore};
//! use framecraft_engine::HeadlessEngine;
//!
//! let mut manager = ContextStackManager::new(
//!     root_engine,
//!     ContentCache::new(SessionStore::new()),
//!     Box::new(|| HeadlessEngine::new("nested")),
//!     EditorOptions::default(),
//! );
//!
//! // double-click on a frame
//! let report = manager.drill_in(&frame_node_id, Instant::now())?;
//!
//! // edit inside the nested context, then merge back
//! let report = manager.return_to_parent()?;
//! for warning in &report.warnings {
//!     eprintln!("{warning}");
//! }
//! ```

mod autosave;
mod cache;
mod content;
mod context;
mod dimensions;
mod errors;
mod frame;
mod options;
mod serializer;
mod stack;

pub use autosave::AutoSaveTimer;
pub use cache::{ContentCache, ContentStore, EntryKind, SessionStore, StoreError, StoreKey};
pub use content::{Representation, SerializedContent};
pub use context::EditingContext;
pub use dimensions::{reconcile, Debouncer, DimensionTracker, FrameDimensions};
pub use errors::{EditorError, EditorWarning, TransitionReport};
pub use frame::{
    container_defaults, frame_defaults, image_defaults, intercept_pointer, text_defaults,
    PointerDisposition, PointerKind,
};
pub use options::{EditorOptions, SettlePolicy};
pub use serializer::{capture, capture_node, restore, restore_into, RestoreOutcome, RestoreReport};
pub use stack::{Breadcrumb, ContextStackManager, EngineFactory, SavedPage};

// Re-export the engine surface the manager is generic over
pub use framecraft_engine::{Engine, HeadlessEngine, Node};
