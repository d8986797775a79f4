//! # Framecraft Engine
//!
//! Component-tree engine layer for the Framecraft page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor: context stack + content recovery    │
//! └─────────────────────────────────────────────┘
//!                     ↓ consumes
//! ┌─────────────────────────────────────────────┐
//! │ engine: canvas contract                     │
//! │  - Node: the component-tree model           │
//! │  - Engine: trait every canvas implements    │
//! │  - HeadlessEngine: in-memory reference      │
//! │  - markup: node tree ⇄ markup codec         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The editor core never talks to a concrete canvas. It drives the [`Engine`]
//! trait, which captures exactly what the nested-editing machinery needs from
//! an editing surface: the root component list, stylesheet text, markup
//! conversion, per-node attribute/style access, rendered geometry, change
//! events, and named commands. [`HeadlessEngine`] is a complete in-memory
//! implementation used by tests and by any host that wants to run the core
//! without a browser canvas.

mod engine;
mod events;
mod headless;
mod ids;
pub mod markup;
mod node;

pub use engine::{Engine, EngineError};
pub use events::{ChangeEvent, Subscriber, SubscriptionId};
pub use headless::{Faults, HeadlessEngine};
pub use ids::{canvas_seed, IdGenerator};
pub use node::{
    count_nodes, find_by_frame_id, find_node, find_node_mut, path_to, Node, AUTO_HEIGHT_ATTR,
    FRAME_ID_ATTR, FRAME_TAG,
};

// Re-export geometry for downstream convenience
pub use framecraft_common::geometry::Rect;
