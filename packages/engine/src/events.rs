//! Structural and content change events emitted by an engine.
//!
//! Subscribers are plain callbacks invoked synchronously from the mutating
//! call, on the same thread. The dimension tracker uses these to debounce
//! auto-height measurement.

/// A change to an engine's component tree or stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A node was added at or under the document root.
    NodeAdded { id: String },
    /// A node (and its subtree) was removed.
    NodeRemoved { id: String },
    /// A node's inline content or children were replaced.
    ContentChanged { id: String },
    /// A node's attribute map changed.
    AttributeChanged { id: String },
    /// A node's style map changed.
    StyleChanged { id: String },
    /// The document stylesheet text changed.
    CssChanged,
}

/// Change-event callback registered with [`crate::Engine::subscribe`].
pub type Subscriber = Box<dyn FnMut(&ChangeEvent)>;

/// Handle returned by `subscribe`, accepted by `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
