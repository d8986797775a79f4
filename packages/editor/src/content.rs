//! Serialized context content.
//!
//! A capture holds up to three representations of the same content, in
//! decreasing order of fidelity. Restore picks the best one that still
//! produces live nodes; persistence stores each representation under its own
//! key so a later session can run the same fallback order.

/// Content representation, in recovery-chain priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Structured JSON component tree (full fidelity).
    Structured,
    /// Flattened markup export.
    Markup,
    /// Markup read directly off the live rendered document.
    RawCanvas,
}

impl Representation {
    /// Capture and restore priority order.
    pub const PRIORITY: [Representation; 3] = [
        Representation::Structured,
        Representation::Markup,
        Representation::RawCanvas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Structured => "structured",
            Representation::Markup => "markup",
            Representation::RawCanvas => "raw-canvas",
        }
    }
}

/// Prioritized capture of a context's content plus its stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializedContent {
    pub structured: Option<String>,
    pub markup: Option<String>,
    pub raw_canvas: Option<String>,
    pub css: String,
    /// Top-level nodes seen at capture time, recorded for diagnostics.
    pub node_count: usize,
}

impl SerializedContent {
    /// The given representation, if present and non-blank.
    pub fn representation(&self, kind: Representation) -> Option<&str> {
        let text = match kind {
            Representation::Structured => self.structured.as_deref(),
            Representation::Markup => self.markup.as_deref(),
            Representation::RawCanvas => self.raw_canvas.as_deref(),
        };
        text.filter(|t| !t.trim().is_empty())
    }

    pub fn set_representation(&mut self, kind: Representation, text: String) {
        match kind {
            Representation::Structured => self.structured = Some(text),
            Representation::Markup => self.markup = Some(text),
            Representation::RawCanvas => self.raw_canvas = Some(text),
        }
    }

    /// True when no representation carries content.
    pub fn is_empty(&self) -> bool {
        Representation::PRIORITY
            .iter()
            .all(|&kind| self.representation(kind).is_none())
    }

    /// Highest-priority representation present in this capture.
    pub fn first_available(&self) -> Option<Representation> {
        Representation::PRIORITY
            .into_iter()
            .find(|&kind| self.representation(kind).is_some())
    }
}
