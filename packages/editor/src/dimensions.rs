//! # Dimension Tracker
//!
//! Tracks a frame's box while its content is edited in a nested context.
//!
//! Height is monotonically non-decreasing under automatic measurement:
//! content measurement can run mid-keystroke and come back transiently
//! small, and letting it shrink the frame truncates content the user is
//! still filling in. A manual resize gesture is an explicit, trusted action
//! and bypasses the growth-only guard; width changes always apply.
//!
//! Measurement is debounced: bursts of change events coalesce into a single
//! measurement after a quiet period. Accepted changes are persisted
//! immediately by the caller, separately from the auto-save interval.

use framecraft_common::units::parse_px;
use framecraft_engine::{Engine, Node};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A frame's rendering box and height policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub padding: Option<f64>,
    #[serde(default)]
    pub auto_height: bool,
}

impl FrameDimensions {
    /// Read dimensions off a node's style map and auto-height attribute.
    pub fn from_node(node: &Node) -> Self {
        let px = |prop: &str| node.style.get(prop).and_then(|v| parse_px(v));
        Self {
            width: px("width"),
            height: px("height"),
            padding: px("padding"),
            auto_height: node.auto_height(),
        }
    }
}

/// Growth-only reconciliation of a measured height against the stored one.
///
/// The measured value wins only when it is larger, or when the change is
/// attributable to an active manual-resize gesture.
pub fn reconcile(previous: f64, measured: f64, manual_resize: bool) -> f64 {
    if manual_resize || measured > previous {
        measured
    } else {
        previous
    }
}

/// Coalesces bursts of change events into one firing after a quiet period.
///
/// Marking is decoupled from time so an engine subscription can bump the
/// shared counter from inside a change callback; the owner polls with the
/// host's clock.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    marks: Rc<Cell<u64>>,
    seen: u64,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            marks: Rc::new(Cell::new(0)),
            seen: 0,
            deadline: None,
        }
    }

    /// Shared counter for subscriber closures; each bump restarts the quiet
    /// period at the next poll.
    pub fn mark_handle(&self) -> Rc<Cell<u64>> {
        self.marks.clone()
    }

    /// True when the quiet period has elapsed since the last burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        let marks = self.marks.get();
        if marks != self.seen {
            self.seen = marks;
            self.deadline = Some(now + self.quiet);
            return false;
        }
        if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.deadline = None;
                return true;
            }
        }
        false
    }

    pub fn is_idle(&self) -> bool {
        self.deadline.is_none() && self.marks.get() == self.seen
    }
}

/// Per-context tracker for the bound frame's dimensions.
#[derive(Debug)]
pub struct DimensionTracker {
    frame_id: String,
    current: FrameDimensions,
    debouncer: Debouncer,
    manual_resize_active: bool,
}

impl DimensionTracker {
    pub fn new(frame_id: impl Into<String>, dimensions: FrameDimensions, quiet: Duration) -> Self {
        Self {
            frame_id: frame_id.into(),
            current: dimensions,
            debouncer: Debouncer::new(quiet),
            manual_resize_active: false,
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn dimensions(&self) -> &FrameDimensions {
        &self.current
    }

    pub fn mark_handle(&self) -> Rc<Cell<u64>> {
        self.debouncer.mark_handle()
    }

    /// Active-resize indicator from the UI. While set, measured changes are
    /// attributed to the gesture and may shrink the frame.
    pub fn set_manual_resize_active(&mut self, active: bool) {
        self.manual_resize_active = active;
    }

    pub fn manual_resize_active(&self) -> bool {
        self.manual_resize_active
    }

    /// Apply an explicit resize. Both axes apply unconditionally.
    pub fn apply_manual_resize(&mut self, width: f64, height: f64) -> &FrameDimensions {
        self.current.width = Some(width);
        self.current.height = Some(height);
        &self.current
    }

    /// Content height of the rendered document, padding included.
    pub fn measure<E: Engine>(engine: &E) -> f64 {
        engine.content_bounds().height
    }

    /// Debounced re-measure. Returns the newly accepted height when it
    /// changed; the caller persists it immediately.
    pub fn pump<E: Engine>(&mut self, engine: &E, now: Instant) -> Option<f64> {
        if !self.debouncer.poll(now) {
            return None;
        }
        let measured = Self::measure(engine);
        let previous = self.current.height.unwrap_or(0.0);
        let accepted = reconcile(previous, measured, self.manual_resize_active);
        if accepted == previous && self.current.height.is_some() {
            return None;
        }
        tracing::debug!(
            frame_id = %self.frame_id,
            previous,
            measured,
            accepted,
            "accepted height change"
        );
        self.current.height = Some(accepted);
        Some(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecraft_engine::{HeadlessEngine, Node};

    #[test]
    fn test_reconcile_is_growth_only() {
        assert_eq!(reconcile(200.0, 250.0, false), 250.0);
        assert_eq!(reconcile(200.0, 120.0, false), 200.0);
        assert_eq!(reconcile(200.0, 200.0, false), 200.0);
    }

    #[test]
    fn test_manual_resize_bypasses_guard() {
        assert_eq!(reconcile(200.0, 120.0, true), 120.0);
    }

    #[test]
    fn test_monotonic_across_repeated_measurements() {
        let mut height = 100.0;
        for measured in [140.0, 90.0, 200.0, 10.0, 200.0, 199.0] {
            let next = reconcile(height, measured, false);
            assert!(next >= height);
            height = next;
        }
        assert_eq!(height, 200.0);
    }

    #[test]
    fn test_debouncer_coalesces_bursts() {
        let start = Instant::now();
        let quiet = Duration::from_millis(300);
        let mut debouncer = Debouncer::new(quiet);
        let handle = debouncer.mark_handle();

        // burst of three edits
        handle.set(handle.get() + 1);
        assert!(!debouncer.poll(start));
        handle.set(handle.get() + 1);
        handle.set(handle.get() + 1);
        // still inside the quiet period, and the burst restarted it
        assert!(!debouncer.poll(start + Duration::from_millis(200)));
        assert!(!debouncer.poll(start + Duration::from_millis(400)));
        // quiet period after the last mark elapsed: fire once
        assert!(debouncer.poll(start + Duration::from_millis(600)));
        assert!(!debouncer.poll(start + Duration::from_millis(700)));
    }

    #[test]
    fn test_pump_never_shrinks_without_gesture() {
        let engine = HeadlessEngine::new("test")
            .with_components(vec![Node::text("a").with_style("height", "80px")]);
        let start = Instant::now();

        let mut tracker = DimensionTracker::new(
            "frame-1",
            FrameDimensions {
                height: Some(300.0),
                ..Default::default()
            },
            Duration::ZERO,
        );
        let handle = tracker.mark_handle();
        handle.set(1);

        assert_eq!(tracker.pump(&engine, start), None);
        // measured 80 < stored 300: rejected
        assert_eq!(tracker.pump(&engine, start), None);
        assert_eq!(tracker.dimensions().height, Some(300.0));
    }

    #[test]
    fn test_pump_accepts_growth() {
        let engine = HeadlessEngine::new("test")
            .with_components(vec![Node::text("a").with_style("height", "500px")]);
        let start = Instant::now();

        let mut tracker = DimensionTracker::new(
            "frame-1",
            FrameDimensions {
                height: Some(300.0),
                ..Default::default()
            },
            Duration::ZERO,
        );
        tracker.mark_handle().set(1);

        tracker.pump(&engine, start);
        assert_eq!(tracker.pump(&engine, start), Some(500.0));
        assert_eq!(tracker.dimensions().height, Some(500.0));
    }

    #[test]
    fn test_from_node_reads_style_and_flag() {
        let node = Node::new("frame")
            .with_style("width", "400px")
            .with_style("padding", "10px")
            .with_attr("data-auto-height", "true");

        let dims = FrameDimensions::from_node(&node);
        assert_eq!(dims.width, Some(400.0));
        assert_eq!(dims.height, None);
        assert_eq!(dims.padding, Some(10.0));
        assert!(dims.auto_height);
    }
}
