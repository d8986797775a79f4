//! # Context Stack Manager
//!
//! Owns the ordered list of open editing contexts, root-first, and drives
//! every transition between them.
//!
//! ## State machine
//!
//! ```text
//! DrillIn(node)        push a nested context seeded from the frame's
//!                      content; persisted state wins over fresh extraction
//! ReturnToParent       capture the child, find the frame in the parent by
//!                      stable identity, replace its children, re-apply the
//!                      frame's own style/attributes, pop
//! JumpToAncestor(i)    ReturnToParent repeated; each level reconciles
//!                      fully before the next
//! ```
//!
//! Invariants: the stack is never empty (root always present); `active` is
//! always in bounds; only contexts below `active` are ancestors. Every
//! transition completes its bookkeeping (index update, timer teardown,
//! breadcrumb change) even when reconciliation itself degrades to a
//! warning — forward progress beats stranding the UI, at the documented
//! cost that an un-reconciled edit is lost.

use crate::autosave::AutoSaveTimer;
use crate::cache::{ContentCache, ContentStore, StoreError};
use crate::context::{EditingContext, FrameBinding};
use crate::dimensions::{reconcile, DimensionTracker, FrameDimensions};
use crate::errors::{EditorError, EditorWarning, TransitionReport};
use crate::options::EditorOptions;
use crate::serializer;
use framecraft_common::units::{format_px, parse_px};
use framecraft_engine::{find_by_frame_id, Engine, IdGenerator, AUTO_HEIGHT_ATTR, FRAME_ID_ATTR};
use std::time::Instant;

/// Produces a fresh engine instance for each nested context.
pub type EngineFactory<E> = Box<dyn FnMut() -> E>;

/// One entry of the breadcrumb trail, root-first up to the active context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub context_id: String,
    /// Frame the context edits; `None` for the root document.
    pub frame_id: Option<String>,
}

/// Result of an explicit save of the active context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    pub html: String,
    pub css: String,
}

pub struct ContextStackManager<E: Engine, S: ContentStore> {
    contexts: Vec<EditingContext<E>>,
    active: usize,
    cache: ContentCache<S>,
    engine_factory: EngineFactory<E>,
    ids: IdGenerator,
    options: EditorOptions,
    in_flight: bool,
}

impl<E: Engine, S: ContentStore> ContextStackManager<E, S> {
    pub fn new(
        root_engine: E,
        cache: ContentCache<S>,
        engine_factory: EngineFactory<E>,
        options: EditorOptions,
    ) -> Self {
        let mut ids = IdGenerator::new("editor");
        let root = EditingContext::root(format!("ctx-{}", ids.new_id()), root_engine);
        Self {
            contexts: vec![root],
            active: 0,
            cache,
            engine_factory,
            ids,
            options,
            in_flight: false,
        }
    }

    /// Number of open contexts, the root included.
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_context(&self) -> &EditingContext<E> {
        &self.contexts[self.active]
    }

    pub fn active_context_mut(&mut self) -> &mut EditingContext<E> {
        &mut self.contexts[self.active]
    }

    pub fn context_at(&self, index: usize) -> Option<&EditingContext<E>> {
        self.contexts.get(index)
    }

    /// Suspended contexts keep their engine resident; hosts occasionally
    /// need direct access (tests, inspectors).
    pub fn context_at_mut(&mut self, index: usize) -> Option<&mut EditingContext<E>> {
        self.contexts.get_mut(index)
    }

    pub fn cache(&self) -> &ContentCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ContentCache<S> {
        &mut self.cache
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Trail from the root to the active context.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.contexts[..=self.active]
            .iter()
            .map(|context| Breadcrumb {
                context_id: context.id.clone(),
                frame_id: context.parent_frame_id().map(str::to_string),
            })
            .collect()
    }

    /// Open a nested editing context for the frame node `node_id` in the
    /// active context.
    pub fn drill_in(&mut self, node_id: &str, now: Instant) -> Result<TransitionReport, EditorError> {
        self.begin_transition()?;
        let result = self.drill_in_inner(node_id, now);
        self.in_flight = false;
        result
    }

    fn drill_in_inner(
        &mut self,
        node_id: &str,
        now: Instant,
    ) -> Result<TransitionReport, EditorError> {
        let mut warnings = Vec::new();

        // Resolve the frame identity, assigning one at first edit. The
        // identity lives in the node's attributes and survives round-trips.
        let existing = {
            let engine = &self.contexts[self.active].engine;
            let node = engine
                .node(node_id)
                .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
            if !node.is_frame() {
                return Err(EditorError::NotAFrame(node_id.to_string()));
            }
            node.frame_id().map(str::to_string)
        };
        let frame_id = match existing {
            Some(frame_id) => frame_id,
            None => {
                let frame_id = format!("frame-{}", self.ids.new_id());
                self.contexts[self.active]
                    .engine
                    .set_attribute(node_id, FRAME_ID_ATTR, &frame_id)?;
                frame_id
            }
        };

        // Fresh extraction: style first, measured bounds as fallback.
        let (fresh_dims, fresh_content) = {
            let engine = &self.contexts[self.active].engine;
            let node = engine
                .node(node_id)
                .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
            let mut dims = FrameDimensions::from_node(node);
            if dims.width.is_none() || dims.height.is_none() {
                if let Some(bounds) = engine.rendered_bounds(node_id) {
                    if dims.width.is_none() {
                        dims.width = Some(bounds.width);
                    }
                    if dims.height.is_none() {
                        dims.height = Some(bounds.height);
                    }
                }
            }
            (dims, serializer::capture_node(engine, node_id)?)
        };

        // Persisted state is authoritative once it exists: it may carry
        // edits from an earlier session on this same frame.
        let persisted_dims = match self.cache.load_dimensions(&frame_id) {
            Ok(dims) => dims,
            Err(error) => {
                push_persist_warning(&mut warnings, &frame_id, &error);
                None
            }
        };
        let mut dims = match persisted_dims {
            Some(dims) => dims,
            None => {
                if let Err(error) = self.cache.save_dimensions(&frame_id, &fresh_dims) {
                    push_persist_warning(&mut warnings, &frame_id, &error);
                }
                fresh_dims
            }
        };
        // The measured-height entry is updated on every accepted growth and
        // may be newer than the stored dimensions; merge growth-only.
        match self.cache.load_height(&frame_id) {
            Ok(Some(measured)) => {
                dims.height = Some(dims.height.map_or(measured, |h| h.max(measured)));
            }
            Ok(None) => {}
            Err(error) => push_persist_warning(&mut warnings, &frame_id, &error),
        }

        let persisted_content = match self.cache.load_content(&frame_id) {
            Ok(content) => content,
            Err(error) => {
                push_persist_warning(&mut warnings, &frame_id, &error);
                None
            }
        };
        let content = match persisted_content {
            Some(mut persisted) => {
                // the stylesheet is not part of the keyed entries; keep the
                // freshly extracted one
                persisted.css = fresh_content.css.clone();
                persisted.node_count = fresh_content.node_count;
                persisted
            }
            None => {
                if let Err(error) = self.cache.save_content(&frame_id, &fresh_content, false) {
                    push_persist_warning(&mut warnings, &frame_id, &error);
                }
                fresh_content
            }
        };

        // Fresh engine seeded with the resolved content and constrained to
        // the resolved dimensions (the tracker carries them).
        let mut engine = (self.engine_factory)();
        engine.set_css(content.css.clone());
        if !content.is_empty() {
            let report = serializer::restore(
                &mut engine,
                &content,
                &self.options.settle,
                &self.options.placeholder_text,
            );
            if report.used_placeholder() {
                warnings.push(EditorWarning::PlaceholderInstalled {
                    frame_id: Some(frame_id.clone()),
                });
            }
        }

        let tracker = DimensionTracker::new(frame_id.clone(), dims, self.options.measure_quiet());
        let marks = tracker.mark_handle();
        engine.subscribe(Box::new(move |_event| marks.set(marks.get() + 1)));

        let context = EditingContext::nested(
            format!("ctx-{}", self.ids.new_id()),
            engine,
            FrameBinding {
                frame_id,
                tracker,
                autosave: AutoSaveTimer::new(self.options.autosave_interval(), now),
            },
        );
        let context_id = context.id.clone();
        self.contexts.push(context);
        self.active += 1;

        Ok(TransitionReport {
            context_id,
            warnings,
        })
    }

    /// Merge the active context back into its parent and pop it.
    pub fn return_to_parent(&mut self) -> Result<TransitionReport, EditorError> {
        self.begin_transition()?;
        let result = self.return_inner();
        self.in_flight = false;
        result
    }

    fn return_inner(&mut self) -> Result<TransitionReport, EditorError> {
        if self.active == 0 {
            return Err(EditorError::AtRoot);
        }
        let mut warnings = Vec::new();

        // Capture the child before anything can disturb it.
        let (captured, frame_id, child_dims) = {
            let context = &self.contexts[self.active];
            let Some(binding) = context.binding.as_ref() else {
                return Err(EditorError::Corrupted("non-root context without frame binding"));
            };
            (
                serializer::capture(&context.engine),
                binding.frame_id.clone(),
                binding.tracker.dimensions().clone(),
            )
        };

        if let Err(error) = self.cache.save_content(&frame_id, &captured, false) {
            push_persist_warning(&mut warnings, &frame_id, &error);
        }

        // Reconcile into the parent. Everything in here degrades to a
        // warning: the transition still completes below.
        let parent_index = self.active - 1;
        let parent = &mut self.contexts[parent_index].engine;
        let found = find_by_frame_id(parent.components(), &frame_id)
            .map(|node| (node.id.clone(), node.style.clone(), node.attributes.clone()));
        match found {
            None => {
                tracing::warn!(%frame_id, "frame missing from parent tree; parent left untouched");
                warnings.push(EditorWarning::ReconciliationFailed {
                    frame_id: frame_id.clone(),
                });
            }
            Some((frame_node_id, mut style_snapshot, attr_snapshot)) => {
                match serializer::restore_into(
                    parent,
                    &frame_node_id,
                    &captured,
                    &self.options.settle,
                    &self.options.placeholder_text,
                ) {
                    Ok(report) if report.used_placeholder() => {
                        warnings.push(EditorWarning::PlaceholderInstalled {
                            frame_id: Some(frame_id.clone()),
                        });
                    }
                    Ok(_) => {}
                    Err(error) => {
                        tracing::warn!(%error, %frame_id, "restore into parent failed");
                        warnings.push(EditorWarning::ReconciliationFailed {
                            frame_id: frame_id.clone(),
                        });
                    }
                }

                // Growth-only height lands in the snapshot so a single style
                // write re-applies identity, box sizing and accepted height.
                let auto_height = child_dims.auto_height
                    || attr_snapshot
                        .get(AUTO_HEIGHT_ATTR)
                        .map(|v| v == "true")
                        .unwrap_or(false);
                if auto_height {
                    if let Some(measured) = child_dims.height {
                        let previous = style_snapshot
                            .get("height")
                            .and_then(|v| parse_px(v))
                            .unwrap_or(0.0);
                        let accepted = reconcile(previous, measured, false);
                        if accepted != previous {
                            style_snapshot.insert("height".to_string(), format_px(accepted));
                        }
                    }
                }

                // Re-apply the frame's original style and attributes over
                // whatever restore altered; identity must survive.
                if let Err(error) = parent.set_node_style(&frame_node_id, style_snapshot) {
                    tracing::warn!(%error, %frame_id, "failed to re-apply frame style");
                    warnings.push(EditorWarning::ReconciliationFailed {
                        frame_id: frame_id.clone(),
                    });
                }
                if let Err(error) = parent.set_node_attributes(&frame_node_id, attr_snapshot) {
                    tracing::warn!(%error, %frame_id, "failed to re-apply frame attributes");
                    warnings.push(EditorWarning::ReconciliationFailed {
                        frame_id: frame_id.clone(),
                    });
                }
            }
        }

        // Bookkeeping always completes: the popped context takes its engine
        // and auto-save timer with it.
        self.contexts.pop();
        self.active -= 1;

        Ok(TransitionReport {
            context_id: self.contexts[self.active].id.clone(),
            warnings,
        })
    }

    /// Return through every level down to `target`. Each intermediate pop
    /// reconciles fully before the next begins; the jump is deliberately not
    /// atomic across levels.
    pub fn jump_to_ancestor(
        &mut self,
        target: usize,
    ) -> Result<Vec<TransitionReport>, EditorError> {
        if target >= self.active {
            return Err(EditorError::InvalidAncestor {
                target,
                active: self.active,
            });
        }
        let mut reports = Vec::new();
        while self.active > target {
            reports.push(self.return_to_parent()?);
        }
        Ok(reports)
    }

    /// Explicit save of the active context. For a nested context this is a
    /// deliberate user action, so even an emptied frame overwrites its
    /// persisted content.
    pub fn save_active(&mut self) -> Result<SavedPage, EditorError> {
        let frame_id = self.contexts[self.active]
            .parent_frame_id()
            .map(str::to_string);
        let content = serializer::capture(&self.contexts[self.active].engine);
        if let Some(frame_id) = &frame_id {
            self.cache.save_content(frame_id, &content, true)?;
        }

        let engine = &self.contexts[self.active].engine;
        Ok(SavedPage {
            html: engine.document_markup()?,
            css: engine.css().to_string(),
        })
    }

    /// Cooperative tick from the host event loop. Runs every open context's
    /// auto-save timer and the active context's debounced measurement.
    pub fn pump(&mut self, now: Instant) {
        let active = self.active;
        let Self {
            contexts, cache, ..
        } = self;

        for (index, context) in contexts.iter_mut().enumerate() {
            let EditingContext {
                engine, binding, ..
            } = context;
            let Some(binding) = binding.as_mut() else {
                continue;
            };

            if binding.autosave.due(now) {
                let captured = serializer::capture(engine);
                if let Err(error) = cache.save_content(&binding.frame_id, &captured, false) {
                    tracing::warn!(%error, frame_id = %binding.frame_id, "auto-save failed");
                }
            }

            // Only the active context receives input, so only it re-measures.
            if index == active {
                if let Some(height) = binding.tracker.pump(engine, now) {
                    if let Err(error) = cache.save_height(&binding.frame_id, height) {
                        tracing::warn!(%error, frame_id = %binding.frame_id, "height persist failed");
                    }
                }
            }
        }
    }

    /// Toggle the active-resize indicator for the active context's frame.
    pub fn set_manual_resize_active(&mut self, active: bool) -> Result<(), EditorError> {
        match self.contexts[self.active].binding.as_mut() {
            Some(binding) => {
                binding.tracker.set_manual_resize_active(active);
                Ok(())
            }
            None => Err(EditorError::AtRoot),
        }
    }

    /// Apply an explicit resize gesture to the active context's frame. Both
    /// axes apply unconditionally and persist immediately.
    pub fn apply_manual_resize(&mut self, width: f64, height: f64) -> Result<(), EditorError> {
        let active = self.active;
        let Self {
            contexts, cache, ..
        } = self;
        let Some(binding) = contexts[active].binding.as_mut() else {
            return Err(EditorError::AtRoot);
        };

        let dims = binding.tracker.apply_manual_resize(width, height).clone();
        if let Err(error) = cache.save_dimensions(&binding.frame_id, &dims) {
            tracing::warn!(%error, frame_id = %binding.frame_id, "dimension persist failed");
        }
        if let Err(error) = cache.save_height(&binding.frame_id, height) {
            tracing::warn!(%error, frame_id = %binding.frame_id, "height persist failed");
        }
        Ok(())
    }

    fn begin_transition(&mut self) -> Result<(), EditorError> {
        if self.in_flight {
            return Err(EditorError::TransitionInFlight);
        }
        self.in_flight = true;
        Ok(())
    }
}

fn push_persist_warning(warnings: &mut Vec<EditorWarning>, frame_id: &str, error: &StoreError) {
    tracing::warn!(%error, frame_id, "persistence failed");
    warnings.push(EditorWarning::PersistenceFailed {
        frame_id: frame_id.to_string(),
        detail: error.to_string(),
    });
}
