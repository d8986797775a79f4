//! # Content Cache
//!
//! Keyed persistence for frame content and dimensions. The cache is injected
//! into the stack manager, which makes the store mockable and the recovery
//! fallback order unit-testable; nothing in the core reaches for ambient
//! session state.
//!
//! Five entry kinds exist per frame, each independently readable and
//! writable: the three content representations, the measured height, and
//! the original user-set dimensions. Closing and reopening the same frame
//! recovers the latest saved state even when the in-memory context was
//! discarded.

use crate::content::{Representation, SerializedContent};
use crate::dimensions::FrameDimensions;
use std::collections::HashMap;
use thiserror::Error;

/// Kind of a persisted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Structured,
    Markup,
    RawCanvas,
    MeasuredHeight,
    OriginalDimensions,
}

impl EntryKind {
    pub const ALL: [EntryKind; 5] = [
        EntryKind::Structured,
        EntryKind::Markup,
        EntryKind::RawCanvas,
        EntryKind::MeasuredHeight,
        EntryKind::OriginalDimensions,
    ];

    /// The three content entry kinds, in recovery priority order.
    pub const CONTENT: [EntryKind; 3] =
        [EntryKind::Structured, EntryKind::Markup, EntryKind::RawCanvas];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Structured => "structured",
            EntryKind::Markup => "markup",
            EntryKind::RawCanvas => "raw-canvas",
            EntryKind::MeasuredHeight => "measured-height",
            EntryKind::OriginalDimensions => "original-dimensions",
        }
    }

    pub fn for_representation(kind: Representation) -> EntryKind {
        match kind {
            Representation::Structured => EntryKind::Structured,
            Representation::Markup => EntryKind::Markup,
            Representation::RawCanvas => EntryKind::RawCanvas,
        }
    }
}

/// Store key: frame identity plus entry kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub frame_id: String,
    pub kind: EntryKind,
}

impl StoreKey {
    pub fn new(frame_id: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            frame_id: frame_id.into(),
            kind,
        }
    }

    /// Flat string form for string-keyed backends.
    pub fn storage_key(&self) -> String {
        format!("frame::{}::{}", self.frame_id, self.kind.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend: {0}")]
    Backend(String),
}

/// Keyed string store the cache writes through. [`SessionStore`] keeps it
/// in memory for the browser session; hosts may back it with anything keyed.
pub trait ContentStore {
    fn read(&self, key: &StoreKey) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &StoreKey, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &StoreKey) -> Result<(), StoreError>;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: HashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentStore for SessionStore {
    fn read(&self, key: &StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(&key.storage_key()).cloned())
    }

    fn write(&mut self, key: &StoreKey, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.storage_key(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &StoreKey) -> Result<(), StoreError> {
        self.entries.remove(&key.storage_key());
        Ok(())
    }
}

/// Typed access to the keyed store.
pub struct ContentCache<S: ContentStore> {
    store: S,
}

impl<S: ContentStore> ContentCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Persist a capture under its frame identity.
    ///
    /// An entirely empty capture never overwrites previously saved content
    /// unless `explicit` marks a deliberate user action; the skipped write
    /// returns `Ok(false)`.
    pub fn save_content(
        &mut self,
        frame_id: &str,
        content: &SerializedContent,
        explicit: bool,
    ) -> Result<bool, StoreError> {
        if content.is_empty() {
            if explicit {
                for kind in EntryKind::CONTENT {
                    self.store.remove(&StoreKey::new(frame_id, kind))?;
                }
                return Ok(true);
            }
            if self.has_content(frame_id)? {
                tracing::warn!(frame_id, "refusing to overwrite saved content with an empty capture");
            }
            return Ok(false);
        }

        for representation in Representation::PRIORITY {
            let key = StoreKey::new(frame_id, EntryKind::for_representation(representation));
            match content.representation(representation) {
                Some(text) => self.store.write(&key, text)?,
                // Drop stale entries from earlier captures
                None => self.store.remove(&key)?,
            }
        }
        Ok(true)
    }

    /// Assemble previously saved content, in recovery priority order.
    pub fn load_content(&self, frame_id: &str) -> Result<Option<SerializedContent>, StoreError> {
        let mut content = SerializedContent::default();
        for representation in Representation::PRIORITY {
            let key = StoreKey::new(frame_id, EntryKind::for_representation(representation));
            if let Some(text) = self.store.read(&key)? {
                content.set_representation(representation, text);
            }
        }
        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content))
        }
    }

    pub fn has_content(&self, frame_id: &str) -> Result<bool, StoreError> {
        for kind in EntryKind::CONTENT {
            if self.store.read(&StoreKey::new(frame_id, kind))?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn save_height(&mut self, frame_id: &str, height: f64) -> Result<(), StoreError> {
        self.store.write(
            &StoreKey::new(frame_id, EntryKind::MeasuredHeight),
            &height.to_string(),
        )
    }

    pub fn load_height(&self, frame_id: &str) -> Result<Option<f64>, StoreError> {
        let value = self
            .store
            .read(&StoreKey::new(frame_id, EntryKind::MeasuredHeight))?;
        Ok(value.and_then(|v| v.parse::<f64>().ok()))
    }

    pub fn save_dimensions(
        &mut self,
        frame_id: &str,
        dimensions: &FrameDimensions,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(dimensions)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        self.store
            .write(&StoreKey::new(frame_id, EntryKind::OriginalDimensions), &json)
    }

    pub fn load_dimensions(&self, frame_id: &str) -> Result<Option<FrameDimensions>, StoreError> {
        let value = self
            .store
            .read(&StoreKey::new(frame_id, EntryKind::OriginalDimensions))?;
        Ok(value.and_then(|v| serde_json::from_str(&v).ok()))
    }

    /// Forget everything saved for a frame.
    pub fn clear_frame(&mut self, frame_id: &str) -> Result<(), StoreError> {
        for kind in EntryKind::ALL {
            self.store.remove(&StoreKey::new(frame_id, kind))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Representation;

    fn content_with(kind: Representation, text: &str) -> SerializedContent {
        let mut content = SerializedContent::default();
        content.set_representation(kind, text.to_string());
        content
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut cache = ContentCache::new(SessionStore::new());
        let content = content_with(Representation::Structured, "[{\"type\":\"text\"}]");

        assert!(cache.save_content("frame-1", &content, false).unwrap());
        let loaded = cache.load_content("frame-1").unwrap().unwrap();
        assert_eq!(loaded.structured.as_deref(), Some("[{\"type\":\"text\"}]"));
        assert_eq!(loaded.first_available(), Some(Representation::Structured));
    }

    #[test]
    fn test_empty_capture_never_clobbers_saved_content() {
        let mut cache = ContentCache::new(SessionStore::new());
        let content = content_with(Representation::Markup, "<div></div>");
        cache.save_content("frame-1", &content, false).unwrap();

        let written = cache
            .save_content("frame-1", &SerializedContent::default(), false)
            .unwrap();
        assert!(!written);
        assert!(cache.load_content("frame-1").unwrap().is_some());
    }

    #[test]
    fn test_explicit_empty_save_clears_content() {
        let mut cache = ContentCache::new(SessionStore::new());
        let content = content_with(Representation::Markup, "<div></div>");
        cache.save_content("frame-1", &content, false).unwrap();

        let written = cache
            .save_content("frame-1", &SerializedContent::default(), true)
            .unwrap();
        assert!(written);
        assert!(cache.load_content("frame-1").unwrap().is_none());
    }

    #[test]
    fn test_new_capture_drops_stale_representations() {
        let mut cache = ContentCache::new(SessionStore::new());
        cache
            .save_content("frame-1", &content_with(Representation::RawCanvas, "<p></p>"), false)
            .unwrap();
        cache
            .save_content(
                "frame-1",
                &content_with(Representation::Structured, "[{\"type\":\"text\"}]"),
                false,
            )
            .unwrap();

        let loaded = cache.load_content("frame-1").unwrap().unwrap();
        assert!(loaded.structured.is_some());
        assert!(loaded.raw_canvas.is_none());
    }

    #[test]
    fn test_height_and_dimensions_entries_are_independent() {
        let mut cache = ContentCache::new(SessionStore::new());
        cache.save_height("frame-1", 240.0).unwrap();

        assert_eq!(cache.load_height("frame-1").unwrap(), Some(240.0));
        assert!(cache.load_dimensions("frame-1").unwrap().is_none());
        assert!(cache.load_content("frame-1").unwrap().is_none());
    }

    #[test]
    fn test_clear_frame_removes_all_entries() {
        let mut cache = ContentCache::new(SessionStore::new());
        cache.save_height("frame-1", 240.0).unwrap();
        cache
            .save_content("frame-1", &content_with(Representation::Markup, "<p></p>"), false)
            .unwrap();

        cache.clear_frame("frame-1").unwrap();
        assert!(cache.store().is_empty());
    }
}
