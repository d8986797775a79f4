//! Editor configuration.
//!
//! Loadable from JSON in the host's config file; every field has a default
//! so an empty object is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    /// Period of the per-context auto-save timer, in milliseconds.
    #[serde(default = "default_autosave_ms")]
    pub autosave_interval_ms: u64,

    /// Quiet period the dimension tracker waits after the last content
    /// change before re-measuring, in milliseconds.
    #[serde(default = "default_quiet_ms")]
    pub measure_quiet_ms: u64,

    #[serde(default)]
    pub settle: SettlePolicy,

    /// Content of the placeholder node installed when every representation
    /// of a frame's content comes back empty.
    #[serde(default = "default_placeholder_text")]
    pub placeholder_text: String,
}

/// Bounded retry policy for waiting on the rendering surface.
///
/// There is no true render-complete signal; the recovery chain polls the
/// surface up to `max_attempts` times. `initial_delay_ms` is the pacing hint
/// a real canvas adapter applies between polls (doubling per attempt); the
/// headless engine settles in poll steps and ignores it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlePolicy {
    #[serde(default = "default_settle_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_settle_delay_ms")]
    pub initial_delay_ms: u64,
}

fn default_autosave_ms() -> u64 {
    5000
}

fn default_quiet_ms() -> u64 {
    300
}

fn default_settle_attempts() -> u32 {
    5
}

fn default_settle_delay_ms() -> u64 {
    50
}

fn default_placeholder_text() -> String {
    "Insert your text here".to_string()
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            autosave_interval_ms: default_autosave_ms(),
            measure_quiet_ms: default_quiet_ms(),
            settle: SettlePolicy::default(),
            placeholder_text: default_placeholder_text(),
        }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_settle_attempts(),
            initial_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl EditorOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    pub fn measure_quiet(&self) -> Duration {
        Duration::from_millis(self.measure_quiet_ms)
    }
}
