//! Per-step metadata emitted by environments.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Opaque metadata attached to one environment slot for one step.
///
/// An empty info carries no signal. A non-empty info on a terminal step is
/// the authoritative "episode truly ended" marker; a bare terminal flag is
/// not (life loss in multi-life games reports terminal without info).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepInfo(BTreeMap<String, Value>);

impl StepInfo {
    /// Empty info (no completion signal)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Info carrying a single key
    pub fn with(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::empty().insert(key, value)
    }

    /// Add a key, builder style
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<BTreeMap<String, Value>> for StepInfo {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Whether a slot's step marks a completed episode.
#[inline]
pub fn ends_episode(terminal: bool, info: &StepInfo) -> bool {
    terminal && !info.is_empty()
}

/// Reward and metadata of one completed episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub reward: f64,
    pub info: StepInfo,
}
