//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Sizing for the tween scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenConfig {
    /// Initial capacity of the tween table.
    pub capacity_hint: usize,

    /// Maximum events retained per `advance`; extra events are discarded with a warning.
    pub max_events_per_tick: usize,
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            capacity_hint: 64,
            max_events_per_tick: 1024,
        }
    }
}
