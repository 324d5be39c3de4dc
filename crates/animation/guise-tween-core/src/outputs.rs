//! Per-advance outputs: property writes and semantic events.
//!
//! A compositor can apply `changes` directly instead of re-reading the store;
//! hosts forward `events` to whatever observes tween lifecycles.

use guise_scene_core::{NodeHandle, PropertyPath, Value};
use serde::{Deserialize, Serialize};

use crate::guard::Panicked;
use crate::ids::TweenId;

/// One property write performed this advance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub tween: TweenId,
    pub target: NodeHandle,
    pub path: PropertyPath,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum TweenEvent {
    /// A once-mode tween reached its end and was removed.
    Completed {
        id: TweenId,
        target: NodeHandle,
        path: PropertyPath,
    },
    /// A looping tween finished one period (one leg for ping-pong).
    LoopCompleted {
        id: TweenId,
        target: NodeHandle,
        path: PropertyPath,
        iteration: u64,
    },
    /// The target node was gone; the tween was removed without its callback.
    Dropped {
        id: TweenId,
        target: NodeHandle,
        path: PropertyPath,
    },
}

/// A completion callback that panicked. The rest of the advance carried on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallbackFailure {
    pub id: TweenId,
    pub target: NodeHandle,
    pub path: PropertyPath,
    pub panic: Panicked,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<TweenEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CallbackFailure>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
        self.failures.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty() && self.failures.is_empty()
    }
}
