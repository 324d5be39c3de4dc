//! Node store configuration.

use serde::{Deserialize, Serialize};

/// Sizing limits for one node store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Hard limit on live nodes. Allocation past this fails with `ResourceExhausted`.
    pub max_nodes: usize,
    /// Initial slot capacity.
    pub capacity_hint: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_nodes: 512,
            capacity_hint: 64,
        }
    }
}
