//! Runtime configuration, loadable from JSON.

use guise_scene_core::SceneConfig;
use guise_tween_core::TweenConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Limits for each component's node store.
    pub scene: SceneConfig,
    /// Sizing for each component's tween scheduler.
    pub tweens: TweenConfig,
    /// Inbound messages handled per component per frame; the rest wait.
    pub max_messages_per_frame: usize,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            tweens: TweenConfig::default(),
            max_messages_per_frame: 256,
        }
    }
}

impl GuiConfig {
    /// Missing fields fall back to defaults.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(GuiConfig::from_json_str("{}").unwrap(), GuiConfig::default());
    }
}
