//! Capability scoping for GUI scripts.
//!
//! GUI scripts see node, animation and messaging operations only. The game
//! object namespace and every other engine service belong to a different
//! script domain and are refused.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Nodes,
    Animation,
    Messaging,
    /// Game-object/entity namespace
    Entities,
    Input,
    Assets,
    Physics,
    Filesystem,
}

impl Capability {
    pub const GRANTED: [Capability; 3] =
        [Capability::Nodes, Capability::Animation, Capability::Messaging];

    #[inline]
    pub fn is_granted(self) -> bool {
        Self::GRANTED.contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::Nodes => "nodes",
            Capability::Animation => "animation",
            Capability::Messaging => "messaging",
            Capability::Entities => "entities",
            Capability::Input => "input",
            Capability::Assets => "assets",
            Capability::Physics => "physics",
            Capability::Filesystem => "filesystem",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Capability::Nodes,
            Capability::Animation,
            Capability::Messaging,
            Capability::Entities,
            Capability::Input,
            Capability::Assets,
            Capability::Physics,
            Capability::Filesystem,
        ]
        .into_iter()
        .find(|c| c.name() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_gui_surface_is_granted() {
        assert!(Capability::Nodes.is_granted());
        assert!(Capability::Messaging.is_granted());
        assert!(!Capability::Entities.is_granted());
        assert_eq!(Capability::from_name("physics"), Some(Capability::Physics));
        assert_eq!(Capability::from_name("go"), None);
    }
}
