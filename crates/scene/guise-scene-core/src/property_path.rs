//! PropertyPath parsing and formatting.
//!
//! Grammar:
//!   property[.component]
//! - `property` names a slot on the node (`position`, `color`, `text`, ...)
//! - `component` optionally selects one channel of a vector/color slot:
//!   `x|r` -> 0, `y|g` -> 1, `z|b` -> 2, `w|a` -> 3
//!
//! Examples:
//!   "position.x" -> property="position", component=Some(X)
//!   "color.a"    -> property="color", component=Some(W)   (same slot as "color.w")
//!   "size"       -> property="size", component=None
//!
//! Paths are canonicalised on parse, so two spellings of the same channel
//! compare and hash equal.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SceneError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    X,
    Y,
    Z,
    W,
}

impl Component {
    pub fn index(self) -> usize {
        match self {
            Component::X => 0,
            Component::Y => 1,
            Component::Z => 2,
            Component::W => 3,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "x" | "r" => Some(Component::X),
            "y" | "g" => Some(Component::Y),
            "z" | "b" => Some(Component::Z),
            "w" | "a" => Some(Component::W),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Component::X => "x",
            Component::Y => "y",
            Component::Z => "z",
            Component::W => "w",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    property: String,
    component: Option<Component>,
}

impl PropertyPath {
    /// Path addressing a whole property slot.
    pub fn whole(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            component: None,
        }
    }

    /// Path addressing a single channel of a property slot.
    pub fn channel(property: impl Into<String>, component: Component) -> Self {
        Self {
            property: property.into(),
            component: Some(component),
        }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, SceneError> {
        let invalid = |reason: &str| SceneError::InvalidProperty {
            path: s.to_string(),
            reason: reason.to_string(),
        };
        if s.is_empty() {
            return Err(invalid("empty path"));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(invalid("path contains whitespace"));
        }
        let mut parts = s.split('.');
        let property = match parts.next() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(invalid("empty property name")),
        };
        let component = match parts.next() {
            None => None,
            Some("") => return Err(invalid("empty component segment")),
            Some(c) => Some(
                Component::parse(c).ok_or_else(|| invalid("unknown component selector"))?,
            ),
        };
        if parts.next().is_some() {
            return Err(invalid("nested component selectors are not supported"));
        }
        Ok(Self {
            property: property.to_string(),
            component,
        })
    }

    /// Name of the addressed property slot.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Selected channel, if any.
    pub fn component(&self) -> Option<Component> {
        self.component
    }

    /// True when the path names the whole slot.
    pub fn is_whole(&self) -> bool {
        self.component.is_none()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component {
            Some(c) => write!(f, "{}.{}", self.property, c.as_str()),
            None => f.write_str(&self.property),
        }
    }
}

impl FromStr for PropertyPath {
    type Err = SceneError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for PropertyPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    fn deserialize<D>(deserializer: D) -> Result<PropertyPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PropertyPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_component() {
        let p = PropertyPath::parse("position.x").unwrap();
        assert_eq!(p.property(), "position");
        assert_eq!(p.component(), Some(Component::X));
        assert_eq!(p.to_string(), "position.x");
    }

    #[test]
    fn color_aliases_canonicalise() {
        let a = PropertyPath::parse("color.a").unwrap();
        let w = PropertyPath::parse("color.w").unwrap();
        assert_eq!(a, w);
        assert_eq!(a.to_string(), "color.w");
    }

    #[test]
    fn parse_whole() {
        let p = PropertyPath::parse("size").unwrap();
        assert!(p.is_whole());
        assert_eq!(p.to_string(), "size");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(PropertyPath::parse("").is_err());
        assert!(PropertyPath::parse(".x").is_err());
        assert!(PropertyPath::parse("position.").is_err());
        assert!(PropertyPath::parse("position.q").is_err());
        assert!(PropertyPath::parse("position.x.y").is_err());
        assert!(PropertyPath::parse("pos ition").is_err());
    }
}
