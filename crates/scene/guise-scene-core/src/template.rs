//! Node templates: the construction requests an external loader hands to the
//! store when a GUI component is loaded.
//!
//! JSON form:
//! ```json
//! { "id": "panel", "kind": "box",
//!   "properties": { "position": { "type": "vec3", "data": [10, 20, 0] } },
//!   "children": [ { "id": "title", "kind": "text" } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::node::NodeKind;
use crate::value::Value;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: NodeKind,
    /// Initial values keyed by property path (whole slots or single channels).
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: Vec<NodeTemplate>,
}

impl NodeTemplate {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: None,
            kind,
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, path: impl Into<String>, value: Value) -> Self {
        self.properties.insert(path.into(), value);
        self
    }

    pub fn with_child(mut self, child: NodeTemplate) -> Self {
        self.children.push(child);
        self
    }

    /// Parse a template tree from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Number of nodes in this template tree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeTemplate::node_count).sum::<usize>()
    }

    /// Depth-first walk (pre-order).
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a NodeTemplate)) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_json() {
        let t = NodeTemplate::from_json_str(
            r#"{ "kind": "box", "children": [ { "id": "label", "kind": "text" } ] }"#,
        )
        .unwrap();
        assert_eq!(t.kind, NodeKind::Box);
        assert!(t.id.is_none());
        assert_eq!(t.node_count(), 2);
        assert_eq!(t.children[0].id.as_deref(), Some("label"));
    }
}
