//! Node records and the per-kind property schema.
//!
//! Every kind shares the transform/appearance slots (`position`, `size`,
//! `color`, `rotation`, `scale`, `enabled`); kinds add their own fields on top.
//! Each slot carries a clamp policy that the store applies on every write, so
//! tweens with overshooting easings land on a legal value without the
//! scheduler knowing about it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::handle::NodeHandle;
use crate::value::{Value, ValueKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Rectangle, optionally nine-sliced
    Box,
    /// Text run
    Text,
    /// Circle/arc sector
    Pie,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Box => "box",
            NodeKind::Text => "text",
            NodeKind::Pie => "pie",
        })
    }
}

/// Write-time clamp applied to every numeric component of a slot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Clamp {
    None,
    /// [0, 1], used for color channels
    Unit,
    /// >= 0
    NonNegative,
    Range(f64, f64),
}

impl Clamp {
    #[inline]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Clamp::None => v,
            Clamp::Unit => v.clamp(0.0, 1.0),
            Clamp::NonNegative => v.max(0.0),
            Clamp::Range(lo, hi) => v.clamp(lo, hi),
        }
    }
}

/// One schema entry.
#[derive(Copy, Clone, Debug)]
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: ValueKind,
    pub clamp: Clamp,
}

const fn def(name: &'static str, kind: ValueKind, clamp: Clamp) -> PropertyDef {
    PropertyDef { name, kind, clamp }
}

const COMMON: &[PropertyDef] = &[
    def("position", ValueKind::Vec3, Clamp::None),
    def("size", ValueKind::Vec3, Clamp::NonNegative),
    def("color", ValueKind::Color, Clamp::Unit),
    def("rotation", ValueKind::Vec3, Clamp::None),
    def("scale", ValueKind::Vec3, Clamp::None),
    def("enabled", ValueKind::Bool, Clamp::None),
];

const BOX: &[PropertyDef] = &[def("slice9", ValueKind::Vec4, Clamp::NonNegative)];

const TEXT: &[PropertyDef] = &[
    def("text", ValueKind::Text, Clamp::None),
    def("outline", ValueKind::Color, Clamp::Unit),
    def("shadow", ValueKind::Color, Clamp::Unit),
    def("line_spacing", ValueKind::Float, Clamp::None),
];

const PIE: &[PropertyDef] = &[
    def("inner_radius", ValueKind::Float, Clamp::NonNegative),
    def("fill_angle", ValueKind::Float, Clamp::Range(-360.0, 360.0)),
];

impl NodeKind {
    /// Kind-specific slots (excluding the common ones).
    fn own_properties(self) -> &'static [PropertyDef] {
        match self {
            NodeKind::Box => BOX,
            NodeKind::Text => TEXT,
            NodeKind::Pie => PIE,
        }
    }

    /// Look up a slot definition by name.
    pub fn property_def(self, name: &str) -> Option<&'static PropertyDef> {
        COMMON
            .iter()
            .chain(self.own_properties())
            .find(|d| d.name == name)
    }

    /// All slot definitions for this kind, common ones first.
    pub fn property_defs(self) -> impl Iterator<Item = &'static PropertyDef> {
        COMMON.iter().chain(self.own_properties())
    }

    /// Default value of a slot.
    pub fn default_value(self, name: &str) -> Option<Value> {
        let v = match name {
            "position" | "rotation" => Value::vec3(0.0, 0.0, 0.0),
            "size" => Value::vec3(100.0, 100.0, 0.0),
            "color" => Value::rgba(1.0, 1.0, 1.0, 1.0),
            "scale" => Value::vec3(1.0, 1.0, 1.0),
            "enabled" => Value::Bool(true),
            "slice9" => Value::vec4(0.0, 0.0, 0.0, 0.0),
            "text" => Value::text(""),
            "outline" | "shadow" => Value::rgba(0.0, 0.0, 0.0, 1.0),
            "line_spacing" => Value::Float(1.0),
            "inner_radius" => Value::Float(0.0),
            "fill_angle" => Value::Float(360.0),
            _ => return None,
        };
        self.property_def(name).map(|_| v)
    }

    /// Fresh property map with every slot at its default.
    pub(crate) fn default_properties(self) -> HashMap<&'static str, Value> {
        self.property_defs()
            .filter_map(|d| self.default_value(d.name).map(|v| (d.name, v)))
            .collect()
    }
}

/// One visual element. Hierarchy edges live on the node; the store keeps them
/// consistent.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) id: Option<String>,
    pub(crate) properties: HashMap<&'static str, Value>,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            id: None,
            properties: kind.default_properties(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}
