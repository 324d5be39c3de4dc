//! Property values stored on nodes.
//! All numeric types use f64.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse kind of a [`Value`], used for schema checks and error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Color,
    Bool,
    Text,
}

impl ValueKind {
    /// Number of addressable numeric components (`0` for step-only kinds).
    pub fn arity(self) -> usize {
        match self {
            ValueKind::Float => 1,
            ValueKind::Vec2 => 2,
            ValueKind::Vec3 => 3,
            ValueKind::Vec4 | ValueKind::Color => 4,
            ValueKind::Bool | ValueKind::Text => 0,
        }
    }

    /// Whether values of this kind can be interpolated.
    pub fn is_numeric(self) -> bool {
        self.arity() > 0
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Float => "float",
            ValueKind::Vec2 => "vec2",
            ValueKind::Vec3 => "vec3",
            ValueKind::Vec4 => "vec4",
            ValueKind::Color => "color",
            ValueKind::Bool => "bool",
            ValueKind::Text => "text",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Value {
    /// Scalar float
    Float(f64),

    /// 2D vector
    Vec2([f64; 2]),

    /// 3D vector
    Vec3([f64; 3]),

    /// 4D vector
    Vec4([f64; 4]),

    /// RGBA color, channels nominally in [0, 1]
    Color([f64; 4]),

    /// Boolean (step only)
    Bool(bool),

    /// Text / string; step only
    Text(String),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Color(_) => ValueKind::Color,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
        }
    }

    /// Numeric components as a slice (empty for bool/text).
    pub fn components(&self) -> &[f64] {
        match self {
            Value::Float(v) => std::slice::from_ref(v),
            Value::Vec2(v) => v,
            Value::Vec3(v) => v,
            Value::Vec4(v) | Value::Color(v) => v,
            Value::Bool(_) | Value::Text(_) => &[],
        }
    }

    /// Mutable view over the numeric components.
    pub fn components_mut(&mut self) -> &mut [f64] {
        match self {
            Value::Float(v) => std::slice::from_mut(v),
            Value::Vec2(v) => v,
            Value::Vec3(v) => v,
            Value::Vec4(v) | Value::Color(v) => v,
            Value::Bool(_) | Value::Text(_) => &mut [],
        }
    }

    /// Read one component, `None` if out of range or not numeric.
    pub fn component(&self, index: usize) -> Option<f64> {
        self.components().get(index).copied()
    }

    /// Scalar payload of a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Convenience constructors
    pub fn vec2(x: f64, y: f64) -> Self {
        Value::Vec2([x, y])
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn vec4(x: f64, y: f64, z: f64, w: f64) -> Self {
        Value::Vec4([x, y, z, w])
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Value::Color([r, g, b, a])
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_follow_kind_arity() {
        assert_eq!(Value::Float(2.0).components(), &[2.0]);
        assert_eq!(Value::vec3(1.0, 2.0, 3.0).components().len(), 3);
        assert_eq!(Value::rgba(0.1, 0.2, 0.3, 0.4).component(3), Some(0.4));
        assert!(Value::Bool(true).components().is_empty());
        assert_eq!(Value::text("x").kind().arity(), 0);
    }

    #[test]
    fn serde_uses_tagged_form() {
        let v = Value::vec2(1.0, 2.0);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"type": "vec2", "data": [1.0, 2.0]}));
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }
}
