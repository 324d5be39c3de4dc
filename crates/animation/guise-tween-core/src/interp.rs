//! Component-wise interpolation of numeric property values.

use guise_scene_core::Value;

/// Linear interpolation of scalars. Exact at `t == 0` and `t == 1`.
#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Interpolate every numeric component of `start` towards `end`.
///
/// The result keeps `start`'s kind; `end` only contributes its components, so
/// a `Vec4` target interpolates into a `Color` slot. Step-only kinds are
/// returned unchanged.
pub fn lerp_value(start: &Value, end: &Value, t: f64) -> Value {
    let mut out = start.clone();
    for (dst, b) in out.components_mut().iter_mut().zip(end.components()) {
        *dst = lerp_f64(*dst, *b, t);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_scalar_and_vector() {
        assert_eq!(lerp_f64(0.0, 100.0, 0.5), 50.0);
        assert_eq!(
            lerp_value(&Value::vec3(0.0, 10.0, 0.0), &Value::vec3(10.0, 0.0, 4.0), 0.25),
            Value::vec3(2.5, 7.5, 1.0)
        );
    }

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(lerp_f64(0.1, 0.7, 1.0), 0.7);
        assert_eq!(lerp_f64(0.1, 0.7, 0.0), 0.1);
    }

    #[test]
    fn extrapolates_past_one() {
        assert_eq!(lerp_f64(0.0, 10.0, 1.5), 15.0);
    }

    #[test]
    fn keeps_start_kind() {
        let v = lerp_value(
            &Value::rgba(0.0, 0.0, 0.0, 0.0),
            &Value::vec4(1.0, 1.0, 1.0, 1.0),
            1.0,
        );
        assert_eq!(v, Value::rgba(1.0, 1.0, 1.0, 1.0));
    }
}
