//! Easing functions: pure maps from normalized time `t` in [0, 1] to progress.
//!
//! Named curves use the usual `in`/`out`/`in_out` family shapes. `out` and
//! `in_out` are derived from the `in` shape, so every family is symmetric.
//! Overshooting families (`back`, `elastic`) may leave [0, 1] between the
//! endpoints; the endpoints themselves are exact.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    Quad,
    Cubic,
    Quart,
    Quint,
    Sine,
    Expo,
    Circ,
    Back,
    Elastic,
    Bounce,
}

impl Curve {
    pub const ALL: [Curve; 10] = [
        Curve::Quad,
        Curve::Cubic,
        Curve::Quart,
        Curve::Quint,
        Curve::Sine,
        Curve::Expo,
        Curve::Circ,
        Curve::Back,
        Curve::Elastic,
        Curve::Bounce,
    ];

    fn name(self) -> &'static str {
        match self {
            Curve::Quad => "quad",
            Curve::Cubic => "cubic",
            Curve::Quart => "quart",
            Curve::Quint => "quint",
            Curve::Sine => "sine",
            Curve::Expo => "expo",
            Curve::Circ => "circ",
            Curve::Back => "back",
            Curve::Elastic => "elastic",
            Curve::Bounce => "bounce",
        }
    }

    /// The `in` shape of the family.
    fn ease_in(self, t: f64) -> f64 {
        const BACK: f64 = 1.70158;
        match self {
            Curve::Quad => t * t,
            Curve::Cubic => t * t * t,
            Curve::Quart => t.powi(4),
            Curve::Quint => t.powi(5),
            Curve::Sine => 1.0 - (t * PI / 2.0).cos(),
            Curve::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Curve::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Curve::Back => (BACK + 1.0) * t * t * t - BACK * t * t,
            Curve::Elastic => {
                if t <= 0.0 || t >= 1.0 {
                    t.clamp(0.0, 1.0)
                } else {
                    let c4 = 2.0 * PI / 3.0;
                    -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
                }
            }
            Curve::Bounce => 1.0 - bounce_out(1.0 - t),
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EaseMode {
    In,
    Out,
    InOut,
}

impl EaseMode {
    fn prefix(self) -> &'static str {
        match self {
            EaseMode::In => "in",
            EaseMode::Out => "out",
            EaseMode::InOut => "in_out",
        }
    }
}

/// Easing function id.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "EasingRepr", into = "EasingRepr")]
pub enum Easing {
    /// Identity
    #[default]
    Linear,
    Eased(Curve, EaseMode),
    /// CSS-style timing curve through (0,0), (x1,y1), (x2,y2), (1,1).
    CubicBezier(f64, f64, f64, f64),
    /// Evenly spaced progress samples, linearly interpolated. An empty list
    /// behaves like `Linear`.
    Samples(Vec<f64>),
}

impl Easing {
    pub fn ease_in(curve: Curve) -> Self {
        Easing::Eased(curve, EaseMode::In)
    }

    pub fn ease_out(curve: Curve) -> Self {
        Easing::Eased(curve, EaseMode::Out)
    }

    pub fn ease_in_out(curve: Curve) -> Self {
        Easing::Eased(curve, EaseMode::InOut)
    }

    /// Evaluate at `t` (clamped to [0, 1]).
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::Eased(curve, mode) => {
                if t <= 0.0 {
                    return 0.0;
                }
                if t >= 1.0 {
                    return 1.0;
                }
                match mode {
                    EaseMode::In => curve.ease_in(t),
                    EaseMode::Out => 1.0 - curve.ease_in(1.0 - t),
                    EaseMode::InOut => {
                        if t < 0.5 {
                            curve.ease_in(2.0 * t) / 2.0
                        } else {
                            1.0 - curve.ease_in(2.0 - 2.0 * t) / 2.0
                        }
                    }
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
            Easing::Samples(samples) => sample_curve(samples, t),
        }
    }
}

/// Solve bezier_x(p) == t (Newton-Raphson, bisection fallback), return bezier_y(p).
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut p = t;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - t;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = t;
    for _ in 0..32 {
        let val = bezier_sample(p, x1, x2);
        if (val - t).abs() < 1e-7 {
            break;
        }
        if val < t {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }
    bezier_sample(p, y1, y2)
}

/// B(t) = 3(1-t)^2 t p1 + 3(1-t) t^2 p2 + t^3, Horner form.
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

fn sample_curve(samples: &[f64], t: f64) -> f64 {
    match samples {
        [] => t,
        [only] => *only,
        _ => {
            let last = samples.len() - 1;
            let pos = t * last as f64;
            let i = (pos.floor() as usize).min(last - 1);
            let frac = pos - i as f64;
            samples[i] + (samples[i + 1] - samples[i]) * frac
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::Eased(curve, mode) => write!(f, "{}_{}", mode.prefix(), curve.name()),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic_bezier({x1}, {y1}, {x2}, {y2})")
            }
            Easing::Samples(s) => write!(f, "samples[{}]", s.len()),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown easing '{0}'")]
pub struct UnknownEasing(pub String);

impl FromStr for Easing {
    type Err = UnknownEasing;

    /// Parses the named catalogue: `linear`, `in_quad`, `out_bounce`, `in_out_sine`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "linear" {
            return Ok(Easing::Linear);
        }
        let (mode, rest) = if let Some(rest) = s.strip_prefix("in_out_") {
            (EaseMode::InOut, rest)
        } else if let Some(rest) = s.strip_prefix("in_") {
            (EaseMode::In, rest)
        } else if let Some(rest) = s.strip_prefix("out_") {
            (EaseMode::Out, rest)
        } else {
            return Err(UnknownEasing(s.to_string()));
        };
        Curve::ALL
            .iter()
            .find(|c| c.name() == rest)
            .map(|c| Easing::Eased(*c, mode))
            .ok_or_else(|| UnknownEasing(s.to_string()))
    }
}

/// Wire form: a name string, `{ "cubic_bezier": [x1, y1, x2, y2] }` or
/// `{ "samples": [...] }`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum EasingRepr {
    Named(String),
    CubicBezier { cubic_bezier: [f64; 4] },
    Samples { samples: Vec<f64> },
}

impl TryFrom<EasingRepr> for Easing {
    type Error = UnknownEasing;

    fn try_from(repr: EasingRepr) -> Result<Self, Self::Error> {
        match repr {
            EasingRepr::Named(name) => name.parse(),
            EasingRepr::CubicBezier {
                cubic_bezier: [x1, y1, x2, y2],
            } => Ok(Easing::CubicBezier(x1, y1, x2, y2)),
            EasingRepr::Samples { samples } => Ok(Easing::Samples(samples)),
        }
    }
}

impl From<Easing> for EasingRepr {
    fn from(e: Easing) -> Self {
        match e {
            Easing::CubicBezier(x1, y1, x2, y2) => EasingRepr::CubicBezier {
                cubic_bezier: [x1, y1, x2, y2],
            },
            Easing::Samples(samples) => EasingRepr::Samples { samples },
            named => EasingRepr::Named(named.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn catalogue() -> Vec<Easing> {
        let mut all = vec![Easing::Linear];
        for c in Curve::ALL {
            all.push(Easing::ease_in(c));
            all.push(Easing::ease_out(c));
            all.push(Easing::ease_in_out(c));
        }
        all
    }

    #[test]
    fn named_curves_hit_endpoints_exactly() {
        for e in catalogue() {
            assert_eq!(e.apply(0.0), 0.0, "{e}");
            assert_eq!(e.apply(1.0), 1.0, "{e}");
            assert_eq!(e.apply(-3.0), 0.0, "{e}");
            assert_eq!(e.apply(7.0), 1.0, "{e}");
        }
    }

    #[test]
    fn in_out_is_half_at_midpoint() {
        for c in Curve::ALL {
            assert_abs_diff_eq!(Easing::ease_in_out(c).apply(0.5), 0.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn quad_shapes() {
        assert_abs_diff_eq!(Easing::ease_in(Curve::Quad).apply(0.5), 0.25);
        assert_abs_diff_eq!(Easing::ease_out(Curve::Quad).apply(0.5), 0.75);
        assert_abs_diff_eq!(Easing::ease_in_out(Curve::Quad).apply(0.25), 0.125);
    }

    #[test]
    fn back_overshoots_both_ways() {
        assert!(Easing::ease_in(Curve::Back).apply(0.2) < 0.0);
        assert!(Easing::ease_out(Curve::Back).apply(0.6) > 1.0);
    }

    #[test]
    fn bounce_out_stays_in_unit_range() {
        let e = Easing::ease_out(Curve::Bounce);
        for i in 0..=100 {
            let p = e.apply(i as f64 / 100.0);
            assert!((0.0..=1.0 + 1e-12).contains(&p), "{p}");
        }
    }

    #[test]
    fn css_ease_bezier() {
        let ease = Easing::CubicBezier(0.25, 0.1, 0.25, 1.0);
        let mid = ease.apply(0.5);
        assert!(mid > 0.75 && mid < 0.85, "{mid}");
        assert_eq!(ease.apply(1.0), 1.0);
        // a linear control polygon is the identity
        let lin = Easing::CubicBezier(1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0);
        assert_abs_diff_eq!(lin.apply(0.3), 0.3, epsilon = 1e-6);
    }

    #[test]
    fn samples_interpolate_piecewise() {
        let e = Easing::Samples(vec![0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(e.apply(0.25), 0.5);
        assert_abs_diff_eq!(e.apply(0.5), 1.0);
        assert_abs_diff_eq!(e.apply(1.0), 0.0);
        assert_abs_diff_eq!(Easing::Samples(vec![]).apply(0.4), 0.4);
        assert_abs_diff_eq!(Easing::Samples(vec![0.7]).apply(0.1), 0.7);
    }

    #[test]
    fn names_parse_back_to_the_same_curve() {
        for e in catalogue() {
            let parsed: Easing = e.to_string().parse().unwrap();
            assert_eq!(parsed, e);
        }
        assert!("in_wobble".parse::<Easing>().is_err());
        assert!("sideways_quad".parse::<Easing>().is_err());
    }

    #[test]
    fn json_forms() {
        let e: Easing = serde_json::from_str(r#""in_out_sine""#).unwrap();
        assert_eq!(e, Easing::ease_in_out(Curve::Sine));
        let e: Easing = serde_json::from_str(r#"{ "cubic_bezier": [0.4, 0.0, 0.2, 1.0] }"#).unwrap();
        assert_eq!(e, Easing::CubicBezier(0.4, 0.0, 0.2, 1.0));
        let e: Easing = serde_json::from_str(r#"{ "samples": [0.0, 0.3, 1.0] }"#).unwrap();
        assert_eq!(e, Easing::Samples(vec![0.0, 0.3, 1.0]));
        assert!(serde_json::from_str::<Easing>(r#""nope""#).is_err());
        assert_eq!(
            serde_json::to_string(&Easing::ease_out(Curve::Expo)).unwrap(),
            r#""out_expo""#
        );
    }
}
