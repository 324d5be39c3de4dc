//! Playback modes and the time math they share.

use serde::{Deserialize, Serialize};

/// Repetition/direction policy of a tween.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playback {
    /// start -> end, then complete
    #[default]
    OnceForward,
    /// end -> start, then complete
    OnceBackward,
    /// start -> end -> start within one duration, then complete
    OncePingPong,
    /// start -> end, repeated
    LoopForward,
    /// end -> start, repeated
    LoopBackward,
    /// start -> end -> start -> ..., one duration per leg
    PingPong,
}

impl Playback {
    /// Whether the tween removes itself when its period ends.
    #[inline]
    pub fn is_once(self) -> bool {
        matches!(
            self,
            Playback::OnceForward | Playback::OnceBackward | Playback::OncePingPong
        )
    }

    /// Map normalized period time `t` to the easing input for this mode.
    ///
    /// Backward modes replay the forward timeline in reverse, so the eased
    /// curve is retraced rather than mirrored. `reversed` is the current leg
    /// of a looping ping-pong.
    pub(crate) fn phase(self, t: f64, reversed: bool) -> f64 {
        match self {
            Playback::OnceForward | Playback::LoopForward => t,
            Playback::OnceBackward | Playback::LoopBackward => 1.0 - t,
            Playback::OncePingPong => {
                let u = 2.0 * t;
                if u <= 1.0 {
                    u
                } else {
                    2.0 - u
                }
            }
            Playback::PingPong => {
                if reversed {
                    1.0 - t
                } else {
                    t
                }
            }
        }
    }
}

/// Floored modulo that never returns a negative remainder for positive `b`.
pub(crate) fn fmod(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_endpoints() {
        assert_eq!(Playback::OnceForward.phase(1.0, false), 1.0);
        assert_eq!(Playback::OnceBackward.phase(1.0, false), 0.0);
        assert_eq!(Playback::OncePingPong.phase(0.5, false), 1.0);
        assert_eq!(Playback::OncePingPong.phase(1.0, false), 0.0);
        assert_eq!(Playback::PingPong.phase(1.0, false), 1.0);
        assert_eq!(Playback::PingPong.phase(1.0, true), 0.0);
    }

    #[test]
    fn fmod_wraps_negative_remainders() {
        assert_eq!(fmod(2.5, 1.0), 0.5);
        assert_eq!(fmod(-0.25, 1.0), 0.75);
        assert_eq!(fmod(3.0, 0.0), 0.0);
    }

    #[test]
    fn snake_case_names() {
        let p: Playback = serde_json::from_str(r#""once_ping_pong""#).unwrap();
        assert_eq!(p, Playback::OncePingPong);
        assert_eq!(
            serde_json::to_string(&Playback::PingPong).unwrap(),
            r#""ping_pong""#
        );
        assert!(!Playback::LoopBackward.is_once());
    }
}
