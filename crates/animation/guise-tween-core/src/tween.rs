//! Tween requests and the per-tween runtime record.

use std::fmt;

use guise_scene_core::{NodeHandle, PropertyPath, Value};

use crate::easing::Easing;
use crate::ids::TweenId;
use crate::playback::Playback;
use crate::scheduler::Animator;

/// Passed to completion callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub id: TweenId,
    pub target: NodeHandle,
    pub path: PropertyPath,
    pub playback: Playback,
}

/// Completion callback. Runs synchronously inside `advance`, after the
/// property write, and may schedule further tweens through the `Animator`.
pub type OnComplete = Box<dyn FnMut(&mut Animator<'_>, &Completion)>;

/// Everything `animate` needs. Built with `new` plus optional setters.
pub struct TweenRequest {
    pub(crate) target: NodeHandle,
    pub(crate) path: String,
    pub(crate) value: Value,
    pub(crate) easing: Easing,
    pub(crate) duration: f64,
    pub(crate) delay: f64,
    pub(crate) playback: Playback,
    pub(crate) on_complete: Option<OnComplete>,
}

impl TweenRequest {
    pub fn new(
        target: NodeHandle,
        path: impl Into<String>,
        value: impl Into<Value>,
        easing: Easing,
        duration: f64,
    ) -> Self {
        Self {
            target,
            path: path.into(),
            value: value.into(),
            easing,
            duration,
            delay: 0.0,
            playback: Playback::OnceForward,
            on_complete: None,
        }
    }

    /// Seconds to wait before the tween starts advancing.
    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn playback(mut self, playback: Playback) -> Self {
        self.playback = playback;
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Animator<'_>, &Completion) + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn target(&self) -> NodeHandle {
        self.target
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for TweenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenRequest")
            .field("target", &self.target)
            .field("path", &self.path)
            .field("value", &self.value)
            .field("easing", &self.easing)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("playback", &self.playback)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// An active tween. Start and end share the slot's kind.
pub(crate) struct Tween {
    pub target: NodeHandle,
    pub path: PropertyPath,
    pub start: Value,
    pub end: Value,
    pub easing: Easing,
    pub duration: f64,
    pub delay: f64,
    pub elapsed: f64,
    pub playback: Playback,
    /// Current leg of a looping ping-pong.
    pub reversed: bool,
    pub iterations: u64,
    pub on_complete: Option<OnComplete>,
}

impl Tween {
    /// Non-finite durations and delays collapse to zero.
    pub fn new(
        path: PropertyPath,
        start: Value,
        end: Value,
        req: TweenRequest,
    ) -> Self {
        let sanitize = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            target: req.target,
            path,
            start,
            end,
            easing: req.easing,
            duration: sanitize(req.duration),
            delay: sanitize(req.delay),
            elapsed: 0.0,
            playback: req.playback,
            reversed: false,
            iterations: 0,
            on_complete: req.on_complete,
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("target", &self.target)
            .field("path", &self.path)
            .field("elapsed", &self.elapsed)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("playback", &self.playback)
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}
