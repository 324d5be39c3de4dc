//! guise-tween-core: easing functions and the per-property tween scheduler.
//!
//! A `TweenScheduler` sits next to one `NodeStore`. Each frame the host calls
//! `advance(&mut store, dt)`; the scheduler writes interpolated values through
//! the store (so its clamp policy applies) and runs completion callbacks,
//! which may chain new tweens for the next frame. A panicking callback is
//! caught and reported in `Outputs::failures`; the advance continues.

pub mod config;
pub mod easing;
pub mod guard;
pub mod ids;
pub mod interp;
pub mod outputs;
pub mod playback;
pub mod scheduler;
pub mod tween;

pub use config::TweenConfig;
pub use easing::{Curve, EaseMode, Easing, UnknownEasing};
pub use guard::{catch_panic, Panicked};
pub use ids::TweenId;
pub use interp::{lerp_f64, lerp_value};
pub use outputs::{CallbackFailure, Change, Outputs, TweenEvent};
pub use playback::Playback;
pub use scheduler::{Animator, TweenScheduler};
pub use tween::{Completion, OnComplete, TweenRequest};
