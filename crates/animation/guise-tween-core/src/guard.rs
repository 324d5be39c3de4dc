//! Panic isolation for user callbacks.
//!
//! `catch_panic` runs a closure under `catch_unwind` and reports the panic
//! message together with the source location it was raised at. The location
//! comes from a process-wide panic hook, installed once, that stores it in a
//! thread-local slot before deferring to the previously installed hook.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// A panic caught by `catch_panic`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Panicked {
    pub message: String,
    /// `file:line:column` of the `panic!`, when the hook saw it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

thread_local! {
    static LAST_LOCATION: Cell<Option<String>> = const { Cell::new(None) };
}

fn install_hook() {
    static HOOK: OnceCell<()> = OnceCell::new();
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info.location().map(|l| l.to_string());
            let _ = LAST_LOCATION.try_with(|slot| slot.set(location));
            previous(info);
        }));
    });
}

fn payload_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "callback panicked".to_string())
}

/// Run `f`, turning a panic into `Err(Panicked)`.
pub fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, Panicked> {
    install_hook();
    LAST_LOCATION.with(|slot| slot.set(None));
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| Panicked {
        message: payload_message(payload.as_ref()),
        location: LAST_LOCATION.with(Cell::take),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_message_and_location() {
        let caught = catch_panic(|| -> u32 { panic!("bad frame {}", 7) }).unwrap_err();
        assert_eq!(caught.message, "bad frame 7");
        let location = caught.location.unwrap();
        assert!(location.contains("guard.rs"), "unexpected location {location}");

        assert_eq!(catch_panic(|| 3).unwrap(), 3);
    }
}
