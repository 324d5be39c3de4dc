use serde::{Deserialize, Serialize};
use std::fmt;

use guise_tween_core::{CallbackFailure, Panicked, TweenEvent};

use crate::address::Address;
use crate::error::ScriptError;

/// Which piece of script code failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    Init,
    Update,
    OnMessage,
    OnReload,
    Finalize,
    /// A tween completion callback run during `advance`
    Completion,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Hook::Init => "init",
            Hook::Update => "update",
            Hook::OnMessage => "on_message",
            Hook::OnReload => "on_reload",
            Hook::Finalize => "finalize",
            Hook::Completion => "completion",
        })
    }
}

/// A script hook that returned `Err` or panicked. Isolated to its component
/// and frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandlerFailure {
    pub address: Address,
    pub hook: Hook,
    /// Message kind when the failing hook was `on_message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_kind: Option<String>,
    pub error: String,
    /// `file:line:column` of the failing script call, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub panicked: bool,
}

impl HandlerFailure {
    pub(crate) fn from_error(address: &Address, hook: Hook, err: &ScriptError) -> Self {
        Self {
            address: address.clone(),
            hook,
            message_kind: None,
            error: err.error().to_string(),
            location: Some(err.location().to_string()),
            panicked: false,
        }
    }

    pub(crate) fn from_panic(address: &Address, hook: Hook, panic: &Panicked) -> Self {
        Self {
            address: address.clone(),
            hook,
            message_kind: None,
            error: panic.message.clone(),
            location: panic.location.clone(),
            panicked: true,
        }
    }

    /// A completion callback that panicked during `advance`.
    pub(crate) fn from_callback(address: &Address, failure: &CallbackFailure) -> Self {
        Self::from_panic(address, Hook::Completion, &failure.panic)
    }
}

/// Summary of one `Runtime::tick`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameReport {
    pub epoch: u64,
    pub dt: f64,
    /// Messages handed to `on_message` this frame.
    pub delivered: usize,
    /// Posted messages routed to local inboxes for the next frame.
    pub routed: usize,
    /// Posted messages handed to the external bus.
    pub forwarded: usize,
    /// Inbound messages still queued after dispatch (over the per-frame cap).
    pub pending: usize,
    pub failures: Vec<HandlerFailure>,
    /// Tween events, tagged with the component that produced them.
    pub tween_events: Vec<(Address, TweenEvent)>,
}

impl FrameReport {
    pub(crate) fn new(epoch: u64, dt: f64) -> Self {
        Self {
            epoch,
            dt,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
