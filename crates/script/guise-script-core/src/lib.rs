//! guise-script
//!
//! Bridges GUI scripts to a component's node store and tween scheduler.
//! Scripts get a capability-scoped `ScriptContext`; messages between
//! components are routed by the `Runtime` once per frame, with anything it
//! does not host handed to an external `MessageBus`.

pub mod address;
pub mod bus;
pub mod capability;
pub mod component;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod message;
pub mod runtime;

pub use crate::address::Address;
pub use crate::bus::{MessageBus, QueueBus};
pub use crate::capability::Capability;
pub use crate::component::{GuiComponent, GuiScript};
pub use crate::config::GuiConfig;
pub use crate::context::ScriptContext;
pub use crate::diagnostics::{FrameReport, HandlerFailure, Hook};
pub use crate::error::{BridgeError, FatalError, ScriptError};
pub use crate::message::Message;
pub use crate::runtime::Runtime;
