//! GuiComponent: one GUI instance with its node store, tween scheduler,
//! script and mailboxes.
//!
//! Script code only runs while the frame window is open (`begin_frame` ..
//! `end_frame`). Each hook runs isolated: an `Err` or a panic becomes a
//! `HandlerFailure` and the frame carries on.

use std::collections::VecDeque;
use std::fmt;

use guise_scene_core::{NodeHandle, NodeStore, NodeTemplate, SceneError};
use guise_tween_core::{catch_panic, TweenEvent, TweenScheduler};
use tracing::{trace, warn};

use crate::address::Address;
use crate::config::GuiConfig;
use crate::context::ScriptContext;
use crate::diagnostics::{HandlerFailure, Hook};
use crate::error::{BridgeError, ScriptError};
use crate::message::Message;

/// Lifecycle hooks of a GUI script. Only `on_message` is required.
pub trait GuiScript {
    fn init(&mut self, ctx: &mut ScriptContext<'_>) -> Result<(), ScriptError> {
        let _ = ctx;
        Ok(())
    }

    /// Runs once per frame after tweens advanced and messages were dispatched.
    fn update(&mut self, ctx: &mut ScriptContext<'_>, dt: f64) -> Result<(), ScriptError> {
        let _ = (ctx, dt);
        Ok(())
    }

    fn on_message(&mut self, ctx: &mut ScriptContext<'_>, message: &Message) -> Result<(), ScriptError>;

    fn on_reload(&mut self, ctx: &mut ScriptContext<'_>) -> Result<(), ScriptError> {
        let _ = ctx;
        Ok(())
    }

    fn finalize(&mut self, ctx: &mut ScriptContext<'_>) -> Result<(), ScriptError> {
        let _ = ctx;
        Ok(())
    }
}

pub struct GuiComponent {
    address: Address,
    nodes: NodeStore,
    tweens: TweenScheduler,
    script: Box<dyn GuiScript>,
    inbox: VecDeque<Message>,
    outbox: Vec<Message>,
    in_frame: bool,
    initialized: bool,
    fatal: Option<SceneError>,
}

impl fmt::Debug for GuiComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuiComponent")
            .field("address", &self.address)
            .field("nodes", &self.nodes.len())
            .field("tweens", &self.tweens.len())
            .field("inbox", &self.inbox.len())
            .field("outbox", &self.outbox.len())
            .field("in_frame", &self.in_frame)
            .finish_non_exhaustive()
    }
}

impl GuiComponent {
    pub fn new(address: Address, cfg: &GuiConfig, script: Box<dyn GuiScript>) -> Self {
        Self {
            address,
            nodes: NodeStore::new(cfg.scene.clone()),
            tweens: TweenScheduler::new(cfg.tweens.clone()),
            script,
            inbox: VecDeque::new(),
            outbox: Vec::new(),
            in_frame: false,
            initialized: false,
            fatal: None,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Node state for the compositor.
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    pub fn tweens(&self) -> &TweenScheduler {
        &self.tweens
    }

    /// Build the component's initial hierarchy (host-side loader, before `init`).
    pub fn load_template(&mut self, template: &NodeTemplate) -> Result<NodeHandle, SceneError> {
        self.nodes.instantiate(template)
    }

    pub fn inbox_len(&self) -> usize {
        self.inbox.len()
    }

    /// Queue an inbound message for the next dispatch.
    pub fn enqueue(&mut self, message: Message) {
        trace!(receiver = %self.address, kind = %message.kind, "message queued");
        self.inbox.push_back(message);
    }

    /// Messages posted by the script since the last call, in send order.
    pub fn take_outbox(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }

    pub fn is_in_frame(&self) -> bool {
        self.in_frame
    }

    /// The unrecoverable error this component hit, if any.
    pub fn fatal(&self) -> Option<&SceneError> {
        self.fatal.as_ref()
    }

    pub fn begin_frame(&mut self) {
        self.in_frame = true;
    }

    pub fn end_frame(&mut self) {
        self.in_frame = false;
    }

    fn require_frame(&self, operation: &'static str) -> Result<(), BridgeError> {
        if self.in_frame {
            Ok(())
        } else {
            Err(BridgeError::NotInFrame { operation })
        }
    }

    /// Run host code against the script surface. Fails with `NotInFrame`
    /// unless the frame window is open.
    pub fn with_context<R>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut ScriptContext<'_>) -> R,
    ) -> Result<R, BridgeError> {
        self.require_frame(operation)?;
        let mut ctx = ScriptContext::new(
            &self.address,
            &mut self.nodes,
            &mut self.tweens,
            &mut self.outbox,
            &mut self.fatal,
        );
        Ok(f(&mut ctx))
    }

    fn run_hook<F>(&mut self, hook: Hook, f: F) -> Option<HandlerFailure>
    where
        F: FnOnce(&mut Box<dyn GuiScript>, &mut ScriptContext<'_>) -> Result<(), ScriptError>,
    {
        let Self {
            address,
            nodes,
            tweens,
            script,
            outbox,
            fatal,
            ..
        } = self;
        let outcome = {
            let mut ctx = ScriptContext::new(address, nodes, tweens, outbox, fatal);
            catch_panic(|| f(script, &mut ctx))
        };
        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => {
                if let BridgeError::Scene(scene) = err.error() {
                    if scene.is_fatal() && fatal.is_none() {
                        *fatal = Some(scene.clone());
                    }
                }
                warn!(address = %address, %hook, category = err.error().category(), error = %err, "script hook failed");
                Some(HandlerFailure::from_error(address, hook, &err))
            }
            Err(panic) => {
                warn!(address = %address, %hook, error = %panic.message, "script hook panicked");
                Some(HandlerFailure::from_panic(address, hook, &panic))
            }
        }
    }

    /// Run `init` the first time the component is in a frame.
    pub(crate) fn ensure_initialized(&mut self, failures: &mut Vec<HandlerFailure>) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        failures.extend(self.run_hook(Hook::Init, |s, ctx| s.init(ctx)));
    }

    /// Step this component's tweens. Returns the tween events of the step;
    /// completion callbacks that panicked are added to `failures`.
    pub fn advance(
        &mut self,
        dt: f64,
        failures: &mut Vec<HandlerFailure>,
    ) -> Result<Vec<TweenEvent>, BridgeError> {
        self.require_frame("advance")?;
        let outputs = self.tweens.advance(&mut self.nodes, dt);
        failures.extend(
            outputs
                .failures
                .iter()
                .map(|failure| HandlerFailure::from_callback(&self.address, failure)),
        );
        Ok(outputs.events.clone())
    }

    /// Hand up to `limit` queued messages to `on_message`, oldest first.
    ///
    /// Only messages queued before the call are considered. Returns how many
    /// were handled; the rest stay queued.
    pub fn dispatch_incoming(
        &mut self,
        limit: usize,
        failures: &mut Vec<HandlerFailure>,
    ) -> Result<usize, BridgeError> {
        self.require_frame("dispatch_incoming")?;
        let batch = self.inbox.len().min(limit);
        let mut delivered = 0;
        for _ in 0..batch {
            let Some(message) = self.inbox.pop_front() else {
                break;
            };
            delivered += 1;
            if let Some(mut failure) =
                self.run_hook(Hook::OnMessage, |s, ctx| s.on_message(ctx, &message))
            {
                failure.message_kind = Some(message.kind.clone());
                failures.push(failure);
            }
        }
        Ok(delivered)
    }

    pub fn update(&mut self, dt: f64, failures: &mut Vec<HandlerFailure>) -> Result<(), BridgeError> {
        self.require_frame("update")?;
        failures.extend(self.run_hook(Hook::Update, |s, ctx| s.update(ctx, dt)));
        Ok(())
    }

    pub fn reload(&mut self) -> Result<Option<HandlerFailure>, BridgeError> {
        self.require_frame("reload")?;
        Ok(self.run_hook(Hook::OnReload, |s, ctx| s.on_reload(ctx)))
    }

    /// Run `finalize` and cancel every tween.
    pub fn finalize(&mut self) -> Result<Option<HandlerFailure>, BridgeError> {
        self.require_frame("finalize")?;
        let failure = self.run_hook(Hook::Finalize, |s, ctx| s.finalize(ctx));
        self.tweens.clear();
        Ok(failure)
    }
}
