//! Frame driver for a set of GUI components.
//!
//! `tick` visits components in registration order. For each one it runs
//! `init` (first frame only), advances tweens, dispatches the inbox and calls
//! `update`. Once every component has run, outboxes are routed: local
//! addresses land in the receiver's inbox for the next frame, everything else
//! goes to the external bus.

use indexmap::IndexMap;
use tracing::{debug, error, trace};

use guise_scene_core::NodeTemplate;

use crate::address::Address;
use crate::bus::MessageBus;
use crate::component::{GuiComponent, GuiScript};
use crate::config::GuiConfig;
use crate::diagnostics::{FrameReport, HandlerFailure};
use crate::error::{BridgeError, FatalError};
use crate::message::Message;

pub struct Runtime {
    cfg: GuiConfig,
    components: IndexMap<Address, GuiComponent>,
    bus: Box<dyn MessageBus>,
    epoch: u64,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("epoch", &self.epoch)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(cfg: GuiConfig, bus: impl MessageBus + 'static) -> Self {
        Self {
            cfg,
            components: IndexMap::new(),
            bus: Box::new(bus),
            epoch: 0,
        }
    }

    pub fn config(&self) -> &GuiConfig {
        &self.cfg
    }

    /// Number of completed ticks.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.components.keys()
    }

    /// Register a component with an empty node store. `init` runs on its
    /// first tick.
    pub fn spawn(
        &mut self,
        address: &str,
        script: impl GuiScript + 'static,
    ) -> Result<Address, BridgeError> {
        let address = Address::new(address)?;
        if self.components.contains_key(&address) {
            return Err(BridgeError::AddressInUse { address });
        }
        let component = GuiComponent::new(address.clone(), &self.cfg, Box::new(script));
        debug!(%address, "component spawned");
        self.components.insert(address.clone(), component);
        Ok(address)
    }

    /// Register a component whose hierarchy is built from `template` before
    /// its script sees it.
    pub fn spawn_with_template(
        &mut self,
        address: &str,
        template: &NodeTemplate,
        script: impl GuiScript + 'static,
    ) -> Result<Address, BridgeError> {
        let address = Address::new(address)?;
        if self.components.contains_key(&address) {
            return Err(BridgeError::AddressInUse { address });
        }
        let mut component = GuiComponent::new(address.clone(), &self.cfg, Box::new(script));
        component.load_template(template)?;
        debug!(%address, nodes = component.nodes().len(), "component spawned from template");
        self.components.insert(address.clone(), component);
        Ok(address)
    }

    pub fn component(&self, address: &str) -> Option<&GuiComponent> {
        self.components.get(address)
    }

    pub fn component_mut(&mut self, address: &str) -> Option<&mut GuiComponent> {
        self.components.get_mut(address)
    }

    /// Queue a message from the host (or the external bus) for a hosted
    /// component.
    pub fn deliver(&mut self, message: Message) -> Result<(), BridgeError> {
        match self.components.get_mut(message.receiver.as_str()) {
            Some(component) => {
                component.enqueue(message);
                Ok(())
            }
            None => Err(BridgeError::UnknownComponent {
                address: message.receiver,
            }),
        }
    }

    /// Run `on_reload` on one component outside the regular frame.
    pub fn reload(&mut self, address: &str) -> Result<Option<HandlerFailure>, BridgeError> {
        let component = self.lookup(address)?;
        component.begin_frame();
        let outcome = component.reload();
        component.end_frame();
        outcome
    }

    /// Run `finalize` and unregister the component. Messages still queued for
    /// it are dropped.
    pub fn remove(&mut self, address: &str) -> Result<Option<HandlerFailure>, BridgeError> {
        let component = self.lookup(address)?;
        component.begin_frame();
        let outcome = component.finalize();
        component.end_frame();
        let dropped = component.inbox_len();
        let posted = component.take_outbox();
        self.components.shift_remove(address);
        debug!(address, dropped, "component removed");
        self.route(posted, &mut FrameReport::default());
        outcome
    }

    fn lookup(&mut self, address: &str) -> Result<&mut GuiComponent, BridgeError> {
        match self.components.get_mut(address) {
            Some(component) => Ok(component),
            None => Err(BridgeError::UnknownComponent {
                address: Address::new(address)?,
            }),
        }
    }

    /// Drive one frame.
    ///
    /// Script failures are isolated and reported. Node exhaustion in any
    /// component aborts the frame with `FatalError`; posts of that frame are
    /// not routed.
    pub fn tick(&mut self, dt: f64) -> Result<FrameReport, FatalError> {
        self.epoch = self.epoch.wrapping_add(1);
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut report = FrameReport::new(self.epoch, dt);
        let limit = self.cfg.max_messages_per_frame;

        for (address, component) in self.components.iter_mut() {
            component.begin_frame();
            let stepped = step_component(address, component, dt, limit, &mut report);
            component.end_frame();
            if let Err(err) = stepped {
                error!(%address, error = %err, "frame step rejected");
            }

            if let Some(source) = component.fatal() {
                error!(%address, error = %source, epoch = self.epoch, "component exhausted node storage");
                return Err(FatalError {
                    address: address.clone(),
                    source: source.clone(),
                });
            }
        }

        report.pending = self.components.values().map(GuiComponent::inbox_len).sum();
        let mut posted = Vec::new();
        for component in self.components.values_mut() {
            posted.extend(component.take_outbox());
        }
        self.route(posted, &mut report);

        trace!(
            epoch = report.epoch,
            delivered = report.delivered,
            routed = report.routed,
            forwarded = report.forwarded,
            failures = report.failures.len(),
            "frame complete"
        );
        Ok(report)
    }

    fn route(&mut self, posted: Vec<Message>, report: &mut FrameReport) {
        for message in posted {
            match self.components.get_mut(message.receiver.as_str()) {
                Some(receiver) => {
                    receiver.enqueue(message);
                    report.routed += 1;
                }
                None => {
                    debug!(
                        sender = %message.sender,
                        receiver = %message.receiver,
                        kind = %message.kind,
                        "forwarding message to external bus"
                    );
                    self.bus.post(message);
                    report.forwarded += 1;
                }
            }
        }
    }
}

fn step_component(
    address: &Address,
    component: &mut GuiComponent,
    dt: f64,
    limit: usize,
    report: &mut FrameReport,
) -> Result<(), BridgeError> {
    component.ensure_initialized(&mut report.failures);
    let events = component.advance(dt, &mut report.failures)?;
    report
        .tween_events
        .extend(events.into_iter().map(|e| (address.clone(), e)));
    report.delivered += component.dispatch_incoming(limit, &mut report.failures)?;
    component.update(dt, &mut report.failures)
}
