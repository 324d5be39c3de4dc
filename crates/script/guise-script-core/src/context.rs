//! ScriptContext: the only surface a GUI script gets.
//!
//! Node, animation and messaging operations on the owning component; nothing
//! else is reachable. Every fallible call returns `ScriptError` carrying the
//! script's call site.

use guise_scene_core::{
    NodeHandle, NodeKind, NodeStore, NodeTemplate, PropertyPath, SceneError, Value,
};
use guise_tween_core::{TweenId, TweenRequest, TweenScheduler};
use tracing::trace;

use crate::address::Address;
use crate::capability::Capability;
use crate::error::{BridgeError, ScriptError};
use crate::message::Message;

/// Convert to `ScriptError`, remembering the first fatal scene error so the
/// runtime still sees it if the script swallows the `Err`.
#[track_caller]
fn lift<T, E: Into<BridgeError>>(
    fatal: &mut Option<SceneError>,
    result: Result<T, E>,
) -> Result<T, ScriptError> {
    match result {
        Ok(v) => Ok(v),
        Err(e) => {
            let e = e.into();
            if let BridgeError::Scene(scene) = &e {
                if scene.is_fatal() && fatal.is_none() {
                    *fatal = Some(scene.clone());
                }
            }
            Err(ScriptError::new(e))
        }
    }
}

pub struct ScriptContext<'a> {
    address: &'a Address,
    nodes: &'a mut NodeStore,
    tweens: &'a mut TweenScheduler,
    outbox: &'a mut Vec<Message>,
    fatal: &'a mut Option<SceneError>,
}

impl<'a> ScriptContext<'a> {
    pub(crate) fn new(
        address: &'a Address,
        nodes: &'a mut NodeStore,
        tweens: &'a mut TweenScheduler,
        outbox: &'a mut Vec<Message>,
        fatal: &'a mut Option<SceneError>,
    ) -> Self {
        Self {
            address,
            nodes,
            tweens,
            outbox,
            fatal,
        }
    }

    /// Address of the component this script belongs to.
    pub fn address(&self) -> &Address {
        self.address
    }

    /// Read-only access for queries (`parent`, `children`, `draw_list`, ...).
    pub fn nodes(&self) -> &NodeStore {
        self.nodes
    }

    pub fn tweens(&self) -> &TweenScheduler {
        self.tweens
    }

    #[track_caller]
    pub fn require(&self, capability: Capability) -> Result<(), ScriptError> {
        if capability.is_granted() {
            Ok(())
        } else {
            Err(ScriptError::new(BridgeError::CapabilityDenied {
                capability: capability.name().to_string(),
            }))
        }
    }

    /// Like `require`, for names coming from script data. Unknown names are denied.
    #[track_caller]
    pub fn require_named(&self, name: &str) -> Result<(), ScriptError> {
        match Capability::from_name(name) {
            Some(capability) => self.require(capability),
            None => Err(ScriptError::new(BridgeError::CapabilityDenied {
                capability: name.to_string(),
            })),
        }
    }

    // -- nodes -------------------------------------------------------------

    #[track_caller]
    pub fn create<K, I>(&mut self, kind: NodeKind, initial: I) -> Result<NodeHandle, ScriptError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        lift(self.fatal, self.nodes.create(kind, initial))
    }

    #[track_caller]
    pub fn instantiate(&mut self, template: &NodeTemplate) -> Result<NodeHandle, ScriptError> {
        lift(self.fatal, self.nodes.instantiate(template))
    }

    #[track_caller]
    pub fn clone_node(&mut self, handle: NodeHandle) -> Result<NodeHandle, ScriptError> {
        lift(self.fatal, self.nodes.clone_node(handle))
    }

    /// Destroy a subtree. Tweens on removed nodes are cancelled immediately.
    /// No-op for stale handles.
    pub fn destroy(&mut self, handle: NodeHandle) -> Vec<NodeHandle> {
        let removed = self.nodes.destroy(handle);
        self.tweens.cancel_targets(&removed);
        removed
    }

    #[track_caller]
    pub fn get_by_id(&self, id: &str) -> Result<NodeHandle, ScriptError> {
        match self.nodes.get_by_id(id) {
            Ok(h) => Ok(h),
            Err(e) => Err(ScriptError::new(e)),
        }
    }

    #[track_caller]
    pub fn set_id(&mut self, handle: NodeHandle, id: &str) -> Result<(), ScriptError> {
        lift(self.fatal, self.nodes.set_id(handle, id))
    }

    #[track_caller]
    pub fn get_property(&self, handle: NodeHandle, path: &str) -> Result<Value, ScriptError> {
        match self.nodes.get_property(handle, path) {
            Ok(v) => Ok(v),
            Err(e) => Err(ScriptError::new(e)),
        }
    }

    #[track_caller]
    pub fn set_property(
        &mut self,
        handle: NodeHandle,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<(), ScriptError> {
        lift(self.fatal, self.nodes.set_property(handle, path, value.into()))
    }

    #[track_caller]
    pub fn reparent(
        &mut self,
        handle: NodeHandle,
        new_parent: Option<NodeHandle>,
        index: Option<usize>,
    ) -> Result<(), ScriptError> {
        lift(self.fatal, self.nodes.reparent(handle, new_parent, index))
    }

    #[track_caller]
    pub fn move_above(&mut self, handle: NodeHandle, reference: NodeHandle) -> Result<(), ScriptError> {
        lift(self.fatal, self.nodes.move_above(handle, reference))
    }

    #[track_caller]
    pub fn move_below(&mut self, handle: NodeHandle, reference: NodeHandle) -> Result<(), ScriptError> {
        lift(self.fatal, self.nodes.move_below(handle, reference))
    }

    // -- animation ---------------------------------------------------------

    #[track_caller]
    pub fn animate(&mut self, request: TweenRequest) -> Result<TweenId, ScriptError> {
        lift(self.fatal, self.tweens.animate(self.nodes, request))
    }

    pub fn cancel(&mut self, id: TweenId) -> bool {
        self.tweens.cancel(id)
    }

    #[track_caller]
    pub fn cancel_property(
        &mut self,
        handle: NodeHandle,
        path: &str,
    ) -> Result<Option<TweenId>, ScriptError> {
        let path = lift(self.fatal, PropertyPath::parse(path))?;
        Ok(self.tweens.cancel_property(handle, &path))
    }

    // -- messaging ---------------------------------------------------------

    /// Queue a message. It is routed after this component's frame work and
    /// handled no earlier than the receiver's next dispatch.
    #[track_caller]
    pub fn post(
        &mut self,
        receiver: &str,
        kind: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<(), ScriptError> {
        let receiver = lift(self.fatal, Address::new(receiver))?;
        let message = Message::new(self.address.clone(), receiver, kind, payload);
        trace!(sender = %message.sender, receiver = %message.receiver, kind = %message.kind, "message posted");
        self.outbox.push(message);
        Ok(())
    }
}
