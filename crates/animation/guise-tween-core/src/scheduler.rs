//! TweenScheduler: the set of active per-property tweens and the per-frame driver.
//!
//! Methods:
//! - animate (validate, capture start value, replace any tween on the same path)
//! - cancel, cancel_property, cancel_targets, clear
//! - advance (delay -> elapsed -> ease -> lerp -> write -> completion)
//!
//! At most one tween exists per (node, property path). Tweens are stepped in
//! registration order; tweens scheduled from a completion callback join the
//! next `advance`, never the current one.

use hashbrown::{HashMap, HashSet};
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use guise_scene_core::{NodeHandle, NodeStore, PropertyPath, SceneError};

use crate::config::TweenConfig;
use crate::guard::catch_panic;
use crate::ids::TweenId;
use crate::interp::lerp_value;
use crate::outputs::{CallbackFailure, Change, Outputs, TweenEvent};
use crate::playback::{fmod, Playback};
use crate::tween::{Completion, OnComplete, Tween, TweenRequest};

/// Dead ids tolerated in `order` before `remove` compacts it.
const ORDER_SLACK: usize = 32;

#[derive(Debug)]
pub struct TweenScheduler {
    cfg: TweenConfig,
    tweens: SlotMap<TweenId, Tween>,
    /// Registration order. May hold ids of removed tweens until the next
    /// advance or compaction.
    order: Vec<TweenId>,
    by_target: HashMap<(NodeHandle, PropertyPath), TweenId>,
    /// Reused snapshot of `order` for one advance.
    batch: Vec<TweenId>,
    outputs: Outputs,
    discarded_events: usize,
}

impl Default for TweenScheduler {
    fn default() -> Self {
        Self::new(TweenConfig::default())
    }
}

impl TweenScheduler {
    pub fn new(cfg: TweenConfig) -> Self {
        Self {
            tweens: SlotMap::with_capacity_and_key(cfg.capacity_hint),
            order: Vec::with_capacity(cfg.capacity_hint),
            by_target: HashMap::with_capacity(cfg.capacity_hint),
            batch: Vec::with_capacity(cfg.capacity_hint),
            outputs: Outputs::default(),
            discarded_events: 0,
            cfg,
        }
    }

    pub fn config(&self) -> &TweenConfig {
        &self.cfg
    }

    /// Number of active tweens.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.contains_key(id)
    }

    /// The tween currently animating `path` on `target`, if any.
    pub fn active_for(&self, target: NodeHandle, path: &PropertyPath) -> Option<TweenId> {
        self.by_target.get(&(target, path.clone())).copied()
    }

    /// Active tween ids in stepping order.
    pub fn ids(&self) -> impl Iterator<Item = TweenId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|id| self.tweens.contains_key(*id))
    }

    /// Outputs of the most recent `advance`.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Start a tween on `req.target`/`req.path` towards `req.value`.
    ///
    /// The start value is read from `nodes` now, not at the first advance. Any
    /// tween already running on the same (node, path) is discarded without its
    /// callback. Fails under the store's own write rules, and with
    /// `InvalidProperty` for step-only (bool/text) slots.
    pub fn animate(&mut self, nodes: &NodeStore, req: TweenRequest) -> Result<TweenId, SceneError> {
        let path = PropertyPath::parse(&req.path)?;
        let kind = nodes.validate_write(req.target, &path, &req.value)?;
        if !kind.is_numeric() {
            return Err(SceneError::InvalidProperty {
                path: path.to_string(),
                reason: format!("{kind} properties cannot be animated"),
            });
        }
        let start = nodes.read(req.target, &path)?;
        let mut end = start.clone();
        for (dst, src) in end.components_mut().iter_mut().zip(req.value.components()) {
            *dst = *src;
        }

        let key = (req.target, path.clone());
        if let Some(previous) = self.by_target.get(&key).copied() {
            self.remove(previous);
            debug!(?previous, target = ?req.target, %path, "tween replaced");
        }

        let tween = Tween::new(path, start, end, req);
        let id = self.tweens.insert(tween);
        self.order.push(id);
        self.by_target.insert(key, id);
        trace!(?id, "tween scheduled");
        Ok(id)
    }

    /// Cancel a tween without firing its callback. Returns false if it had
    /// already finished or been cancelled.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        self.remove(id).is_some()
    }

    /// Cancel whatever tween runs on (`target`, `path`).
    pub fn cancel_property(&mut self, target: NodeHandle, path: &PropertyPath) -> Option<TweenId> {
        let id = self.active_for(target, path)?;
        self.remove(id);
        Some(id)
    }

    /// Cancel every tween aimed at one of `targets`. Returns how many were removed.
    pub fn cancel_targets(&mut self, targets: &[NodeHandle]) -> usize {
        if targets.is_empty() || self.tweens.is_empty() {
            return 0;
        }
        let targets: HashSet<NodeHandle> = targets.iter().copied().collect();
        let doomed: Vec<TweenId> = self
            .tweens
            .iter()
            .filter(|(_, t)| targets.contains(&t.target))
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            self.remove(*id);
        }
        if !doomed.is_empty() {
            debug!(cancelled = doomed.len(), "tweens cancelled for removed nodes");
        }
        doomed.len()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.tweens.clear();
        self.order.clear();
        self.by_target.clear();
    }

    fn remove(&mut self, id: TweenId) -> Option<Tween> {
        let tween = self.tweens.remove(id)?;
        let key = (tween.target, tween.path.clone());
        if self.by_target.get(&key) == Some(&id) {
            self.by_target.remove(&key);
        }
        if self.order.len() > self.tweens.len() * 2 + ORDER_SLACK {
            let tweens = &self.tweens;
            self.order.retain(|id| tweens.contains_key(*id));
        }
        Some(tween)
    }

    fn run_callback(&mut self, nodes: &mut NodeStore, callback: &mut OnComplete, completion: Completion) {
        let outcome = catch_panic(|| callback(&mut Animator::new(nodes, self), &completion));
        if let Err(panic) = outcome {
            warn!(id = ?completion.id, target = ?completion.target, message = %panic.message, "completion callback panicked");
            self.outputs.failures.push(CallbackFailure {
                id: completion.id,
                target: completion.target,
                path: completion.path,
                panic,
            });
        }
    }

    fn push_event(&mut self, event: TweenEvent) {
        if self.outputs.events.len() < self.cfg.max_events_per_tick {
            self.outputs.events.push(event);
        } else {
            self.discarded_events += 1;
        }
    }

    /// Step every active tween by `dt` seconds, writing into `nodes`.
    ///
    /// Negative or non-finite `dt` is treated as zero.
    pub fn advance(&mut self, nodes: &mut NodeStore, dt: f64) -> &Outputs {
        self.outputs.clear();
        self.discarded_events = 0;
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let mut batch = std::mem::take(&mut self.batch);
        batch.clear();
        batch.extend_from_slice(&self.order);
        for id in batch.iter().copied() {
            self.step(nodes, id, dt);
        }
        self.batch = batch;

        let tweens = &self.tweens;
        self.order.retain(|id| tweens.contains_key(*id));

        if self.discarded_events > 0 {
            warn!(
                discarded = self.discarded_events,
                limit = self.cfg.max_events_per_tick,
                "tween event limit reached"
            );
        }
        &self.outputs
    }

    fn step(&mut self, nodes: &mut NodeStore, id: TweenId, dt: f64) {
        let Some(tween) = self.tweens.get_mut(id) else {
            // removed earlier in this pass
            return;
        };
        let target = tween.target;

        if !nodes.is_alive(target) {
            if let Some(stale) = self.remove(id) {
                trace!(?id, ?target, "tween dropped: target destroyed");
                self.push_event(TweenEvent::Dropped {
                    id,
                    target,
                    path: stale.path,
                });
            }
            return;
        }

        let mut dt = dt;
        if tween.delay > 0.0 {
            if dt < tween.delay {
                tween.delay -= dt;
                return;
            }
            dt -= tween.delay;
            tween.delay = 0.0;
        }

        tween.elapsed += dt;
        let finished = tween.duration <= 0.0 || tween.elapsed >= tween.duration;
        let t = if finished {
            1.0
        } else {
            tween.elapsed / tween.duration
        };
        let progress = tween.easing.apply(tween.playback.phase(t, tween.reversed));
        let value = lerp_value(&tween.start, &tween.end, progress);
        let path = tween.path.clone();
        let playback = tween.playback;

        if let Err(err) = nodes.write(target, &path, value.clone()) {
            warn!(?id, ?target, %path, %err, "tween write rejected; dropping");
            self.remove(id);
            self.push_event(TweenEvent::Dropped { id, target, path });
            return;
        }
        self.outputs.push_change(Change {
            tween: id,
            target,
            path: path.clone(),
            value,
        });
        if !finished {
            return;
        }

        let completion = Completion {
            id,
            target,
            path: path.clone(),
            playback,
        };

        if playback.is_once() {
            let callback = self.remove(id).and_then(|mut t| t.on_complete.take());
            self.push_event(TweenEvent::Completed { id, target, path });
            if let Some(mut callback) = callback {
                self.run_callback(nodes, &mut callback, completion);
            }
            return;
        }

        // Loop modes: carry the overshoot into the next period.
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        tween.iterations += 1;
        tween.elapsed = if tween.duration > 0.0 {
            fmod(tween.elapsed - tween.duration, tween.duration)
        } else {
            0.0
        };
        if playback == Playback::PingPong {
            tween.reversed = !tween.reversed;
        }
        let iteration = tween.iterations;
        let callback = tween.on_complete.take();
        self.push_event(TweenEvent::LoopCompleted {
            id,
            target,
            path,
            iteration,
        });
        if let Some(mut callback) = callback {
            self.run_callback(nodes, &mut callback, completion);
            // Hand the callback back unless the tween was replaced or given a new one.
            if let Some(tween) = self.tweens.get_mut(id) {
                if tween.on_complete.is_none() {
                    tween.on_complete = Some(callback);
                }
            }
        }
    }
}

/// Mutable view of a node store and its scheduler, handed to completion
/// callbacks so they can chain tweens or edit nodes.
pub struct Animator<'a> {
    nodes: &'a mut NodeStore,
    tweens: &'a mut TweenScheduler,
}

impl<'a> Animator<'a> {
    pub fn new(nodes: &'a mut NodeStore, tweens: &'a mut TweenScheduler) -> Self {
        Self { nodes, tweens }
    }

    pub fn animate(&mut self, req: TweenRequest) -> Result<TweenId, SceneError> {
        self.tweens.animate(self.nodes, req)
    }

    pub fn cancel(&mut self, id: TweenId) -> bool {
        self.tweens.cancel(id)
    }

    pub fn cancel_property(&mut self, target: NodeHandle, path: &PropertyPath) -> Option<TweenId> {
        self.tweens.cancel_property(target, path)
    }

    /// Destroy a subtree and cancel its tweens immediately.
    pub fn destroy(&mut self, handle: NodeHandle) -> Vec<NodeHandle> {
        let removed = self.nodes.destroy(handle);
        self.tweens.cancel_targets(&removed);
        removed
    }

    pub fn nodes(&self) -> &NodeStore {
        self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeStore {
        self.nodes
    }

    pub fn tweens(&self) -> &TweenScheduler {
        self.tweens
    }
}
