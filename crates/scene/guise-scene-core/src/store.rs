//! NodeStore: ownership of node records, hierarchy edges and handle validity.
//!
//! Methods:
//! - create, instantiate, clone_node, destroy (allocation / lifetime)
//! - get_by_id, set_id, clear_id, id_of (naming)
//! - get_property, set_property, read, write, validate_write (typed properties)
//! - reparent, move_above, move_below, draw_order, draw_list (hierarchy)
//!
//! Every mutation is visible to the next read; nothing is buffered.

use hashbrown::{HashMap, HashSet};
use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::handle::NodeHandle;
use crate::node::{Node, NodeKind, PropertyDef};
use crate::property_path::PropertyPath;
use crate::template::NodeTemplate;
use crate::value::{Value, ValueKind};

/// A validated, not yet allocated subtree.
struct Pending {
    node: Node,
    children: Vec<Pending>,
}

impl Pending {
    fn count(&self) -> usize {
        1 + self.children.iter().map(Pending::count).sum::<usize>()
    }
}

/// Resolve a path against a kind's schema, checking the component index.
fn slot_def(kind: NodeKind, path: &PropertyPath) -> Result<&'static PropertyDef, SceneError> {
    let def = kind.property_def(path.property()).ok_or_else(|| {
        SceneError::property(
            path,
            format!("{kind} nodes have no '{}' property", path.property()),
        )
    })?;
    if let Some(c) = path.component() {
        if c.index() >= def.kind.arity() {
            return Err(SceneError::property(
                path,
                format!("{} property has no component {}", def.kind, c.index()),
            ));
        }
    }
    Ok(def)
}

/// Type rules for assignment: channels take floats, whole slots take their own
/// kind (a vec4 is accepted for a color slot). Non-finite numbers are refused.
fn check_value(def: &PropertyDef, path: &PropertyPath, value: &Value) -> Result<(), SceneError> {
    let (ok, expected) = match path.component() {
        Some(_) => (value.kind() == ValueKind::Float, ValueKind::Float),
        None => (
            value.kind() == def.kind
                || (def.kind == ValueKind::Color && value.kind() == ValueKind::Vec4),
            def.kind,
        ),
    };
    if !ok {
        return Err(SceneError::property(
            path,
            format!("expected {expected}, got {}", value.kind()),
        ));
    }
    if value.components().iter().any(|c| !c.is_finite()) {
        return Err(SceneError::property(path, "non-finite component"));
    }
    Ok(())
}

fn assign(node: &mut Node, path: &PropertyPath, value: Value) -> Result<(), SceneError> {
    let def = slot_def(node.kind, path)?;
    check_value(def, path, &value)?;
    let slot = node
        .properties
        .get_mut(def.name)
        .ok_or_else(|| SceneError::property(path, "slot missing on node"))?;
    match path.component() {
        Some(c) => {
            let x = value.as_float().unwrap_or_default();
            if let Some(dst) = slot.components_mut().get_mut(c.index()) {
                *dst = def.clamp.apply(x);
            }
        }
        None => {
            let mut v = match value {
                Value::Vec4(v) if def.kind == ValueKind::Color => Value::Color(v),
                other => other,
            };
            for c in v.components_mut() {
                *c = def.clamp.apply(*c);
            }
            *slot = v;
        }
    }
    Ok(())
}

#[derive(Debug)]
pub struct NodeStore {
    cfg: SceneConfig,
    nodes: SlotMap<NodeHandle, Node>,
    /// Parentless nodes in draw order.
    roots: Vec<NodeHandle>,
    ids: HashMap<String, NodeHandle>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl NodeStore {
    /// Create an empty store with the given limits.
    pub fn new(cfg: SceneConfig) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(cfg.capacity_hint),
            roots: Vec::new(),
            ids: HashMap::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.cfg
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// O(1) validity check; false for destroyed handles.
    #[inline]
    pub fn is_alive(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Borrow a live node record.
    pub fn node(&self, handle: NodeHandle) -> Result<&Node, SceneError> {
        self.nodes
            .get(handle)
            .ok_or(SceneError::InvalidHandle { handle })
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node, SceneError> {
        self.nodes
            .get_mut(handle)
            .ok_or(SceneError::InvalidHandle { handle })
    }

    /// Iterate all live nodes (slot order, not draw order).
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    fn ensure_capacity(&self, requested: usize) -> Result<(), SceneError> {
        let live = self.nodes.len();
        if live + requested > self.cfg.max_nodes {
            return Err(SceneError::ResourceExhausted {
                requested,
                live,
                limit: self.cfg.max_nodes,
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Allocation
    // ---------------------------------------------------------------------

    /// Allocate a parentless, unnamed node with defaults overridden by `initial`.
    ///
    /// Initial entries are property paths (`"color"`, `"position.x"`). They are
    /// validated before anything is allocated.
    pub fn create<K, I>(&mut self, kind: NodeKind, initial: I) -> Result<NodeHandle, SceneError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut node = Node::new(kind);
        for (path, value) in initial {
            let path = PropertyPath::parse(path.as_ref())?;
            assign(&mut node, &path, value)?;
        }
        self.ensure_capacity(1)?;
        let handle = self.attach(
            Pending {
                node,
                children: Vec::new(),
            },
            None,
            None,
        );
        trace!(?handle, %kind, "node created");
        Ok(handle)
    }

    /// Build a subtree from a template, keeping the template's ids.
    pub fn instantiate(&mut self, template: &NodeTemplate) -> Result<NodeHandle, SceneError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut duplicate: Option<String> = None;
        let ids = &self.ids;
        template.walk(&mut |t| {
            if duplicate.is_some() {
                return;
            }
            if let Some(id) = t.id.as_deref() {
                if !seen.insert(id) || ids.contains_key(id) {
                    duplicate = Some(id.to_string());
                }
            }
        });
        if let Some(id) = duplicate {
            return Err(SceneError::DuplicateId { id });
        }

        let pending = Self::pending_from_template(template)?;
        self.ensure_capacity(pending.count())?;
        let root = self.attach(pending, None, None);
        debug!(?root, nodes = template.node_count(), "template instantiated");
        Ok(root)
    }

    fn pending_from_template(t: &NodeTemplate) -> Result<Pending, SceneError> {
        let mut node = Node::new(t.kind);
        node.id = t.id.clone();
        for (path, value) in &t.properties {
            let path = PropertyPath::parse(path)?;
            assign(&mut node, &path, value.clone())?;
        }
        let children = t
            .children
            .iter()
            .map(Self::pending_from_template)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pending { node, children })
    }

    /// Deep-copy the subtree rooted at `handle`.
    ///
    /// Copies get fresh handles and no ids; the copy is inserted as the sibling
    /// directly after the original.
    pub fn clone_node(&mut self, handle: NodeHandle) -> Result<NodeHandle, SceneError> {
        let pending = self.snapshot(handle)?;
        self.ensure_capacity(pending.count())?;
        let parent = pending.node.parent;
        let index = self.draw_order(handle)? + 1;
        let copy = self.attach(pending, parent, Some(index));
        trace!(source = ?handle, ?copy, "subtree cloned");
        Ok(copy)
    }

    fn snapshot(&self, handle: NodeHandle) -> Result<Pending, SceneError> {
        let src = self.node(handle)?;
        let node = Node {
            kind: src.kind,
            id: None,
            properties: src.properties.clone(),
            parent: src.parent,
            children: Vec::new(),
        };
        let children = src
            .children
            .iter()
            .map(|c| self.snapshot(*c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pending { node, children })
    }

    /// Insert a validated subtree under `parent` at `index` (end when `None`).
    fn attach(
        &mut self,
        pending: Pending,
        parent: Option<NodeHandle>,
        index: Option<usize>,
    ) -> NodeHandle {
        let Pending { mut node, children } = pending;
        node.parent = parent;
        let id = node.id.clone();
        let handle = self.nodes.insert(node);
        if let Some(id) = id {
            self.ids.insert(id, handle);
        }
        if let Some(siblings) = self.siblings_mut(parent) {
            let at = index.unwrap_or(siblings.len()).min(siblings.len());
            siblings.insert(at, handle);
        }
        for child in children {
            self.attach(child, Some(handle), None);
        }
        handle
    }

    /// Destroy `handle` and all of its descendants.
    ///
    /// Idempotent: destroying a stale handle is a no-op returning an empty list.
    /// Returns every handle invalidated by this call (root first).
    pub fn destroy(&mut self, handle: NodeHandle) -> Vec<NodeHandle> {
        let parent = match self.nodes.get(handle) {
            Some(n) => n.parent,
            None => return Vec::new(),
        };
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|h| *h != handle);
        }
        let doomed = self.subtree(handle);
        for h in &doomed {
            if let Some(node) = self.nodes.remove(*h) {
                if let Some(id) = node.id {
                    self.ids.remove(&id);
                }
            }
        }
        debug!(?handle, removed = doomed.len(), "node subtree destroyed");
        doomed
    }

    /// `handle` and its descendants in pre-order (empty for stale handles).
    pub fn subtree(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            if let Some(node) = self.nodes.get(h) {
                out.push(h);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    // ---------------------------------------------------------------------
    // Ids
    // ---------------------------------------------------------------------

    pub fn get_by_id(&self, id: &str) -> Result<NodeHandle, SceneError> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| SceneError::NotFound { id: id.to_string() })
    }

    /// Name a node. Re-assigning a node's current id is a no-op.
    pub fn set_id(&mut self, handle: NodeHandle, id: impl Into<String>) -> Result<(), SceneError> {
        let id = id.into();
        self.node(handle)?;
        match self.ids.get(&id) {
            Some(owner) if *owner == handle => return Ok(()),
            Some(_) => return Err(SceneError::DuplicateId { id }),
            None => {}
        }
        let node = self.node_mut(handle)?;
        let previous = node.id.replace(id.clone());
        if let Some(previous) = previous {
            self.ids.remove(&previous);
        }
        self.ids.insert(id, handle);
        Ok(())
    }

    /// Remove a node's id, if it has one.
    pub fn clear_id(&mut self, handle: NodeHandle) -> Result<(), SceneError> {
        if let Some(previous) = self.node_mut(handle)?.id.take() {
            self.ids.remove(&previous);
        }
        Ok(())
    }

    pub fn id_of(&self, handle: NodeHandle) -> Result<Option<&str>, SceneError> {
        Ok(self.node(handle)?.id())
    }

    pub fn kind(&self, handle: NodeHandle) -> Result<NodeKind, SceneError> {
        Ok(self.node(handle)?.kind)
    }

    // ---------------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------------

    /// Read a property by path string (`"position.x"`, `"color"`).
    pub fn get_property(&self, handle: NodeHandle, path: &str) -> Result<Value, SceneError> {
        let node = self.node(handle)?;
        let path = PropertyPath::parse(path)?;
        Self::read_node(node, &path)
    }

    /// Write a property by path string. The slot's clamp policy is applied.
    pub fn set_property(
        &mut self,
        handle: NodeHandle,
        path: &str,
        value: Value,
    ) -> Result<(), SceneError> {
        self.node(handle)?;
        let path = PropertyPath::parse(path)?;
        self.write(handle, &path, value)
    }

    /// Read through an already parsed path.
    pub fn read(&self, handle: NodeHandle, path: &PropertyPath) -> Result<Value, SceneError> {
        Self::read_node(self.node(handle)?, path)
    }

    fn read_node(node: &Node, path: &PropertyPath) -> Result<Value, SceneError> {
        let def = slot_def(node.kind, path)?;
        let slot = node
            .properties
            .get(def.name)
            .ok_or_else(|| SceneError::property(path, "slot missing on node"))?;
        match path.component() {
            Some(c) => slot
                .component(c.index())
                .map(Value::Float)
                .ok_or_else(|| SceneError::property(path, "component out of range")),
            None => Ok(slot.clone()),
        }
    }

    /// Write through an already parsed path.
    pub fn write(
        &mut self,
        handle: NodeHandle,
        path: &PropertyPath,
        value: Value,
    ) -> Result<(), SceneError> {
        assign(self.node_mut(handle)?, path, value)
    }

    /// Check that `value` could be written to `path` on `handle`, without writing.
    /// Returns the slot's kind.
    pub fn validate_write(
        &self,
        handle: NodeHandle,
        path: &PropertyPath,
        value: &Value,
    ) -> Result<ValueKind, SceneError> {
        let def = slot_def(self.node(handle)?.kind, path)?;
        check_value(def, path, value)?;
        Ok(def.kind)
    }

    // ---------------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------------

    pub fn parent(&self, handle: NodeHandle) -> Result<Option<NodeHandle>, SceneError> {
        Ok(self.node(handle)?.parent)
    }

    pub fn children(&self, handle: NodeHandle) -> Result<&[NodeHandle], SceneError> {
        Ok(&self.node(handle)?.children)
    }

    /// Parentless nodes in draw order.
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    fn siblings(&self, parent: Option<NodeHandle>) -> Option<&Vec<NodeHandle>> {
        match parent {
            Some(p) => self.nodes.get(p).map(|n| &n.children),
            None => Some(&self.roots),
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeHandle>) -> Option<&mut Vec<NodeHandle>> {
        match parent {
            Some(p) => self.nodes.get_mut(p).map(|n| &mut n.children),
            None => Some(&mut self.roots),
        }
    }

    /// Index of the node among its siblings (roots count as siblings).
    pub fn draw_order(&self, handle: NodeHandle) -> Result<usize, SceneError> {
        let parent = self.node(handle)?.parent;
        self.siblings(parent)
            .and_then(|s| s.iter().position(|h| *h == handle))
            .ok_or(SceneError::InvalidHandle { handle })
    }

    /// Full draw list: roots in order, each parent before its children.
    pub fn draw_list(&self) -> Vec<NodeHandle> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            out.extend(self.subtree(*root));
        }
        out
    }

    /// True when `ancestor` lies on the parent chain of `node`.
    pub fn is_descendant(&self, node: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut cursor = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(h) = cursor {
            if h == ancestor {
                return true;
            }
            cursor = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Move `handle` (with its subtree) under `new_parent` at sibling `index`.
    ///
    /// `None` parent makes it a root; `None` index appends. Indices past the end
    /// are clamped. Fails with `CycleDetected` (hierarchy untouched) when the new
    /// parent is the node itself or one of its descendants.
    pub fn reparent(
        &mut self,
        handle: NodeHandle,
        new_parent: Option<NodeHandle>,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        let old_parent = self.node(handle)?.parent;
        if let Some(p) = new_parent {
            self.node(p)?;
            if p == handle || self.is_descendant(p, handle) {
                return Err(SceneError::CycleDetected {
                    node: handle,
                    new_parent: p,
                });
            }
        }
        if let Some(siblings) = self.siblings_mut(old_parent) {
            siblings.retain(|h| *h != handle);
        }
        if let Some(siblings) = self.siblings_mut(new_parent) {
            let at = index.unwrap_or(siblings.len()).min(siblings.len());
            siblings.insert(at, handle);
        }
        self.node_mut(handle)?.parent = new_parent;
        Ok(())
    }

    /// Place `handle` directly after `reference` in draw order (drawn above it).
    pub fn move_above(
        &mut self,
        handle: NodeHandle,
        reference: NodeHandle,
    ) -> Result<(), SceneError> {
        self.move_next_to(handle, reference, 1)
    }

    /// Place `handle` directly before `reference` in draw order (drawn below it).
    pub fn move_below(
        &mut self,
        handle: NodeHandle,
        reference: NodeHandle,
    ) -> Result<(), SceneError> {
        self.move_next_to(handle, reference, 0)
    }

    fn move_next_to(
        &mut self,
        handle: NodeHandle,
        reference: NodeHandle,
        offset: usize,
    ) -> Result<(), SceneError> {
        self.node(handle)?;
        if handle == reference {
            return Ok(());
        }
        let parent = self.node(reference)?.parent;
        self.reparent(handle, parent, None)?;
        // The reference index is taken with `handle` detached.
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|h| *h != handle);
            let at = siblings
                .iter()
                .position(|h| *h == reference)
                .map_or(siblings.len(), |i| i + offset);
            siblings.insert(at, handle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_props() -> Vec<(&'static str, Value)> {
        Vec::new()
    }

    #[test]
    fn create_applies_initial_properties_and_defaults() {
        let mut store = NodeStore::default();
        let h = store
            .create(NodeKind::Box, [("position.x", Value::Float(5.0))])
            .unwrap();
        assert_eq!(
            store.get_property(h, "position").unwrap(),
            Value::vec3(5.0, 0.0, 0.0)
        );
        assert_eq!(
            store.get_property(h, "color").unwrap(),
            Value::rgba(1.0, 1.0, 1.0, 1.0)
        );
        assert_eq!(store.id_of(h).unwrap(), None);
        assert_eq!(store.parent(h).unwrap(), None);
    }

    #[test]
    fn create_with_bad_initial_property_allocates_nothing() {
        let mut store = NodeStore::default();
        let err = store
            .create(NodeKind::Box, [("text", Value::text("nope"))])
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidProperty { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn vec4_is_accepted_for_color() {
        let mut store = NodeStore::default();
        let h = store.create(NodeKind::Box, no_props()).unwrap();
        store
            .set_property(h, "color", Value::vec4(0.5, 0.5, 0.5, 0.5))
            .unwrap();
        assert_eq!(
            store.get_property(h, "color").unwrap(),
            Value::rgba(0.5, 0.5, 0.5, 0.5)
        );
    }

    #[test]
    fn writes_apply_clamp_policy() {
        let mut store = NodeStore::default();
        let h = store.create(NodeKind::Pie, no_props()).unwrap();
        store.set_property(h, "color.a", Value::Float(1.7)).unwrap();
        store.set_property(h, "size.x", Value::Float(-3.0)).unwrap();
        store.set_property(h, "fill_angle", Value::Float(720.0)).unwrap();
        store.set_property(h, "position.y", Value::Float(-40.0)).unwrap();
        assert_eq!(store.get_property(h, "color.w").unwrap(), Value::Float(1.0));
        assert_eq!(store.get_property(h, "size.x").unwrap(), Value::Float(0.0));
        assert_eq!(
            store.get_property(h, "fill_angle").unwrap(),
            Value::Float(360.0)
        );
        assert_eq!(
            store.get_property(h, "position.y").unwrap(),
            Value::Float(-40.0)
        );
    }

    #[test]
    fn type_mismatches_are_invalid_property() {
        let mut store = NodeStore::default();
        let h = store.create(NodeKind::Text, no_props()).unwrap();
        for (path, value) in [
            ("position", Value::Float(1.0)),
            ("position.x", Value::vec2(1.0, 2.0)),
            ("text.x", Value::Float(1.0)),
            ("line_spacing.y", Value::Float(1.0)),
            ("position.w", Value::Float(1.0)),
            ("bogus", Value::Float(1.0)),
            ("position.x", Value::Float(f64::NAN)),
        ] {
            let err = store.set_property(h, path, value).unwrap_err();
            assert!(
                matches!(err, SceneError::InvalidProperty { .. }),
                "{path}: {err}"
            );
        }
    }

    #[test]
    fn draw_list_is_parent_before_children() {
        let mut store = NodeStore::default();
        let a = store.create(NodeKind::Box, no_props()).unwrap();
        let b = store.create(NodeKind::Box, no_props()).unwrap();
        let c = store.create(NodeKind::Box, no_props()).unwrap();
        store.reparent(c, Some(a), None).unwrap();
        assert_eq!(store.draw_list(), vec![a, c, b]);
        assert_eq!(store.draw_order(b).unwrap(), 1);
        assert_eq!(store.draw_order(c).unwrap(), 0);
    }

    #[test]
    fn move_above_and_below_reorder_siblings() {
        let mut store = NodeStore::default();
        let a = store.create(NodeKind::Box, no_props()).unwrap();
        let b = store.create(NodeKind::Box, no_props()).unwrap();
        let c = store.create(NodeKind::Box, no_props()).unwrap();
        store.move_below(c, a).unwrap();
        assert_eq!(store.roots(), &[c, a, b]);
        store.move_above(c, b).unwrap();
        assert_eq!(store.roots(), &[a, b, c]);
    }

    #[test]
    fn move_above_adopts_reference_parent() {
        let mut store = NodeStore::default();
        let panel = store.create(NodeKind::Box, no_props()).unwrap();
        let inner = store.create(NodeKind::Box, no_props()).unwrap();
        let loose = store.create(NodeKind::Text, no_props()).unwrap();
        store.reparent(inner, Some(panel), None).unwrap();
        store.move_above(loose, inner).unwrap();
        assert_eq!(store.parent(loose).unwrap(), Some(panel));
        assert_eq!(store.children(panel).unwrap(), &[inner, loose]);
        assert_eq!(store.roots(), &[panel]);
    }

    #[test]
    fn capacity_limit_is_fatal_and_checked_up_front() {
        let mut store = NodeStore::new(SceneConfig {
            max_nodes: 2,
            capacity_hint: 2,
        });
        let a = store.create(NodeKind::Box, no_props()).unwrap();
        store.create(NodeKind::Box, no_props()).unwrap();
        let err = store.create(NodeKind::Box, no_props()).unwrap_err();
        assert!(err.is_fatal());
        assert!(store.clone_node(a).unwrap_err().is_fatal());
        assert_eq!(store.len(), 2);
    }
}
