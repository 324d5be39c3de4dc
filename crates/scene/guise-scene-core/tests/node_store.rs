use approx::assert_abs_diff_eq;
use guise_scene_core::{
    NodeHandle, NodeKind, NodeStore, NodeTemplate, SceneConfig, SceneError, Value,
};

fn plain(store: &mut NodeStore, kind: NodeKind) -> NodeHandle {
    store
        .create(kind, Vec::<(&str, Value)>::new())
        .expect("create node")
}

/// it should invalidate a destroyed node and every former descendant
#[test]
fn destroy_cascades_and_invalidates_handles() {
    let mut store = NodeStore::default();
    let root = plain(&mut store, NodeKind::Box);
    let child = plain(&mut store, NodeKind::Box);
    let grandchild = plain(&mut store, NodeKind::Text);
    let bystander = plain(&mut store, NodeKind::Box);
    store.reparent(child, Some(root), None).unwrap();
    store.reparent(grandchild, Some(child), None).unwrap();
    store.set_id(grandchild, "label").unwrap();

    let removed = store.destroy(root);
    assert_eq!(removed, vec![root, child, grandchild]);

    for h in [root, child, grandchild] {
        assert!(!store.is_alive(h));
        assert_eq!(
            store.get_property(h, "position").unwrap_err(),
            SceneError::InvalidHandle { handle: h }
        );
        assert!(matches!(
            store.set_property(h, "position.x", Value::Float(1.0)),
            Err(SceneError::InvalidHandle { .. })
        ));
        assert!(matches!(
            store.clone_node(h),
            Err(SceneError::InvalidHandle { .. })
        ));
        assert!(matches!(
            store.reparent(h, None, None),
            Err(SceneError::InvalidHandle { .. })
        ));
        assert!(matches!(
            store.set_id(h, "again"),
            Err(SceneError::InvalidHandle { .. })
        ));
    }

    // ids held by destroyed nodes are released
    assert!(matches!(
        store.get_by_id("label"),
        Err(SceneError::NotFound { .. })
    ));
    store.set_id(bystander, "label").unwrap();

    // idempotent
    assert!(store.destroy(root).is_empty());
    assert_eq!(store.len(), 1);
    assert_eq!(store.roots(), &[bystander]);
}

/// it should never hand out a handle equal to a destroyed one
#[test]
fn stale_handles_do_not_alias_new_nodes() {
    let mut store = NodeStore::default();
    let a = plain(&mut store, NodeKind::Box);
    store.destroy(a);
    let b = plain(&mut store, NodeKind::Box);
    assert_ne!(a, b);
    assert!(!store.is_alive(a));
    assert!(store.is_alive(b));
}

/// it should clone property values and subtree shape without ids, as the next sibling
#[test]
fn clone_copies_subtree_without_ids() {
    let mut store = NodeStore::default();
    let parent = plain(&mut store, NodeKind::Box);
    let b = store
        .create(
            NodeKind::Box,
            [
                ("color", Value::rgba(0.2, 0.4, 0.6, 1.0)),
                ("position", Value::vec3(10.0, 20.0, 0.0)),
            ],
        )
        .unwrap();
    let label = plain(&mut store, NodeKind::Text);
    let after = plain(&mut store, NodeKind::Box);
    store.reparent(b, Some(parent), None).unwrap();
    store.reparent(after, Some(parent), None).unwrap();
    store.reparent(label, Some(b), None).unwrap();
    store.set_id(b, "b").unwrap();
    store.set_id(label, "b_label").unwrap();
    store
        .set_property(label, "text", Value::text("hello"))
        .unwrap();

    let b2 = store.clone_node(b).unwrap();
    assert_ne!(b2, b);
    assert_eq!(store.id_of(b2).unwrap(), None);
    assert_eq!(store.parent(b2).unwrap(), Some(parent));
    assert_eq!(store.children(parent).unwrap(), &[b, b2, after]);
    assert_eq!(
        store.get_property(b2, "color").unwrap(),
        store.get_property(b, "color").unwrap()
    );

    let copies = store.children(b2).unwrap().to_vec();
    assert_eq!(copies.len(), 1);
    let label2 = copies[0];
    assert_ne!(label2, label);
    assert_eq!(store.id_of(label2).unwrap(), None);
    assert_eq!(store.kind(label2).unwrap(), NodeKind::Text);
    assert_eq!(
        store.get_property(label2, "text").unwrap(),
        Value::text("hello")
    );
    assert_eq!(store.get_by_id("b_label").unwrap(), label);
}

/// Scenario: create box B; clone(B) -> B2; set B2 color orange; B color unchanged
#[test]
fn mutating_clone_leaves_source_untouched() {
    let mut store = NodeStore::default();
    let b = plain(&mut store, NodeKind::Box);
    let original = store.get_property(b, "color").unwrap();
    let b2 = store.clone_node(b).unwrap();
    let orange = Value::rgba(1.0, 0.5, 0.0, 1.0);
    store.set_property(b2, "color", orange.clone()).unwrap();
    store
        .set_property(b2, "position.x", Value::Float(99.0))
        .unwrap();
    assert_eq!(store.get_property(b, "color").unwrap(), original);
    assert_eq!(store.get_property(b2, "color").unwrap(), orange);
    assert_eq!(
        store.get_property(b, "position.x").unwrap(),
        Value::Float(0.0)
    );
}

/// it should reject reparenting under a descendant and leave the hierarchy unchanged
#[test]
fn reparent_under_descendant_is_cycle() {
    let mut store = NodeStore::default();
    let a = plain(&mut store, NodeKind::Box);
    let b = plain(&mut store, NodeKind::Box);
    let c = plain(&mut store, NodeKind::Box);
    store.reparent(b, Some(a), None).unwrap();
    store.reparent(c, Some(b), None).unwrap();
    let before = store.draw_list();

    for target in [c, b, a] {
        let err = store.reparent(a, Some(target), Some(0)).unwrap_err();
        assert_eq!(
            err,
            SceneError::CycleDetected {
                node: a,
                new_parent: target
            }
        );
    }
    assert_eq!(store.draw_list(), before);
    assert_eq!(store.parent(a).unwrap(), None);
    assert_eq!(store.children(b).unwrap(), &[c]);
}

/// it should place a reparented node at the requested sibling index
#[test]
fn reparent_sets_draw_order_index() {
    let mut store = NodeStore::default();
    let parent = plain(&mut store, NodeKind::Box);
    let kids: Vec<_> = (0..3).map(|_| plain(&mut store, NodeKind::Box)).collect();
    for k in &kids {
        store.reparent(*k, Some(parent), None).unwrap();
    }
    let mover = plain(&mut store, NodeKind::Text);
    store.reparent(mover, Some(parent), Some(1)).unwrap();
    assert_eq!(store.draw_order(mover).unwrap(), 1);
    assert_eq!(
        store.children(parent).unwrap(),
        &[kids[0], mover, kids[1], kids[2]]
    );

    // out-of-range index appends
    store.reparent(kids[0], Some(parent), Some(99)).unwrap();
    assert_eq!(store.draw_order(kids[0]).unwrap(), 3);

    // back to root level
    store.reparent(mover, None, Some(0)).unwrap();
    assert_eq!(store.roots(), &[mover, parent]);
}

#[test]
fn id_lookup_and_collisions() {
    let mut store = NodeStore::default();
    let a = plain(&mut store, NodeKind::Box);
    let b = plain(&mut store, NodeKind::Box);
    store.set_id(a, "play").unwrap();
    assert_eq!(store.get_by_id("play").unwrap(), a);
    assert_eq!(
        store.set_id(b, "play").unwrap_err(),
        SceneError::DuplicateId { id: "play".into() }
    );
    // re-assigning the same id is fine
    store.set_id(a, "play").unwrap();

    // renaming frees the old id
    store.set_id(a, "start").unwrap();
    assert!(store.get_by_id("play").is_err());
    store.set_id(b, "play").unwrap();

    store.clear_id(b).unwrap();
    assert_eq!(
        store.get_by_id("play").unwrap_err(),
        SceneError::NotFound { id: "play".into() }
    );
}

/// it should build a named hierarchy from a template fixture
#[test]
fn instantiate_hud_template() {
    let template: NodeTemplate = guise_test_fixtures::templates::load("hud").unwrap();
    let mut store = NodeStore::default();
    let hud = store.instantiate(&template).unwrap();

    assert_eq!(store.get_by_id("hud").unwrap(), hud);
    let score = store.get_by_id("score").unwrap();
    let health = store.get_by_id("health").unwrap();
    assert_eq!(store.children(hud).unwrap(), &[score, health]);
    assert_eq!(store.len(), 4);
    assert_eq!(
        store.get_property(score, "text").unwrap(),
        Value::text("0")
    );
    assert_eq!(
        store.get_property(score, "position").unwrap(),
        Value::vec3(16.0, 0.0, 0.0)
    );
    assert_eq!(
        store.get_property(health, "fill_angle").unwrap(),
        Value::Float(270.0)
    );

    // unnamed template children stay unnamed
    let pip = store.children(health).unwrap()[0];
    assert_eq!(store.id_of(pip).unwrap(), None);

    // a second instantiation collides on ids and allocates nothing
    let err = store.instantiate(&template).unwrap_err();
    assert_eq!(err, SceneError::DuplicateId { id: "hud".into() });
    assert_eq!(store.len(), 4);
}

#[test]
fn instantiate_rejects_ids_repeated_inside_template() {
    let template: NodeTemplate = guise_test_fixtures::templates::load("duplicate-ids").unwrap();
    let mut store = NodeStore::default();
    let err = store.instantiate(&template).unwrap_err();
    assert_eq!(
        err,
        SceneError::DuplicateId {
            id: "button".into()
        }
    );
    assert!(store.is_empty());
}

#[test]
fn instantiate_respects_node_limit() {
    let template: NodeTemplate = guise_test_fixtures::templates::load("hud").unwrap();
    let mut store = NodeStore::new(SceneConfig {
        max_nodes: 3,
        capacity_hint: 3,
    });
    let err = store.instantiate(&template).unwrap_err();
    assert!(err.is_fatal());
    assert!(store.is_empty());
}

/// it should clamp on write per property and accept a vec4 in a color slot
#[test]
fn writes_are_clamped_per_property() {
    let mut store = NodeStore::default();
    let pie = plain(&mut store, NodeKind::Pie);

    store
        .set_property(pie, "color", Value::vec4(1.4, -0.2, 0.25, 0.5))
        .unwrap();
    assert_eq!(
        store.get_property(pie, "color").unwrap(),
        Value::rgba(1.0, 0.0, 0.25, 0.5)
    );

    store.set_property(pie, "color.a", Value::Float(0.1 + 0.2)).unwrap();
    let alpha = store.get_property(pie, "color.w").unwrap().as_float().unwrap();
    assert_abs_diff_eq!(alpha, 0.3, epsilon = 1e-12);

    store.set_property(pie, "size.x", Value::Float(-3.0)).unwrap();
    store.set_property(pie, "fill_angle", Value::Float(400.0)).unwrap();
    store.set_property(pie, "position.x", Value::Float(-5.0)).unwrap();
    let read = |path: &str| store.get_property(pie, path).unwrap().as_float().unwrap();
    assert_abs_diff_eq!(read("size.x"), 0.0);
    assert_abs_diff_eq!(read("fill_angle"), 360.0);
    assert_abs_diff_eq!(read("position.x"), -5.0);
}
