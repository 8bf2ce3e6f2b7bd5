use cgmath::Vector3;
use scenery_ngin::data_structures::{
    arena::VertexArena,
    model::ModelRegistry,
    scene::{MAX_ENTITIES, SceneTable, snap_position},
};

mod common;
use common::test_utils::{fixed_loader, floor_mesh, init_logs, triangle_mesh};

fn setup() -> (SceneTable, ModelRegistry, VertexArena) {
    init_logs();
    let mut registry = ModelRegistry::new();
    let mut arena = VertexArena::new();

    let floor = registry
        .get_or_load("floor.obj", &mut arena, fixed_loader(floor_mesh()))
        .unwrap();
    let lamp = registry
        .get_or_load("lamp.obj", &mut arena, fixed_loader(triangle_mesh()))
        .unwrap();
    registry.set_emission(lamp, Vector3::new(1.0, 0.9, 0.7));
    assert_eq!((floor, lamp), (0, 1));

    (SceneTable::new(), registry, arena)
}

#[test]
fn add_entity_registers_roles() {
    let (mut scene, registry, _arena) = setup();

    let floor = scene.add_entity(&registry, 0, None).unwrap();
    let lamp = scene
        .add_entity(&registry, 1, Some(Vector3::new(0.0, 2.0, 0.0)))
        .unwrap();

    assert_eq!(scene.renderable(), &[floor, lamp]);
    // Emissive models land in both role lists, exactly once each.
    assert_eq!(scene.lights(), &[lamp]);
    assert_eq!(scene.transform(lamp).unwrap().pos, Vector3::new(0.0, 2.0, 0.0));
}

#[test]
fn remove_entity_rewrites_swapped_id() {
    let (mut scene, registry, _arena) = setup();

    let a = scene.add_entity(&registry, 0, None).unwrap();
    let _b = scene.add_entity(&registry, 0, None).unwrap();
    let lamp = scene.add_entity(&registry, 1, None).unwrap();
    assert_eq!(lamp, 2);

    // Removing the first entity swaps the lamp into slot 0; both role lists
    // must now call it by its new id.
    scene.remove_entity(a);
    assert_eq!(scene.entity_count(), 2);
    assert!(scene.renderable().contains(&0));
    assert!(scene.renderable().contains(&1));
    assert_eq!(scene.lights(), &[0]);
}

#[test]
fn remove_last_entity_needs_no_rewrite() {
    let (mut scene, registry, _arena) = setup();

    let _a = scene.add_entity(&registry, 0, None).unwrap();
    let b = scene.add_entity(&registry, 1, None).unwrap();

    scene.remove_entity(b);
    assert_eq!(scene.entity_count(), 1);
    assert_eq!(scene.renderable(), &[0]);
    assert!(scene.lights().is_empty());
}

#[test]
fn remove_clears_selection() {
    let (mut scene, registry, _arena) = setup();

    let a = scene.add_entity(&registry, 0, None).unwrap();
    scene.select(Some(a));
    assert_eq!(scene.current_entity, Some(a));

    scene.remove_current();
    assert_eq!(scene.current_entity, None);
    assert_eq!(scene.highlighted_entity, None);
    assert_eq!(scene.entity_count(), 0);

    // Without a selection nothing happens.
    scene.remove_current();
    assert_eq!(scene.entity_count(), 0);
}

#[test]
fn remove_out_of_range_is_noop() {
    let (mut scene, registry, _arena) = setup();
    scene.add_entity(&registry, 0, None).unwrap();

    scene.remove_entity(42);
    assert_eq!(scene.entity_count(), 1);
    assert_eq!(scene.renderable(), &[0]);
}

#[test]
fn duplicate_copies_transform_and_roles() {
    let (mut scene, registry, _arena) = setup();

    let lamp = scene
        .add_entity(&registry, 1, Some(Vector3::new(3.0, 1.0, -2.0)))
        .unwrap();
    let copy = scene.duplicate(&registry, lamp).unwrap();

    assert_ne!(copy, lamp);
    assert_eq!(scene.transform(copy).unwrap().pos, Vector3::new(3.0, 1.0, -2.0));
    assert_eq!(scene.lights(), &[lamp, copy]);
    assert_eq!(scene.current_entity, Some(copy));
    assert_eq!(scene.highlighted_entity, Some(copy));
}

#[test]
fn select_invalid_clears() {
    let (mut scene, registry, _arena) = setup();
    let a = scene.add_entity(&registry, 0, None).unwrap();

    scene.select(Some(a));
    scene.select(Some(99));
    assert_eq!(scene.current_entity, None);
    assert_eq!(scene.highlighted_entity, None);
}

#[test]
fn rotate_current_updates_matrix() {
    let (mut scene, registry, _arena) = setup();
    let a = scene.add_entity(&registry, 0, None).unwrap();

    scene.rotate_current(1, 90.0);
    assert_eq!(scene.transform(a).unwrap().rot.y, 0.0, "no selection, no rotation");

    scene.select(Some(a));
    scene.rotate_current(1, 90.0);
    assert_eq!(scene.transform(a).unwrap().rot.y, 90.0);

    // A 90 degree yaw turns +x into -z.
    let m = scene.transform(a).unwrap().matrix();
    let x = m * cgmath::Vector4::new(1.0, 0.0, 0.0, 0.0);
    assert!(x.x.abs() < 1.0e-6 && (x.z + 1.0).abs() < 1.0e-6);
}

#[test]
fn entity_table_is_bounded() {
    let (mut scene, registry, _arena) = setup();

    for _ in 0..MAX_ENTITIES {
        assert!(scene.add_entity(&registry, 0, None).is_some());
    }
    assert!(scene.add_entity(&registry, 0, None).is_none());
    assert_eq!(scene.entity_count(), MAX_ENTITIES);
}

#[test]
fn clear_keeps_models() {
    let (mut scene, registry, _arena) = setup();
    scene.add_entity(&registry, 0, None).unwrap();
    scene.add_entity(&registry, 1, None).unwrap();

    scene.clear();
    assert_eq!(scene.entity_count(), 0);
    assert!(scene.renderable().is_empty());
    assert!(scene.lights().is_empty());
    assert_eq!(registry.len(), 2);
}

#[test]
fn three_entities_share_one_model_with_distinct_uniforms() {
    let (mut scene, registry, arena) = setup();
    assert_eq!(arena.len(), 9, "floor quad plus lamp triangle");

    let positions = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(2.0, 0.0, 0.0),
        Vector3::new(-2.0, 0.0, 3.0),
    ];
    for pos in positions {
        scene.add_entity(&registry, 0, Some(pos)).unwrap();
    }
    assert_eq!(scene.renderable(), &[0, 1, 2]);

    // All three draw the same vertex range but carry their own translation
    // in the uniform record.
    let model = registry.get(0).unwrap();
    assert_eq!((model.offset, model.len), (0, 6));
    for (entity, pos) in positions.iter().enumerate() {
        let uniform = scenery_ngin::pipelines::geometry::EntityUniform::new(
            scene.transform(entity).unwrap().matrix(),
            [0.0; 3],
            model.material,
        );
        assert_eq!(uniform.model[3], [pos.x, pos.y, pos.z, 1.0]);
    }
}

#[test]
fn snap_rounds_down_to_grid() {
    assert_eq!(
        snap_position(Vector3::new(1.7, -0.3, 2.0), 0.5),
        Vector3::new(1.5, -0.5, 2.0)
    );
}
