use std::fs;
use std::path::PathBuf;

use cgmath::Vector3;
use scenery_ngin::data_structures::{arena::VertexArena, model::ModelRegistry, scene::SceneTable};
use scenery_ngin::resources::Resources;
use scenery_ngin::scene_file::{load_scene, save_scene};

mod common;
use common::test_utils::init_logs;

const TRIANGLE_OBJ: &str = "\
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
f 1/1/1 2/1/1 3/1/1
";

const EPS: f32 = 1.0e-5;

fn temp_root(tag: &str) -> PathBuf {
    let root =
        std::env::temp_dir().join(format!("scenery-scene-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

fn assert_vec_close(a: Vector3<f32>, b: Vector3<f32>) {
    assert!((a - b).map(f32::abs).x < EPS, "{:?} != {:?}", a, b);
    assert!((a - b).map(f32::abs).y < EPS, "{:?} != {:?}", a, b);
    assert!((a - b).map(f32::abs).z < EPS, "{:?} != {:?}", a, b);
}

#[test]
fn save_and_load_round_trip() {
    init_logs();
    let root = temp_root("roundtrip");
    fs::write(root.join("tri.obj"), TRIANGLE_OBJ).unwrap();
    fs::write(root.join("lamp.obj"), TRIANGLE_OBJ).unwrap();
    let resources = Resources::new(&root);

    let mut registry = ModelRegistry::new();
    let mut arena = VertexArena::new();
    let tri = registry
        .get_or_load("tri.obj", &mut arena, |n| resources.load_mesh(n))
        .unwrap();
    let lamp = registry
        .get_or_load("lamp.obj", &mut arena, |n| resources.load_mesh(n))
        .unwrap();
    registry.set_emission(lamp, Vector3::new(1.0, 0.8, 0.6));

    let mut scene = SceneTable::new();
    let a = scene
        .add_entity(&registry, tri, Some(Vector3::new(1.0, 0.0, -3.0)))
        .unwrap();
    scene.add_entity(&registry, lamp, Some(Vector3::new(0.0, 4.0, 0.0))).unwrap();
    {
        let t = scene.transform_mut(a).unwrap();
        t.rot = Vector3::new(0.0, 45.0, 0.0);
        t.scale = Vector3::new(2.0, 2.0, 2.0);
        t.update();
    }

    let path = root.join("scene.json");
    save_scene(&path, "roundtrip", &scene, &registry).unwrap();

    // Load into a fresh world.
    let mut registry2 = ModelRegistry::new();
    let mut arena2 = VertexArena::new();
    let mut scene2 = SceneTable::new();
    load_scene(&path, &mut scene2, &mut registry2, &mut arena2, &resources).unwrap();

    assert_eq!(scene2.entity_count(), 2);
    assert_eq!(scene2.renderable(), scene.renderable());
    assert_eq!(scene2.lights(), scene.lights());

    let t = scene2.transform(0).unwrap();
    assert_vec_close(t.pos, Vector3::new(1.0, 0.0, -3.0));
    assert_vec_close(t.rot, Vector3::new(0.0, 45.0, 0.0));
    assert_vec_close(t.scale, Vector3::new(2.0, 2.0, 2.0));

    // Model names were resolved through the registry again.
    assert_eq!(registry2.get(scene2.model_of(1).unwrap()).unwrap().name, "lamp.obj");
}

#[test]
fn load_replaces_existing_scene() {
    let root = temp_root("replace");
    fs::write(root.join("tri.obj"), TRIANGLE_OBJ).unwrap();
    let resources = Resources::new(&root);

    let mut registry = ModelRegistry::new();
    let mut arena = VertexArena::new();
    let tri = registry
        .get_or_load("tri.obj", &mut arena, |n| resources.load_mesh(n))
        .unwrap();

    let mut scene = SceneTable::new();
    scene.add_entity(&registry, tri, None).unwrap();
    let path = root.join("one.json");
    save_scene(&path, "one", &scene, &registry).unwrap();

    // Grow the scene, then load the one-entity file back over it.
    scene.add_entity(&registry, tri, None).unwrap();
    scene.add_entity(&registry, tri, None).unwrap();
    scene.select(Some(2));

    load_scene(&path, &mut scene, &mut registry, &mut arena, &resources).unwrap();
    assert_eq!(scene.entity_count(), 1);
    assert_eq!(scene.current_entity, None);
}

#[test]
fn unavailable_models_are_skipped() {
    let root = temp_root("skip");
    fs::write(root.join("tri.obj"), TRIANGLE_OBJ).unwrap();
    let resources = Resources::new(&root);

    let json = serde_json::json!({
        "name": "partial",
        "entity_list": [
            { "model": "ghost.obj", "pos": [0.0, 0.0, 0.0], "rot": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0] },
            { "model": "tri.obj", "pos": [5.0, 0.0, 0.0], "rot": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0] },
        ],
        "e_model_list": [0, 1],
        "e_light_list": [],
    });
    let path = root.join("partial.json");
    fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

    let mut registry = ModelRegistry::new();
    let mut arena = VertexArena::new();
    let mut scene = SceneTable::new();
    load_scene(&path, &mut scene, &mut registry, &mut arena, &resources).unwrap();

    assert_eq!(scene.entity_count(), 1, "the ghost entity is dropped");
    assert_vec_close(
        scene.transform(0).unwrap().pos,
        Vector3::new(5.0, 0.0, 0.0),
    );
}
