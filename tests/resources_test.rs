use std::fs;
use std::path::PathBuf;

use scenery_ngin::resources::{Resources, find_shader_source, mesh::parse_wavefront};

mod common;
use common::test_utils::init_logs;

const TRIANGLE_OBJ: &str = "\
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.25 0.25
f 1/1/1 2/1/1 3/1/1
";

const QUAD_OBJ: &str = "\
v -1.0 0.0 -1.0
v -1.0 0.0 1.0
v 1.0 0.0 1.0
v 1.0 0.0 -1.0
f 1 2 3 4
";

fn temp_root(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("scenery-resources-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

#[test]
fn parse_triangle_obj() {
    init_logs();
    let data = parse_wavefront(TRIANGLE_OBJ.as_bytes()).unwrap();
    assert_eq!(data.vertex_count, 3);
    assert_eq!(data.positions.len(), 9);
    assert_eq!(&data.positions[0..3], &[-1.0, -1.0, 0.0]);
    assert_eq!(&data.normals[0..3], &[0.0, 0.0, 1.0]);
    // The v coordinate is flipped for top-left uv origin.
    assert_eq!(&data.uvs[0..2], &[0.25, 0.75]);
}

#[test]
fn quads_are_triangulated_and_missing_attributes_default() {
    let data = parse_wavefront(QUAD_OBJ.as_bytes()).unwrap();
    assert_eq!(data.vertex_count, 6);
    assert!(data.normals.iter().all(|&n| n == 0.0));
    assert_eq!(data.uvs.len(), 12);
}

#[test]
fn find_resource_reports_misses_as_none() {
    let root = temp_root("miss");
    let resources = Resources::new(&root);

    assert!(resources.find_resource("nope.obj").is_none());

    fs::write(root.join("hit.obj"), TRIANGLE_OBJ).unwrap();
    assert_eq!(
        resources.find_resource("hit.obj").unwrap(),
        TRIANGLE_OBJ.as_bytes()
    );
    let mesh = resources.load_mesh("hit.obj").unwrap();
    assert_eq!(mesh.vertex_count, 3);
}

#[test]
fn list_obj_files_filters_and_sorts() {
    let root = temp_root("list");
    fs::write(root.join("b.obj"), TRIANGLE_OBJ).unwrap();
    fs::write(root.join("a.obj"), TRIANGLE_OBJ).unwrap();
    fs::write(root.join("texture.png"), b"not a mesh").unwrap();

    let resources = Resources::new(&root);
    assert_eq!(resources.list_obj_files(), vec!["a.obj", "b.obj"]);
}

#[test]
fn shader_sections_resolve_by_name() {
    let source = "\
#shader quad
fn quad() {}
#shader blur
fn blur() {}
#shader last
fn last() {}
";
    assert!(find_shader_source(source, "quad").unwrap().contains("fn quad"));
    assert!(!find_shader_source(source, "quad").unwrap().contains("fn blur"));
    assert!(find_shader_source(source, "blur").unwrap().contains("fn blur"));
    // The final section runs to end of input.
    assert!(find_shader_source(source, "last").unwrap().contains("fn last"));
    assert!(find_shader_source(source, "missing").is_none());
}
