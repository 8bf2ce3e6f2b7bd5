//! Shared helpers for the integration tests: log setup and small hand-built
//! meshes so no test depends on files on disk.

use scenery_ngin::resources::mesh::MeshData;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A single triangle in the xy plane, spanning (-1,-1)..(1,1) at z = 0.
pub fn triangle_mesh() -> MeshData {
    MeshData {
        positions: vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        uvs: vec![0.0, 1.0, 1.0, 1.0, 0.5, 0.0],
        vertex_count: 3,
    }
}

/// A 2x2 floor quad as two triangles at y = 0.
pub fn floor_mesh() -> MeshData {
    let positions = vec![
        -1.0, 0.0, -1.0, -1.0, 0.0, 1.0, 1.0, 0.0, 1.0, //
        -1.0, 0.0, -1.0, 1.0, 0.0, 1.0, 1.0, 0.0, -1.0,
    ];
    let normals = [0.0, 1.0, 0.0].repeat(6);
    let uvs = vec![
        0.0, 0.0, 0.0, 1.0, 1.0, 1.0, //
        0.0, 0.0, 1.0, 1.0, 1.0, 0.0,
    ];
    MeshData {
        positions,
        normals,
        uvs,
        vertex_count: 6,
    }
}

/// Loader closure for `ModelRegistry::get_or_load` that serves one in-memory
/// mesh regardless of the requested name.
pub fn fixed_loader(mesh: MeshData) -> impl FnOnce(&str) -> Option<MeshData> {
    move |_name| Some(mesh)
}
