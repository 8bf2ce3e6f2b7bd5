//! Wavefront OBJ parsing into flat vertex streams.

use std::io::{BufReader, Cursor};

/// Parsed, already triangulated mesh data in parallel attribute streams.
///
/// The streams are de-indexed: three vertices per triangle, ready to append
/// into the vertex arena and draw without an index buffer.
#[derive(Debug, Default)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub vertex_count: usize,
}

/// Parse OBJ file contents. N-gon faces are fanned into triangles by the
/// loader; missing normals/uvs fall back to zero so partially specified
/// meshes still load. Multi-object files are concatenated into one stream.
pub fn parse_wavefront(bytes: &[u8]) -> anyhow::Result<MeshData> {
    let mut reader = BufReader::new(Cursor::new(bytes));
    // Textures are assigned per model from the outside, so material library
    // references in the file are ignored.
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_path| {
        Ok((Vec::new(), std::collections::HashMap::new()))
    })?;

    let mut data = MeshData::default();
    for m in &models {
        let mesh = &m.mesh;
        for &index in &mesh.indices {
            let i = index as usize;
            data.positions.extend_from_slice(&[
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ]);
            data.normals.extend_from_slice(&[
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ]);
            // OBJ uv origin is bottom-left, wgpu samples top-left.
            data.uvs.extend_from_slice(&[
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ]);
        }
    }
    data.vertex_count = data.positions.len() / 3;

    Ok(data)
}
