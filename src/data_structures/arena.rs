//! Append-only vertex attribute arena.
//!
//! All loaded meshes share one set of parallel attribute streams: position
//! (3 floats), normal (3 floats) and uv (2 floats) per vertex. Models refer
//! into the arena by vertex offset and length, so indices stay valid across
//! growth and no per-model GPU buffers are needed.

/// Starting capacity in vertices. Growth doubles from here.
pub const INITIAL_CAPACITY: usize = 1024;

/// Growable storage for position/normal/uv streams, indexed by vertex.
///
/// The arena never shrinks and never frees: models reference `[offset,
/// offset + len)` ranges for the lifetime of the process. Appends are
/// all-or-nothing; a rejected append leaves previously stored data untouched.
#[derive(Debug)]
pub struct VertexArena {
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
    len: usize,
    capacity: usize,
}

impl VertexArena {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: vec![0.0; capacity * 3],
            normals: vec![0.0; capacity * 3],
            uvs: vec![0.0; capacity * 2],
            len: 0,
            capacity,
        }
    }

    /// Number of vertices stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current capacity in vertices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append `count` vertices given as parallel attribute slices and return
    /// the starting vertex offset of the new range.
    ///
    /// Returns `None` (and logs) when the slices don't agree with `count`;
    /// nothing is written in that case.
    pub fn append(
        &mut self,
        positions: &[f32],
        normals: &[f32],
        uvs: &[f32],
        count: usize,
    ) -> Option<u32> {
        if positions.len() != count * 3 || normals.len() != count * 3 || uvs.len() != count * 2 {
            log::error!(
                "dropping vertex append: stream lengths {}/{}/{} don't match vertex count {}",
                positions.len(),
                normals.len(),
                uvs.len(),
                count
            );
            return None;
        }

        // All three streams grow together so they always share one capacity.
        while self.len + count > self.capacity {
            self.capacity *= 2;
        }
        self.positions.resize(self.capacity * 3, 0.0);
        self.normals.resize(self.capacity * 3, 0.0);
        self.uvs.resize(self.capacity * 2, 0.0);

        let offset = self.len;
        self.positions[offset * 3..offset * 3 + count * 3].copy_from_slice(positions);
        self.normals[offset * 3..offset * 3 + count * 3].copy_from_slice(normals);
        self.uvs[offset * 2..offset * 2 + count * 2].copy_from_slice(uvs);
        self.len += count;

        Some(offset as u32)
    }

    /// Position stream for the stored vertices (3 floats per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.len * 3]
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals[..self.len * 3]
    }

    pub fn uvs(&self) -> &[f32] {
        &self.uvs[..self.len * 2]
    }

    /// Position of one vertex.
    pub fn position(&self, vertex: usize) -> [f32; 3] {
        let i = vertex * 3;
        [self.positions[i], self.positions[i + 1], self.positions[i + 2]]
    }

    /// Interleave the streams into `position + normal + uv` vertex records
    /// for upload into a single GPU vertex buffer.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.len * 8);
        for i in 0..self.len {
            data.extend_from_slice(&self.positions[i * 3..i * 3 + 3]);
            data.extend_from_slice(&self.normals[i * 3..i * 3 + 3]);
            data.extend_from_slice(&self.uvs[i * 2..i * 2 + 2]);
        }
        data
    }
}

impl Default for VertexArena {
    fn default() -> Self {
        Self::new()
    }
}
