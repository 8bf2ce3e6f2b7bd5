//! Loaded models and the filename-deduplicated model registry.

use cgmath::{Vector3, Zero};

use crate::data_structures::arena::VertexArena;
use crate::resources::mesh::MeshData;

/// Index into [`ModelRegistry`].
pub type ModelId = usize;

/// Index into the render context's material texture table.
pub type TextureId = usize;

/// Upper bound on loaded models. Scenes are authored by hand, so the table
/// stays small and filename lookup is a linear scan.
pub const MAX_MODELS: usize = 32;

/// How a model's surface is coloured in the geometry pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Material {
    /// Flat white, modulated only by lighting.
    Untextured,
    /// Sampled from the bound texture.
    Textured(TextureId),
}

impl Material {
    /// The mix uniform consumed by the geometry shader: 1.0 selects the
    /// white constant, 0.0 selects the sampled texture.
    pub fn mix_factor(&self) -> f32 {
        match self {
            Material::Untextured => 1.0,
            Material::Textured(_) => 0.0,
        }
    }
}

/// A named mesh occupying `[offset, offset + len)` vertices in the arena.
///
/// Immutable after load except for its material/emission/wireframe settings.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    pub offset: u32,
    pub len: u32,
    pub material: Material,
    pub emission: Vector3<f32>,
    pub wireframe: bool,
}

impl Model {
    pub fn is_emissive(&self) -> bool {
        !self.emission.is_zero()
    }
}

/// Flat model table. Re-requesting an already loaded filename returns the
/// existing id, so model ids are stable for the process lifetime.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<Model>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id)
    }

    pub fn find(&self, name: &str) -> Option<ModelId> {
        self.models.iter().position(|m| m.name == name)
    }

    /// Return the id for `name`, loading and appending its mesh into the
    /// arena on first request.
    ///
    /// `load` resolves the filename to parsed mesh data; it is only invoked
    /// on a registry miss. Returns `None` when the mesh is unavailable, the
    /// arena rejects the append or the model table is full — all logged, none
    /// fatal.
    pub fn get_or_load(
        &mut self,
        name: &str,
        arena: &mut VertexArena,
        load: impl FnOnce(&str) -> Option<MeshData>,
    ) -> Option<ModelId> {
        if let Some(id) = self.find(name) {
            return Some(id);
        }
        if self.models.len() >= MAX_MODELS {
            log::error!("model table full ({} entries), dropping {}", MAX_MODELS, name);
            return None;
        }

        let mesh = load(name)?;
        let offset = arena.append(&mesh.positions, &mesh.normals, &mesh.uvs, mesh.vertex_count)?;

        let id = self.models.len();
        self.models.push(Model {
            name: name.to_string(),
            offset,
            len: mesh.vertex_count as u32,
            material: Material::Untextured,
            emission: Vector3::zero(),
            wireframe: false,
        });
        log::info!("loaded model {} ({} vertices) as id {}", name, mesh.vertex_count, id);

        Some(id)
    }

    pub fn set_texture(&mut self, id: ModelId, texture: TextureId) {
        if let Some(model) = self.models.get_mut(id) {
            model.material = Material::Textured(texture);
        }
    }

    pub fn set_emission(&mut self, id: ModelId, emission: Vector3<f32>) {
        if let Some(model) = self.models.get_mut(id) {
            model.emission = emission;
        }
    }

    pub fn set_wireframe(&mut self, id: ModelId, wireframe: bool) {
        if let Some(model) = self.models.get_mut(id) {
            model.wireframe = wireframe;
        }
    }

    pub fn is_emissive(&self, id: ModelId) -> bool {
        self.get(id).map(Model::is_emissive).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModelId, &Model)> {
        self.models.iter().enumerate()
    }
}
