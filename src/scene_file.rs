//! Scene persistence as JSON.
//!
//! A scene file stores one record per entity (model filename plus transform
//! components) and the role-index lists as they were at save time. Loading
//! does not trust the stored lists: it replays `add_entity` record by record,
//! which rebuilds the lists from model properties, then compares them against
//! the stored ones so divergence between file and loader shows up in the log
//! instead of as corrupted state.

use std::path::Path;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::data_structures::arena::VertexArena;
use crate::data_structures::model::ModelRegistry;
use crate::data_structures::scene::SceneTable;
use crate::resources::Resources;

#[derive(Debug, Serialize, Deserialize)]
pub struct EntityRecord {
    pub model: String,
    pub pos: [f32; 3],
    pub rot: [f32; 3],
    pub scale: [f32; 3],
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SceneFile {
    pub name: String,
    pub entity_list: Vec<EntityRecord>,
    pub e_model_list: Vec<usize>,
    pub e_light_list: Vec<usize>,
}

/// Serialize the live scene to `path`.
pub fn save_scene(
    path: &Path,
    name: &str,
    scene: &SceneTable,
    registry: &ModelRegistry,
) -> anyhow::Result<()> {
    let mut entity_list = Vec::with_capacity(scene.entity_count());
    for entity in 0..scene.entity_count() {
        let model = scene
            .model_of(entity)
            .and_then(|id| registry.get(id))
            .map(|m| m.name.clone())
            .unwrap_or_default();
        let t = match scene.transform(entity) {
            Some(t) => *t,
            None => continue,
        };
        entity_list.push(EntityRecord {
            model,
            pos: t.pos.into(),
            rot: t.rot.into(),
            scale: t.scale.into(),
        });
    }

    let file = SceneFile {
        name: name.to_string(),
        entity_list,
        e_model_list: scene.renderable().to_vec(),
        e_light_list: scene.lights().to_vec(),
    };

    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, json)?;
    log::info!("saved scene {} ({} entities)", name, file.entity_list.len());
    Ok(())
}

/// Replace the live scene with the contents of `path`.
///
/// The current scene is cleared first, then every record is replayed through
/// [`SceneTable::add_entity`], loading models on demand. Records whose model
/// cannot be loaded are skipped with a warning. Stored role lists are
/// validated against the rebuilt ones, never applied.
pub fn load_scene(
    path: &Path,
    scene: &mut SceneTable,
    registry: &mut ModelRegistry,
    arena: &mut VertexArena,
    resources: &Resources,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)?;
    let file: SceneFile = serde_json::from_str(&json)?;

    scene.clear();
    for record in &file.entity_list {
        let Some(model) = registry.get_or_load(&record.model, arena, |name| {
            resources.load_mesh(name)
        }) else {
            log::warn!("skipping entity with unavailable model {}", record.model);
            continue;
        };
        let Some(id) = scene.add_entity(registry, model, None) else {
            break;
        };
        if let Some(t) = scene.transform_mut(id) {
            t.pos = Vector3::from(record.pos);
            t.rot = Vector3::from(record.rot);
            t.scale = Vector3::from(record.scale);
            t.update();
        }
    }

    if scene.renderable() != file.e_model_list.as_slice() {
        log::warn!("scene {}: stored renderable list diverges from rebuilt one", file.name);
    }
    if scene.lights() != file.e_light_list.as_slice() {
        log::warn!("scene {}: stored light list diverges from rebuilt one", file.name);
    }

    log::info!("loaded scene {} ({} entities)", file.name, scene.entity_count());
    Ok(())
}
