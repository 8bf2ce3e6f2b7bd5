//! Flat entity table with role-index lists.
//!
//! Entities are dense: an entity id is its index into the parallel
//! transform/model columns. Role lists (`renderable`, `lights`) hold entity
//! ids, not entities, so one entity may participate in several rendering
//! categories. Removal swap-fills from the end, which renames the previously
//! last entity — every role-list occurrence of the old last id has to be
//! rewritten to the vacated slot. That rewrite is the central invariant of
//! this module and lives in exactly one place, [`SceneTable::remove_entity`].

use cgmath::Vector3;

use crate::data_structures::{model::{ModelId, ModelRegistry}, transform::Transform};

/// Upper bound on placed entities.
pub const MAX_ENTITIES: usize = 1024;

/// The scene: entity columns, role lists and selection state.
#[derive(Debug, Default)]
pub struct SceneTable {
    transforms: Vec<Transform>,
    models: Vec<ModelId>,
    renderable: Vec<usize>,
    lights: Vec<usize>,
    /// Entity the editor is operating on, if any.
    pub current_entity: Option<usize>,
    /// Entity drawn with the outline overlay, if any.
    pub highlighted_entity: Option<usize>,
}

impl SceneTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_count(&self) -> usize {
        self.transforms.len()
    }

    /// Entity ids participating in the geometry/shadow passes.
    pub fn renderable(&self) -> &[usize] {
        &self.renderable
    }

    /// Entity ids treated as point lights.
    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    pub fn transform(&self, entity: usize) -> Option<&Transform> {
        self.transforms.get(entity)
    }

    pub fn transform_mut(&mut self, entity: usize) -> Option<&mut Transform> {
        self.transforms.get_mut(entity)
    }

    pub fn model_of(&self, entity: usize) -> Option<ModelId> {
        self.models.get(entity).copied()
    }

    /// Append a new entity referencing `model`, registered as renderable and
    /// additionally as a light when the model is emissive.
    ///
    /// Returns `None` when the entity table is full (logged drop).
    pub fn add_entity(
        &mut self,
        registry: &ModelRegistry,
        model: ModelId,
        pos: Option<Vector3<f32>>,
    ) -> Option<usize> {
        if self.transforms.len() >= MAX_ENTITIES {
            log::error!("entity table full ({} entries), dropping entity", MAX_ENTITIES);
            return None;
        }

        let id = self.transforms.len();
        let transform = match pos {
            Some(pos) => Transform::from_position(pos),
            None => Transform::new(),
        };
        self.transforms.push(transform);
        self.models.push(model);

        self.renderable.push(id);
        if registry.is_emissive(model) {
            self.lights.push(id);
        }

        Some(id)
    }

    /// Remove `entity` by swapping the last entity into its slot.
    ///
    /// Role lists are updated in two steps: drop every occurrence of
    /// `entity`, then rewrite every occurrence of the old last id to
    /// `entity`, since that entity now lives in the vacated slot. Clears
    /// selection and highlight. Out-of-range ids are a logged no-op.
    pub fn remove_entity(&mut self, entity: usize) {
        let count = self.transforms.len();
        if entity >= count {
            log::warn!("remove_entity: id {} is not live (count {})", entity, count);
            return;
        }

        self.renderable.retain(|&e| e != entity);
        self.lights.retain(|&e| e != entity);

        self.transforms.swap_remove(entity);
        self.models.swap_remove(entity);

        // The entity formerly at count - 1 is now known as `entity`.
        let old_last = count - 1;
        if old_last != entity {
            for e in self.renderable.iter_mut().chain(self.lights.iter_mut()) {
                if *e == old_last {
                    *e = entity;
                }
            }
        }

        self.current_entity = None;
        self.highlighted_entity = None;

        self.debug_assert_roles_live();
    }

    /// Remove the currently selected entity; no selection means no-op.
    pub fn remove_current(&mut self) {
        if let Some(entity) = self.current_entity {
            self.remove_entity(entity);
        }
    }

    /// Clone `entity`'s model and transform into a fresh entity, re-running
    /// the same role registration as [`add_entity`](Self::add_entity). The
    /// clone becomes the current and highlighted entity.
    pub fn duplicate(&mut self, registry: &ModelRegistry, entity: usize) -> Option<usize> {
        let model = self.model_of(entity)?;
        let transform = *self.transform(entity)?;

        let id = self.add_entity(registry, model, None)?;
        self.transforms[id] = transform;

        self.current_entity = Some(id);
        self.highlighted_entity = Some(id);
        Some(id)
    }

    /// Select and highlight `entity`; `None` clears both, as after a failed
    /// pick.
    pub fn select(&mut self, entity: Option<usize>) {
        match entity {
            Some(e) if e < self.entity_count() => {
                self.current_entity = Some(e);
                self.highlighted_entity = Some(e);
            }
            _ => {
                self.current_entity = None;
                self.highlighted_entity = None;
            }
        }
    }

    /// Rotate the current entity around one axis (0 = x, 1 = y, 2 = z) by
    /// `dtheta` degrees. No selection means no-op.
    pub fn rotate_current(&mut self, axis: usize, dtheta: f32) {
        let Some(entity) = self.current_entity else {
            return;
        };
        if let Some(t) = self.transforms.get_mut(entity) {
            match axis {
                0 => t.rot.x += dtheta,
                1 => t.rot.y += dtheta,
                2 => t.rot.z += dtheta,
                _ => return,
            }
            t.update();
        }
    }

    /// Drop every entity and role entry, keeping loaded models intact.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.models.clear();
        self.renderable.clear();
        self.lights.clear();
        self.current_entity = None;
        self.highlighted_entity = None;
    }

    fn debug_assert_roles_live(&self) {
        debug_assert!(
            self.renderable
                .iter()
                .chain(self.lights.iter())
                .all(|&e| e < self.transforms.len()),
            "role list entry resolves to a dead entity"
        );
    }
}

/// Snap each component of `pos` down to a multiple of `delta`.
pub fn snap_position(pos: Vector3<f32>, delta: f32) -> Vector3<f32> {
    Vector3::new(
        delta * (pos.x / delta).floor(),
        delta * (pos.y / delta).floor(),
        delta * (pos.z / delta).floor(),
    )
}
