//! Object picking and selection.
//!
//! Picking runs on the CPU against the same vertex arena the GPU draws from:
//! the clicked pixel is unprojected into a world-space ray, then intersected
//! with every renderable entity's transformed triangles. The nearest hit
//! becomes the current entity; a miss clears the selection.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::camera::Camera;
use crate::data_structures::arena::VertexArena;
use crate::data_structures::model::ModelRegistry;
use crate::data_structures::scene::SceneTable;

const RAY_EPSILON: f32 = 1.0e-6;

/// Cast a ray through the given screen pixel and select what it hits.
pub fn pick_and_select(
    scene: &mut SceneTable,
    registry: &ModelRegistry,
    arena: &VertexArena,
    camera: &Camera,
    screen_pos: (f32, f32),
    surface_size: (u32, u32),
) {
    let hit = pick_entity(scene, registry, arena, camera, screen_pos, surface_size);
    scene.select(hit.map(|(entity, _)| entity));
}

/// Find the nearest renderable entity under the given screen pixel, together
/// with its ray parameter.
pub fn pick_entity(
    scene: &SceneTable,
    registry: &ModelRegistry,
    arena: &VertexArena,
    camera: &Camera,
    screen_pos: (f32, f32),
    surface_size: (u32, u32),
) -> Option<(usize, f32)> {
    let (width, height) = surface_size;
    let direction = unproject(camera, screen_pos, width, height)?;
    let origin = camera.pos;

    let mut nearest: Option<(usize, f32)> = None;
    for &entity in scene.renderable() {
        let Some(model) = scene.model_of(entity).and_then(|id| registry.get(id)) else {
            continue;
        };
        let Some(matrix) = scene.transform(entity).map(|t| t.matrix()) else {
            continue;
        };

        for tri in 0..(model.len / 3) {
            let base = model.offset + tri * 3;
            let a = transformed_vertex(arena, matrix, base);
            let b = transformed_vertex(arena, matrix, base + 1);
            let c = transformed_vertex(arena, matrix, base + 2);

            if let Some(t) = ray_triangle(origin, direction, a, b, c) {
                if nearest.map_or(true, |(_, best)| t < best) {
                    nearest = Some((entity, t));
                }
            }
        }
    }

    if let Some((entity, t)) = nearest {
        log::debug!("picked entity {} at distance {}", entity, t);
    }
    nearest
}

/// Turn a screen pixel into a normalized world-space ray direction from the
/// camera position, by unprojecting the far-plane point under the cursor.
fn unproject(camera: &Camera, screen_pos: (f32, f32), width: u32, height: u32) -> Option<Vector3<f32>> {
    let inverse = match camera.combined(width, height).invert() {
        Some(m) => m,
        None => {
            log::warn!("camera matrix not invertible, pick dropped");
            return None;
        }
    };

    let ndc_x = 2.0 * screen_pos.0 / width.max(1) as f32 - 1.0;
    let ndc_y = 1.0 - 2.0 * screen_pos.1 / height.max(1) as f32;
    let far = inverse * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);
    if far.w.abs() < RAY_EPSILON {
        return None;
    }
    let far = far.truncate() / far.w;

    Some((far - camera.pos).normalize())
}

fn transformed_vertex(arena: &VertexArena, matrix: Matrix4<f32>, index: u32) -> Vector3<f32> {
    let p = arena.position(index as usize);
    (matrix * Vector4::new(p[0], p[1], p[2], 1.0)).truncate()
}

/// Möller-Trumbore ray/triangle intersection. Returns the ray parameter of
/// the hit, or `None` for misses and back-facing near-parallel cases.
fn ray_triangle(
    origin: Vector3<f32>,
    direction: Vector3<f32>,
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < RAY_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > RAY_EPSILON).then_some(t)
}
