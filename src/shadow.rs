//! Cube-shadow atlas scheduling.
//!
//! Every shadow-casting light gets six depth tiles in one shared square
//! atlas texture, one per cube face, laid out row-major as
//! `tile_index = 6 * light_rank + face`. The shadow pass renders depth into
//! each tile and the light-accumulation pass samples it back; both go through
//! the same pure [`shadow_tile`] function so their matrices and rectangles
//! can never drift apart.

use cgmath::{Deg, Matrix4, Point3, Vector3, perspective};

use crate::camera::OPENGL_TO_WGPU_MATRIX;

/// Edge length of the square shadow atlas texture in texels.
pub const ATLAS_SIZE: u32 = 8192;
/// Edge length of one cube-face tile in texels.
pub const TILE_SIZE: u32 = 1024;
pub const ATLAS_COLS: u32 = ATLAS_SIZE / TILE_SIZE;
pub const ATLAS_ROWS: u32 = ATLAS_SIZE / TILE_SIZE;
/// Total tile slots in the atlas.
pub const MAX_TILES: usize = (ATLAS_COLS * ATLAS_ROWS) as usize;
/// Hard cap on shadow-casting lights: past this the atlas is exhausted, so
/// additional lights are skipped instead of silently aliasing tiles.
pub const MAX_SHADOW_LIGHTS: usize = MAX_TILES / 6;

pub const SHADOW_NEAR: f32 = 0.01;
pub const SHADOW_FAR: f32 = 10.0;

/// The six cube faces as (direction, up) pairs, in the fixed order
/// +X, +Y, +Z, -X, -Y, -Z. The up vectors keep the look-at cross products
/// non-degenerate: world-up for the horizontal faces, +Z for the vertical
/// ones.
pub const CUBE_FACES: [([f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
];

/// Texel rectangle of one tile inside the atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// One scheduled cube face: where to render in the atlas and with which
/// view-projection.
#[derive(Clone, Copy, Debug)]
pub struct ShadowTile {
    pub view_proj: Matrix4<f32>,
    pub rect: TileRect,
}

/// Row-major tile placement.
pub fn tile_rect(index: usize) -> TileRect {
    debug_assert!(index < MAX_TILES, "tile index {} exceeds atlas capacity", index);
    let index = index as u32;
    TileRect {
        x: TILE_SIZE * (index % ATLAS_COLS),
        y: TILE_SIZE * (index / ATLAS_COLS),
        size: TILE_SIZE,
    }
}

/// Compute the view-projection matrix and atlas rectangle for one cube face
/// of one light.
///
/// Pure: the shadow pass and the light pass both call this with the same
/// `(light_rank, face)` and must get identical results.
pub fn shadow_tile(light_pos: Vector3<f32>, light_rank: usize, face: usize) -> ShadowTile {
    let (dir, up) = CUBE_FACES[face];
    let dir = Vector3::from(dir);
    let up = Vector3::from(up);

    let proj = OPENGL_TO_WGPU_MATRIX * perspective(Deg(90.0), 1.0, SHADOW_NEAR, SHADOW_FAR);
    let eye = Point3::new(light_pos.x, light_pos.y, light_pos.z);
    let view = Matrix4::look_at_rh(eye, eye + dir, up);

    ShadowTile {
        view_proj: proj * view,
        rect: tile_rect(6 * light_rank + face),
    }
}
