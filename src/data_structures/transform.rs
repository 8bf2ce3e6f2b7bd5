//! Entity transforms with a cached model matrix.

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};

/// Position, Euler rotation (degrees) and scale, plus the composed 4x4 model
/// matrix.
///
/// The matrix is a cache: after mutating `pos`, `rot` or `scale` the caller
/// must run [`update`](Self::update) before the matrix is read again by
/// rendering or picking. The composition order is fixed to
/// `T(pos) * Rz * Ry * Rx * S(scale)`; changing the axis order changes what
/// users see when they rotate entities in the editor.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub pos: Vector3<f32>,
    pub rot: Vector3<f32>,
    pub scale: Vector3<f32>,
    matrix: Matrix4<f32>,
}

impl Transform {
    pub fn new() -> Self {
        let mut t = Self {
            pos: Vector3::new(0.0, 0.0, 0.0),
            rot: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            matrix: Matrix4::identity(),
        };
        t.update();
        t
    }

    pub fn from_position(pos: Vector3<f32>) -> Self {
        let mut t = Self::new();
        t.pos = pos;
        t.update();
        t
    }

    /// Recompute the cached matrix from `pos`/`rot`/`scale`.
    pub fn update(&mut self) {
        self.matrix = Matrix4::from_translation(self.pos)
            * Matrix4::from_angle_z(Deg(self.rot.z))
            * Matrix4::from_angle_y(Deg(self.rot.y))
            * Matrix4::from_angle_x(Deg(self.rot.x))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
    }

    /// Reset to the identity transform and recompute.
    pub fn identity(&mut self) {
        self.pos = Vector3::new(0.0, 0.0, 0.0);
        self.rot = Vector3::new(0.0, 0.0, 0.0);
        self.scale = Vector3::new(1.0, 1.0, 1.0);
        self.update();
    }

    /// The cached model matrix, valid as of the last [`update`](Self::update).
    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
