//! Fly camera pose and view/projection matrices.
//!
//! The camera pose (position, yaw, pitch) comes from the input collaborator
//! once per frame; this module turns it into the matrices consumed by the
//! geometry pass and by picking.

use cgmath::{Deg, Matrix4, Rad, Vector3, perspective};

/// cgmath produces OpenGL clip space (z in -1..1); wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub const CAMERA_FOVY_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 10000.0;

/// Camera pose. Yaw and pitch are radians, applied as `T(pos) * Ry * Rx`
/// (look direction rotates around world-up first, then tilts).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pos: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn new(pos: Vector3<f32>, yaw: f32, pitch: f32) -> Self {
        Self { pos, yaw, pitch }
    }

    /// Camera-to-world matrix, used to place grabbed entities in front of
    /// the viewer.
    pub fn view_inverse(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.pos)
            * Matrix4::from_angle_y(Rad(self.yaw))
            * Matrix4::from_angle_x(Rad(self.pitch))
    }

    /// World-to-camera matrix. Computed as the analytic inverse of
    /// [`view_inverse`](Self::view_inverse) so it never fails.
    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(-self.pitch))
            * Matrix4::from_angle_y(Rad(-self.yaw))
            * Matrix4::from_translation(-self.pos)
    }

    /// Perspective projection for the output surface, in wgpu clip space.
    pub fn projection(&self, width: u32, height: u32) -> Matrix4<f32> {
        let aspect = width as f32 / height.max(1) as f32;
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(CAMERA_FOVY_DEG), aspect, CAMERA_NEAR, CAMERA_FAR)
    }

    /// Combined projection * view, kept around for unprojecting pick rays.
    pub fn combined(&self, width: u32, height: u32) -> Matrix4<f32> {
        self.projection(width, height) * self.view()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 2.0, 8.0), 0.0, 0.0)
    }
}

/// GPU-side camera state for the geometry and highlight passes.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera, width: u32, height: u32) -> Self {
        Self {
            view: camera.view().into(),
            proj: camera.projection(width, height).into(),
        }
    }
}
