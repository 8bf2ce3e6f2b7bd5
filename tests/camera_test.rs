use cgmath::{Matrix4, Vector3, Vector4};
use scenery_ngin::camera::Camera;

mod common;
use common::test_utils::init_logs;

const EPS: f32 = 1.0e-5;

#[test]
fn view_is_the_inverse_of_the_pose() {
    init_logs();
    let camera = Camera::new(Vector3::new(3.0, 1.5, -2.0), 0.7, -0.3);
    let product = camera.view() * camera.view_inverse();

    let identity: [[f32; 4]; 4] = Matrix4::from_scale(1.0).into();
    let got: [[f32; 4]; 4] = product.into();
    for (row_i, row_g) in identity.iter().zip(got.iter()) {
        for (a, b) in row_i.iter().zip(row_g.iter()) {
            assert!((a - b).abs() < EPS, "view * view_inverse != identity");
        }
    }
}

#[test]
fn default_pose_looks_down_negative_z() {
    let camera = Camera::new(Vector3::new(0.0, 0.0, 5.0), 0.0, 0.0);
    let forward = camera.view_inverse() * Vector4::new(0.0, 0.0, -1.0, 0.0);
    assert!((forward.z + 1.0).abs() < EPS);

    // A point ahead of the camera projects inside clip space with depth in
    // wgpu's 0..1 range.
    let clip = camera.combined(800, 600) * Vector4::new(0.0, 0.0, 0.0, 1.0);
    let ndc_z = clip.z / clip.w;
    assert!(clip.w > 0.0);
    assert!((0.0..=1.0).contains(&ndc_z), "ndc z {}", ndc_z);
}
