use cgmath::{Matrix4, Vector3, Vector4};
use scenery_ngin::data_structures::transform::Transform;

mod common;
use common::test_utils::init_logs;

const EPS: f32 = 1.0e-5;

fn assert_vec_close(a: Vector4<f32>, b: Vector4<f32>) {
    for i in 0..4 {
        assert!((a[i] - b[i]).abs() < EPS, "{:?} != {:?}", a, b);
    }
}

#[test]
fn new_transform_is_identity() {
    init_logs();
    let t = Transform::new();
    assert_eq!(t.matrix(), Matrix4::from_scale(1.0));
}

#[test]
fn update_is_deterministic() {
    let mut a = Transform::new();
    a.pos = Vector3::new(1.5, -2.0, 0.25);
    a.rot = Vector3::new(10.0, 20.0, 30.0);
    a.scale = Vector3::new(2.0, 1.0, 0.5);
    a.update();

    let mut b = a;
    b.update();

    // Same components, bit-identical matrix.
    let ma: [[f32; 4]; 4] = a.matrix().into();
    let mb: [[f32; 4]; 4] = b.matrix().into();
    assert_eq!(ma, mb);
}

#[test]
fn translation_lands_in_last_column() {
    let mut t = Transform::new();
    t.pos = Vector3::new(3.0, 4.0, 5.0);
    t.rot = Vector3::new(45.0, 90.0, 180.0);
    t.update();

    let origin = t.matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_vec_close(origin, Vector4::new(3.0, 4.0, 5.0, 1.0));
}

#[test]
fn rotation_applies_x_before_y_before_z() {
    // With Rz * Ry * Rx, a unit +x vector under (90, 90, 0) first stays on +x
    // (Rx fixes it), then Ry(90) carries it to -z. If the order were swapped
    // the result would differ.
    let mut t = Transform::new();
    t.rot = Vector3::new(90.0, 90.0, 0.0);
    t.update();

    let v = t.matrix() * Vector4::new(1.0, 0.0, 0.0, 0.0);
    assert_vec_close(v, Vector4::new(0.0, 0.0, -1.0, 0.0));

    // And +y under the same rotation: Rx(90) lifts it to +z, Ry(90) to +x.
    let v = t.matrix() * Vector4::new(0.0, 1.0, 0.0, 0.0);
    assert_vec_close(v, Vector4::new(1.0, 0.0, 0.0, 0.0));
}

#[test]
fn scale_applies_before_rotation() {
    let mut t = Transform::new();
    t.rot = Vector3::new(0.0, 90.0, 0.0);
    t.scale = Vector3::new(2.0, 1.0, 1.0);
    t.update();

    // x is scaled in model space first, then rotated onto -z.
    let v = t.matrix() * Vector4::new(1.0, 0.0, 0.0, 0.0);
    assert_vec_close(v, Vector4::new(0.0, 0.0, -2.0, 0.0));
}

#[test]
fn identity_resets_components() {
    let mut t = Transform::new();
    t.pos = Vector3::new(1.0, 2.0, 3.0);
    t.rot = Vector3::new(10.0, 20.0, 30.0);
    t.scale = Vector3::new(4.0, 5.0, 6.0);
    t.update();

    t.identity();
    assert_eq!(t.pos, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(t.scale, Vector3::new(1.0, 1.0, 1.0));
    assert_eq!(t.matrix(), Matrix4::from_scale(1.0));
}
