/// 3D transformation matrices and rotation state
use std::f64::consts::TAU;

use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};

/// Rotation state around three axes (in radians)
///
/// Angles accumulate without wraparound; the rotation matrix takes them
/// modulo 2π implicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// XYZ Euler angles of an orientation, so that
    /// `Transform::rotation_matrix` reproduces it
    pub fn from_quaternion(orientation: &UnitQuaternion<f64>) -> Self {
        let m = orientation.to_rotation_matrix().into_inner();
        let sin_y = m[(0, 2)].clamp(-1.0, 1.0);
        let y = sin_y.asin();

        if sin_y.abs() < 0.999_999_9 {
            let x = (-m[(1, 2)]).atan2(m[(2, 2)]);
            let z = (-m[(0, 1)]).atan2(m[(0, 0)]);
            Self::new(x, y, z)
        } else {
            // Gimbal lock: X and Z turn about the same axis, fold it into X
            Self::new(m[(2, 1)].atan2(m[(1, 1)]), y, 0.0)
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state.
    ///
    /// Euler order is XYZ: the X rotation is applied last. Angles are
    /// reduced to one turn before narrowing to `f32`.
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let turn = |angle: f64| angle.rem_euclid(TAU) as f32;
        let rx = Matrix4::new_rotation(Vector3::new(turn(rotation.x), 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, turn(rotation.y), 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, turn(rotation.z)));

        rx * ry * rz
    }

    /// Create a translation matrix
    pub fn translation_matrix(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(translation)
    }

    /// Create a scale matrix
    pub fn scale_matrix(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// Inverse transpose of the upper 3x3 of `model`, which keeps normals
    /// perpendicular under non-uniform scale. A singular model matrix falls
    /// back to its upper 3x3.
    pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
        let linear: Matrix3<f32> = model.fixed_view::<3, 3>(0, 0).clone_owned();
        match linear.try_inverse() {
            Some(inverse) => inverse.transpose(),
            None => linear,
        }
    }

    /// Local matrix of a scene node: `T * R * S`
    pub fn local_matrix(
        translation: &Vector3<f32>,
        rotation: &RotationState,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation_matrix(translation)
            * Self::rotation_matrix(rotation)
            * Self::scale_matrix(scale)
    }
}
