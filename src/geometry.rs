//! Transform helpers for scopes.
//!
//! A scope transform is a rigid `glam::Mat4` (rotation and translation only,
//! column-vector convention). Operations compose in the shape's local frame:
//! `transform * m`.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this `sqrt(r00² + r10²)` the Euler decomposition is treated as gimbal-locked.
pub const GIMBAL_EPSILON: f32 = 1e-6;

/// A local scope axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// Derived attributes and local-frame composition for scope transforms.
pub trait ScopeTransform: Sized {
    /// Scope origin in world space.
    fn position(&self) -> Vec3;

    /// Replaces the origin, keeping the rotation.
    fn with_position(self, position: Vec3) -> Self;

    /// World-space direction of a local axis.
    fn axis(&self, axis: Axis) -> Vec3;

    /// Euler angles `(x, y, z)` in radians.
    fn euler_angles(&self) -> Vec3;

    /// Moves the scope by `offset`, expressed in its local frame.
    fn translate_local(self, offset: Vec3) -> Self;

    /// Rotates the scope by `rotation`, expressed in its local frame.
    fn rotate_local(self, rotation: Quat) -> Self;
}

impl ScopeTransform for Mat4 {
    fn position(&self) -> Vec3 {
        self.w_axis.truncate()
    }

    fn with_position(mut self, position: Vec3) -> Self {
        self.w_axis = position.extend(1.0);
        self
    }

    fn axis(&self, axis: Axis) -> Vec3 {
        match axis {
            Axis::X => self.x_axis.truncate(),
            Axis::Y => self.y_axis.truncate(),
            Axis::Z => self.z_axis.truncate(),
        }
    }

    fn euler_angles(&self) -> Vec3 {
        // r_ij is row i, column j of the rotation block.
        let r = |i: usize, j: usize| self.col(j)[i];
        let sy = (r(0, 0) * r(0, 0) + r(1, 0) * r(1, 0)).sqrt();
        if sy >= GIMBAL_EPSILON {
            Vec3::new(
                r(2, 1).atan2(r(2, 2)),
                (-r(2, 0)).atan2(sy),
                r(1, 0).atan2(r(0, 0)),
            )
        } else {
            Vec3::new((-r(1, 2)).atan2(r(1, 1)), (-r(2, 0)).atan2(sy), 0.0)
        }
    }

    fn translate_local(self, offset: Vec3) -> Self {
        self * Mat4::from_translation(offset)
    }

    fn rotate_local(self, rotation: Quat) -> Self {
        self * Mat4::from_quat(rotation)
    }
}

/// Yaw (about Y), pitch (about X) and roll (about Z) rotation from degrees.
///
/// Roll is applied first, then pitch, then yaw.
pub fn yaw_pitch_roll(pitch_deg: f32, yaw_deg: f32, roll_deg: f32) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        yaw_deg.to_radians(),
        pitch_deg.to_radians(),
        roll_deg.to_radians(),
    )
}

/// Returns `v` with component `axis` replaced.
pub fn with_component(mut v: Vec3, axis: Axis, value: f32) -> Vec3 {
    v[axis.index()] = value;
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn single_axis_rotations_read_back() {
        let angle = 30f32.to_radians();
        let rx = Mat4::IDENTITY.rotate_local(Quat::from_rotation_x(angle));
        let ry = Mat4::IDENTITY.rotate_local(Quat::from_rotation_y(angle));
        let rz = Mat4::IDENTITY.rotate_local(Quat::from_rotation_z(angle));
        assert!(approx(rx.euler_angles(), Vec3::new(angle, 0.0, 0.0)));
        assert!(approx(ry.euler_angles(), Vec3::new(0.0, angle, 0.0)));
        assert!(approx(rz.euler_angles(), Vec3::new(0.0, 0.0, angle)));
    }

    #[test]
    fn gimbal_lock_takes_degenerate_branch() {
        // Pitch of 90 degrees about Y collapses r00 and r10.
        let m = Mat4::from_quat(Quat::from_rotation_y(FRAC_PI_2))
            * Mat4::from_quat(Quat::from_rotation_x(0.3));
        let e = m.euler_angles();
        assert_eq!(e.z, 0.0);
        assert!((e.y - FRAC_PI_2).abs() < 1e-3);
        assert!(e.x.is_finite());
    }

    #[test]
    fn local_translation_follows_rotation() {
        let m = Mat4::IDENTITY
            .rotate_local(yaw_pitch_roll(0.0, 90.0, 0.0))
            .translate_local(Vec3::X);
        // Yawing +90 degrees turns local X into world -Z.
        assert!(approx(m.position(), Vec3::new(0.0, 0.0, -1.0)));
        assert!(approx(m.axis(Axis::X), Vec3::NEG_Z));
    }

    #[test]
    fn position_roundtrip_keeps_rotation() {
        let m = Mat4::from_quat(Quat::from_rotation_z(0.5)).with_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(m.euler_angles(), Vec3::new(0.0, 0.0, 0.5)));
    }
}
