use std::ops::Mul;

use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::ops;

const SMALL_ANGLE_EPSILON: f64 = 1.0e-8;

/// A 3D rotation, stored as a unit quaternion.
///
/// `q` and `-q` represent the same rotation; [`SO3::log`] always picks the short way round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SO3 {
    /// Unit quaternion.
    pub q: DQuat,
}

impl Default for SO3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SO3 {
    /// The identity rotation.
    pub const IDENTITY: Self = Self { q: DQuat::IDENTITY };

    /// Create a rotation from a quaternion. The quaternion is normalized.
    pub fn from_quaternion(quat: DQuat) -> Self {
        Self {
            q: quat.normalize(),
        }
    }

    /// Create a rotation from a rotation matrix.
    pub fn from_matrix(mat: &DMat3) -> Self {
        Self {
            q: DQuat::from_mat3(mat),
        }
    }

    /// Rotation of `angle` radians about the z axis.
    pub fn from_rotation_z(angle: f64) -> Self {
        Self::exp(DVec3::Z * angle)
    }

    /// The rotation matrix.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_quat(self.q)
    }

    /// The unit quaternion.
    #[inline]
    pub fn unit_quaternion(&self) -> DQuat {
        self.q
    }

    /// The inverse rotation.
    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.conjugate(),
        }
    }

    /// Lie algebra -> Lie group
    pub fn exp(v: DVec3) -> Self {
        Self::exp_scaled(v, 1.0)
    }

    /// Rotation of `v * scale`, e.g. an angular rate integrated over `scale` seconds.
    ///
    /// Uses the Taylor-guarded quaternion exponential, so tiny increments keep full precision.
    pub fn exp_scaled(v: DVec3, scale: f64) -> Self {
        let (_, q) = ops::quaternion_exp(v, 0.5 * scale);
        Self { q }
    }

    /// Lie group -> Lie algebra
    pub fn log(&self) -> DVec3 {
        let mut w = self.q.w;
        let mut vec = self.q.xyz();

        if w < 0.0 {
            w = -w;
            vec = -vec;
        }

        let theta = vec.length();
        if theta > SMALL_ANGLE_EPSILON {
            vec * (2.0 * theta.atan2(w) / theta)
        } else {
            // small-angle approximation
            vec * (2.0 / w)
        }
    }

    /// Vector space -> Lie algebra
    pub fn hat(v: DVec3) -> DMat3 {
        ops::skew(v)
    }

    /// Lie algebra -> vector space
    pub fn vee(omega: &DMat3) -> DVec3 {
        ops::vee(omega)
    }

    /// Left Jacobian of the exponential map.
    pub fn left_jacobian(v: DVec3) -> DMat3 {
        ops::a_matrix(v)
    }

    /// Right Jacobian of the exponential map.
    pub fn right_jacobian(v: DVec3) -> DMat3 {
        ops::a_matrix(-v)
    }

    /// Rotate a point.
    #[inline]
    pub fn transform(&self, point: DVec3) -> DVec3 {
        self.q * point
    }

    /// Spherical linear interpolation towards `other`; `s = 0` gives `self`, `s = 1` gives `other`.
    pub fn slerp(&self, other: &Self, s: f64) -> Self {
        Self {
            q: self.q.slerp(other.q, s).normalize(),
        }
    }
}

impl Mul for SO3 {
    type Output = SO3;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            q: (self.q * rhs.q).normalize(),
        }
    }
}

impl Mul<DVec3> for SO3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.transform(rhs)
    }
}
