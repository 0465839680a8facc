use std::ops::Mul;

use glam::{DMat3, DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::so3::SO3;

/// A rigid body transformation: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SE3 {
    /// Rotation part.
    pub rotation: SO3,
    /// Translation part.
    pub translation: DVec3,
}

impl Default for SE3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SE3 {
    /// The identity transformation.
    pub const IDENTITY: Self = Self {
        rotation: SO3::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a transformation from a rotation and a translation.
    pub fn new(rotation: SO3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            rotation: SO3::IDENTITY,
            translation,
        }
    }

    /// Rotation of `yaw` radians about z, followed by `translation`.
    pub fn from_rotation_z(yaw: f64, translation: DVec3) -> Self {
        Self {
            rotation: SO3::from_rotation_z(yaw),
            translation,
        }
    }

    /// The rotation matrix.
    pub fn rotation_matrix(&self) -> DMat3 {
        self.rotation.matrix()
    }

    /// The inverse transformation.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// Transform a point.
    #[inline]
    pub fn transform(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// The homogeneous 4x4 matrix.
    pub fn matrix(&self) -> DMat4 {
        let mut m = DMat4::from_mat3(self.rotation.matrix());
        m.w_axis = self.translation.extend(1.0);
        m
    }
}

impl Mul for SE3 {
    type Output = SE3;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            rotation: self.rotation * rhs.rotation,
            translation: self.translation + self.rotation * rhs.translation,
        }
    }
}

impl Mul<DVec3> for SE3 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.transform(rhs)
    }
}
