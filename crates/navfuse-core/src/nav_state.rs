use std::fmt;

use glam::{DVec3, Quat, Vec3};
use navfuse_lie::{se3::SE3, so3::SO3};
use serde::{Deserialize, Serialize};

/// Quaternion coefficients in `x, y, z, w` order, for printing.
trait QuatCoeffs {
    fn coeffs(&self) -> [f64; 4];
}

impl QuatCoeffs for SO3 {
    fn coeffs(&self) -> [f64; 4] {
        self.q.to_array()
    }
}

impl QuatCoeffs for Quat {
    fn coeffs(&self) -> [f64; 4] {
        self.as_dquat().to_array()
    }
}

macro_rules! impl_nav_state {
    ($(#[$meta:meta])* $name:ident, $rot:ty, $vec:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Time of the state in seconds.
            pub timestamp: f64,
            /// Body to world rotation.
            pub rotation: $rot,
            /// Position in the world frame.
            pub position: $vec,
            /// Velocity in the world frame.
            pub velocity: $vec,
            /// Gyroscope bias.
            pub gyro_bias: $vec,
            /// Accelerometer bias.
            pub accel_bias: $vec,
        }

        impl $name {
            /// Create a state from its components.
            pub fn new(
                timestamp: f64,
                rotation: $rot,
                position: $vec,
                velocity: $vec,
                gyro_bias: $vec,
                accel_bias: $vec,
            ) -> Self {
                Self {
                    timestamp,
                    rotation,
                    position,
                    velocity,
                    gyro_bias,
                    accel_bias,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let [qx, qy, qz, qw] = self.rotation.coeffs();
                write!(
                    f,
                    "p: {} {} {}, v: {} {} {}, q: {} {} {} {}, bg: {} {} {}, ba: {} {} {}",
                    self.position.x,
                    self.position.y,
                    self.position.z,
                    self.velocity.x,
                    self.velocity.y,
                    self.velocity.z,
                    qx,
                    qy,
                    qz,
                    qw,
                    self.gyro_bias.x,
                    self.gyro_bias.y,
                    self.gyro_bias.z,
                    self.accel_bias.x,
                    self.accel_bias.y,
                    self.accel_bias.z,
                )
            }
        }
    };
}

impl_nav_state!(
    /// Navigation state in double precision, used by the estimators.
    NavStateF64,
    SO3,
    DVec3
);

impl_nav_state!(
    /// Navigation state in single precision, used for rendering.
    NavStateF32,
    Quat,
    Vec3
);

impl NavStateF64 {
    /// Create a state from a pose and a velocity. Biases are zero.
    pub fn from_pose(timestamp: f64, pose: &SE3, velocity: DVec3) -> Self {
        Self {
            timestamp,
            rotation: pose.rotation,
            position: pose.translation,
            velocity,
            ..Default::default()
        }
    }

    /// The pose `(rotation, position)`.
    pub fn pose(&self) -> SE3 {
        SE3::new(self.rotation, self.position)
    }
}

impl NavStateF32 {
    /// The pose `(rotation, position)`, widened to double precision.
    pub fn pose(&self) -> SE3 {
        SE3::new(
            SO3::from_quaternion(self.rotation.as_dquat()),
            self.position.as_dvec3(),
        )
    }
}

impl From<&NavStateF64> for NavStateF32 {
    fn from(state: &NavStateF64) -> Self {
        Self {
            timestamp: state.timestamp,
            rotation: state.rotation.q.as_quat(),
            position: state.position.as_vec3(),
            velocity: state.velocity.as_vec3(),
            gyro_bias: state.gyro_bias.as_vec3(),
            accel_bias: state.accel_bias.as_vec3(),
        }
    }
}
