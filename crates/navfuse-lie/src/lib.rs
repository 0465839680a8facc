#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # navfuse Lie groups
//!
//! Rotation and rigid body maps used by the inertial, odometry and GNSS pipelines.
//!
//! - **SO(3)**: unit-quaternion rotations with exp/log maps and Jacobians
//! - **SE(3)**: rigid body transformations (rotation + translation)
//! - matrix-form helpers (Rodrigues, skew, left Jacobian, Euler angles)
//! - time-indexed pose interpolation
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use navfuse_lie::so3::SO3;
//!
//! // Create a rotation from a rotation vector
//! let rotation = SO3::exp(DVec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
//!
//! // Apply the rotation to a point
//! let rotated = rotation.transform(DVec3::X);
//! assert!((rotated - DVec3::Y).length() < 1e-12);
//! ```

/// Pose interpolation over time-stamped samples.
pub mod interpolation;

/// Matrix-form rotation maps and angle helpers.
pub mod ops;

/// Special Euclidean group SE(3) for 3D rigid transformations.
pub mod se3;

/// Special Orthogonal group SO(3) for 3D rotations.
pub mod so3;
