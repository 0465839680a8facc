//! Matrix-form rotation maps and angle helpers.
//!
//! These functions operate directly on rotation matrices ([`DMat3`]) and are the building
//! blocks used by Jacobian and covariance propagation code. The quaternion-backed group type
//! lives in [`crate::so3`].

use glam::{DMat3, DQuat, DVec3};
use num_traits::Float;

/// Degrees to radians.
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees.
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Rotation vectors with a norm at or below this value map to the identity in [`exp_rotation`].
pub const EXP_EPSILON: f64 = 1e-7;

// trace above 3 - eps is numerically the identity
const LOG_TRACE_EPSILON: f64 = 1e-6;
// below this angle the axis is taken from the linearized form
const LOG_SMALL_ANGLE: f64 = 1e-3;
const A_MATRIX_EPSILON: f64 = 1e-5;
// gimbal lock threshold used by `rotation_to_euler`
const EULER_SINGULAR_EPSILON: f64 = 1e-6;

/// Skew-symmetric (cross-product) matrix of a vector.
///
/// `skew(a) * b == a.cross(b)` for every `b`.
///
/// Example:
///
/// ```
/// use glam::DVec3;
/// use navfuse_lie::ops::skew;
///
/// let a = DVec3::new(1.0, 2.0, 3.0);
/// let b = DVec3::new(-2.0, 0.5, 4.0);
/// assert!((skew(a) * b - a.cross(b)).length() < 1e-12);
/// ```
pub fn skew(v: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, v.z, -v.y),
        DVec3::new(-v.z, 0.0, v.x),
        DVec3::new(v.y, -v.x, 0.0),
    )
}

/// Inverse of [`skew`]: extracts the vector from a skew-symmetric matrix.
pub fn vee(m: &DMat3) -> DVec3 {
    DVec3::new(m.y_axis.z, m.z_axis.x, m.x_axis.y)
}

/// Exponential map from an axis-angle vector to a rotation matrix (Rodrigues' formula).
///
/// Vectors whose norm does not exceed [`EXP_EPSILON`] return the identity instead of
/// normalizing a near-zero axis.
pub fn exp_rotation(v: DVec3) -> DMat3 {
    rodrigues(v, 1.0)
}

/// Exponential map of an angular rate integrated over `dt` seconds.
///
/// Equivalent to `exp_rotation(omega * dt)` but keeps the small-norm test on the rate itself.
pub fn exp_rotation_dt(omega: DVec3, dt: f64) -> DMat3 {
    rodrigues(omega, dt)
}

fn rodrigues(v: DVec3, scale: f64) -> DMat3 {
    let norm = v.length();
    if norm <= EXP_EPSILON {
        return DMat3::IDENTITY;
    }

    let k = skew(v / norm);
    let angle = norm * scale;
    DMat3::IDENTITY + k * angle.sin() + (k * k) * (1.0 - angle.cos())
}

/// Logarithm map from a rotation matrix to an axis-angle vector.
///
/// PRECONDITION: `r` is a rotation matrix. The input is not validated.
pub fn log_rotation(r: &DMat3) -> DVec3 {
    let trace = r.x_axis.x + r.y_axis.y + r.z_axis.z;
    let theta = if trace > 3.0 - LOG_TRACE_EPSILON {
        0.0
    } else {
        // clamp so that round-off on a valid rotation never leaves the acos domain
        (0.5 * (trace - 1.0)).clamp(-1.0, 1.0).acos()
    };

    // antisymmetric part: R(2,1) - R(1,2), R(0,2) - R(2,0), R(1,0) - R(0,1)
    let k = DVec3::new(
        r.y_axis.z - r.z_axis.y,
        r.z_axis.x - r.x_axis.z,
        r.x_axis.y - r.y_axis.x,
    );

    if theta.abs() < LOG_SMALL_ANGLE {
        k * 0.5
    } else {
        k * (0.5 * theta / theta.sin())
    }
}

/// Left Jacobian of SO(3), also known as the "A-matrix".
///
/// `I + (1 - cos θ)/θ² [v]ₓ + (1 - sin θ/θ)/θ² [v]ₓ²` with `θ = |v|`; the identity is returned
/// for `θ < 1e-5`.
pub fn a_matrix(v: DVec3) -> DMat3 {
    let squared_norm = v.length_squared();
    let norm = squared_norm.sqrt();
    if norm < A_MATRIX_EPSILON {
        return DMat3::IDENTITY;
    }

    let k = skew(v);
    DMat3::IDENTITY
        + k * ((1.0 - norm.cos()) / squared_norm)
        + (k * k) * ((1.0 - norm.sin() / norm) / squared_norm)
}

/// Cosine and sinc of `sqrt(x2)`.
///
/// For `x2` below `ε^(1/4)` a truncated Taylor expansion is used, which avoids the
/// cancellation in `sin(x) / x` for tiny angles. Larger arguments use the direct formulas.
///
/// PRECONDITION: `x2 >= 0`.
pub fn cos_sinc_sqrt<T: Float + From<u8>>(x2: T) -> (T, T) {
    debug_assert!(x2 >= T::zero(), "argument must be non-negative");

    let taylor_0_bound = T::epsilon();
    let taylor_2_bound = taylor_0_bound.sqrt();
    let taylor_n_bound = taylor_2_bound.sqrt();

    if x2 >= taylor_n_bound {
        let x = x2.sqrt();
        return (x.cos(), x.sin() / x);
    }

    let inv = |d: u8| T::one() / <T as From<u8>>::from(d);
    let two = <T as From<u8>>::from(2);

    let mut cosi = T::one();
    let mut sinc = T::one();
    let mut term = -x2 / two;
    for i in 0..3u8 {
        cosi = cosi + term;
        term = term * inv(2 * i + 3);
        sinc = sinc + term;
        term = term * -inv(2 * i + 4) * x2;
    }

    (cosi, sinc)
}

/// Quaternion exponential of the pure quaternion `scale * v`.
///
/// Returns the scalar part (the cosine) together with the full unit quaternion. The encoded
/// rotation angle is `2 |scale * v|`, so integrating an angular rate `ω` over `dt` uses
/// `scale = dt / 2`.
pub fn quaternion_exp(v: DVec3, scale: f64) -> (f64, DQuat) {
    let (cos, sinc) = cos_sinc_sqrt(scale * scale * v.length_squared());
    let xyz = v * (sinc * scale);
    (cos, DQuat::from_xyzw(xyz.x, xyz.y, xyz.z, cos))
}

/// Roll, pitch and yaw (x, y, z) of a rotation matrix, ZYX convention.
pub fn rotation_to_euler(r: &DMat3) -> DVec3 {
    // r(row, col) == r.col(col)[row]
    let sy = (r.x_axis.x * r.x_axis.x + r.x_axis.y * r.x_axis.y).sqrt();
    if sy < EULER_SINGULAR_EPSILON {
        DVec3::new(
            (-r.z_axis.y).atan2(r.y_axis.y),
            (-r.x_axis.z).atan2(sy),
            0.0,
        )
    } else {
        DVec3::new(
            r.y_axis.z.atan2(r.z_axis.z),
            (-r.x_axis.z).atan2(sy),
            r.x_axis.y.atan2(r.x_axis.x),
        )
    }
}

/// Rotation matrix `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn rpy_to_rotation(roll: f64, pitch: f64, yaw: f64) -> DMat3 {
    DMat3::from_rotation_z(yaw) * DMat3::from_rotation_y(pitch) * DMat3::from_rotation_x(roll)
}

/// Wraps an angle into `[-π, π]`.
///
/// NaN and infinite angles are returned unchanged.
pub fn keep_angle_in_pi(angle: f64) -> f64 {
    use std::f64::consts::PI;

    if !angle.is_finite() || (-PI..=PI).contains(&angle) {
        return angle;
    }
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// Degrees to radians.
#[inline]
pub fn deg2rad(degrees: f64) -> f64 {
    degrees * DEG2RAD
}

/// Radians to degrees.
#[inline]
pub fn rad2deg(radians: f64) -> f64 {
    radians * RAD2DEG
}
