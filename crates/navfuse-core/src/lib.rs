#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// GNSS fixes and UTM coordinates.
pub mod gnss;

/// IMU readings.
pub mod imu;

/// Navigation state in double and single precision.
pub mod nav_state;

/// Wheel odometry readings.
pub mod odom;

/// Timing of named closures.
pub mod timer;

pub use navfuse_lie::ops::{DEG2RAD, RAD2DEG};

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.81;
