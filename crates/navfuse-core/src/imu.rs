use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A single IMU reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Imu {
    /// Time of the reading in seconds.
    pub timestamp: f64,
    /// Angular rate in rad/s.
    pub gyro: DVec3,
    /// Specific force in m/s².
    pub acce: DVec3,
}

impl Imu {
    /// Create a new IMU reading.
    pub fn new(timestamp: f64, gyro: DVec3, acce: DVec3) -> Self {
        Self {
            timestamp,
            gyro,
            acce,
        }
    }
}
