use serde::{Deserialize, Serialize};

/// Wheel encoder reading: pulses per unit time of the left and right wheels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Odom {
    /// Time of the reading in seconds.
    pub timestamp: f64,
    /// Left wheel pulse rate.
    pub left_pulse: f64,
    /// Right wheel pulse rate.
    pub right_pulse: f64,
}

impl Odom {
    /// Create a new odometry reading.
    pub fn new(timestamp: f64, left_pulse: f64, right_pulse: f64) -> Self {
        Self {
            timestamp,
            left_pulse,
            right_pulse,
        }
    }
}
