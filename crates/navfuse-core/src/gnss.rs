use glam::{DVec2, DVec3};
use navfuse_lie::se3::SE3;
use serde::{Deserialize, Serialize};

/// Solution quality reported by the receiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GnssStatus {
    /// No fix.
    #[default]
    NotExist,
    /// Single point solution (10 m level).
    SinglePoint,
    /// Pseudo-range differential solution (dm level).
    PseudoRangeDifferential,
    /// RTK fixed solution (cm level).
    FixedSolution,
    /// RTK float solution (cm to dm level).
    FloatSolution,
    /// Any other receiver code.
    Other,
}

impl GnssStatus {
    /// The receiver's integer code for this status.
    pub fn code(self) -> i32 {
        match self {
            GnssStatus::NotExist => 0,
            GnssStatus::SinglePoint => 1,
            GnssStatus::PseudoRangeDifferential => 2,
            GnssStatus::FixedSolution => 4,
            GnssStatus::FloatSolution => 5,
            GnssStatus::Other => -1,
        }
    }
}

impl From<i32> for GnssStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => GnssStatus::NotExist,
            1 => GnssStatus::SinglePoint,
            2 => GnssStatus::PseudoRangeDifferential,
            4 => GnssStatus::FixedSolution,
            5 => GnssStatus::FloatSolution,
            _ => GnssStatus::Other,
        }
    }
}

/// A position in UTM coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmCoordinate {
    /// UTM zone, 1 to 60.
    pub zone: u8,
    /// Easting and northing in meters.
    pub xy: DVec2,
    /// Height in meters, taken directly from the receiver.
    pub z: f64,
    /// Whether the position is in the northern hemisphere.
    pub north: bool,
}

impl Default for UtmCoordinate {
    fn default() -> Self {
        Self {
            zone: 0,
            xy: DVec2::ZERO,
            z: 0.0,
            north: true,
        }
    }
}

impl UtmCoordinate {
    /// Create a UTM coordinate with zero height.
    pub fn new(zone: u8, xy: DVec2, north: bool) -> Self {
        Self {
            zone,
            xy,
            z: 0.0,
            north,
        }
    }
}

/// A GNSS fix.
///
/// `utm` and `utm_pose` are filled in by the geodetic conversion; they stay `None` until a
/// conversion succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gnss {
    /// Time of the fix in seconds.
    pub timestamp: f64,
    /// Solution quality.
    pub status: GnssStatus,
    /// Latitude and longitude in degrees, altitude in meters.
    pub lat_lon_alt: DVec3,
    /// Dual-antenna heading in degrees, clockwise from north.
    pub heading: f64,
    /// Whether `heading` carries a valid measurement.
    pub heading_valid: bool,
    /// Converted UTM position.
    pub utm: Option<UtmCoordinate>,
    /// Vehicle pose derived from the fix.
    pub utm_pose: Option<SE3>,
}

impl Gnss {
    /// Create a fix from the raw receiver fields.
    pub fn new(
        timestamp: f64,
        status: impl Into<GnssStatus>,
        lat_lon_alt: DVec3,
        heading: f64,
        heading_valid: bool,
    ) -> Self {
        Self {
            timestamp,
            status: status.into(),
            lat_lon_alt,
            heading,
            heading_valid,
            utm: None,
            utm_pose: None,
        }
    }

    /// Whether the UTM position has been computed.
    #[inline]
    pub fn utm_valid(&self) -> bool {
        self.utm.is_some()
    }

    /// Whether the vehicle pose has been computed.
    #[inline]
    pub fn pose_valid(&self) -> bool {
        self.utm_pose.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        for code in [0, 1, 2, 4, 5, -1] {
            assert_eq!(GnssStatus::from(code).code(), code);
        }
        assert_eq!(GnssStatus::from(3), GnssStatus::Other);
        assert_eq!(GnssStatus::from(42), GnssStatus::Other);
    }

    #[test]
    fn test_new_gnss() {
        let gnss = Gnss::new(1.0, 4, DVec3::new(31.0, 121.0, 10.0), 90.0, true);
        assert_eq!(gnss.status, GnssStatus::FixedSolution);
        assert!(!gnss.utm_valid());
        assert!(!gnss.pose_valid());

        let gnss = Gnss::new(1.0, GnssStatus::SinglePoint, DVec3::ZERO, 0.0, false);
        assert_eq!(gnss.status, GnssStatus::SinglePoint);
    }

    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let mut gnss = Gnss::new(2.5, 5, DVec3::new(40.0, 116.25, 50.0), 12.0, true);
        gnss.utm = Some(UtmCoordinate::new(50, DVec2::new(440247.5, 4427991.75), true));
        let json = serde_json::to_string(&gnss)?;
        let back: Gnss = serde_json::from_str(&json)?;
        assert_eq!(back, gnss);
        Ok(())
    }
}
