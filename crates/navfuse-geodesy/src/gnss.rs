use glam::{DVec2, DVec3};
use navfuse_core::gnss::Gnss;
use navfuse_lie::{ops::DEG2RAD, se3::SE3, so3::SO3};
use serde::{Deserialize, Serialize};

use crate::{error::GeodesyError, utm::latlon_to_utm};

/// Mounting of the GNSS antenna on the vehicle body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GnssExtrinsics {
    /// Antenna position in the body frame (x forward, y left), meters.
    pub antenna_offset: DVec2,
    /// Antenna yaw relative to the body x axis, degrees.
    pub antenna_yaw_deg: f64,
    /// Fail the conversion when the fix has no valid heading.
    pub require_heading: bool,
}

impl GnssExtrinsics {
    /// The body to antenna transform.
    pub fn body_to_antenna(&self) -> SE3 {
        SE3::new(
            SO3::exp(DVec3::Z * (self.antenna_yaw_deg * DEG2RAD)),
            self.antenna_offset.extend(0.0),
        )
    }
}

/// Fill in the UTM position of a fix without applying any extrinsics.
///
/// The UTM height is the fix altitude and the pose is a pure translation.
pub fn convert_gnss_to_utm_only_trans(gnss: &mut Gnss) -> Result<(), GeodesyError> {
    let mut utm = latlon_to_utm(gnss.lat_lon_alt.truncate())?;
    utm.z = gnss.lat_lon_alt.z;

    gnss.utm_pose = Some(SE3::from_translation(utm.xy.extend(utm.z)));
    gnss.utm = Some(utm);

    Ok(())
}

/// Compute the vehicle pose of a fix in a map frame anchored at `map_origin` (UTM meters).
///
/// The antenna frame is placed at the UTM position of the fix, rotated by the heading
/// converted to an ENU yaw (`90° - heading`). The vehicle pose is the antenna pose composed
/// with the inverse of [`GnssExtrinsics::body_to_antenna`]. Without a valid heading the yaw is
/// zero and only the translation of the pose is kept, unless
/// [`GnssExtrinsics::require_heading`] is set, which makes the conversion fail.
///
/// On error the fix is left unchanged.
pub fn convert_gnss_to_utm(
    gnss: &mut Gnss,
    extrinsics: &GnssExtrinsics,
    map_origin: DVec3,
) -> Result<(), GeodesyError> {
    if extrinsics.require_heading && !gnss.heading_valid {
        log::warn!("rejecting fix at {}: heading is not valid", gnss.timestamp);
        return Err(GeodesyError::HeadingInvalid);
    }

    let mut utm = latlon_to_utm(gnss.lat_lon_alt.truncate())?;
    utm.z = gnss.lat_lon_alt.z;

    let heading_yaw = if gnss.heading_valid {
        (90.0 - gnss.heading) * DEG2RAD
    } else {
        0.0
    };

    let t_wg = SE3::from_rotation_z(heading_yaw, utm.xy.extend(utm.z) - map_origin);
    let t_wb = t_wg * extrinsics.body_to_antenna().inverse();

    utm.xy = t_wb.translation.truncate();
    utm.z = t_wb.translation.z;

    gnss.utm = Some(utm);
    gnss.utm_pose = Some(if gnss.heading_valid {
        t_wb
    } else {
        SE3::from_translation(t_wb.translation)
    });

    Ok(())
}
