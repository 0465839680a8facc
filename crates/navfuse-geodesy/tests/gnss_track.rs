use glam::{DVec2, DVec3};
use navfuse_core::gnss::{Gnss, GnssStatus};
use navfuse_geodesy::gnss::{convert_gnss_to_utm, GnssExtrinsics};
use navfuse_geodesy::utm::latlon_to_utm;
use navfuse_geodesy::GeodesyError;
use navfuse_lie::interpolation::{interpolate, DEFAULT_TIME_TOLERANCE};

#[test]
fn gnss_track_to_map_poses() -> Result<(), GeodesyError> {
    let extrinsics = GnssExtrinsics {
        antenna_offset: DVec2::new(-0.17, -0.2),
        antenna_yaw_deg: 12.06,
        require_heading: false,
    };

    // a vehicle driving north at roughly 11 m/s
    let mut fixes: Vec<Gnss> = (0..10)
        .map(|i| {
            Gnss::new(
                i as f64,
                GnssStatus::FixedSolution,
                DVec3::new(31.2304 + 1e-4 * i as f64, 121.4737, 10.0),
                0.0,
                true,
            )
        })
        .collect();

    let origin = latlon_to_utm(fixes[0].lat_lon_alt.truncate())?.xy.extend(10.0);
    for fix in fixes.iter_mut() {
        convert_gnss_to_utm(fix, &extrinsics, origin)?;
    }

    assert!(fixes.iter().all(|f| f.pose_valid()));

    let first = fixes[0].utm_pose.unwrap();
    let last = fixes[9].utm_pose.unwrap();
    // ~100 m of northing between first and last fix
    let travelled = last.translation - first.translation;
    assert!(travelled.y > 95.0 && travelled.y < 105.0);
    assert!(travelled.x.abs() < 5.0);

    let (mid, nearest) = interpolate(
        4.5,
        &fixes,
        |f| f.timestamp,
        |f| f.utm_pose.unwrap_or_default(),
        DEFAULT_TIME_TOLERANCE,
    )
    .unwrap();
    let a = fixes[4].utm_pose.unwrap().translation;
    let b = fixes[5].utm_pose.unwrap().translation;
    assert!((mid.translation - (a + b) * 0.5).length() < 1e-6);
    assert_eq!(nearest.timestamp, 5.0);

    Ok(())
}
