//! Transverse Mercator projection of the WGS84 ellipsoid in UTM zones.
//!
//! The forward and inverse maps use the Krüger series to third order in the third flattening
//! `n`, which keeps the error well below a millimetre inside a zone.

use glam::DVec2;
use navfuse_core::gnss::UtmCoordinate;
use navfuse_lie::ops::{DEG2RAD, RAD2DEG};

use crate::error::GeodesyError;

/// WGS84 semi-major axis in meters.
pub const EQUATORIAL_RADIUS: f64 = 6378137.0;

/// WGS84 flattening.
pub const FLATTENING: f64 = 1.0 / 298.257223563;

/// UTM scale factor on the central meridian.
pub const SCALE_FACTOR: f64 = 0.9996;

/// Easting of the central meridian in meters.
pub const FALSE_EASTING: f64 = 500_000.0;

/// Northing offset applied in the southern hemisphere, in meters.
pub const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const MIN_LATITUDE: f64 = -80.5;
const MAX_LATITUDE: f64 = 84.5;
const MIN_EASTING: f64 = 100_000.0;
const MAX_EASTING: f64 = 900_000.0;
const MAX_NORTHING: f64 = 10_000_000.0;
const NUM_ZONES: u8 = 60;

/// Series coefficients of the WGS84 ellipsoid.
struct KruegerSeries {
    /// Rectifying radius.
    rect_radius: f64,
    /// First eccentricity.
    ecc: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl KruegerSeries {
    fn wgs84() -> Self {
        let n = FLATTENING / (2.0 - FLATTENING);
        let (n2, n3) = (n * n, n * n * n);

        Self {
            rect_radius: EQUATORIAL_RADIUS / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
            ecc: 2.0 * n.sqrt() / (1.0 + n),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }
}

/// Longitude in degrees of the central meridian of `zone`.
pub fn central_meridian(zone: u8) -> f64 {
    (zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
}

/// UTM zone of a longitude in `[-180, 180)` degrees.
fn zone_of(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / 6.0).floor() as u8 + 1;
    zone.min(NUM_ZONES)
}

/// Project a latitude/longitude pair (degrees) to UTM.
///
/// The zone is derived from the longitude on every call and the hemisphere from the sign of
/// the latitude. Longitudes in `[180, 360)` are wrapped to `[-180, 0)`. The returned height is
/// zero.
///
/// # Example
///
/// ```
/// use glam::DVec2;
/// use navfuse_geodesy::utm::latlon_to_utm;
///
/// let utm = latlon_to_utm(DVec2::new(31.2304, 121.4737)).unwrap();
/// assert_eq!(utm.zone, 51);
/// assert!(utm.north);
/// ```
pub fn latlon_to_utm(latlon: DVec2) -> Result<UtmCoordinate, GeodesyError> {
    let lat = latlon.x;
    let mut lon = latlon.y;

    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
        return Err(GeodesyError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..360.0).contains(&lon) {
        return Err(GeodesyError::LongitudeOutOfRange(lon));
    }
    if lon >= 180.0 {
        lon -= 360.0;
    }

    let zone = zone_of(lon);
    let north = lat >= 0.0;

    let series = KruegerSeries::wgs84();
    let phi = lat * DEG2RAD;
    let lambda = (lon - central_meridian(zone)) * DEG2RAD;

    // conformal latitude
    let sin_phi = phi.sin();
    let t = (sin_phi.atanh() - series.ecc * (series.ecc * sin_phi).atanh()).sinh();

    let xi_p = t.atan2(lambda.cos());
    let eta_p = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

    let (mut xi, mut eta) = (xi_p, eta_p);
    for (j, a) in series.alpha.iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
        eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
    }

    let scale = SCALE_FACTOR * series.rect_radius;
    let easting = FALSE_EASTING + scale * eta;
    let mut northing = scale * xi;
    if !north {
        northing += FALSE_NORTHING_SOUTH;
    }

    Ok(UtmCoordinate::new(zone, DVec2::new(easting, northing), north))
}

/// Inverse projection of a UTM coordinate to latitude/longitude in degrees.
///
/// The returned longitude is in `[-180, 180]`.
pub fn utm_to_latlon(utm: &UtmCoordinate) -> Result<DVec2, GeodesyError> {
    if !(1..=NUM_ZONES).contains(&utm.zone) {
        return Err(GeodesyError::InvalidZone(utm.zone));
    }

    let (easting, northing) = (utm.xy.x, utm.xy.y);
    if !(MIN_EASTING..=MAX_EASTING).contains(&easting) {
        return Err(GeodesyError::EastingOutOfRange(easting));
    }
    if !(0.0..=MAX_NORTHING).contains(&northing) {
        return Err(GeodesyError::NorthingOutOfRange(northing));
    }

    let series = KruegerSeries::wgs84();
    let scale = SCALE_FACTOR * series.rect_radius;

    let false_northing = if utm.north { 0.0 } else { FALSE_NORTHING_SOUTH };
    let xi = (northing - false_northing) / scale;
    let eta = (easting - FALSE_EASTING) / scale;

    let (mut xi_p, mut eta_p) = (xi, eta);
    for (j, b) in series.beta.iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        xi_p -= b * (k * xi).sin() * (k * eta).cosh();
        eta_p -= b * (k * xi).cos() * (k * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).asin();
    let mut phi = chi;
    for (j, d) in series.delta.iter().enumerate() {
        phi += d * (2.0 * (j + 1) as f64 * chi).sin();
    }

    let lambda = eta_p.sinh().atan2(xi_p.cos());

    Ok(DVec2::new(
        phi * RAD2DEG,
        central_meridian(utm.zone) + lambda * RAD2DEG,
    ))
}
