/// An error type for the geodesy module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeodesyError {
    /// Latitude outside the UTM domain.
    #[error("Latitude {0} deg is outside [-80.5, 84.5]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside the accepted range.
    #[error("Longitude {0} deg is outside [-180, 360)")]
    LongitudeOutOfRange(f64),

    /// UTM zone outside 1..=60.
    #[error("Invalid UTM zone {0}")]
    InvalidZone(u8),

    /// Easting outside the valid band of a zone.
    #[error("Easting {0} m is outside [100000, 900000]")]
    EastingOutOfRange(f64),

    /// Northing outside the valid band.
    #[error("Northing {0} m is outside [0, 10000000]")]
    NorthingOutOfRange(f64),

    /// A valid heading is required but the fix does not carry one.
    #[error("GNSS heading is not valid")]
    HeadingInvalid,
}
