#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the geodetic conversions.
pub mod error;

/// Conversion of GNSS fixes to UTM positions and vehicle poses.
pub mod gnss;

/// WGS84 latitude/longitude to UTM projection.
pub mod utm;

pub use error::GeodesyError;
