use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use glam::DVec3;
use navfuse_core::{
    gnss::{Gnss, GnssStatus},
    imu::Imu,
    odom::Odom,
};

/// Error types for the text reader.
#[derive(Debug, thiserror::Error)]
pub enum TxtIoError {
    /// Error reading the file
    #[error("error reading file")]
    IoError(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),
}

/// A single measurement read from a log line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// `IMU t gx gy gz ax ay az`
    Imu(Imu),
    /// `ODOM t wl wr`
    Odom(Odom),
    /// `GNSS t lat lon alt heading heading_valid`
    Gnss(Gnss),
}

/// Number of records of each kind seen by [`TxtIo::go`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// IMU records.
    pub imu: usize,
    /// Odometry records.
    pub odom: usize,
    /// GNSS records.
    pub gnss: usize,
    /// Lines with an unknown tag.
    pub unknown: usize,
}

fn parse_part<T: std::str::FromStr>(s: &str) -> Result<T, TxtIoError>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| TxtIoError::ParseError(format!("{}: {}", s, e)))
}

fn parse_flag(s: &str) -> Result<bool, TxtIoError> {
    match s {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(TxtIoError::ParseError(format!("{}: invalid flag", s))),
    }
}

fn parse_values<const N: usize>(tag: &str, parts: &[&str]) -> Result<[f64; N], TxtIoError> {
    if parts.len() < N {
        return Err(TxtIoError::ParseError(format!(
            "{} record expects {} values, got {}",
            tag,
            N,
            parts.len()
        )));
    }

    let mut values = [0.0; N];
    for (value, part) in values.iter_mut().zip(parts) {
        let parsed: f64 = parse_part(part)?;
        if !parsed.is_finite() {
            return Err(TxtIoError::ParseError(format!("{}: value is not finite", part)));
        }
        *value = parsed;
    }
    Ok(values)
}

/// Parse one log line.
///
/// Returns `Ok(None)` for empty lines, `#` comments and unknown tags.
///
/// # Example
///
/// ```
/// use navfuse_io::txt::{parse_record, Record};
///
/// let record = parse_record("ODOM 12.5 100 102").unwrap();
/// assert!(matches!(record, Some(Record::Odom(_))));
/// assert!(parse_record("# comment").unwrap().is_none());
/// ```
pub fn parse_record(line: &str) -> Result<Option<Record>, TxtIoError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parts = line.split_whitespace().collect::<Vec<_>>();
    let (tag, values) = match parts.split_first() {
        Some((tag, values)) => (*tag, values),
        None => return Ok(None),
    };

    let record = match tag {
        "IMU" => {
            let [t, gx, gy, gz, ax, ay, az] = parse_values(tag, values)?;
            Record::Imu(Imu::new(
                t,
                DVec3::new(gx, gy, gz),
                DVec3::new(ax, ay, az),
            ))
        }
        "ODOM" => {
            let [t, wl, wr] = parse_values(tag, values)?;
            Record::Odom(Odom::new(t, wl, wr))
        }
        "GNSS" => {
            let [t, lat, lon, alt, heading] = parse_values(tag, values)?;
            let heading_valid = match values.get(5) {
                Some(flag) => parse_flag(flag)?,
                None => {
                    return Err(TxtIoError::ParseError(format!(
                        "GNSS record expects 6 values, got {}",
                        values.len()
                    )))
                }
            };
            // the log carries no fix quality
            Record::Gnss(Gnss::new(
                t,
                GnssStatus::FixedSolution,
                DVec3::new(lat, lon, alt),
                heading,
                heading_valid,
            ))
        }
        _ => {
            log::debug!("skipping record with unknown tag {tag}");
            return Ok(None);
        }
    };

    Ok(Some(record))
}

type Callback<'a, T> = Box<dyn FnMut(&T) + 'a>;

/// Reads a text log line by line and hands every record to the matching callback.
///
/// # Example
///
/// ```
/// use navfuse_io::txt::TxtIo;
///
/// let log = "IMU 0.0 0 0 0 0 0 9.8\nODOM 0.0 1 1\nIMU 0.01 0 0 0 0 0 9.8\n";
/// let mut times = vec![];
/// let summary = TxtIo::from_reader(log.as_bytes())
///     .set_imu_process_func(|imu| times.push(imu.timestamp))
///     .go()
///     .unwrap();
/// assert_eq!(summary.imu, 2);
/// assert_eq!(times, vec![0.0, 0.01]);
/// ```
pub struct TxtIo<'a, R> {
    reader: R,
    imu_proc: Option<Callback<'a, Imu>>,
    odom_proc: Option<Callback<'a, Odom>>,
    gnss_proc: Option<Callback<'a, Gnss>>,
}

impl TxtIo<'_, BufReader<File>> {
    /// Open a log file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TxtIoError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<'a, R: BufRead> TxtIo<'a, R> {
    /// Read a log from any buffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            imu_proc: None,
            odom_proc: None,
            gnss_proc: None,
        }
    }

    /// Set the callback for IMU records.
    pub fn set_imu_process_func(mut self, func: impl FnMut(&Imu) + 'a) -> Self {
        self.imu_proc = Some(Box::new(func));
        self
    }

    /// Set the callback for odometry records.
    pub fn set_odom_process_func(mut self, func: impl FnMut(&Odom) + 'a) -> Self {
        self.odom_proc = Some(Box::new(func));
        self
    }

    /// Set the callback for GNSS records.
    pub fn set_gnss_process_func(mut self, func: impl FnMut(&Gnss) + 'a) -> Self {
        self.gnss_proc = Some(Box::new(func));
        self
    }

    /// Read the whole log, dispatching records in file order.
    ///
    /// Records without a callback are parsed and counted but otherwise dropped. Reading stops
    /// at the first malformed line.
    pub fn go(mut self) -> Result<IngestSummary, TxtIoError> {
        let mut summary = IngestSummary::default();

        for (idx, line) in self.reader.lines().enumerate() {
            let line = line?;
            let record = parse_record(&line).map_err(|e| match e {
                TxtIoError::ParseError(msg) => {
                    TxtIoError::ParseError(format!("at line {}: {}", idx + 1, msg))
                }
                other => other,
            })?;

            match record {
                Some(Record::Imu(imu)) => {
                    summary.imu += 1;
                    if let Some(func) = self.imu_proc.as_mut() {
                        func(&imu);
                    }
                }
                Some(Record::Odom(odom)) => {
                    summary.odom += 1;
                    if let Some(func) = self.odom_proc.as_mut() {
                        func(&odom);
                    }
                }
                Some(Record::Gnss(gnss)) => {
                    summary.gnss += 1;
                    if let Some(func) = self.gnss_proc.as_mut() {
                        func(&gnss);
                    }
                }
                None => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        summary.unknown += 1;
                    }
                }
            }
        }

        log::info!(
            "done: {} imu, {} odom, {} gnss records",
            summary.imu,
            summary.odom,
            summary.gnss
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_imu() -> Result<(), TxtIoError> {
        let record = parse_record("IMU 1624426287.2 0.01 -0.02 0.03 0.1 0.2 9.8")?;
        let Some(Record::Imu(imu)) = record else {
            panic!("expected an IMU record");
        };
        assert_eq!(imu.timestamp, 1624426287.2);
        assert_eq!(imu.gyro, DVec3::new(0.01, -0.02, 0.03));
        assert_eq!(imu.acce, DVec3::new(0.1, 0.2, 9.8));
        Ok(())
    }

    #[test]
    fn test_parse_gnss() -> Result<(), TxtIoError> {
        let record = parse_record("GNSS 10.5 31.2304 121.4737 10.0 87.5 1")?;
        let Some(Record::Gnss(gnss)) = record else {
            panic!("expected a GNSS record");
        };
        assert_eq!(gnss.status, GnssStatus::FixedSolution);
        assert_eq!(gnss.lat_lon_alt, DVec3::new(31.2304, 121.4737, 10.0));
        assert!(gnss.heading_valid);
        assert!(!gnss.utm_valid());

        let record = parse_record("GNSS 10.5 31.2304 121.4737 10.0 87.5 false")?;
        assert!(matches!(record, Some(Record::Gnss(g)) if !g.heading_valid));
        Ok(())
    }

    #[test]
    fn test_skipped_lines() -> Result<(), TxtIoError> {
        assert!(parse_record("")?.is_none());
        assert!(parse_record("   ")?.is_none());
        assert!(parse_record("# IMU 1 2 3")?.is_none());
        assert!(parse_record("LIDAR 1.0 a b c")?.is_none());
        Ok(())
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            parse_record("IMU 1.0 0.1 0.2"),
            Err(TxtIoError::ParseError(_))
        ));
        assert!(matches!(
            parse_record("ODOM 1.0 abc 2"),
            Err(TxtIoError::ParseError(_))
        ));
        assert!(matches!(
            parse_record("GNSS 1 2 3 4 5"),
            Err(TxtIoError::ParseError(_))
        ));
        assert!(matches!(
            parse_record("GNSS 1 2 3 4 5 maybe"),
            Err(TxtIoError::ParseError(_))
        ));
    }

    #[test]
    fn test_non_finite_values() {
        for line in [
            "IMU nan 0 0 0 0 0 9.8",
            "IMU 1.0 0 inf 0 0 0 9.8",
            "ODOM -inf 1 1",
            "GNSS 1 NaN 3 4 5 1",
        ] {
            assert!(
                matches!(parse_record(line), Err(TxtIoError::ParseError(_))),
                "{line}"
            );
        }

        let log = "IMU 0.0 0 0 0 0 0 9.8\nIMU nan 0 0 0 0 0 9.8\n";
        let err = TxtIo::from_reader(log.as_bytes()).go().unwrap_err();
        assert!(err.to_string().contains("at line 2"), "{err}");
    }

    #[test]
    fn test_go_reports_line() {
        let log = "ODOM 0 1 1\n\nODOM x 1 1\n";
        let err = TxtIo::from_reader(log.as_bytes()).go().unwrap_err();
        assert!(err.to_string().contains("at line 3"), "{err}");
    }
}
