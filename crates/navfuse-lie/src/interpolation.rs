use thiserror::Error;

use crate::se3::SE3;

/// How far (seconds) a query may lie outside the data span and still be clamped to the end sample.
pub const DEFAULT_TIME_TOLERANCE: f64 = 0.5;

/// Two samples closer than this (seconds) are treated as one.
const MIN_TIME_SPAN: f64 = 1e-6;

/// Error types for pose interpolation.
#[derive(Debug, Error, PartialEq)]
pub enum InterpolationError {
    /// There is nothing to interpolate.
    #[error("No samples to interpolate")]
    Empty,

    /// The query time is NaN or infinite.
    #[error("Query time {0} is not finite")]
    InvalidTime(f64),

    /// The query lies outside the data span by more than the tolerance.
    #[error("Query time {query_time} is outside [{first_time}, {last_time}] by more than {tolerance} s")]
    OutOfRange {
        /// The requested time.
        query_time: f64,
        /// Time of the first sample.
        first_time: f64,
        /// Time of the last sample.
        last_time: f64,
        /// Tolerance used for clamping.
        tolerance: f64,
    },
}

/// Interpolate a pose at `query_time` from time-sorted samples.
///
/// `take_time` and `take_pose` extract the timestamp and pose of a sample, so any record type
/// can be used. Returns the interpolated pose together with the sample nearest to the query.
///
/// Queries outside the data span are clamped to the first/last sample when they are less than
/// `tolerance` seconds away from it. A non-finite query is an error. Inside the span the rotation is slerped and the translation is
/// interpolated linearly between the bracketing samples `t0 <= query_time < t1`.
///
/// PRECONDITION: `data` is sorted by time. This is not checked.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use navfuse_lie::interpolation::{interpolate, DEFAULT_TIME_TOLERANCE};
/// use navfuse_lie::se3::SE3;
///
/// let poses = vec![
///     (0.0, SE3::from_translation(DVec3::ZERO)),
///     (1.0, SE3::from_translation(DVec3::new(2.0, 0.0, 0.0))),
/// ];
/// let (pose, _) = interpolate(0.25, &poses, |p| p.0, |p| p.1, DEFAULT_TIME_TOLERANCE).unwrap();
/// assert!((pose.translation.x - 0.5).abs() < 1e-12);
/// ```
pub fn interpolate<T, FT, FP>(
    query_time: f64,
    data: &[T],
    take_time: FT,
    take_pose: FP,
    tolerance: f64,
) -> Result<(SE3, &T), InterpolationError>
where
    FT: Fn(&T) -> f64,
    FP: Fn(&T) -> SE3,
{
    if !query_time.is_finite() {
        return Err(InterpolationError::InvalidTime(query_time));
    }

    let (first, last) = match (data.first(), data.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(InterpolationError::Empty),
    };

    let first_time = take_time(first);
    let last_time = take_time(last);
    let out_of_range = InterpolationError::OutOfRange {
        query_time,
        first_time,
        last_time,
        tolerance,
    };

    if query_time == last_time {
        return Ok((take_pose(last), last));
    }

    if query_time > last_time {
        if query_time - last_time >= tolerance {
            return Err(out_of_range);
        }
        log::debug!("clamping query {query_time} to last sample at {last_time}");
        return Ok((take_pose(last), last));
    }

    if query_time < first_time {
        if first_time - query_time >= tolerance {
            return Err(out_of_range);
        }
        log::debug!("clamping query {query_time} to first sample at {first_time}");
        return Ok((take_pose(first), first));
    }

    // first_time <= query_time < last_time, so 1 <= idx < len
    let idx = data.partition_point(|d| take_time(d) <= query_time);
    let (prev, next) = (&data[idx - 1], &data[idx]);
    let (t0, t1) = (take_time(prev), take_time(next));

    let span = t1 - t0;
    if span.abs() < MIN_TIME_SPAN {
        return Ok((take_pose(prev), prev));
    }

    let s = (query_time - t0) / span;
    let (pose0, pose1) = (take_pose(prev), take_pose(next));
    let pose = SE3::new(
        pose0.rotation.slerp(&pose1.rotation, s),
        pose0.translation.lerp(pose1.translation, s),
    );
    let nearest = if s < 0.5 { prev } else { next };

    Ok((pose, nearest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[derive(Debug, PartialEq)]
    struct Stamped {
        time: f64,
        pose: SE3,
    }

    fn track() -> Vec<Stamped> {
        (0..5)
            .map(|i| Stamped {
                time: i as f64,
                pose: SE3::from_rotation_z(0.1 * i as f64, DVec3::new(i as f64, 0.0, 0.0)),
            })
            .collect()
    }

    fn run(query: f64, data: &[Stamped]) -> Result<(SE3, &Stamped), InterpolationError> {
        interpolate(query, data, |d| d.time, |d| d.pose, DEFAULT_TIME_TOLERANCE)
    }

    #[test]
    fn test_empty() {
        assert_eq!(run(0.0, &[]).unwrap_err(), InterpolationError::Empty);
    }

    #[test]
    fn test_at_samples() {
        let data = track();
        for d in &data {
            let (pose, nearest) = run(d.time, &data).unwrap();
            assert!((pose.translation - d.pose.translation).length() < 1e-12);
            assert!((pose.rotation.log() - d.pose.rotation.log()).length() < 1e-12);
            assert_eq!(nearest, d);
        }
    }

    #[test]
    fn test_between_samples() {
        let data = track();
        let (pose, nearest) = run(1.25, &data).unwrap();
        assert_relative_eq!(pose.translation.x, 1.25, epsilon = 1e-12);
        assert_relative_eq!(pose.rotation.log().z, 0.125, epsilon = 1e-12);
        assert_eq!(nearest.time, 1.0);

        let (_, nearest) = run(1.75, &data).unwrap();
        assert_eq!(nearest.time, 2.0);
    }

    #[test]
    fn test_after_last() {
        let data = track();
        let (pose, nearest) = run(4.3, &data).unwrap();
        assert_eq!(pose, data[4].pose);
        assert_eq!(nearest.time, 4.0);

        assert!(matches!(
            run(4.6, &data),
            Err(InterpolationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_before_first() {
        let data = track();
        let (pose, _) = run(-0.2, &data).unwrap();
        assert_eq!(pose, data[0].pose);

        assert!(matches!(
            run(-1.0, &data),
            Err(InterpolationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_tolerance_boundary() {
        let data = track();
        assert!(run(4.49, &data).is_ok());
        assert!(matches!(
            run(4.5, &data),
            Err(InterpolationError::OutOfRange { .. })
        ));
        assert!(run(-0.49, &data).is_ok());
        assert!(matches!(
            run(-0.5, &data),
            Err(InterpolationError::OutOfRange { .. })
        ));

        // an exact hit on the last sample needs no tolerance
        let (pose, _) = interpolate(4.0, &data, |d| d.time, |d| d.pose, 0.0).unwrap();
        assert_eq!(pose, data[4].pose);
    }

    #[test]
    fn test_non_finite_query() {
        let data = track();
        assert!(matches!(
            run(f64::NAN, &data),
            Err(InterpolationError::InvalidTime(t)) if t.is_nan()
        ));
        assert_eq!(
            run(f64::INFINITY, &data).unwrap_err(),
            InterpolationError::InvalidTime(f64::INFINITY)
        );
        assert!(matches!(
            run(f64::NAN, &[]),
            Err(InterpolationError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_close_timestamps() {
        let data = vec![
            Stamped {
                time: 1.0,
                pose: SE3::from_translation(DVec3::X),
            },
            Stamped {
                time: 1.0 + 1e-7,
                pose: SE3::from_translation(DVec3::Y),
            },
            Stamped {
                time: 2.0,
                pose: SE3::from_translation(DVec3::Z),
            },
        ];
        let (pose, nearest) = run(1.00000005, &data).unwrap();
        assert_eq!(pose.translation, DVec3::X);
        assert_eq!(nearest.time, 1.0);
    }

    #[test]
    fn test_single_sample() {
        let data = vec![Stamped {
            time: 3.0,
            pose: SE3::IDENTITY,
        }];
        assert!(run(3.0, &data).is_ok());
        assert!(run(3.4, &data).is_ok());
        assert!(run(2.7, &data).is_ok());
        assert!(run(4.0, &data).is_err());
    }
}
