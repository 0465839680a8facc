use glam::{DVec2, DVec3, DVec4};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for the fitting routines.
#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    /// Not enough points for the model.
    #[error("Fitting requires at least {required} points, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points.
        required: usize,
        /// Number of points provided.
        actual: usize,
    },

    /// A point does not agree with the fitted model.
    #[error("Point {index} has residual {residual} above {eps}")]
    ResidualExceeded {
        /// Index of the first offending point.
        index: usize,
        /// Its residual.
        residual: f64,
        /// Threshold that was exceeded.
        eps: f64,
    },

    /// The points do not determine a model.
    #[error("Degenerate point configuration")]
    Degenerate,

    /// Singular value decomposition failed.
    #[error("SVD computation failed: {0}")]
    SvdFailed(String),
}

/// Residual thresholds for plane and line fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Largest squared plane residual.
    pub plane_eps: f64,
    /// Largest squared point-to-line distance.
    pub line_eps: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            plane_eps: 1e-2,
            line_eps: 0.2,
        }
    }
}

/// A line in 3D through `origin` along the unit vector `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line3 {
    /// A point on the line.
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
}

impl Line3 {
    /// Squared distance of `point` to the line.
    pub fn squared_distance(&self, point: DVec3) -> f64 {
        self.direction.cross(point - self.origin).length_squared()
    }
}

fn check_len(actual: usize, required: usize) -> Result<(), FitError> {
    if actual < required {
        return Err(FitError::InsufficientPoints { required, actual });
    }
    Ok(())
}

fn check_residual(index: usize, residual: f64, eps: f64) -> Result<(), FitError> {
    if residual > eps {
        log::debug!("fit rejected: point {index} residual {residual} > {eps}");
        return Err(FitError::ResidualExceeded {
            index,
            residual,
            eps,
        });
    }
    Ok(())
}

/// Right singular vector of `a` for the smallest (or largest) singular value.
fn singular_vector(a: DMatrix<f64>, smallest: bool) -> Result<DVector<f64>, FitError> {
    let svd = a.svd(false, true);
    let v_t = match svd.v_t {
        Some(v) => v,
        None => return Err(FitError::SvdFailed("Failed to compute V^T".to_string())),
    };

    let values = svd.singular_values.iter().enumerate();
    let picked = if smallest {
        values.min_by(|a, b| a.1.total_cmp(b.1))
    } else {
        values.max_by(|a, b| a.1.total_cmp(b.1))
    };
    let (idx, _) = picked.ok_or(FitError::Degenerate)?;

    Ok(v_t.row(idx).transpose())
}

/// Fit a plane `a x + b y + c z + d = 0` to at least three points.
///
/// The coefficients `(a, b, c, d)` have unit norm. Every point must satisfy
/// `(a x + b y + c z + d)² <= eps`.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use navfuse_linalg::fit::fit_plane;
///
/// let points = [
///     DVec3::new(0.0, 0.0, 1.0),
///     DVec3::new(1.0, 0.0, 1.0),
///     DVec3::new(0.0, 1.0, 1.0),
///     DVec3::new(1.0, 1.0, 1.0),
/// ];
/// let plane = fit_plane(&points, 1e-2).unwrap();
/// assert!((plane.x.abs() + plane.y.abs()) < 1e-9);
/// assert!((plane.z + plane.w).abs() < 1e-9);
/// ```
pub fn fit_plane(points: &[DVec3], eps: f64) -> Result<DVec4, FitError> {
    check_len(points.len(), 3)?;

    // zero rows keep the null space of three points in the thin decomposition
    let rows = points.len().max(4);
    let a = DMatrix::from_fn(rows, 4, |r, c| match points.get(r) {
        Some(p) if c < 3 => p[c],
        Some(_) => 1.0,
        None => 0.0,
    });

    let v = singular_vector(a, true)?;
    let coeffs = DVec4::new(v[0], v[1], v[2], v[3]);

    for (i, p) in points.iter().enumerate() {
        let err = coeffs.truncate().dot(*p) + coeffs.w;
        check_residual(i, err * err, eps)?;
    }

    Ok(coeffs)
}

/// Fit a 3D line to at least two points.
///
/// The origin is the centroid and the direction the principal axis of the points. Every point
/// must lie within squared distance `eps` of the line.
pub fn fit_line(points: &[DVec3], eps: f64) -> Result<Line3, FitError> {
    check_len(points.len(), 2)?;

    let origin = points.iter().sum::<DVec3>() / points.len() as f64;
    let y = DMatrix::from_fn(points.len(), 3, |r, c| (points[r] - origin)[c]);

    let v = singular_vector(y, false)?;
    let direction = DVec3::new(v[0], v[1], v[2]);
    if !direction.is_normalized() {
        return Err(FitError::Degenerate);
    }

    let line = Line3 { origin, direction };
    for (i, p) in points.iter().enumerate() {
        check_residual(i, line.squared_distance(*p), eps)?;
    }

    Ok(line)
}

/// Fit a 2D line `a x + b y + c = 0` to at least two points.
///
/// The coefficients have unit norm. When `eps` is given every point must satisfy
/// `(a x + b y + c)² <= eps`; otherwise the fit is returned unchecked.
pub fn fit_line_2d(points: &[DVec2], eps: Option<f64>) -> Result<DVec3, FitError> {
    check_len(points.len(), 2)?;

    let rows = points.len().max(3);
    let a = DMatrix::from_fn(rows, 3, |r, c| match points.get(r) {
        Some(p) if c < 2 => p[c],
        Some(_) => 1.0,
        None => 0.0,
    });

    let v = singular_vector(a, true)?;
    let coeffs = DVec3::new(v[0], v[1], v[2]);

    if let Some(eps) = eps {
        for (i, p) in points.iter().enumerate() {
            let err = coeffs.x * p.x + coeffs.y * p.y + coeffs.z;
            check_residual(i, err * err, eps)?;
        }
    }

    Ok(coeffs)
}

/// Fit a plane by least squares on `n · p = -1`, for planes that do not pass through the origin.
///
/// Returns `(n̂, d)` with a unit normal `n̂` and `d = 1 / |n|`. Every point must satisfy
/// `|n̂ · p + d| <= threshold`.
pub fn estimate_plane_dynamic(points: &[DVec3], threshold: f64) -> Result<DVec4, FitError> {
    if points.len() < 3 {
        log::warn!("plane estimation needs at least 3 points, given {}", points.len());
    }
    check_len(points.len(), 3)?;

    let a = DMatrix::from_fn(points.len(), 3, |r, c| points[r][c]);
    let b = DVector::from_element(points.len(), -1.0);

    let n = a
        .svd(true, true)
        .solve(&b, 1e-12)
        .map_err(|e| FitError::SvdFailed(e.to_string()))?;
    let normal = DVec3::new(n[0], n[1], n[2]);

    let len = normal.length();
    if len == 0.0 || !len.is_finite() {
        return Err(FitError::Degenerate);
    }
    let normal = normal / len;
    let d = 1.0 / len;

    for (i, p) in points.iter().enumerate() {
        check_residual(i, (normal.dot(*p) + d).abs(), threshold)?;
    }

    Ok(normal.extend(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane_points() -> Vec<DVec3> {
        // z = 0.5 x - 0.2 y + 2
        let mut points = vec![];
        for i in 0..5 {
            for j in 0..5 {
                let (x, y) = (i as f64, j as f64 * 0.7);
                points.push(DVec3::new(x, y, 0.5 * x - 0.2 * y + 2.0));
            }
        }
        points
    }

    #[test]
    fn test_fit_plane_exact() -> Result<(), FitError> {
        let points = plane_points();
        let plane = fit_plane(&points, FitParams::default().plane_eps)?;
        assert_relative_eq!(plane.length(), 1.0, epsilon = 1e-12);
        for p in &points {
            assert!((plane.truncate().dot(*p) + plane.w).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_fit_plane_three_points() -> Result<(), FitError> {
        let points = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
        ];
        let plane = fit_plane(&points, 1e-6)?;
        // x + y + z = 1
        let scale = plane.x;
        assert_relative_eq!(plane.y / scale, 1.0, epsilon = 1e-9);
        assert_relative_eq!(plane.z / scale, 1.0, epsilon = 1e-9);
        assert_relative_eq!(plane.w / scale, -1.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_fit_plane_outlier() {
        let mut points = plane_points();
        points[7].z += 5.0;
        assert!(matches!(
            fit_plane(&points, 1e-2),
            Err(FitError::ResidualExceeded { .. })
        ));
    }

    #[test]
    fn test_fit_plane_insufficient() {
        let points = [DVec3::ZERO, DVec3::X];
        assert_eq!(
            fit_plane(&points, 1e-2),
            Err(FitError::InsufficientPoints {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_fit_line() -> Result<(), FitError> {
        let dir = DVec3::new(1.0, 2.0, -0.5).normalize();
        let points: Vec<DVec3> = (0..10)
            .map(|i| DVec3::new(1.0, -1.0, 3.0) + dir * i as f64)
            .collect();

        let line = fit_line(&points, FitParams::default().line_eps)?;
        assert_relative_eq!(line.direction.dot(dir).abs(), 1.0, epsilon = 1e-12);
        assert!((line.origin - (DVec3::new(1.0, -1.0, 3.0) + dir * 4.5)).length() < 1e-12);
        for p in &points {
            assert!(line.squared_distance(*p) < 1e-18);
        }
        Ok(())
    }

    #[test]
    fn test_fit_line_two_points() -> Result<(), FitError> {
        let line = fit_line(&[DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0)], 0.2)?;
        assert_relative_eq!(line.direction.z.abs(), 1.0, epsilon = 1e-12);
        assert_eq!(line.origin, DVec3::new(0.0, 0.0, 1.0));
        Ok(())
    }

    #[test]
    fn test_fit_line_outlier() {
        let mut points: Vec<DVec3> = (0..10).map(|i| DVec3::X * i as f64).collect();
        points[3].y = 2.0;
        assert!(matches!(
            fit_line(&points, 0.2),
            Err(FitError::ResidualExceeded { .. })
        ));
    }

    #[test]
    fn test_fit_line_2d() -> Result<(), FitError> {
        // y = 2 x + 1
        let points: Vec<DVec2> = (0..6)
            .map(|i| DVec2::new(i as f64, 2.0 * i as f64 + 1.0))
            .collect();
        let coeffs = fit_line_2d(&points, Some(1e-9))?;
        assert_relative_eq!(coeffs.y / coeffs.x, -0.5, epsilon = 1e-9);
        assert_relative_eq!(coeffs.z / coeffs.x, 0.5, epsilon = 1e-9);

        let two = fit_line_2d(&points[..2], None)?;
        assert_relative_eq!(two.length(), 1.0, epsilon = 1e-12);

        let mut noisy = points.clone();
        noisy[2].y += 3.0;
        assert!(fit_line_2d(&noisy, None).is_ok());
        assert!(fit_line_2d(&noisy, Some(1e-3)).is_err());
        Ok(())
    }

    #[test]
    fn test_estimate_plane_dynamic() -> Result<(), FitError> {
        let points = plane_points();
        let plane = estimate_plane_dynamic(&points, 0.1)?;
        assert_relative_eq!(plane.truncate().length(), 1.0, epsilon = 1e-12);
        for p in &points {
            assert!((plane.truncate().dot(*p) + plane.w).abs() < 1e-9);
        }

        let mut noisy = points.clone();
        noisy[0].z += 1.0;
        assert!(matches!(
            estimate_plane_dynamic(&noisy, 0.1),
            Err(FitError::ResidualExceeded { .. })
        ));

        assert!(matches!(
            estimate_plane_dynamic(&points[..2], 0.1),
            Err(FitError::InsufficientPoints { .. })
        ));
        Ok(())
    }
}
