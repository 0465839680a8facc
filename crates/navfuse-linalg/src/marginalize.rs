use nalgebra::DMatrix;
use thiserror::Error;

use crate::ops::pseudo_inverse;

/// Singular values of the eliminated block at or below this are treated as zero.
pub const SINGULAR_VALUE_THRESHOLD: f64 = 1e-6;

/// Error types for marginalization.
#[derive(Debug, Error, PartialEq)]
pub enum MarginalizeError {
    /// The information matrix is not square.
    #[error("Information matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// The block to eliminate is not inside the matrix.
    #[error("Invalid block [{start}, {end}] for a matrix of size {size}")]
    InvalidRange {
        /// First index of the block.
        start: usize,
        /// Last index of the block (inclusive).
        end: usize,
        /// Size of the matrix.
        size: usize,
    },

    /// Singular value decomposition failed.
    #[error("SVD computation failed: {0}")]
    SvdFailed(String),
}

/// Marginalize the variables `start..=end` out of the information matrix `h`.
///
/// The retained variables receive the Schur complement
/// `H_rr - H_rm H_mm⁺ H_mr`, where `H_mm⁺` is the SVD pseudo-inverse of the eliminated block.
/// The output has the size and layout of `h`; the rows and columns of the eliminated variables
/// are zero.
///
/// # Example
///
/// ```
/// use nalgebra::DMatrix;
/// use navfuse_linalg::marginalize::marginalize;
///
/// let h = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
/// let m = marginalize(&h, 1, 1).unwrap();
/// assert!((m[(0, 0)] - 1.5).abs() < 1e-12);
/// assert_eq!(m[(1, 1)], 0.0);
/// ```
pub fn marginalize(
    h: &DMatrix<f64>,
    start: usize,
    end: usize,
) -> Result<DMatrix<f64>, MarginalizeError> {
    let (rows, cols) = h.shape();
    if rows != cols {
        return Err(MarginalizeError::NotSquare { rows, cols });
    }
    let size = rows;
    if start > end || end >= size {
        return Err(MarginalizeError::InvalidRange { start, end, size });
    }

    // move the eliminated block to the bottom-right corner
    let perm: Vec<usize> = (0..start).chain(end + 1..size).chain(start..=end).collect();
    let hn = DMatrix::from_fn(size, size, |r, c| h[(perm[r], perm[c])]);

    let keep = size - (end - start + 1);
    let marg = size - keep;

    let h_mm = hn.view((keep, keep), (marg, marg)).into_owned();
    let h_mm_inv = pseudo_inverse(&h_mm, SINGULAR_VALUE_THRESHOLD)
        .ok_or_else(|| MarginalizeError::SvdFailed("Failed to compute U or V^T".to_string()))?;

    let h_rm = hn.view((0, keep), (keep, marg));
    let h_mr = hn.view((keep, 0), (marg, keep));
    let schur = hn.view((0, 0), (keep, keep)) - h_rm * h_mm_inv * h_mr;

    // restore the input ordering
    let mut out = DMatrix::zeros(size, size);
    for r in 0..keep {
        for c in 0..keep {
            out[(perm[r], perm[c])] = schur[(r, c)];
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::Rng;

    fn random_information(n: usize) -> DMatrix<f64> {
        let mut rng = rand::rng();
        let j = DMatrix::from_fn(n + 3, n, |_, _| rng.random_range(-1.0..1.0));
        j.transpose() * &j + DMatrix::identity(n, n) * 0.1
    }

    #[test]
    fn test_invalid_arguments() {
        let h = DMatrix::<f64>::identity(4, 4);
        assert_eq!(
            marginalize(&h, 2, 1),
            Err(MarginalizeError::InvalidRange {
                start: 2,
                end: 1,
                size: 4
            })
        );
        assert!(marginalize(&h, 0, 4).is_err());
        assert_eq!(
            marginalize(&DMatrix::zeros(3, 4), 0, 1),
            Err(MarginalizeError::NotSquare { rows: 3, cols: 4 })
        );
    }

    #[test]
    fn test_decoupled_block() -> Result<(), MarginalizeError> {
        let mut h = DMatrix::<f64>::zeros(6, 6);
        for i in 0..6 {
            h[(i, i)] = (i + 1) as f64;
        }
        h[(0, 5)] = 0.5;
        h[(5, 0)] = 0.5;

        let m = marginalize(&h, 2, 3)?;
        for r in 0..6 {
            for c in 0..6 {
                if (2..=3).contains(&r) || (2..=3).contains(&c) {
                    assert_eq!(m[(r, c)], 0.0);
                } else {
                    assert_relative_eq!(m[(r, c)], h[(r, c)], epsilon = 1e-12);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_schur_matches_covariance() -> Result<(), MarginalizeError> {
        // marginalizing information equals dropping the variables from the covariance
        let n = 7;
        let h = random_information(n);
        let cov = h.clone().try_inverse().unwrap();

        for (start, end) in [(0, 1), (2, 4), (5, 6), (3, 3)] {
            let m = marginalize(&h, start, end)?;

            let kept: Vec<usize> = (0..n).filter(|i| *i < start || *i > end).collect();
            let h_kept = DMatrix::from_fn(kept.len(), kept.len(), |r, c| m[(kept[r], kept[c])]);
            let cov_kept = DMatrix::from_fn(kept.len(), kept.len(), |r, c| cov[(kept[r], kept[c])]);

            let identity = h_kept * cov_kept;
            assert_relative_eq!(identity, DMatrix::identity(kept.len(), kept.len()), epsilon = 1e-8);

            for i in start..=end {
                assert!(m.row(i).iter().all(|v| *v == 0.0));
                assert!(m.column(i).iter().all(|v| *v == 0.0));
            }
        }
        Ok(())
    }

    #[test]
    fn test_singular_block() -> Result<(), MarginalizeError> {
        // the eliminated block carries no information at all
        let mut h = DMatrix::<f64>::identity(4, 4);
        h[(3, 3)] = 0.0;
        let m = marginalize(&h, 3, 3)?;
        assert_relative_eq!(
            m.view((0, 0), (3, 3)).into_owned(),
            DMatrix::identity(3, 3),
            epsilon = 1e-12
        );
        Ok(())
    }

    #[test]
    fn test_whole_matrix() -> Result<(), MarginalizeError> {
        let h = random_information(3);
        let m = marginalize(&h, 0, 2)?;
        assert!(m.iter().all(|v| *v == 0.0));
        Ok(())
    }
}
