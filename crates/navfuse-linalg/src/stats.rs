use nalgebra::{DMatrix, DVector, SMatrix, SVector};
use num_traits::Float;
use thiserror::Error;

/// Error types for the statistics routines.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    /// Not enough samples for the requested statistic.
    #[error("At least {required} samples are required, got {actual}")]
    InsufficientSamples {
        /// Minimum number of samples.
        required: usize,
        /// Number of samples provided.
        actual: usize,
    },

    /// A summary to be merged has no samples.
    #[error("Sample counts must be positive, got {hist_n} and {curr_n}")]
    InvalidCount {
        /// Number of samples of the history summary.
        hist_n: usize,
        /// Number of samples of the current summary.
        curr_n: usize,
    },

    /// The covariance matrix cannot be inverted.
    #[error("Covariance matrix is singular")]
    SingularCovariance,
}

fn collect_samples<I, F, const D: usize>(
    data: I,
    getter: F,
) -> Result<Vec<SVector<f64, D>>, StatsError>
where
    I: IntoIterator,
    F: Fn(I::Item) -> SVector<f64, D>,
{
    let samples: Vec<_> = data.into_iter().map(getter).collect();
    if samples.len() < 2 {
        return Err(StatsError::InsufficientSamples {
            required: 2,
            actual: samples.len(),
        });
    }
    Ok(samples)
}

fn mean_of<const D: usize>(samples: &[SVector<f64, D>]) -> SVector<f64, D> {
    samples.iter().sum::<SVector<f64, D>>() / samples.len() as f64
}

/// Mean and per-component (unbiased) variance of the values extracted by `getter`.
///
/// # Example
///
/// ```
/// use nalgebra::Vector2;
/// use navfuse_linalg::stats::compute_mean_and_cov_diag;
///
/// let data = [(1.0, 10.0), (3.0, 10.0)];
/// let (mean, var) = compute_mean_and_cov_diag(&data, |d| Vector2::new(d.0, d.1)).unwrap();
/// assert_eq!(mean, Vector2::new(2.0, 10.0));
/// assert_eq!(var, Vector2::new(2.0, 0.0));
/// ```
pub fn compute_mean_and_cov_diag<I, F, const D: usize>(
    data: I,
    getter: F,
) -> Result<(SVector<f64, D>, SVector<f64, D>), StatsError>
where
    I: IntoIterator,
    F: Fn(I::Item) -> SVector<f64, D>,
{
    let samples = collect_samples(data, getter)?;
    let mean = mean_of(&samples);

    let var = samples
        .iter()
        .map(|v| (v - mean).component_mul(&(v - mean)))
        .sum::<SVector<f64, D>>()
        / (samples.len() - 1) as f64;

    Ok((mean, var))
}

/// Mean and (unbiased) covariance matrix of the values extracted by `getter`.
pub fn compute_mean_and_cov<I, F, const D: usize>(
    data: I,
    getter: F,
) -> Result<(SVector<f64, D>, SMatrix<f64, D, D>), StatsError>
where
    I: IntoIterator,
    F: Fn(I::Item) -> SVector<f64, D>,
{
    let samples = collect_samples(data, getter)?;
    let mean = mean_of(&samples);

    let cov = samples
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d.transpose()
        })
        .sum::<SMatrix<f64, D, D>>()
        / (samples.len() - 1) as f64;

    Ok((mean, cov))
}

/// Merge two Gaussian summaries into the summary of the union of their samples.
///
/// Both covariances follow the unbiased (`n - 1`) convention of [`compute_mean_and_cov`], so the
/// result equals the batch statistics of the union regardless of how the samples were split.
pub fn update_mean_and_cov<const D: usize>(
    hist_n: usize,
    hist_mean: &SVector<f64, D>,
    hist_cov: &SMatrix<f64, D, D>,
    curr_n: usize,
    curr_mean: &SVector<f64, D>,
    curr_cov: &SMatrix<f64, D, D>,
) -> Result<(SVector<f64, D>, SMatrix<f64, D, D>), StatsError> {
    if hist_n == 0 || curr_n == 0 {
        return Err(StatsError::InvalidCount { hist_n, curr_n });
    }

    let (m, n) = (hist_n as f64, curr_n as f64);
    let new_mean = (hist_mean * m + curr_mean * n) / (m + n);

    let d_hist = hist_mean - new_mean;
    let d_curr = curr_mean - new_mean;
    let scatter = hist_cov * (m - 1.0)
        + curr_cov * (n - 1.0)
        + d_hist * d_hist.transpose() * m
        + d_curr * d_curr.transpose() * n;

    Ok((new_mean, scatter / (m + n - 1.0)))
}

/// Scalar version of [`update_mean_and_cov`].
pub fn history_mean_and_var<T: Float>(
    hist_n: usize,
    hist_mean: T,
    hist_var: T,
    curr_n: usize,
    curr_mean: T,
    curr_var: T,
) -> Result<(T, T), StatsError> {
    let invalid = StatsError::InvalidCount { hist_n, curr_n };
    if hist_n == 0 || curr_n == 0 {
        return Err(invalid);
    }

    let (m, n) = match (T::from(hist_n), T::from(curr_n)) {
        (Some(m), Some(n)) => (m, n),
        _ => return Err(invalid),
    };

    let new_mean = (hist_mean * m + curr_mean * n) / (m + n);
    let d_hist = hist_mean - new_mean;
    let d_curr = curr_mean - new_mean;
    let scatter = hist_var * (m - T::one())
        + curr_var * (n - T::one())
        + d_hist * d_hist * m
        + d_curr * d_curr * n;

    Ok((new_mean, scatter / (m + n - T::one())))
}

/// Density of a multivariate normal distribution at `x`.
///
/// The absolute value of the determinant is used. An exactly singular covariance is an error;
/// near-singular matrices are evaluated as given.
pub fn gaussian_pdf<const D: usize>(
    mean: &SVector<f64, D>,
    cov: &SMatrix<f64, D, D>,
    x: &SVector<f64, D>,
) -> Result<f64, StatsError> {
    let cov = DMatrix::from_column_slice(D, D, cov.as_slice());

    let det = cov.determinant().abs();
    if det == 0.0 || !det.is_finite() {
        return Err(StatsError::SingularCovariance);
    }
    let cov_inv = cov.try_inverse().ok_or(StatsError::SingularCovariance)?;

    let d = DVector::from_column_slice((x - mean).as_slice());
    let mahalanobis = d.dot(&(cov_inv * &d));

    let norm = ((2.0 * std::f64::consts::PI).powi(D as i32) * det).sqrt();
    Ok((-0.5 * mahalanobis).exp() / norm)
}

/// Median of the scalars extracted by `getter`. For an even count the upper median is returned.
pub fn compute_median<I, F>(data: I, getter: F) -> Result<f64, StatsError>
where
    I: IntoIterator,
    F: Fn(I::Item) -> f64,
{
    let mut values: Vec<f64> = data.into_iter().map(getter).collect();
    if values.is_empty() {
        return Err(StatsError::InsufficientSamples {
            required: 1,
            actual: 0,
        });
    }

    let mid = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    Ok(*median)
}
