use nalgebra::{DMatrix, Dim, Matrix, RawStorage};

/// Moore-Penrose pseudo-inverse through the SVD.
///
/// Singular values not larger than `tol` are treated as zero. Returns `None` if the SVD factors
/// could not be computed.
pub fn pseudo_inverse(m: &DMatrix<f64>, tol: f64) -> Option<DMatrix<f64>> {
    let svd = m.clone().svd(true, true);
    let (u, v_t) = (svd.u?, svd.v_t?);

    let sigma_inv = DMatrix::from_diagonal(
        &svd.singular_values
            .map(|s| if s > tol { 1.0 / s } else { 0.0 }),
    );

    Some(v_t.transpose() * sigma_inv * u.transpose())
}

/// Whether `m` contains a NaN. The matrix is logged when it does.
pub fn has_nan<R: Dim, C: Dim, S: RawStorage<f64, R, C>>(m: &Matrix<f64, R, C, S>) -> bool {
    if m.iter().any(|v| v.is_nan()) {
        log::error!("matrix has nan: {m}");
        return true;
    }
    false
}
