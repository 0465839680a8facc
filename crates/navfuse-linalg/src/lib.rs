#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Robust least-squares fitting of planes and lines.
pub mod fit;

/// Schur-complement marginalization of information matrices.
pub mod marginalize;

/// Pseudo-inverse and matrix diagnostics.
pub mod ops;

/// Gaussian statistics: batch estimates, incremental merges and densities.
pub mod stats;
