// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Coefficient Fitting
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear least-squares fit of basis coefficients to sampled field vectors.
//!
//! The nonlinear geometry is evaluated exactly once per sample point while
//! the design matrix is assembled; the solve then works on numbers only.

use crate::basis::{BasisField, CoefficientTable};
use magneto_math::linalg::solve_least_squares;
use magneto_math::vector::Vec3;
use magneto_types::error::{MagnetoError, MagnetoResult};
use ndarray::{Array1, Array2};
use tracing::debug;

/// Singular-value cutoff relative to the largest one.
pub const FIT_RCOND: f64 = 1e-7;

/// Rows `3i..3i+3` hold the x, y, z components of every basis term at `points[i]`.
pub fn design_matrix<B: BasisField>(basis: &B, points: &[Vec3]) -> MagnetoResult<Array2<f64>> {
    let count = basis.basis_count();
    let mut design = Array2::zeros((3 * points.len(), count));
    for (i, p) in points.iter().enumerate() {
        let terms = basis.expand(p)?;
        if terms.len() != count {
            return Err(MagnetoError::BasisCountMismatch {
                left: count,
                right: terms.len(),
            });
        }
        for (k, term) in terms.iter().enumerate() {
            for c in 0..3 {
                design[[3 * i + c, k]] = term[c];
            }
        }
    }
    Ok(design)
}

/// Fit one coefficient per basis term to `(location, observed field)` samples.
///
/// The result is indexed from `lower`, ready for
/// [`with_coefficients`](crate::basis::with_coefficients).
pub fn fit_coefficients<B: BasisField>(
    basis: &B,
    samples: &[(Vec3, Vec3)],
    lower: i64,
) -> MagnetoResult<CoefficientTable> {
    if samples.is_empty() {
        return Err(MagnetoError::LinAlg("no samples to fit".to_string()));
    }
    let points: Vec<Vec3> = samples.iter().map(|(p, _)| *p).collect();
    let design = design_matrix(basis, &points)?;
    let target = Array1::from_iter(samples.iter().flat_map(|(_, b)| [b.x, b.y, b.z]));

    let coefficients = solve_least_squares(&design, &target, FIT_RCOND)?;
    let residual = (design.dot(&coefficients) - &target)
        .mapv(|v| v * v)
        .sum()
        .sqrt();
    debug!(
        terms = basis.basis_count(),
        samples = samples.len(),
        residual,
        "fitted basis coefficients"
    );
    Ok(CoefficientTable::new(lower, coefficients))
}
