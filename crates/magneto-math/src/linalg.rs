// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Linear Algebra
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Linear algebra for coefficient fitting.
//!
//! Cyclic Jacobi eigen-decomposition of small symmetric matrices and a
//! least-squares solver built on it. The systems solved here are the normal
//! equations of basis-expansion fits: tall design matrices with a few dozen
//! columns at most.

use magneto_types::error::{MagnetoError, MagnetoResult};
use ndarray::{Array1, Array2};

const MAX_SWEEPS: usize = 100;

/// Eigen-decomposition of a symmetric matrix.
///
/// Returns `(eigenvalues, eigenvectors)` with eigenvectors as columns, sorted
/// by descending eigenvalue, so that `A ≈ V · diag(λ) · Vᵀ`.
pub fn symmetric_eigen(a: &Array2<f64>) -> MagnetoResult<(Array1<f64>, Array2<f64>)> {
    let (n, cols) = a.dim();
    if n != cols {
        return Err(MagnetoError::LinAlg(format!(
            "symmetric_eigen needs a square matrix, got {n}x{cols}"
        )));
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(MagnetoError::LinAlg(
            "symmetric_eigen input contains non-finite entries".to_string(),
        ));
    }

    let mut m = a.clone();
    let mut v = Array2::eye(n);
    let scale = m.iter().map(|x| x * x).sum::<f64>().sqrt().max(f64::MIN_POSITIVE);

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += m[[p, q]] * m[[p, q]];
            }
        }
        if off.sqrt() <= 1e-15 * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq.abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * apq);
                let t = if theta >= 0.0 {
                    1.0 / (theta + (1.0 + theta * theta).sqrt())
                } else {
                    -1.0 / (-theta + (1.0 + theta * theta).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                // M ← Pᵀ M P, V ← V P
                for k in 0..n {
                    let mkp = m[[k, p]];
                    let mkq = m[[k, q]];
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[[p, k]];
                    let mqk = m[[q, k]];
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        m[[j, j]]
            .partial_cmp(&m[[i, i]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let values = Array1::from_iter(order.iter().map(|&i| m[[i, i]]));
    let mut vectors = Array2::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }
    Ok((values, vectors))
}

/// Minimum-norm least-squares solution of `A x ≈ b`.
///
/// Directions whose singular value falls below `rcond · σ_max` are dropped,
/// which keeps rank-deficient designs (duplicate basis terms) solvable.
/// The normal equations square the condition number, so `rcond` below about
/// 1e-7 no longer filters roundoff.
pub fn solve_least_squares(
    a: &Array2<f64>,
    b: &Array1<f64>,
    rcond: f64,
) -> MagnetoResult<Array1<f64>> {
    let (rows, cols) = a.dim();
    if rows != b.len() {
        return Err(MagnetoError::LinAlg(format!(
            "design has {rows} rows but target has {} entries",
            b.len()
        )));
    }
    if cols == 0 {
        return Err(MagnetoError::LinAlg(
            "design matrix has no columns".to_string(),
        ));
    }
    if !rcond.is_finite() || rcond < 0.0 {
        return Err(MagnetoError::LinAlg(format!(
            "rcond must be finite and >= 0, got {rcond}"
        )));
    }

    let normal = a.t().dot(a);
    let rhs = a.t().dot(b);
    let (lambda, vectors) = symmetric_eigen(&normal)?;

    let lambda_max = lambda.iter().cloned().fold(0.0_f64, f64::max);
    if lambda_max <= 0.0 {
        return Err(MagnetoError::LinAlg(
            "design matrix has rank zero".to_string(),
        ));
    }
    // eigenvalues of AᵀA are σ², so the cutoff is squared too
    let cutoff = rcond * rcond * lambda_max;

    let projected = vectors.t().dot(&rhs);
    let mut scaled = Array1::zeros(cols);
    for k in 0..cols {
        if lambda[k] > cutoff {
            scaled[k] = projected[k] / lambda[k];
        }
    }
    Ok(vectors.dot(&scaled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_eigen_diagonal() {
        let a = array![[3.0, 0.0], [0.0, 5.0]];
        let (vals, _vecs) = symmetric_eigen(&a).unwrap();
        assert!((vals[0] - 5.0).abs() < 1e-12);
        assert!((vals[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_eigen_symmetric_reconstruction() {
        let a = array![[4.0, 1.0, -2.0], [1.0, 2.0, 0.5], [-2.0, 0.5, 3.0]];
        let (vals, vecs) = symmetric_eigen(&a).unwrap();
        let recon = vecs.dot(&Array2::from_diag(&vals)).dot(&vecs.t());
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (recon[[i, j]] - a[[i, j]]).abs() < 1e-10,
                    "reconstruction failed at ({i}, {j})"
                );
            }
        }
        assert!(vals[0] >= vals[1] && vals[1] >= vals[2]);
    }

    #[test]
    fn test_eigen_rejects_non_square() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(symmetric_eigen(&a).is_err());
    }

    #[test]
    fn test_least_squares_exact_system() {
        let a = array![[1.0, 0.0], [0.0, 2.0], [1.0, 1.0], [3.0, -1.0]];
        let x_true = array![0.5, -1.5];
        let b = a.dot(&x_true);
        let x = solve_least_squares(&a, &b, 1e-12).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-10);
        assert!((x[1] + 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_least_squares_rank_deficient_is_min_norm() {
        // identical columns: only x0 + x1 is determined, min-norm splits it evenly
        let a = array![[1.0, 1.0], [2.0, 2.0], [-1.0, -1.0]];
        let b = array![2.0, 4.0, -2.0];
        let x = solve_least_squares(&a, &b, 1e-6).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9, "x = {x}");
        assert!((x[1] - 1.0).abs() < 1e-9, "x = {x}");
    }

    #[test]
    fn test_least_squares_rejects_bad_shapes() {
        let a = Array2::<f64>::zeros((3, 2));
        let b = Array1::<f64>::zeros(4);
        assert!(solve_least_squares(&a, &b, 1e-12).is_err());
        let b3 = Array1::<f64>::zeros(3);
        assert!(solve_least_squares(&a, &b3, 1e-12).is_err(), "zero design must fail");
    }
}
