// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Vector Primitives
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fixed-size vector and matrix primitives.
//!
//! nalgebra supplies the arithmetic (add, scale, dot, cross, matrix-vector
//! products). This module names the aliases used across the workspace and
//! adds the few operations the field model needs on top.

use magneto_types::error::{MagnetoError, MagnetoResult};
use nalgebra::{Matrix3, SVector, Vector2, Vector3};

pub type Vec2 = Vector2<f64>;
pub type Vec3 = Vector3<f64>;
pub type Mat3 = Matrix3<f64>;

/// Scale `v` to unit length. The zero vector is a domain error.
pub fn unitize<const D: usize>(v: &SVector<f64, D>) -> MagnetoResult<SVector<f64, D>> {
    let norm = v.norm();
    if norm == 0.0 {
        return Err(MagnetoError::ZeroVector);
    }
    Ok(v / norm)
}

/// Like [`unitize`], but maps the zero vector to itself.
pub fn unitize_or_zero<const D: usize>(v: &SVector<f64, D>) -> SVector<f64, D> {
    let norm = v.norm();
    if norm == 0.0 {
        SVector::<f64, D>::zeros()
    } else {
        v / norm
    }
}

/// Transposed cofactor matrix: `m · adj(m) = det(m) · I`.
///
/// Defined for singular matrices too, which is why the deformations use it
/// instead of `det · inverse`.
pub fn adjugate(m: &Mat3) -> Mat3 {
    let c = |r0: usize, r1: usize, c0: usize, c1: usize| {
        m[(r0, c0)] * m[(r1, c1)] - m[(r0, c1)] * m[(r1, c0)]
    };
    Mat3::new(
        c(1, 2, 1, 2),
        -c(0, 2, 1, 2),
        c(0, 1, 1, 2),
        -c(1, 2, 0, 2),
        c(0, 2, 0, 2),
        -c(0, 1, 0, 2),
        c(1, 2, 0, 1),
        -c(0, 2, 0, 1),
        c(0, 1, 0, 1),
    )
}

/// Directional derivative of [`adjugate`] at `m` along `dm`.
///
/// Row `i` of `adj(m)` is `m_{i+1} × m_{i+2}` over the columns of `m`
/// (indices mod 3), so the derivative is bilinear in `m` and `dm`.
pub fn adjugate_derivative(m: &Mat3, dm: &Mat3) -> Mat3 {
    let row = |i: usize| {
        let (j, k) = ((i + 1) % 3, (i + 2) % 3);
        let (mj, mk): (Vec3, Vec3) = (m.column(j).into_owned(), m.column(k).into_owned());
        let (dj, dk): (Vec3, Vec3) = (dm.column(j).into_owned(), dm.column(k).into_owned());
        (dj.cross(&mk) + mj.cross(&dk)).transpose()
    };
    Mat3::from_rows(&[row(0), row(1), row(2)])
}

/// `a ⊗ b`, i.e. `(a bᵀ)[i][j] = a_i b_j`.
pub fn outer(a: &Vec3, b: &Vec3) -> Mat3 {
    a * b.transpose()
}

/// Right-handed rotation by `angle` about the x axis.
pub fn rotation_x(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

/// Right-handed rotation by `angle` about the y axis.
pub fn rotation_y(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

/// Right-handed rotation by `angle` about the z axis.
pub fn rotation_z(angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unitize_unit_length() {
        let u = unitize(&Vec3::new(3.0, -4.0, 12.0)).unwrap();
        assert!((u.norm() - 1.0).abs() < 1e-15);
        assert!((u.x - 3.0 / 13.0).abs() < 1e-15);

        let u2 = unitize(&Vec2::new(0.0, -2.0)).unwrap();
        assert_eq!(u2, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_unitize_zero_is_domain_error() {
        let err = unitize(&Vec3::zeros()).unwrap_err();
        assert!(matches!(err, MagnetoError::ZeroVector));
        assert!(err.is_domain());
        assert_eq!(unitize_or_zero(&Vec3::zeros()), Vec3::zeros());
    }

    #[test]
    fn test_adjugate_identity_relation() {
        let m = Mat3::new(2.0, -1.0, 0.5, 0.3, 4.0, 1.0, -2.0, 0.7, 3.0);
        let prod = m * adjugate(&m);
        let det = m.determinant();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { det } else { 0.0 };
                assert!(
                    (prod[(i, j)] - expected).abs() < 1e-12,
                    "m·adj(m) mismatch at ({i}, {j}): {}",
                    prod[(i, j)]
                );
            }
        }
    }

    #[test]
    fn test_adjugate_of_singular_matrix() {
        // Rank-1 matrix: every 2x2 minor vanishes.
        let m = outer(&Vec3::new(1.0, 2.0, 3.0), &Vec3::new(4.0, 5.0, 6.0));
        assert!(adjugate(&m).norm() < 1e-12);
    }

    #[test]
    fn test_adjugate_derivative_matches_difference() {
        let m = Mat3::new(2.0, -1.0, 0.5, 0.3, 4.0, 1.0, -2.0, 0.7, 3.0);
        let dm = Mat3::new(0.1, 0.4, -0.3, 1.0, -0.2, 0.6, 0.5, 0.0, -0.9);
        // adj is quadratic, so the central difference is exact up to rounding
        let h = 1e-3;
        let numeric = (adjugate(&(m + dm * h)) - adjugate(&(m - dm * h))) / (2.0 * h);
        assert!((adjugate_derivative(&m, &dm) - numeric).norm() < 1e-10);
        assert_eq!(adjugate_derivative(&m, &Mat3::zeros()), Mat3::zeros());
    }

    #[test]
    fn test_rotations_are_orthonormal() {
        for rot in [rotation_x(0.4), rotation_y(-1.2), rotation_z(2.9)] {
            let should_be_identity = rot * rot.transpose();
            assert!((should_be_identity - Mat3::identity()).norm() < 1e-14);
            assert!((rot.determinant() - 1.0).abs() < 1e-14);
        }
        let v = rotation_z(std::f64::consts::FRAC_PI_2) * Vec3::x();
        assert!((v - Vec3::y()).norm() < 1e-15);
        let w = rotation_y(std::f64::consts::FRAC_PI_2) * Vec3::z();
        assert!((w - Vec3::x()).norm() < 1e-15);
    }
}
