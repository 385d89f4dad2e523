// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Source Fields
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Analytic source fields: the planetary dipole and the Cartesian
//! harmonics used for magnetopause shielding expansions.
//!
//! Lengths are in Earth radii and fields in nT.

use crate::basis::{from_fields, FieldList};
use crate::field::{DifferentiableField, Differential, VectorField};
use magneto_math::vector::{outer, Mat3, Vec3};
use magneto_types::constants::{AXIS_EPSILON, EARTH_DIPOLE_FIELD_NT};
use magneto_types::error::{MagnetoError, MagnetoResult};

/// Point dipole at the origin, tilted by ψ in the X–Z plane.
#[derive(Debug, Clone, Copy)]
pub struct Dipole {
    moment: Vec3,
}

impl Dipole {
    /// `m = −B₀ (sin ψ, 0, cos ψ)`: at ψ = 0 the field points north (+z) at the equator.
    pub fn tilted(surface_field: f64, tilt: f64) -> MagnetoResult<Self> {
        if !surface_field.is_finite() || !tilt.is_finite() {
            return Err(MagnetoError::ConfigError(format!(
                "dipole needs finite parameters, got B0 = {surface_field}, tilt = {tilt}"
            )));
        }
        let (sps, cps) = tilt.sin_cos();
        Ok(Dipole {
            moment: Vec3::new(sps, 0.0, cps) * -surface_field,
        })
    }

    pub fn earth(tilt: f64) -> MagnetoResult<Self> {
        Self::tilted(EARTH_DIPOLE_FIELD_NT, tilt)
    }

    pub fn moment(&self) -> Vec3 {
        self.moment
    }
}

impl VectorField for Dipole {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        let r = location.norm().max(AXIS_EPSILON);
        let r2 = r * r;
        let r5 = r2 * r2 * r;
        let mr = self.moment.dot(location);
        Ok((location * (3.0 * mr) - self.moment * r2) / r5)
    }
}

impl DifferentiableField for Dipole {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let m = &self.moment;
        let r = location.norm().max(AXIS_EPSILON);
        let r2 = r * r;
        let r5 = r2 * r2 * r;
        let mr = m.dot(location);
        let value = (location * (3.0 * mr) - m * r2) / r5;
        // ∂B_a/∂x_b = 3(r_a m_b + m_a r_b + (m·r) δ_ab)/r⁵ − 15 (m·r) r_a r_b / r⁷
        let jacobian = (outer(location, m) + outer(m, location) + Mat3::identity() * mr) * (3.0 / r5)
            - outer(location, location) * (15.0 * mr / (r5 * r2));
        Ok(Differential::new(value, jacobian))
    }
}

/// `B = ∇U` with `U = exp(k x) cos(y/p) sin(z/r)`, `k = √(1/p² + 1/r²)`.
///
/// U is harmonic, so B is both curl- and divergence-free.
#[derive(Debug, Clone, Copy)]
pub struct ShieldingHarmonic {
    p: f64,
    r: f64,
}

impl ShieldingHarmonic {
    pub fn new(p: f64, r: f64) -> MagnetoResult<Self> {
        if !(p.is_finite() && r.is_finite() && p > 0.0 && r > 0.0) {
            return Err(MagnetoError::ConfigError(format!(
                "shielding harmonic scales must be finite and > 0, got p = {p}, r = {r}"
            )));
        }
        Ok(ShieldingHarmonic { p, r })
    }

    fn wavenumber(&self) -> f64 {
        (1.0 / (self.p * self.p) + 1.0 / (self.r * self.r)).sqrt()
    }
}

impl VectorField for ShieldingHarmonic {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        let k = self.wavenumber();
        let e = (k * location.x).exp();
        let (sy, cy) = (location.y / self.p).sin_cos();
        let (sz, cz) = (location.z / self.r).sin_cos();
        Ok(Vec3::new(
            k * e * cy * sz,
            -e * sy * sz / self.p,
            e * cy * cz / self.r,
        ))
    }
}

impl DifferentiableField for ShieldingHarmonic {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let (p, r) = (self.p, self.r);
        let k = self.wavenumber();
        let e = (k * location.x).exp();
        let (sy, cy) = (location.y / p).sin_cos();
        let (sz, cz) = (location.z / r).sin_cos();

        let value = Vec3::new(k * e * cy * sz, -e * sy * sz / p, e * cy * cz / r);
        // Hessian of U
        let xx = k * k * e * cy * sz;
        let xy = -k * e * sy * sz / p;
        let xz = k * e * cy * cz / r;
        let yy = -e * cy * sz / (p * p);
        let yz = -e * sy * cz / (p * r);
        let zz = -e * cy * sz / (r * r);
        let jacobian = Mat3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz);
        Ok(Differential::new(value, jacobian))
    }
}

/// One [`ShieldingHarmonic`] per `(p, r)` pair, in order.
pub fn harmonic_basis(scales: &[(f64, f64)]) -> MagnetoResult<FieldList<ShieldingHarmonic>> {
    let terms = scales
        .iter()
        .map(|&(p, r)| ShieldingHarmonic::new(p, r))
        .collect::<MagnetoResult<Vec<_>>>()?;
    Ok(from_fields(terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisField;

    #[test]
    fn test_dipole_equator_and_pole() {
        let d = Dipole::earth(0.0).unwrap();
        let eq = d.evaluate(&Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!((eq - Vec3::new(0.0, 0.0, EARTH_DIPOLE_FIELD_NT)).norm() < 1e-9);
        let pole = d.evaluate(&Vec3::new(0.0, 0.0, 2.0)).unwrap();
        // |B| doubles at the pole and falls as r⁻³
        assert!((pole.z + 2.0 * EARTH_DIPOLE_FIELD_NT / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_dipole_is_curl_and_divergence_free() {
        let d = Dipole::earth(0.4).unwrap();
        let diff = d.differentiate(&Vec3::new(3.0, -2.0, 1.5)).unwrap();
        let scale = diff.jacobian.norm();
        assert!(diff.curl().norm() < 1e-12 * scale);
        assert!(diff.divergence().abs() < 1e-12 * scale);
    }

    #[test]
    fn test_harmonic_is_curl_and_divergence_free() {
        let h = ShieldingHarmonic::new(5.0, 12.0).unwrap();
        let diff = h.differentiate(&Vec3::new(-4.0, 1.0, 2.5)).unwrap();
        assert!(diff.curl().norm() < 1e-14);
        assert!(diff.divergence().abs() < 1e-14);
        assert_eq!(diff.value, h.evaluate(&Vec3::new(-4.0, 1.0, 2.5)).unwrap());
    }

    #[test]
    fn test_harmonic_basis_rejects_bad_scale() {
        let basis = harmonic_basis(&[(5.0, 10.0), (7.0, 14.0)]).unwrap();
        assert_eq!(basis.basis_count(), 2);
        let err = harmonic_basis(&[(5.0, 10.0), (0.0, 1.0)]).err().unwrap();
        assert!(err.is_configuration());
    }
}
