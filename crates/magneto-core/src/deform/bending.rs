// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Current-Sheet Bending
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Tilt-dependent bending of the equatorial current sheet.
//!
//! Each point is rotated in its X–Z half-plane by `α(r) = asin(sin ψ · Q(r))`,
//! where `Q(r) = [1 + (r/R_H)^ε]^(−1/ε)` and the hinge distance
//! `R_H = R_H0 + R_H2 (z/r)²`. Close to the planet α → ψ (the sheet follows
//! the dipole equator); far out α → 0 (the sheet flattens toward the
//! solar-wind direction).

use super::{check_tilt, Deformation, Mapping, SecondOrderMapping};
use magneto_math::vector::{outer, Mat3, Vec3};
use magneto_types::config::BendingParams;
use magneto_types::constants::AXIS_EPSILON;
use magneto_types::error::MagnetoResult;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct PositionBending {
    sin_tilt: f64,
    hinge_distance: f64,
    hinge_quadratic: f64,
    exponent: f64,
}

impl PositionBending {
    pub fn new(tilt: f64, params: &BendingParams) -> MagnetoResult<Self> {
        check_tilt(tilt)?;
        params.validate()?;
        debug!(
            tilt,
            hinge = params.hinge_distance,
            quadratic = params.hinge_quadratic,
            "position bending"
        );
        Ok(PositionBending {
            sin_tilt: tilt.sin(),
            hinge_distance: params.hinge_distance,
            hinge_quadratic: params.hinge_quadratic,
            exponent: params.exponent,
        })
    }
}

impl Deformation for PositionBending {
    fn deform(&self, location: &Vec3) -> Mapping {
        if self.sin_tilt == 0.0 {
            return Mapping::identity(*location);
        }
        let (x, y, z) = (location.x, location.y, location.z);
        let e = self.exponent;
        let sps = self.sin_tilt;

        let r = location.norm().max(AXIS_EPSILON);
        let zr = z / r;
        let rh = self.hinge_distance + self.hinge_quadratic * zr * zr;
        let drhdr = -2.0 * self.hinge_quadratic * zr * zr / r;
        let drhdz = 2.0 * self.hinge_quadratic * zr / r;

        let rrh = r / rh;
        let f = (1.0 + rrh.powf(e)).powf(-1.0 / e);
        let dfdr = -rrh.powf(e - 1.0) * f.powf(e + 1.0) / rh;
        let dfdrh = -rrh * dfdr;

        let spsas = sps * f;
        let cpsas = (1.0 - spsas * spsas).max(0.0).sqrt();
        let xas = x * cpsas - z * spsas;
        let zas = x * spsas + z * cpsas;

        // ∇(sin α) / cos α
        let facps = sps / cpsas * (dfdr + dfdrh * drhdr) / r;
        let psas = location * facps + Vec3::new(0.0, 0.0, sps / cpsas * dfdrh * drhdz);

        let jacobian = Mat3::new(
            cpsas - zas * psas.x,
            -zas * psas.y,
            -spsas - zas * psas.z,
            0.0,
            1.0,
            0.0,
            spsas + xas * psas.x,
            xas * psas.y,
            cpsas + xas * psas.z,
        );
        Mapping {
            point: Vec3::new(xas, y, zas),
            jacobian,
        }
    }

    /// With `σ = sin α` the map is `q_x = x c(σ) − z σ`, `q_z = x σ + z c(σ)`
    /// where `c = √(1 − σ²)`, and `σ = sin ψ · Q(t)` with `t = r / R_H`.
    fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping {
        let mapping = self.deform(location);
        if self.sin_tilt == 0.0 {
            return SecondOrderMapping::flat(mapping);
        }
        let (x, z) = (location.x, location.z);
        let e = self.exponent;
        let sps = self.sin_tilt;
        let sym = |a: &Vec3, b: &Vec3| outer(a, b) + outer(b, a);
        let ez = Vec3::z();

        let r = location.norm().max(AXIS_EPSILON);
        let n = location / r;
        let hess_r = (Mat3::identity() - outer(&n, &n)) / r;

        // w = z/r and R_H = R_H0 + R_H2 w²
        let w = z / r;
        let grad_w = (ez - n * w) / r;
        let hess_w = (-sym(&ez, &n) - Mat3::identity() * w + outer(&n, &n) * (3.0 * w)) / (r * r);
        let rh = self.hinge_distance + self.hinge_quadratic * w * w;
        let grad_rh = grad_w * (2.0 * self.hinge_quadratic * w);
        let hess_rh = (outer(&grad_w, &grad_w) + hess_w * w) * (2.0 * self.hinge_quadratic);

        let t = r / rh;
        let grad_t = n / rh - grad_rh * (r / (rh * rh));
        let hess_t = hess_r / rh - sym(&n, &grad_rh) / (rh * rh) - hess_rh * (r / (rh * rh))
            + outer(&grad_rh, &grad_rh) * (2.0 * r / (rh * rh * rh));

        let te = t.powf(e);
        let f = (1.0 + te).powf(-1.0 / e);
        let df = -t.powf(e - 1.0) * f.powf(e + 1.0);
        let d2f = -(e - 1.0) * t.powf(e - 2.0) * f.powf(e + 1.0)
            + (e + 1.0) * t.powf(2.0 * e - 2.0) * f.powf(2.0 * e + 1.0);

        let sigma = sps * f;
        let grad_sigma = grad_t * (sps * df);
        let hess_sigma = (outer(&grad_t, &grad_t) * d2f + hess_t * df) * sps;

        let c = (1.0 - sigma * sigma).max(0.0).sqrt();
        let dc = -sigma / c;
        let d2c = -1.0 / (c * c * c);
        let gg = outer(&grad_sigma, &grad_sigma);
        let along_x = sym(&grad_sigma, &Vec3::x());
        let along_z = sym(&grad_sigma, &ez);

        let hess_qx = along_x * dc - along_z + gg * (x * d2c) + hess_sigma * (x * dc - z);
        let hess_qz = along_x + along_z * dc + gg * (z * d2c) + hess_sigma * (x + z * dc);
        SecondOrderMapping {
            mapping,
            hessians: [hess_qx, Mat3::zeros(), hess_qz],
        }
    }

    fn name(&self) -> &'static str {
        "position-bending"
    }
}
