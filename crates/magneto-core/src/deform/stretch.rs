// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Azimuthal Stretching
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Noon-midnight stretching about the x axis.
//!
//! In the x-aligned cylinder (ρ, φ, x) the azimuth becomes
//! `F = φ − S(ρ) sin φ − β ψ / Q(r)` with `S(ρ) = α ρ²/(ρ² + L²)` and the
//! same saturating `Q(r)` as the bending stage. ρ and x are unchanged.

use super::{
    check_tilt, shift_azimuth, shift_azimuth_second_order, AzimuthalCurvature, AzimuthalShift,
    Deformation, Mapping, SecondOrderMapping,
};
use magneto_math::coords::{x_aligned, Cylindrical};
use magneto_math::vector::Vec3;
use magneto_types::config::StretchParams;
use magneto_types::constants::AXIS_EPSILON;
use magneto_types::error::MagnetoResult;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct Stretching {
    tilt: f64,
    amplitude: f64,
    scale_length: f64,
    tilt_coupling: f64,
    hinge_distance: f64,
    exponent: f64,
}

impl Stretching {
    pub fn new(tilt: f64, params: &StretchParams) -> MagnetoResult<Self> {
        check_tilt(tilt)?;
        params.validate()?;
        debug!(
            tilt,
            amplitude = params.amplitude,
            coupling = params.tilt_coupling,
            "azimuthal stretching"
        );
        Ok(Stretching {
            tilt,
            amplitude: params.amplitude,
            scale_length: params.scale_length,
            tilt_coupling: params.tilt_coupling,
            hinge_distance: params.hinge_distance,
            exponent: params.exponent,
        })
    }

    /// `1/Q(r)` and its first two derivatives in r.
    fn inverse_q(&self, r: f64) -> (f64, f64, f64) {
        let e = self.exponent;
        let u = (r / self.hinge_distance).powf(e);
        let inv_q = (1.0 + u).powf(1.0 / e);
        let d_inv_q = (1.0 + u).powf(1.0 / e - 1.0) * u / r;
        let d2_inv_q = (e - 1.0) * u * (1.0 + u).powf(1.0 / e - 2.0) / (r * r);
        (inv_q, d_inv_q, d2_inv_q)
    }

    /// `S(ρ)` and its first two derivatives.
    fn sheet_profile(&self, rho: f64) -> (f64, f64, f64) {
        let l2 = self.scale_length * self.scale_length;
        let denom = rho * rho + l2;
        let s = self.amplitude * rho * rho / denom;
        let ds = 2.0 * self.amplitude * rho * l2 / (denom * denom);
        let d2s = 2.0 * self.amplitude * l2 * (l2 - 3.0 * rho * rho) / (denom * denom * denom);
        (s, ds, d2s)
    }

    fn shift(&self, c: &Cylindrical, r: f64) -> AzimuthalShift {
        let (rho, phi, x) = (c.rho, c.phi, c.z);
        let (sp, cp) = phi.sin_cos();
        let (s, ds, _) = self.sheet_profile(rho);
        let (inv_q, d_inv_q, _) = self.inverse_q(r);
        let coupling = self.tilt_coupling * self.tilt;

        AzimuthalShift {
            angle: phi - s * sp - coupling * inv_q,
            d_rho: -ds * sp - coupling * d_inv_q * rho / r,
            d_phi: 1.0 - s * cp,
            d_x: -coupling * d_inv_q * x / r,
        }
    }

    fn curvature(&self, c: &Cylindrical, r: f64) -> AzimuthalCurvature {
        let (rho, x) = (c.rho, c.z);
        let (sp, cp) = c.phi.sin_cos();
        let (s, ds, d2s) = self.sheet_profile(rho);
        let (_, d_inv_q, d2_inv_q) = self.inverse_q(r);
        let coupling = self.tilt_coupling * self.tilt;
        let (r2, r3) = (r * r, r * r * r);

        AzimuthalCurvature {
            rho_rho: -d2s * sp - coupling * (d2_inv_q * rho * rho / r2 + d_inv_q * x * x / r3),
            rho_phi: -ds * cp,
            rho_x: -coupling * rho * x * (d2_inv_q / r2 - d_inv_q / r3),
            phi_phi: s * sp,
            phi_x: 0.0,
            x_x: -coupling * (d2_inv_q * x * x / r2 + d_inv_q * rho * rho / r3),
        }
    }
}

impl Deformation for Stretching {
    fn deform(&self, location: &Vec3) -> Mapping {
        let c = x_aligned(location);
        let r = location.norm().max(AXIS_EPSILON);
        shift_azimuth(&c, &self.shift(&c, r))
    }

    fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping {
        let c = x_aligned(location);
        let r = location.norm().max(AXIS_EPSILON);
        shift_azimuth_second_order(&c, &self.shift(&c, r), &self.curvature(&c, r))
    }

    fn name(&self) -> &'static str {
        "stretching"
    }
}
