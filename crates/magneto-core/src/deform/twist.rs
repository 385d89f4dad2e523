// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Twist and Warp
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Tilt-driven warping of the sheet plus a uniform twist down the tail:
//! `F = φ + G ρ³/(ρ⁴ + L⁴) cos φ sin ψ + T x` in the x-aligned cylinder.

use super::{
    check_tilt, shift_azimuth, shift_azimuth_second_order, AzimuthalCurvature, AzimuthalShift,
    Deformation, Mapping, SecondOrderMapping,
};
use magneto_math::coords::{x_aligned, Cylindrical};
use magneto_math::vector::Vec3;
use magneto_types::config::TwistWarpParams;
use magneto_types::error::MagnetoResult;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct TwistWarp {
    sin_tilt: f64,
    warp: f64,
    warp_length: f64,
    twist: f64,
}

impl TwistWarp {
    pub fn new(tilt: f64, params: &TwistWarpParams) -> MagnetoResult<Self> {
        check_tilt(tilt)?;
        params.validate()?;
        debug!(tilt, warp = params.warp, twist = params.twist, "twist-warp");
        Ok(TwistWarp {
            sin_tilt: tilt.sin(),
            warp: params.warp,
            warp_length: params.warp_length,
            twist: params.twist,
        })
    }
}

impl TwistWarp {
    /// `W(ρ) = G sin ψ ρ³/(ρ⁴ + L⁴)` and its first two derivatives.
    fn warp_profile(&self, rho: f64) -> (f64, f64, f64) {
        let l4 = self.warp_length.powi(4);
        let rho2 = rho * rho;
        let rho4 = rho2 * rho2;
        let denom = rho4 + l4;
        let g = self.warp * self.sin_tilt;
        let w = g * rho2 * rho / denom;
        let dw = g * rho2 * (3.0 * l4 - rho4) / (denom * denom);
        let d2w = 2.0 * g * rho * (rho4 * rho4 - 12.0 * l4 * rho4 + 3.0 * l4 * l4)
            / (denom * denom * denom);
        (w, dw, d2w)
    }

    fn shift(&self, c: &Cylindrical) -> AzimuthalShift {
        let (sp, cp) = c.phi.sin_cos();
        let (w, dw, _) = self.warp_profile(c.rho);
        AzimuthalShift {
            angle: c.phi + w * cp + self.twist * c.z,
            d_rho: dw * cp,
            d_phi: 1.0 - w * sp,
            d_x: self.twist,
        }
    }
}

impl Deformation for TwistWarp {
    fn deform(&self, location: &Vec3) -> Mapping {
        let c = x_aligned(location);
        shift_azimuth(&c, &self.shift(&c))
    }

    fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping {
        let c = x_aligned(location);
        let (sp, cp) = c.phi.sin_cos();
        let (w, dw, d2w) = self.warp_profile(c.rho);
        let curvature = AzimuthalCurvature {
            rho_rho: d2w * cp,
            rho_phi: -dw * sp,
            phi_phi: -w * cp,
            ..AzimuthalCurvature::default()
        };
        shift_azimuth_second_order(&c, &self.shift(&c), &curvature)
    }

    fn name(&self) -> &'static str {
        "twist-warp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::tests::{assert_jacobian_matches, assert_second_order_matches};
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pure_twist_rotates_with_distance() {
        let params = TwistWarpParams {
            twist: 0.1,
            ..TwistWarpParams::default()
        };
        let tw = TwistWarp::new(0.0, &params).unwrap();
        // y axis at x = −10 turns by −1 rad
        let q = tw.deform(&Vec3::new(-10.0, 1.0, 0.0)).point;
        assert!((q.z.atan2(q.y) + 1.0).abs() < 1e-13);
    }

    #[test]
    fn test_warp_vanishes_without_tilt() {
        let params = TwistWarpParams {
            warp: 2.0,
            ..TwistWarpParams::default()
        };
        let tw = TwistWarp::new(0.0, &params).unwrap();
        let p = Vec3::new(-12.0, 3.0, -4.0);
        assert!((tw.deform(&p).point - p).norm() < 1e-13);
    }

    #[test]
    fn test_jacobian_matches_finite_differences() {
        let params = TwistWarpParams {
            warp: 1.5,
            twist: 0.04,
            ..TwistWarpParams::default()
        };
        let tw = TwistWarp::new(0.45, &params).unwrap();
        for p in [
            Vec3::new(-10.0, 15.0, 3.0),
            Vec3::new(2.0, -4.0, -6.0),
            Vec3::new(-30.0, -20.0, 25.0),
        ] {
            assert_jacobian_matches(&tw, &p);
        }
    }

    #[test]
    fn test_hessians_match_finite_differences() {
        let params = TwistWarpParams {
            warp: -2.0,
            twist: 0.05,
            ..TwistWarpParams::default()
        };
        let tw = TwistWarp::new(0.5, &params).unwrap();
        for p in [
            Vec3::new(-10.0, 15.0, 3.0),
            Vec3::new(2.0, -4.0, -6.0),
            Vec3::new(-30.0, -20.0, 25.0),
            Vec3::new(-5.0, 1.5, -0.5),
        ] {
            assert_second_order_matches(&tw, &p);
        }
    }

    #[test]
    fn test_rejects_tilt_at_pole() {
        assert!(TwistWarp::new(FRAC_PI_2, &TwistWarpParams::default()).is_err());
    }
}
