// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Scalar Fields
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Elementary scalar fields.
//!
//! Besides constants and coordinate projections this is where external
//! scalar evaluators (Bessel functions, tabulated profiles) enter the model:
//! [`scalar_fn`] wraps any thread-safe closure as a [`ScalarField`].

use crate::field::{DifferentiableScalarField, ScalarField};
use magneto_math::vector::Vec3;
use magneto_types::error::{MagnetoError, MagnetoResult};

#[derive(Debug, Clone, Copy)]
pub struct ConstantScalar {
    value: f64,
}

pub fn constant_scalar(value: f64) -> ConstantScalar {
    ConstantScalar { value }
}

impl ScalarField for ConstantScalar {
    fn evaluate(&self, _location: &Vec3) -> MagnetoResult<f64> {
        Ok(self.value)
    }
}

impl DifferentiableScalarField for ConstantScalar {
    fn gradient(&self, _location: &Vec3) -> MagnetoResult<(f64, Vec3)> {
        Ok((self.value, Vec3::zeros()))
    }
}

/// Projection onto one Cartesian axis: 0 → x, 1 → y, 2 → z.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate {
    axis: usize,
}

pub fn coordinate(axis: usize) -> MagnetoResult<Coordinate> {
    if axis > 2 {
        return Err(MagnetoError::ConfigError(format!(
            "coordinate axis must be 0, 1 or 2, got {axis}"
        )));
    }
    Ok(Coordinate { axis })
}

impl ScalarField for Coordinate {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<f64> {
        Ok(location[self.axis])
    }
}

impl DifferentiableScalarField for Coordinate {
    fn gradient(&self, location: &Vec3) -> MagnetoResult<(f64, Vec3)> {
        let mut grad = Vec3::zeros();
        grad[self.axis] = 1.0;
        Ok((location[self.axis], grad))
    }
}

/// Distance from the origin. The gradient at the origin is taken as zero.
#[derive(Debug, Clone, Copy)]
pub struct Radius;

pub fn radius() -> Radius {
    Radius
}

impl ScalarField for Radius {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<f64> {
        Ok(location.norm())
    }
}

impl DifferentiableScalarField for Radius {
    fn gradient(&self, location: &Vec3) -> MagnetoResult<(f64, Vec3)> {
        let r = location.norm();
        if r == 0.0 {
            return Ok((0.0, Vec3::zeros()));
        }
        Ok((r, location / r))
    }
}

/// A scalar field backed by a plain function.
pub struct ScalarFn<G> {
    function: G,
}

pub fn scalar_fn<G>(function: G) -> ScalarFn<G>
where
    G: Fn(&Vec3) -> f64 + Send + Sync,
{
    ScalarFn { function }
}

impl<G> ScalarField for ScalarFn<G>
where
    G: Fn(&Vec3) -> f64 + Send + Sync,
{
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<f64> {
        Ok((self.function)(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_projection() {
        let p = Vec3::new(1.0, -2.0, 3.5);
        let (v, g) = coordinate(2).unwrap().gradient(&p).unwrap();
        assert_eq!(v, 3.5);
        assert_eq!(g, Vec3::z());
        assert!(coordinate(3).unwrap_err().is_configuration());
    }

    #[test]
    fn test_radius_gradient() {
        let (r, g) = radius().gradient(&Vec3::new(3.0, 0.0, 4.0)).unwrap();
        assert_eq!(r, 5.0);
        assert!((g - Vec3::new(0.6, 0.0, 0.8)).norm() < 1e-15);
        let (r0, g0) = radius().gradient(&Vec3::zeros()).unwrap();
        assert_eq!((r0, g0), (0.0, Vec3::zeros()));
    }

    #[test]
    fn test_scalar_fn_wraps_closure() {
        let cylinder = scalar_fn(|p: &Vec3| p.x.hypot(p.y));
        assert_eq!(cylinder.evaluate(&Vec3::new(3.0, 4.0, 9.0)).unwrap(), 5.0);
        assert_eq!(constant_scalar(2.5).evaluate(&Vec3::zeros()).unwrap(), 2.5);
    }
}
