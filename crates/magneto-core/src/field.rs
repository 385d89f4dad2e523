// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Field Contracts
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Vector- and scalar-field contracts.
//!
//! A field is anything that maps a Cartesian location to a value. A
//! differentiable field also returns the nine first-order partials
//! `∂F_a/∂x_b` from the same call, so composed fields never have to fall
//! back on finite differences.
//!
//! All fields are `Send + Sync` and hold no mutable evaluation state; one
//! instance may be evaluated from any number of threads.

use magneto_math::vector::{Mat3, Vec3};
use magneto_types::error::MagnetoResult;
use std::ops::{Add, Neg};
use std::sync::Arc;

/// Field value plus its Jacobian `jacobian[(a, b)] = ∂F_a/∂x_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Differential {
    pub value: Vec3,
    pub jacobian: Mat3,
}

impl Differential {
    pub fn new(value: Vec3, jacobian: Mat3) -> Self {
        Differential { value, jacobian }
    }

    /// A value that does not change with location.
    pub fn constant(value: Vec3) -> Self {
        Differential {
            value,
            jacobian: Mat3::zeros(),
        }
    }

    /// `∂F_component/∂x_wrt`
    pub fn derivative(&self, component: usize, wrt: usize) -> f64 {
        self.jacobian[(component, wrt)]
    }

    pub fn divergence(&self) -> f64 {
        self.jacobian.trace()
    }

    pub fn curl(&self) -> Vec3 {
        let j = &self.jacobian;
        Vec3::new(
            j[(2, 1)] - j[(1, 2)],
            j[(0, 2)] - j[(2, 0)],
            j[(1, 0)] - j[(0, 1)],
        )
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Differential {
            value: self.value * factor,
            jacobian: self.jacobian * factor,
        }
    }
}

impl Add for Differential {
    type Output = Differential;

    fn add(self, rhs: Differential) -> Differential {
        Differential {
            value: self.value + rhs.value,
            jacobian: self.jacobian + rhs.jacobian,
        }
    }
}

impl Neg for Differential {
    type Output = Differential;

    fn neg(self) -> Differential {
        self.scaled(-1.0)
    }
}

/// Location → vector.
pub trait VectorField: Send + Sync {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3>;
}

/// Location → vector plus all first-order partials, computed in closed form.
pub trait DifferentiableField: VectorField {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential>;
}

/// Location → scalar.
pub trait ScalarField: Send + Sync {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<f64>;
}

/// Location → scalar and its gradient.
pub trait DifferentiableScalarField: ScalarField {
    fn gradient(&self, location: &Vec3) -> MagnetoResult<(f64, Vec3)>;
}

macro_rules! forward_field_impls {
    ($($ptr:ident),*) => {$(
        impl<F: VectorField + ?Sized> VectorField for $ptr<F> {
            fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
                (**self).evaluate(location)
            }
        }

        impl<F: DifferentiableField + ?Sized> DifferentiableField for $ptr<F> {
            fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
                (**self).differentiate(location)
            }
        }

        impl<F: ScalarField + ?Sized> ScalarField for $ptr<F> {
            fn evaluate(&self, location: &Vec3) -> MagnetoResult<f64> {
                (**self).evaluate(location)
            }
        }

        impl<F: DifferentiableScalarField + ?Sized> DifferentiableScalarField for $ptr<F> {
            fn gradient(&self, location: &Vec3) -> MagnetoResult<(f64, Vec3)> {
                (**self).gradient(location)
            }
        }
    )*};
}

forward_field_impls!(Box, Arc);

impl<F: VectorField + ?Sized> VectorField for &F {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        (**self).evaluate(location)
    }
}

impl<F: DifferentiableField + ?Sized> DifferentiableField for &F {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        (**self).differentiate(location)
    }
}

impl<F: ScalarField + ?Sized> ScalarField for &F {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<f64> {
        (**self).evaluate(location)
    }
}

impl<F: DifferentiableScalarField + ?Sized> DifferentiableScalarField for &F {
    fn gradient(&self, location: &Vec3) -> MagnetoResult<(f64, Vec3)> {
        (**self).gradient(location)
    }
}
