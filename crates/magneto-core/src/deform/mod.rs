// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Deformation Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coordinate deformations and their application to fields.
//!
//! A [`Deformation`] maps a location `p` to a deformed location `q = D(p)`
//! and returns `∂q/∂p` alongside. Fields are carried through a deformation
//! in one of two ways:
//!
//! - [`pullback`]: `F(p) = B(D(p))`, differentiable by the chain rule.
//! - [`flux_preserving`]: `F(p) = adj(∂D/∂p) · B(D(p))`, which keeps a
//!   divergence-free `B` divergence-free. Its derivative needs the second
//!   derivatives of `D`, which every deformation supplies in closed form
//!   through [`Deformation::deform_second_order`].
//!
//! Basis variants deform once per location and reuse the mapping for every
//! term.

mod bending;
mod stretch;
mod twist;

pub use bending::PositionBending;
pub use stretch::Stretching;
pub use twist::TwistWarp;

use crate::basis::{BasisField, DifferentiableBasisField};
use crate::field::{DifferentiableField, Differential, VectorField};
use magneto_math::coords::{from_x_aligned, Cylindrical};
use magneto_math::vector::{adjugate, adjugate_derivative, outer, Mat3, Vec3};
use magneto_types::config::DeformationConfig;
use magneto_types::constants::AXIS_EPSILON;
use magneto_types::error::{MagnetoError, MagnetoResult};
use std::sync::Arc;
use tracing::debug;

/// Deformed location and `jacobian[(a, b)] = ∂q_a/∂p_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    pub point: Vec3,
    pub jacobian: Mat3,
}

impl Mapping {
    pub fn identity(point: Vec3) -> Self {
        Mapping {
            point,
            jacobian: Mat3::identity(),
        }
    }
}

/// A [`Mapping`] plus `hessians[a][(b, c)] = ∂²q_a/∂p_b∂p_c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondOrderMapping {
    pub mapping: Mapping,
    pub hessians: [Mat3; 3],
}

impl SecondOrderMapping {
    /// A mapping whose Jacobian is locally constant.
    pub fn flat(mapping: Mapping) -> Self {
        SecondOrderMapping {
            mapping,
            hessians: [Mat3::zeros(); 3],
        }
    }

    /// `∂J/∂p_c`, i.e. `[(a, b)] = ∂²q_a/∂p_b∂p_c`.
    pub fn jacobian_derivative(&self, c: usize) -> Mat3 {
        Mat3::from_rows(&[
            self.hessians[0].row(c).into_owned(),
            self.hessians[1].row(c).into_owned(),
            self.hessians[2].row(c).into_owned(),
        ])
    }
}

pub trait Deformation: Send + Sync {
    fn deform(&self, location: &Vec3) -> Mapping;

    /// `deform` plus second derivatives.
    fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping;

    fn name(&self) -> &'static str;
}

macro_rules! forward_deformation_impls {
    ($($ptr:ident),*) => {$(
        impl<D: Deformation + ?Sized> Deformation for $ptr<D> {
            fn deform(&self, location: &Vec3) -> Mapping {
                (**self).deform(location)
            }
            fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping {
                (**self).deform_second_order(location)
            }
            fn name(&self) -> &'static str {
                (**self).name()
            }
        }
    )*};
}

forward_deformation_impls!(Box, Arc);

impl<D: Deformation + ?Sized> Deformation for &D {
    fn deform(&self, location: &Vec3) -> Mapping {
        (**self).deform(location)
    }
    fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping {
        (**self).deform_second_order(location)
    }
    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// `D(p) = p`
#[derive(Debug, Clone, Copy)]
pub struct Undeformed;

impl Deformation for Undeformed {
    fn deform(&self, location: &Vec3) -> Mapping {
        Mapping::identity(*location)
    }

    fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping {
        SecondOrderMapping::flat(Mapping::identity(*location))
    }

    fn name(&self) -> &'static str {
        "undeformed"
    }
}

pub(crate) fn check_tilt(tilt: f64) -> MagnetoResult<()> {
    if !tilt.is_finite() || tilt.abs() >= std::f64::consts::FRAC_PI_2 {
        return Err(MagnetoError::ConfigError(format!(
            "dipole tilt must lie in (-π/2, π/2), got {tilt}"
        )));
    }
    Ok(())
}

// ── Azimuthal shifts ─────────────────────────────────────────────────

/// New azimuth `F(ρ, φ, x)` about the x axis and its partials.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AzimuthalShift {
    pub angle: f64,
    pub d_rho: f64,
    pub d_phi: f64,
    pub d_x: f64,
}

/// `q = (x, ρ cos F, ρ sin F)` for a point already split into x-aligned
/// cylindrical coordinates.
///
/// Gradients are formed as `ρ ∇F`, so nothing is divided by ρ.
pub(crate) fn shift_azimuth(c: &Cylindrical, shift: &AzimuthalShift) -> Mapping {
    let (rho, x) = (c.rho, c.z);
    let (sp, cp) = c.phi.sin_cos();
    let (sf, cf) = shift.angle.sin_cos();

    let grad_rho = Vec3::new(0.0, cp, sp);
    let rho_grad_f = grad_rho * (rho * shift.d_rho)
        + Vec3::new(0.0, -sp, cp) * shift.d_phi
        + Vec3::new(rho * shift.d_x, 0.0, 0.0);

    let dq_y = grad_rho * cf - rho_grad_f * sf;
    let dq_z = grad_rho * sf + rho_grad_f * cf;
    Mapping {
        point: from_x_aligned(&Cylindrical::new(rho, shift.angle, x)),
        jacobian: Mat3::from_rows(&[
            Vec3::x().transpose(),
            dq_y.transpose(),
            dq_z.transpose(),
        ]),
    }
}

/// Second partials of the new azimuth `F(ρ, φ, x)`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AzimuthalCurvature {
    pub rho_rho: f64,
    pub rho_phi: f64,
    pub rho_x: f64,
    pub phi_phi: f64,
    pub phi_x: f64,
    pub x_x: f64,
}

/// [`shift_azimuth`] with second derivatives.
///
/// Each of `q_y = ρ cos F` and `q_z = ρ sin F` is differentiated twice in
/// (ρ, φ, x) and carried to Cartesian coordinates with the Hessians of ρ
/// and φ. Both of those blow up on the axis, so ρ is floored there.
pub(crate) fn shift_azimuth_second_order(
    c: &Cylindrical,
    shift: &AzimuthalShift,
    curvature: &AzimuthalCurvature,
) -> SecondOrderMapping {
    let mapping = shift_azimuth(c, shift);
    let rho = c.rho.max(AXIS_EPSILON);
    let (sp, cp) = c.phi.sin_cos();
    let e_rho = Vec3::new(0.0, cp, sp);
    let e_phi = Vec3::new(0.0, -sp, cp);

    // rows ∇ρ, ∇φ, ∇x
    let grad = Mat3::from_rows(&[
        e_rho.transpose(),
        (e_phi / rho).transpose(),
        Vec3::x().transpose(),
    ]);
    let hess_rho = outer(&e_phi, &e_phi) / rho;
    let hess_phi = -(outer(&e_rho, &e_phi) + outer(&e_phi, &e_rho)) / (rho * rho);

    let (fr, fp, fx) = (shift.d_rho, shift.d_phi, shift.d_x);
    let k = curvature;
    // q = ρ u(F) with u' = −v and v' = u
    let component = |u: f64, v: f64| -> Mat3 {
        let d_rho = u - rho * v * fr;
        let d_phi = -rho * v * fp;
        let rr = -2.0 * v * fr - rho * (u * fr * fr + v * k.rho_rho);
        let rp = -v * fp - rho * (u * fr * fp + v * k.rho_phi);
        let rx = -v * fx - rho * (u * fr * fx + v * k.rho_x);
        let pp = -rho * (u * fp * fp + v * k.phi_phi);
        let px = -rho * (u * fp * fx + v * k.phi_x);
        let xx = -rho * (u * fx * fx + v * k.x_x);
        let cyl = Mat3::new(rr, rp, rx, rp, pp, px, rx, px, xx);
        grad.transpose() * cyl * grad + hess_rho * d_rho + hess_phi * d_phi
    };
    let (sf, cf) = shift.angle.sin_cos();
    SecondOrderMapping {
        mapping,
        hessians: [Mat3::zeros(), component(cf, sf), component(sf, -cf)],
    }
}

// ── Composition ──────────────────────────────────────────────────────

/// `second ∘ first`
pub struct Chain<A, B> {
    first: A,
    second: B,
}

pub fn chain<A: Deformation, B: Deformation>(first: A, second: B) -> Chain<A, B> {
    Chain { first, second }
}

impl<A: Deformation, B: Deformation> Deformation for Chain<A, B> {
    fn deform(&self, location: &Vec3) -> Mapping {
        let inner = self.first.deform(location);
        let outer = self.second.deform(&inner.point);
        Mapping {
            point: outer.point,
            jacobian: outer.jacobian * inner.jacobian,
        }
    }

    /// `H_a = J₁ᵀ H₂_a J₁ + Σ_k (J₂)_ak H₁_k`
    fn deform_second_order(&self, location: &Vec3) -> SecondOrderMapping {
        let inner = self.first.deform_second_order(location);
        let outer = self.second.deform_second_order(&inner.mapping.point);
        let j1 = inner.mapping.jacobian;
        let j2 = outer.mapping.jacobian;
        let hessian = |a: usize| {
            (0..3).fold(j1.transpose() * outer.hessians[a] * j1, |acc, k| {
                acc + inner.hessians[k] * j2[(a, k)]
            })
        };
        SecondOrderMapping {
            mapping: Mapping {
                point: outer.mapping.point,
                jacobian: j2 * j1,
            },
            hessians: [hessian(0), hessian(1), hessian(2)],
        }
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

/// `F(p) = B(D(p))`
pub struct Pullback<F, D> {
    field: F,
    deformation: D,
}

pub fn pullback<F: VectorField, D: Deformation>(field: F, deformation: D) -> Pullback<F, D> {
    Pullback { field, deformation }
}

impl<F: VectorField, D: Deformation> VectorField for Pullback<F, D> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        self.field.evaluate(&self.deformation.deform(location).point)
    }
}

impl<F: DifferentiableField, D: Deformation> DifferentiableField for Pullback<F, D> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let map = self.deformation.deform(location);
        let inner = self.field.differentiate(&map.point)?;
        Ok(Differential::new(inner.value, inner.jacobian * map.jacobian))
    }
}

/// `F(p) = adj(∂D/∂p) · B(D(p))`
pub struct FluxPreserving<F, D> {
    field: F,
    deformation: D,
}

pub fn flux_preserving<F: VectorField, D: Deformation>(
    field: F,
    deformation: D,
) -> FluxPreserving<F, D> {
    FluxPreserving { field, deformation }
}

impl<F: VectorField, D: Deformation> VectorField for FluxPreserving<F, D> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        let map = self.deformation.deform(location);
        Ok(adjugate(&map.jacobian) * self.field.evaluate(&map.point)?)
    }
}

impl<F: DifferentiableField, D: Deformation> DifferentiableField for FluxPreserving<F, D> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let second = self.deformation.deform_second_order(location);
        let inner = self.field.differentiate(&second.mapping.point)?;
        Ok(PiolaTransform::new(&second).apply(&inner))
    }
}

/// `A = adj(J)` and its partials at one location.
struct PiolaTransform {
    jacobian: Mat3,
    adjugate: Mat3,
    derivatives: [Mat3; 3],
}

impl PiolaTransform {
    fn new(second: &SecondOrderMapping) -> Self {
        let jacobian = second.mapping.jacobian;
        let partial = |c: usize| adjugate_derivative(&jacobian, &second.jacobian_derivative(c));
        PiolaTransform {
            jacobian,
            adjugate: adjugate(&jacobian),
            derivatives: [partial(0), partial(1), partial(2)],
        }
    }

    /// `∂(A · B∘D)/∂p_c = (∂A/∂p_c) · B + A · J_B · J`
    fn apply(&self, inner: &Differential) -> Differential {
        let mut jacobian = self.adjugate * inner.jacobian * self.jacobian;
        for c in 0..3 {
            let column = jacobian.column(c) + self.derivatives[c] * inner.value;
            jacobian.set_column(c, &column);
        }
        Differential::new(self.adjugate * inner.value, jacobian)
    }
}

/// Every term pulled back through one shared mapping.
pub struct PullbackBasis<B, D> {
    basis: B,
    deformation: D,
}

pub fn pullback_basis<B: BasisField, D: Deformation>(basis: B, deformation: D) -> PullbackBasis<B, D> {
    PullbackBasis { basis, deformation }
}

impl<B: BasisField, D: Deformation> BasisField for PullbackBasis<B, D> {
    fn basis_count(&self) -> usize {
        self.basis.basis_count()
    }

    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        self.basis.expand(&self.deformation.deform(location).point)
    }
}

impl<B: DifferentiableBasisField, D: Deformation> DifferentiableBasisField for PullbackBasis<B, D> {
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        let map = self.deformation.deform(location);
        Ok(self
            .basis
            .differentiate_expansion(&map.point)?
            .into_iter()
            .map(|d| Differential::new(d.value, d.jacobian * map.jacobian))
            .collect())
    }
}

/// Every term carried by the flux-preserving transform of one shared mapping.
pub struct FluxPreservingBasis<B, D> {
    basis: B,
    deformation: D,
}

pub fn flux_preserving_basis<B: BasisField, D: Deformation>(
    basis: B,
    deformation: D,
) -> FluxPreservingBasis<B, D> {
    FluxPreservingBasis { basis, deformation }
}

impl<B: BasisField, D: Deformation> BasisField for FluxPreservingBasis<B, D> {
    fn basis_count(&self) -> usize {
        self.basis.basis_count()
    }

    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        let map = self.deformation.deform(location);
        let transform = adjugate(&map.jacobian);
        Ok(self
            .basis
            .expand(&map.point)?
            .into_iter()
            .map(|v| transform * v)
            .collect())
    }
}

impl<B: DifferentiableBasisField, D: Deformation> DifferentiableBasisField
    for FluxPreservingBasis<B, D>
{
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        let second = self.deformation.deform_second_order(location);
        let transform = PiolaTransform::new(&second);
        Ok(self
            .basis
            .differentiate_expansion(&second.mapping.point)?
            .iter()
            .map(|d| transform.apply(d))
            .collect())
    }
}

// ── Standard pipeline ────────────────────────────────────────────────

pub type StandardPipeline = Chain<Chain<PositionBending, Stretching>, TwistWarp>;

/// Bend, then stretch, then twist-warp, all for the same dipole tilt.
pub fn standard_pipeline(tilt: f64, config: &DeformationConfig) -> MagnetoResult<StandardPipeline> {
    let bend = PositionBending::new(tilt, &config.bending)?;
    let stretch = Stretching::new(tilt, &config.stretching)?;
    let twist = TwistWarp::new(tilt, &config.twist_warp)?;
    debug!(
        tilt,
        hinge = config.bending.hinge_distance,
        stretch = config.stretching.amplitude,
        warp = config.twist_warp.warp,
        twist = config.twist_warp.twist,
        "built deformation pipeline"
    );
    Ok(chain(chain(bend, stretch), twist))
}
