// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Field Combinators
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Algebra on fields.
//!
//! Each factory returns a small named type that stores its inputs and
//! delegates at evaluation time. Nothing is evaluated on construction.
//! Whenever every input is differentiable the combinator is too, with the
//! product/chain rule written out below.

use crate::field::{
    DifferentiableField, DifferentiableScalarField, Differential, ScalarField, VectorField,
};
use magneto_math::vector::{outer, unitize as unit_vector, Mat3, Vec3};
use magneto_types::error::{MagnetoError, MagnetoResult};

const ROTATION_TOLERANCE: f64 = 1e-9;

/// `F(p) = p`
#[derive(Debug, Clone, Copy)]
pub struct Identity;

pub fn identity() -> Identity {
    Identity
}

impl VectorField for Identity {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(*location)
    }
}

impl DifferentiableField for Identity {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        Ok(Differential::new(*location, Mat3::identity()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Constant {
    value: Vec3,
}

pub fn constant(value: Vec3) -> Constant {
    Constant { value }
}

impl VectorField for Constant {
    fn evaluate(&self, _location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(self.value)
    }
}

impl DifferentiableField for Constant {
    fn differentiate(&self, _location: &Vec3) -> MagnetoResult<Differential> {
        Ok(Differential::constant(self.value))
    }
}

pub struct Sum<A, B> {
    a: A,
    b: B,
}

pub fn add<A: VectorField, B: VectorField>(a: A, b: B) -> Sum<A, B> {
    Sum { a, b }
}

impl<A: VectorField, B: VectorField> VectorField for Sum<A, B> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(self.a.evaluate(location)? + self.b.evaluate(location)?)
    }
}

impl<A: DifferentiableField, B: DifferentiableField> DifferentiableField for Sum<A, B> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        Ok(self.a.differentiate(location)? + self.b.differentiate(location)?)
    }
}

/// Sum of any number of fields of one type (use `Box<dyn ...>` to mix types).
/// An empty sum is the zero field.
pub struct SumAll<F> {
    fields: Vec<F>,
}

pub fn add_all<F: VectorField>(fields: Vec<F>) -> SumAll<F> {
    SumAll { fields }
}

impl<F: VectorField> VectorField for SumAll<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        let mut total = Vec3::zeros();
        for field in &self.fields {
            total += field.evaluate(location)?;
        }
        Ok(total)
    }
}

impl<F: DifferentiableField> DifferentiableField for SumAll<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let mut total = Differential::constant(Vec3::zeros());
        for field in &self.fields {
            total = total + field.differentiate(location)?;
        }
        Ok(total)
    }
}

pub struct Negate<F> {
    field: F,
}

pub fn negate<F: VectorField>(field: F) -> Negate<F> {
    Negate { field }
}

impl<F: VectorField> VectorField for Negate<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(-self.field.evaluate(location)?)
    }
}

impl<F: DifferentiableField> DifferentiableField for Negate<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        Ok(-self.field.differentiate(location)?)
    }
}

/// `F(p) = k · G(p)`
pub struct Scale<F> {
    field: F,
    factor: f64,
}

pub fn scale<F: VectorField>(field: F, factor: f64) -> Scale<F> {
    Scale { field, factor }
}

impl<F: VectorField> VectorField for Scale<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(self.field.evaluate(location)? * self.factor)
    }
}

impl<F: DifferentiableField> DifferentiableField for Scale<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        Ok(self.field.differentiate(location)?.scaled(self.factor))
    }
}

/// `F(p) = G(k · p)`
pub struct ScaleLocation<F> {
    field: F,
    factor: f64,
}

pub fn scale_location<F: VectorField>(field: F, factor: f64) -> ScaleLocation<F> {
    ScaleLocation { field, factor }
}

impl<F: VectorField> VectorField for ScaleLocation<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        self.field.evaluate(&(location * self.factor))
    }
}

impl<F: DifferentiableField> DifferentiableField for ScaleLocation<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let inner = self.field.differentiate(&(location * self.factor))?;
        Ok(Differential::new(inner.value, inner.jacobian * self.factor))
    }
}

/// `F(p) = s(p) · G(p)`
pub struct Multiply<F, S> {
    field: F,
    scalar: S,
}

pub fn multiply<F: VectorField, S: ScalarField>(field: F, scalar: S) -> Multiply<F, S> {
    Multiply { field, scalar }
}

impl<F: VectorField, S: ScalarField> VectorField for Multiply<F, S> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(self.field.evaluate(location)? * self.scalar.evaluate(location)?)
    }
}

impl<F, S> DifferentiableField for Multiply<F, S>
where
    F: DifferentiableField,
    S: DifferentiableScalarField,
{
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let inner = self.field.differentiate(location)?;
        let (s, grad) = self.scalar.gradient(location)?;
        Ok(Differential::new(
            inner.value * s,
            inner.jacobian * s + outer(&inner.value, &grad),
        ))
    }
}

/// `F(p) = A(p) × B(p)`
pub struct Cross<A, B> {
    a: A,
    b: B,
}

pub fn cross<A: VectorField, B: VectorField>(a: A, b: B) -> Cross<A, B> {
    Cross { a, b }
}

impl<A: VectorField, B: VectorField> VectorField for Cross<A, B> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(self.a.evaluate(location)?.cross(&self.b.evaluate(location)?))
    }
}

impl<A: DifferentiableField, B: DifferentiableField> DifferentiableField for Cross<A, B> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let da = self.a.differentiate(location)?;
        let db = self.b.differentiate(location)?;
        let mut jacobian = Mat3::zeros();
        for wrt in 0..3 {
            let dadx = da.jacobian.column(wrt).into_owned();
            let dbdx = db.jacobian.column(wrt).into_owned();
            jacobian.set_column(wrt, &(dadx.cross(&db.value) + da.value.cross(&dbdx)));
        }
        Ok(Differential::new(da.value.cross(&db.value), jacobian))
    }
}

/// Vector field assembled from three scalar components.
pub struct Components<X, Y, Z> {
    x: X,
    y: Y,
    z: Z,
}

pub fn components<X, Y, Z>(x: X, y: Y, z: Z) -> Components<X, Y, Z>
where
    X: ScalarField,
    Y: ScalarField,
    Z: ScalarField,
{
    Components { x, y, z }
}

impl<X: ScalarField, Y: ScalarField, Z: ScalarField> VectorField for Components<X, Y, Z> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(Vec3::new(
            self.x.evaluate(location)?,
            self.y.evaluate(location)?,
            self.z.evaluate(location)?,
        ))
    }
}

impl<X, Y, Z> DifferentiableField for Components<X, Y, Z>
where
    X: DifferentiableScalarField,
    Y: DifferentiableScalarField,
    Z: DifferentiableScalarField,
{
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let (vx, gx) = self.x.gradient(location)?;
        let (vy, gy) = self.y.gradient(location)?;
        let (vz, gz) = self.z.gradient(location)?;
        Ok(Differential::new(
            Vec3::new(vx, vy, vz),
            Mat3::from_rows(&[gx.transpose(), gy.transpose(), gz.transpose()]),
        ))
    }
}

/// `F/|F|`; the zero vector is a domain error.
pub struct Unitize<F> {
    field: F,
}

pub fn unitize<F: VectorField>(field: F) -> Unitize<F> {
    Unitize { field }
}

impl<F: VectorField> VectorField for Unitize<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        unit_vector(&self.field.evaluate(location)?)
    }
}

fn unit_differential(inner: &Differential) -> MagnetoResult<Differential> {
    let norm = inner.value.norm();
    if norm == 0.0 {
        return Err(MagnetoError::ZeroVector);
    }
    let u = inner.value / norm;
    // ∂(F/|F|) = (I − u uᵀ) ∂F / |F|
    let projector = Mat3::identity() - outer(&u, &u);
    Ok(Differential::new(u, projector * inner.jacobian / norm))
}

impl<F: DifferentiableField> DifferentiableField for Unitize<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        unit_differential(&self.field.differentiate(location)?)
    }
}

/// `F/|F|`, or the zero vector where `F` vanishes.
pub struct UnitizeOrZero<F> {
    field: F,
}

pub fn unitize_or_zero<F: VectorField>(field: F) -> UnitizeOrZero<F> {
    UnitizeOrZero { field }
}

impl<F: VectorField> VectorField for UnitizeOrZero<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(magneto_math::vector::unitize_or_zero(
            &self.field.evaluate(location)?,
        ))
    }
}

impl<F: DifferentiableField> DifferentiableField for UnitizeOrZero<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let inner = self.field.differentiate(location)?;
        if inner.value.norm() == 0.0 {
            return Ok(Differential::constant(Vec3::zeros()));
        }
        unit_differential(&inner)
    }
}

pub(crate) fn check_rotation(rotation: &Mat3) -> MagnetoResult<()> {
    let orthogonality = (rotation.transpose() * rotation - Mat3::identity()).norm();
    let det = rotation.determinant();
    if !orthogonality.is_finite()
        || orthogonality > ROTATION_TOLERANCE
        || (det - 1.0).abs() > ROTATION_TOLERANCE
    {
        return Err(MagnetoError::ConfigError(format!(
            "rotation matrix must be proper orthogonal (|RᵀR − I| = {orthogonality:e}, det = {det})"
        )));
    }
    Ok(())
}

/// Field expressed in a rotated frame: `F(p) = R · G(Rᵀ p)`.
pub struct Rotate<F> {
    field: F,
    rotation: Mat3,
}

pub fn rotate<F: VectorField>(field: F, rotation: Mat3) -> MagnetoResult<Rotate<F>> {
    check_rotation(&rotation)?;
    Ok(Rotate { field, rotation })
}

impl<F: VectorField> VectorField for Rotate<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        let inner = self.field.evaluate(&(self.rotation.transpose() * location))?;
        Ok(self.rotation * inner)
    }
}

impl<F: DifferentiableField> DifferentiableField for Rotate<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        let rt = self.rotation.transpose();
        let inner = self.field.differentiate(&(rt * location))?;
        Ok(Differential::new(
            self.rotation * inner.value,
            self.rotation * inner.jacobian * rt,
        ))
    }
}

/// Field moved so that its origin sits at `origin`: `F(p) = G(p − origin)`.
pub struct Offset<F> {
    field: F,
    origin: Vec3,
}

pub fn offset<F: VectorField>(field: F, origin: Vec3) -> Offset<F> {
    Offset { field, origin }
}

impl<F: VectorField> VectorField for Offset<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        self.field.evaluate(&(location - self.origin))
    }
}

impl<F: DifferentiableField> DifferentiableField for Offset<F> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        self.field.differentiate(&(location - self.origin))
    }
}

/// Test on a location, used by [`filter`].
pub trait LocationPredicate: Send + Sync {
    fn test(&self, location: &Vec3) -> bool;
}

impl<P> LocationPredicate for P
where
    P: Fn(&Vec3) -> bool + Send + Sync,
{
    fn test(&self, location: &Vec3) -> bool {
        self(location)
    }
}

/// `G(p)` where the predicate holds, `fill` elsewhere.
pub struct Filter<F, P> {
    field: F,
    predicate: P,
    fill: Vec3,
}

pub fn filter<F: VectorField, P: LocationPredicate>(field: F, predicate: P, fill: Vec3) -> Filter<F, P> {
    Filter {
        field,
        predicate,
        fill,
    }
}

impl<F: VectorField, P: LocationPredicate> VectorField for Filter<F, P> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        if self.predicate.test(location) {
            self.field.evaluate(location)
        } else {
            Ok(self.fill)
        }
    }
}

impl<F: DifferentiableField, P: LocationPredicate> DifferentiableField for Filter<F, P> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        if self.predicate.test(location) {
            self.field.differentiate(location)
        } else {
            Ok(Differential::constant(self.fill))
        }
    }
}

/// `∇ × G`, evaluated from the closed-form Jacobian of `G`.
pub struct Curl<F> {
    field: F,
}

pub fn curl<F: DifferentiableField>(field: F) -> Curl<F> {
    Curl { field }
}

impl<F: DifferentiableField> VectorField for Curl<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(self.field.differentiate(location)?.curl())
    }
}

/// `∇ · G`
pub struct Divergence<F> {
    field: F,
}

pub fn divergence<F: DifferentiableField>(field: F) -> Divergence<F> {
    Divergence { field }
}

impl<F: DifferentiableField> ScalarField for Divergence<F> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<f64> {
        Ok(self.field.differentiate(location)?.divergence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{coordinate, radius};
    use crate::sources::Dipole;
    use magneto_math::vector::rotation_z;

    fn p() -> Vec3 {
        Vec3::new(1.5, -0.5, 2.0)
    }

    #[test]
    fn test_identity_and_constant() {
        let d = identity().differentiate(&p()).unwrap();
        assert_eq!(d.value, p());
        assert_eq!(d.jacobian, Mat3::identity());
        let c = constant(Vec3::x()).differentiate(&p()).unwrap();
        assert_eq!(c.jacobian, Mat3::zeros());
    }

    #[test]
    fn test_add_all_empty_is_zero() {
        let empty: SumAll<Constant> = add_all(Vec::new());
        assert_eq!(empty.evaluate(&p()).unwrap(), Vec3::zeros());
    }

    #[test]
    fn test_scale_multiplies_values() {
        let d = Dipole::earth(0.3).unwrap();
        for k in [-2.5, 0.0, 0.5, 7.0] {
            let scaled = scale(d, k).evaluate(&p()).unwrap();
            assert_eq!(scaled, d.evaluate(&p()).unwrap() * k);
        }
    }

    #[test]
    fn test_double_negation_is_identity() {
        let d = Dipole::earth(-0.2).unwrap();
        let twice = negate(negate(d));
        assert_eq!(twice.evaluate(&p()).unwrap(), d.evaluate(&p()).unwrap());
        assert_eq!(twice.differentiate(&p()).unwrap(), d.differentiate(&p()).unwrap());
    }

    #[test]
    fn test_scale_location_chain_factor() {
        let f = scale_location(identity(), 3.0);
        let d = f.differentiate(&p()).unwrap();
        assert_eq!(d.value, p() * 3.0);
        assert_eq!(d.jacobian, Mat3::identity() * 3.0);
    }

    #[test]
    fn test_multiply_product_rule() {
        // F = r · p → ∂F_a/∂x_b = r δ_ab + x_a x_b / r
        let f = multiply(identity(), radius());
        let d = f.differentiate(&p()).unwrap();
        let r = p().norm();
        let expected = Mat3::identity() * r + outer(&p(), &p()) / r;
        assert!((d.jacobian - expected).norm() < 1e-13);
    }

    #[test]
    fn test_cross_with_constant_axis() {
        // p × ẑ = (y, −x, 0)
        let f = cross(identity(), constant(Vec3::z()));
        let d = f.differentiate(&p()).unwrap();
        assert_eq!(d.value, Vec3::new(-0.5, -1.5, 0.0));
        let expected = Mat3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!((d.jacobian - expected).norm() < 1e-15);
        // curl(p × ẑ) = −2ẑ
        assert!((curl(f).evaluate(&p()).unwrap() - Vec3::new(0.0, 0.0, -2.0)).norm() < 1e-15);
    }

    #[test]
    fn test_components_rows_are_gradients() {
        let f = components(coordinate(1).unwrap(), coordinate(0).unwrap(), radius());
        let d = f.differentiate(&p()).unwrap();
        assert_eq!(d.value.x, p().y);
        assert_eq!(d.jacobian[(0, 1)], 1.0);
        assert_eq!(d.jacobian[(1, 0)], 1.0);
        assert!((d.jacobian[(2, 2)] - p().z / p().norm()).abs() < 1e-15);
    }

    #[test]
    fn test_unitize_variants_on_zero() {
        let zero = constant(Vec3::zeros());
        let err = unitize(zero).evaluate(&p()).unwrap_err();
        assert!(err.is_domain());
        assert!(unitize(zero).differentiate(&p()).is_err());
        assert_eq!(unitize_or_zero(zero).evaluate(&p()).unwrap(), Vec3::zeros());
        let d = unitize_or_zero(zero).differentiate(&p()).unwrap();
        assert_eq!(d.jacobian, Mat3::zeros());
    }

    #[test]
    fn test_unitize_jacobian_is_tangent() {
        // d(p/|p|) annihilates the radial direction
        let d = unitize(identity()).differentiate(&p()).unwrap();
        assert!((d.jacobian * p()).norm() < 1e-14);
    }

    #[test]
    fn test_rotate_conjugates_frame() {
        let rot = rotation_z(std::f64::consts::FRAC_PI_2);
        // a field pointing along +x in its own frame points along +y after rotation
        let f = rotate(constant(Vec3::x()), rot).unwrap();
        assert!((f.evaluate(&p()).unwrap() - Vec3::y()).norm() < 1e-15);
        // the identity field is frame independent
        let g = rotate(identity(), rot).unwrap();
        assert!((g.evaluate(&p()).unwrap() - p()).norm() < 1e-14);
        let d = g.differentiate(&p()).unwrap();
        assert!((d.jacobian - Mat3::identity()).norm() < 1e-14);
    }

    #[test]
    fn test_rotate_rejects_non_rotation() {
        let err = rotate(identity(), Mat3::identity() * 2.0).err().unwrap();
        assert!(err.is_configuration());
        let reflection = Mat3::new(-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(rotate(identity(), reflection).is_err());
    }

    #[test]
    fn test_offset_moves_origin() {
        let f = offset(identity(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(f.evaluate(&Vec3::new(1.0, 1.0, 1.0)).unwrap(), Vec3::zeros());
    }

    #[test]
    fn test_filter_fills_outside() {
        let f = filter(identity(), |q: &Vec3| q.x > 0.0, Vec3::new(9.0, 9.0, 9.0));
        assert_eq!(f.evaluate(&p()).unwrap(), p());
        let outside = Vec3::new(-1.0, 0.0, 0.0);
        assert_eq!(f.evaluate(&outside).unwrap(), Vec3::new(9.0, 9.0, 9.0));
        assert_eq!(f.differentiate(&outside).unwrap().jacobian, Mat3::zeros());
    }

    #[test]
    fn test_inner_failure_propagates() {
        let failing = unitize(constant(Vec3::zeros()));
        let sum = add(identity(), failing);
        assert!(matches!(sum.evaluate(&p()), Err(MagnetoError::ZeroVector)));
    }

    #[test]
    fn test_divergence_of_identity() {
        assert_eq!(divergence(identity()).evaluate(&p()).unwrap(), 3.0);
    }
}
