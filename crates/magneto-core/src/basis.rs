// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Basis Expansions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fields that decompose into an ordered list of basis terms.
//!
//! The value of a basis field is the component-wise sum of its expansion.
//! The number of terms is fixed when the field is built; combinators that
//! need matching counts check them at construction.

use crate::combinators::check_rotation;
use crate::field::{DifferentiableField, Differential, VectorField};
use magneto_math::vector::{Mat3, Vec3};
use magneto_types::error::{MagnetoError, MagnetoResult};
use ndarray::Array1;
use std::sync::Arc;

/// Location → one vector per basis term.
pub trait BasisField: Send + Sync {
    fn basis_count(&self) -> usize;
    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>>;
}

/// Location → one differential per basis term.
pub trait DifferentiableBasisField: BasisField {
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>>;
}

macro_rules! forward_basis_impls {
    ($($ptr:ident),*) => {$(
        impl<B: BasisField + ?Sized> BasisField for $ptr<B> {
            fn basis_count(&self) -> usize {
                (**self).basis_count()
            }
            fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
                (**self).expand(location)
            }
        }

        impl<B: DifferentiableBasisField + ?Sized> DifferentiableBasisField for $ptr<B> {
            fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
                (**self).differentiate_expansion(location)
            }
        }
    )*};
}

forward_basis_impls!(Box, Arc);

impl<B: BasisField + ?Sized> BasisField for &B {
    fn basis_count(&self) -> usize {
        (**self).basis_count()
    }
    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        (**self).expand(location)
    }
}

impl<B: DifferentiableBasisField + ?Sized> DifferentiableBasisField for &B {
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        (**self).differentiate_expansion(location)
    }
}

// ── Coefficient Table ────────────────────────────────────────────────

/// Linear coefficients indexed from a declared lower bound.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    lower: i64,
    values: Array1<f64>,
}

impl CoefficientTable {
    pub fn new(lower: i64, values: Array1<f64>) -> Self {
        CoefficientTable { lower, values }
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    /// One past the last valid index.
    pub fn upper(&self) -> i64 {
        self.lower + self.values.len() as i64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: i64) -> MagnetoResult<f64> {
        if index < self.lower || index >= self.upper() {
            return Err(self.out_of_range(index));
        }
        Ok(self.values[(index - self.lower) as usize])
    }

    fn out_of_range(&self, index: i64) -> MagnetoError {
        MagnetoError::CoefficientOutOfRange {
            index,
            lower: self.lower,
            upper: self.upper(),
        }
    }
}

// ── Combinators ──────────────────────────────────────────────────────

/// Every field of a list as one basis term.
pub struct FieldList<F> {
    fields: Vec<F>,
}

pub fn from_fields<F: VectorField>(fields: Vec<F>) -> FieldList<F> {
    FieldList { fields }
}

impl<F: VectorField> BasisField for FieldList<F> {
    fn basis_count(&self) -> usize {
        self.fields.len()
    }

    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        self.fields.iter().map(|f| f.evaluate(location)).collect()
    }
}

impl<F: DifferentiableField> DifferentiableBasisField for FieldList<F> {
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        self.fields.iter().map(|f| f.differentiate(location)).collect()
    }
}

/// The plain field of a basis: sum of its expansion.
pub struct Summed<B> {
    basis: B,
}

pub fn summed<B: BasisField>(basis: B) -> Summed<B> {
    Summed { basis }
}

impl<B: BasisField> VectorField for Summed<B> {
    fn evaluate(&self, location: &Vec3) -> MagnetoResult<Vec3> {
        Ok(self
            .basis
            .expand(location)?
            .into_iter()
            .fold(Vec3::zeros(), |acc, v| acc + v))
    }
}

impl<B: DifferentiableBasisField> DifferentiableField for Summed<B> {
    fn differentiate(&self, location: &Vec3) -> MagnetoResult<Differential> {
        Ok(self
            .basis
            .differentiate_expansion(location)?
            .into_iter()
            .fold(Differential::constant(Vec3::zeros()), |acc, d| acc + d))
    }
}

/// Terms of `first` followed by terms of `second`.
pub struct Concat<A, B> {
    first: A,
    second: B,
}

pub fn concat<A: BasisField, B: BasisField>(first: A, second: B) -> Concat<A, B> {
    Concat { first, second }
}

impl<A: BasisField, B: BasisField> BasisField for Concat<A, B> {
    fn basis_count(&self) -> usize {
        self.first.basis_count() + self.second.basis_count()
    }

    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        let mut terms = self.first.expand(location)?;
        terms.extend(self.second.expand(location)?);
        Ok(terms)
    }
}

impl<A: DifferentiableBasisField, B: DifferentiableBasisField> DifferentiableBasisField
    for Concat<A, B>
{
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        let mut terms = self.first.differentiate_expansion(location)?;
        terms.extend(self.second.differentiate_expansion(location)?);
        Ok(terms)
    }
}

/// Term-by-term sum of two expansions of equal length.
pub struct AddExpansions<A, B> {
    a: A,
    b: B,
}

pub fn add_expansions<A: BasisField, B: BasisField>(a: A, b: B) -> MagnetoResult<AddExpansions<A, B>> {
    let (left, right) = (a.basis_count(), b.basis_count());
    if left != right {
        return Err(MagnetoError::BasisCountMismatch { left, right });
    }
    Ok(AddExpansions { a, b })
}

impl<A: BasisField, B: BasisField> BasisField for AddExpansions<A, B> {
    fn basis_count(&self) -> usize {
        self.a.basis_count()
    }

    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        let left = self.a.expand(location)?;
        let right = self.b.expand(location)?;
        Ok(left.into_iter().zip(right).map(|(l, r)| l + r).collect())
    }
}

impl<A: DifferentiableBasisField, B: DifferentiableBasisField> DifferentiableBasisField
    for AddExpansions<A, B>
{
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        let left = self.a.differentiate_expansion(location)?;
        let right = self.b.differentiate_expansion(location)?;
        Ok(left.into_iter().zip(right).map(|(l, r)| l + r).collect())
    }
}

/// Each term scaled by its own coefficient.
pub struct WithCoefficients<B> {
    basis: B,
    coefficients: Vec<f64>,
}

/// Term `k` of `basis` is multiplied by `table.get(first_index + k)`.
/// The whole index range is checked here, not at evaluation.
pub fn with_coefficients<B: BasisField>(
    basis: B,
    table: &CoefficientTable,
    first_index: i64,
) -> MagnetoResult<WithCoefficients<B>> {
    let coefficients = (0..basis.basis_count() as i64)
        .map(|k| table.get(first_index + k))
        .collect::<MagnetoResult<Vec<f64>>>()?;
    Ok(WithCoefficients {
        basis,
        coefficients,
    })
}

impl<B> WithCoefficients<B> {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl<B: BasisField> BasisField for WithCoefficients<B> {
    fn basis_count(&self) -> usize {
        self.coefficients.len()
    }

    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        let terms = self.basis.expand(location)?;
        Ok(terms
            .into_iter()
            .zip(&self.coefficients)
            .map(|(v, c)| v * *c)
            .collect())
    }
}

impl<B: DifferentiableBasisField> DifferentiableBasisField for WithCoefficients<B> {
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        let terms = self.basis.differentiate_expansion(location)?;
        Ok(terms
            .into_iter()
            .zip(&self.coefficients)
            .map(|(d, c)| d.scaled(*c))
            .collect())
    }
}

/// Every term expressed in a rotated frame: `R · B_k(Rᵀ p)`.
pub struct RotateBasis<B> {
    basis: B,
    rotation: Mat3,
}

pub fn rotate_basis<B: BasisField>(basis: B, rotation: Mat3) -> MagnetoResult<RotateBasis<B>> {
    check_rotation(&rotation)?;
    Ok(RotateBasis { basis, rotation })
}

impl<B: BasisField> BasisField for RotateBasis<B> {
    fn basis_count(&self) -> usize {
        self.basis.basis_count()
    }

    fn expand(&self, location: &Vec3) -> MagnetoResult<Vec<Vec3>> {
        let inner = self.rotation.transpose() * location;
        Ok(self
            .basis
            .expand(&inner)?
            .into_iter()
            .map(|v| self.rotation * v)
            .collect())
    }
}

impl<B: DifferentiableBasisField> DifferentiableBasisField for RotateBasis<B> {
    fn differentiate_expansion(&self, location: &Vec3) -> MagnetoResult<Vec<Differential>> {
        let rt = self.rotation.transpose();
        Ok(self
            .basis
            .differentiate_expansion(&(rt * location))?
            .into_iter()
            .map(|d| Differential::new(self.rotation * d.value, self.rotation * d.jacobian * rt))
            .collect())
    }
}
