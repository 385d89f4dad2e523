// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Coordinate Converters
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cartesian ↔ cylindrical / spherical / latitudinal conversions.
//!
//! Every system knows its analytic Jacobian `∂(x,y,z)/∂(q₁,q₂,q₃)`, the
//! inverse `∂(q₁,q₂,q₃)/∂(x,y,z)`, and its local orthonormal frame.
//! Longitudes are returned in `[0, 2π)`; on the symmetry axis the longitude
//! is 0. Non-finite input propagates as NaN, nothing here panics.

use crate::vector::{Mat3, Vec3};
use magneto_types::constants::AXIS_EPSILON;
use std::f64::consts::TAU;

/// Two-argument arctangent in `[0, 2π)`.
///
/// Both arguments are divided by the larger magnitude first, so huge
/// coordinates cannot overflow intermediate products. `(0, 0)` maps to 0.
pub fn normalized_atan2(y: f64, x: f64) -> f64 {
    if x.is_nan() || y.is_nan() {
        return f64::NAN;
    }
    let scale = x.abs().max(y.abs());
    if scale == 0.0 {
        return 0.0;
    }
    let angle = (y / scale).atan2(x / scale);
    if angle >= 0.0 {
        return angle;
    }
    let wrapped = angle + TAU;
    // -tiny + 2π rounds to 2π
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

pub trait CoordinateSystem: Copy {
    fn from_cartesian(p: &Vec3) -> Self;

    fn to_cartesian(&self) -> Vec3;

    /// The coordinate triple in declaration order.
    fn components(&self) -> Vec3;

    /// `∂(x,y,z)/∂(q₁,q₂,q₃)`, columns are the coordinate tangents.
    fn jacobian(&self) -> Mat3;

    /// `∂(q₁,q₂,q₃)/∂(x,y,z)`. Singular scale factors are replaced by
    /// [`AXIS_EPSILON`].
    fn inverse_jacobian(&self) -> Mat3;

    /// Orthonormal local unit vectors as columns.
    fn local_basis(&self) -> Mat3;

    /// Cartesian vector components → components in the local frame.
    fn vector_to_local(&self, v: &Vec3) -> Vec3 {
        self.local_basis().transpose() * v
    }

    /// Local-frame vector components → Cartesian components.
    fn vector_to_cartesian(&self, v: &Vec3) -> Vec3 {
        self.local_basis() * v
    }
}

fn safe(scale: f64) -> f64 {
    if scale.abs() < AXIS_EPSILON {
        AXIS_EPSILON
    } else {
        scale
    }
}

/// Cylindrical point (ρ, φ, z) about the z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylindrical {
    pub rho: f64,
    pub phi: f64,
    pub z: f64,
}

impl Cylindrical {
    pub fn new(rho: f64, phi: f64, z: f64) -> Self {
        Cylindrical { rho, phi, z }
    }
}

impl CoordinateSystem for Cylindrical {
    fn from_cartesian(p: &Vec3) -> Self {
        Cylindrical {
            rho: p.x.hypot(p.y),
            phi: normalized_atan2(p.y, p.x),
            z: p.z,
        }
    }

    fn to_cartesian(&self) -> Vec3 {
        let (s, c) = self.phi.sin_cos();
        Vec3::new(self.rho * c, self.rho * s, self.z)
    }

    fn components(&self) -> Vec3 {
        Vec3::new(self.rho, self.phi, self.z)
    }

    fn jacobian(&self) -> Mat3 {
        let (s, c) = self.phi.sin_cos();
        Mat3::new(
            c,
            -self.rho * s,
            0.0,
            s,
            self.rho * c,
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }

    fn inverse_jacobian(&self) -> Mat3 {
        let (s, c) = self.phi.sin_cos();
        let rho = safe(self.rho);
        Mat3::new(c, s, 0.0, -s / rho, c / rho, 0.0, 0.0, 0.0, 1.0)
    }

    fn local_basis(&self) -> Mat3 {
        let (s, c) = self.phi.sin_cos();
        Mat3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
    }
}

/// Spherical point (r, θ colatitude, φ longitude).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub r: f64,
    pub theta: f64,
    pub phi: f64,
}

impl Spherical {
    pub fn new(r: f64, theta: f64, phi: f64) -> Self {
        Spherical { r, theta, phi }
    }
}

impl CoordinateSystem for Spherical {
    fn from_cartesian(p: &Vec3) -> Self {
        let rho = p.x.hypot(p.y);
        Spherical {
            r: rho.hypot(p.z),
            // atan2 of non-negative ρ already lies in [0, π]
            theta: rho.atan2(p.z),
            phi: normalized_atan2(p.y, p.x),
        }
    }

    fn to_cartesian(&self) -> Vec3 {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        Vec3::new(self.r * st * cp, self.r * st * sp, self.r * ct)
    }

    fn components(&self) -> Vec3 {
        Vec3::new(self.r, self.theta, self.phi)
    }

    fn jacobian(&self) -> Mat3 {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        let r = self.r;
        Mat3::new(
            st * cp,
            r * ct * cp,
            -r * st * sp,
            st * sp,
            r * ct * sp,
            r * st * cp,
            ct,
            -r * st,
            0.0,
        )
    }

    fn inverse_jacobian(&self) -> Mat3 {
        let basis = self.local_basis();
        let r = safe(self.r);
        let rho = safe(self.r * self.theta.sin());
        let e_r = basis.column(0).transpose();
        let e_theta = basis.column(1).transpose() / r;
        let e_phi = basis.column(2).transpose() / rho;
        Mat3::from_rows(&[e_r, e_theta, e_phi])
    }

    fn local_basis(&self) -> Mat3 {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        Mat3::new(
            st * cp,
            ct * cp,
            -sp,
            st * sp,
            ct * sp,
            cp,
            ct,
            -st,
            0.0,
        )
    }
}

/// Geographic-style point (r, signed latitude, longitude).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Latitudinal {
    pub r: f64,
    pub lat: f64,
    pub lon: f64,
}

impl Latitudinal {
    pub fn new(r: f64, lat: f64, lon: f64) -> Self {
        Latitudinal { r, lat, lon }
    }
}

impl CoordinateSystem for Latitudinal {
    fn from_cartesian(p: &Vec3) -> Self {
        let rho = p.x.hypot(p.y);
        Latitudinal {
            r: rho.hypot(p.z),
            lat: p.z.atan2(rho),
            lon: normalized_atan2(p.y, p.x),
        }
    }

    fn to_cartesian(&self) -> Vec3 {
        let (sl, cl) = self.lat.sin_cos();
        let (so, co) = self.lon.sin_cos();
        Vec3::new(self.r * cl * co, self.r * cl * so, self.r * sl)
    }

    fn components(&self) -> Vec3 {
        Vec3::new(self.r, self.lat, self.lon)
    }

    fn jacobian(&self) -> Mat3 {
        let (sl, cl) = self.lat.sin_cos();
        let (so, co) = self.lon.sin_cos();
        let r = self.r;
        Mat3::new(
            cl * co,
            -r * sl * co,
            -r * cl * so,
            cl * so,
            -r * sl * so,
            r * cl * co,
            sl,
            r * cl,
            0.0,
        )
    }

    fn inverse_jacobian(&self) -> Mat3 {
        let basis = self.local_basis();
        let r = safe(self.r);
        let rho = safe(self.r * self.lat.cos());
        let e_r = basis.column(0).transpose();
        let e_lat = basis.column(1).transpose() / r;
        let e_lon = basis.column(2).transpose() / rho;
        Mat3::from_rows(&[e_r, e_lat, e_lon])
    }

    /// Columns: radial, northward, eastward.
    fn local_basis(&self) -> Mat3 {
        let (sl, cl) = self.lat.sin_cos();
        let (so, co) = self.lon.sin_cos();
        Mat3::new(cl * co, -sl * co, -so, cl * so, -sl * so, co, sl, cl, 0.0)
    }
}

/// Cylinder about the x axis: ρ in the y–z plane, φ = atan2(z, y), axial
/// coordinate x carried in the `z` slot.
///
/// (y, z, x) is a cyclic permutation of (x, y, z), so the frame stays right-handed.
pub fn x_aligned(p: &Vec3) -> Cylindrical {
    Cylindrical::from_cartesian(&Vec3::new(p.y, p.z, p.x))
}

/// Inverse of [`x_aligned`].
pub fn from_x_aligned(c: &Cylindrical) -> Vec3 {
    let q = c.to_cartesian();
    Vec3::new(q.z, q.x, q.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_vec_close(a: &Vec3, b: &Vec3, tol: f64) {
        assert!((a - b).norm() < tol, "expected {b:?}, got {a:?}");
    }

    #[test]
    fn test_cylindrical_example_point() {
        let c = Cylindrical::from_cartesian(&Vec3::new(1.0, 2.0, 3.0));
        assert!((c.rho - 2.236_067_98).abs() < 1e-8);
        assert!((c.phi - 1.107_148_72).abs() < 1e-8);
        assert_eq!(c.z, 3.0);
        assert_vec_close(&c.to_cartesian(), &Vec3::new(1.0, 2.0, 3.0), 1e-9);
    }

    #[test]
    fn test_axis_longitude_is_zero() {
        let c = Cylindrical::from_cartesian(&Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(c.rho, 0.0);
        assert_eq!(c.phi, 0.0);
        let s = Spherical::from_cartesian(&Vec3::new(0.0, 0.0, 0.0));
        assert_eq!((s.r, s.theta, s.phi), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_longitude_wraps_into_range() {
        let c = Cylindrical::from_cartesian(&Vec3::new(1.0, -1.0, 0.0));
        assert!((c.phi - 7.0 * PI / 4.0).abs() < 1e-14);
        let tiny = Cylindrical::from_cartesian(&Vec3::new(1.0, -1e-300, 0.0));
        assert!(tiny.phi >= 0.0 && tiny.phi < TAU);
    }

    #[test]
    fn test_large_coordinates_do_not_overflow() {
        let p = Vec3::new(1e300, 1e300, 0.0);
        let c = Cylindrical::from_cartesian(&p);
        assert!(c.rho.is_finite());
        assert!((c.phi - PI / 4.0).abs() < 1e-14);
    }

    #[test]
    fn test_nan_propagates() {
        let c = Cylindrical::from_cartesian(&Vec3::new(f64::NAN, 1.0, 0.0));
        assert!(c.rho.is_nan());
        assert!(c.phi.is_nan());
    }

    #[test]
    fn test_spherical_and_latitudinal_agree() {
        let p = Vec3::new(-2.0, 0.5, 1.5);
        let s = Spherical::from_cartesian(&p);
        let l = Latitudinal::from_cartesian(&p);
        assert!((s.r - l.r).abs() < 1e-14);
        assert!((s.theta + l.lat - FRAC_PI_2).abs() < 1e-14);
        assert!((s.phi - l.lon).abs() < 1e-14);
        assert_vec_close(&s.to_cartesian(), &p, 1e-12);
        assert_vec_close(&l.to_cartesian(), &p, 1e-12);
    }

    #[test]
    fn test_jacobian_times_inverse_is_identity() {
        let p = Vec3::new(0.7, -1.3, 2.1);
        let c = Cylindrical::from_cartesian(&p);
        let s = Spherical::from_cartesian(&p);
        let l = Latitudinal::from_cartesian(&p);
        for prod in [
            c.jacobian() * c.inverse_jacobian(),
            s.jacobian() * s.inverse_jacobian(),
            l.jacobian() * l.inverse_jacobian(),
        ] {
            assert!((prod - Mat3::identity()).norm() < 1e-12, "{prod}");
        }
    }

    #[test]
    fn test_local_basis_vector_roundtrip() {
        let s = Spherical::from_cartesian(&Vec3::new(1.0, 1.0, 1.0));
        let v = Vec3::new(0.3, -2.0, 5.0);
        let local = s.vector_to_local(&v);
        assert_vec_close(&s.vector_to_cartesian(&local), &v, 1e-13);
        // radial component of the position vector is r itself
        let radial = s.vector_to_local(&Vec3::new(1.0, 1.0, 1.0));
        assert!((radial.x - 3f64.sqrt()).abs() < 1e-14);
        assert!(radial.y.abs() < 1e-14 && radial.z.abs() < 1e-14);
    }

    #[test]
    fn test_x_aligned_frame() {
        let p = Vec3::new(5.0, 0.0, 2.0);
        let c = x_aligned(&p);
        assert!((c.rho - 2.0).abs() < 1e-15);
        assert!((c.phi - FRAC_PI_2).abs() < 1e-15);
        assert_eq!(c.z, 5.0);
        assert_vec_close(&from_x_aligned(&c), &p, 1e-14);
    }
}
