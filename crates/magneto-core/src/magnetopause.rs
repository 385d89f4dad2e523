// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Magnetopause
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pressure-scaled magnetopause: a prolate half-ellipsoid on the dayside
//! joined at the seam `x = x₀ − a` to a cylinder down the tail.
//!
//! The ellipsoid is the surface σ = σ₀ of prolate spheroidal coordinates
//! with foci at `x₀` and `x₀ − 2a`:
//!
//! ```text
//! ξ = (x − x₀)/a + 1,   ζ = ρ/a
//! σ = (√((1+ξ)² + ζ²) + √((1−ξ)² + ζ²)) / 2
//! τ = (√((1+ξ)² + ζ²) − √((1−ξ)² + ζ²)) / 2
//! ```
//!
//! The cylinder radius `a √(σ₀² − 1)` equals the ellipsoid radius at the seam.

use crate::combinators::{filter, Filter, LocationPredicate};
use crate::field::VectorField;
use magneto_math::vector::{unitize, Vec3};
use magneto_types::config::MagnetopauseParams;
use magneto_types::constants::SOLAR_WIND_PRESSURE_FACTOR;
use magneto_types::error::{MagnetoError, MagnetoResult};
use tracing::debug;

/// Which piece of the boundary governs a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// `x < seam`: the tail cylinder.
    Tail,
    /// `x ≥ seam`: the dayside ellipsoid.
    Dayside,
}

#[derive(Debug, Clone, Copy)]
pub struct Magnetopause {
    a: f64,
    sigma0: f64,
    x0: f64,
}

impl Magnetopause {
    /// Scale the shape to dynamic pressure `pressure` (nPa).
    pub fn new(params: &MagnetopauseParams, pressure: f64) -> MagnetoResult<Self> {
        params.validate()?;
        if !pressure.is_finite() || pressure <= 0.0 {
            return Err(MagnetoError::ConfigError(format!(
                "dynamic pressure must be finite and > 0, got {pressure}"
            )));
        }
        let scale = (pressure / params.reference_pressure).powf(params.kappa);
        let mp = Magnetopause {
            a: params.a0 / scale,
            sigma0: params.sigma0,
            x0: params.x0 / scale,
        };
        debug!(
            pressure,
            scale,
            standoff = mp.standoff(),
            tail_radius = mp.tail_radius(),
            "magnetopause"
        );
        Ok(mp)
    }

    /// Pressure from solar-wind proton density (cm⁻³) and speed (km/s).
    pub fn from_solar_wind(params: &MagnetopauseParams, density: f64, speed: f64) -> MagnetoResult<Self> {
        if !(density.is_finite() && speed.is_finite() && density > 0.0) {
            return Err(MagnetoError::ConfigError(format!(
                "solar wind needs finite density > 0 and finite speed, got n = {density}, v = {speed}"
            )));
        }
        Self::new(params, SOLAR_WIND_PRESSURE_FACTOR * density * speed * speed)
    }

    /// `x` of the junction between ellipsoid and cylinder.
    pub fn seam(&self) -> f64 {
        self.x0 - self.a
    }

    pub fn tail_radius(&self) -> f64 {
        self.a * (self.sigma0 * self.sigma0 - 1.0).sqrt()
    }

    /// Subsolar distance of the nose.
    pub fn standoff(&self) -> f64 {
        self.x0 - self.a + self.a * self.sigma0
    }

    pub fn region(&self, location: &Vec3) -> Region {
        if location.x < self.seam() {
            Region::Tail
        } else {
            Region::Dayside
        }
    }

    /// Prolate spheroidal `(τ, σ)` of a location.
    pub fn ellipsoidal(&self, location: &Vec3) -> (f64, f64) {
        let xi = (location.x - self.x0) / self.a + 1.0;
        let zeta = location.y.hypot(location.z) / self.a;
        let sq1 = (1.0 + xi).hypot(zeta);
        let sq2 = (1.0 - xi).hypot(zeta);
        (0.5 * (sq1 - sq2), 0.5 * (sq1 + sq2))
    }

    pub fn contains(&self, location: &Vec3) -> bool {
        match self.region(location) {
            Region::Tail => location.y.hypot(location.z) < self.tail_radius(),
            Region::Dayside => self.ellipsoidal(location).1 <= self.sigma0,
        }
    }

    /// Boundary point associated with a location: same x on the cylinder,
    /// same τ on the ellipsoid, same azimuth about the x axis in both cases.
    pub fn boundary_point(&self, location: &Vec3) -> Vec3 {
        let rho = location.y.hypot(location.z);
        let (cy, cz) = if rho > 0.0 {
            (location.y / rho, location.z / rho)
        } else {
            (0.0, 1.0)
        };
        let (x, radius) = match self.region(location) {
            Region::Tail => (location.x, self.tail_radius()),
            Region::Dayside => {
                let (tau, _) = self.ellipsoidal(location);
                let s2m = self.sigma0 * self.sigma0 - 1.0;
                (
                    self.x0 - self.a * (1.0 - self.sigma0 * tau),
                    self.a * (s2m * (1.0 - tau * tau)).max(0.0).sqrt(),
                )
            }
        };
        Vec3::new(x, radius * cy, radius * cz)
    }

    /// Distance to [`boundary_point`](Self::boundary_point), negative inside.
    pub fn distance(&self, location: &Vec3) -> f64 {
        let d = (location - self.boundary_point(location)).norm();
        if self.contains(location) {
            -d
        } else {
            d
        }
    }

    /// Outward unit normal at a point of the surface.
    pub fn normal(&self, surface_point: &Vec3) -> MagnetoResult<Vec3> {
        let p = surface_point;
        match self.region(p) {
            Region::Tail => unitize(&Vec3::new(0.0, p.y, p.z)),
            Region::Dayside => {
                let xi = (p.x - self.x0) / self.a + 1.0;
                let s2 = self.sigma0 * self.sigma0;
                let radial = 1.0 / (self.a * self.a * (s2 - 1.0));
                unitize(&Vec3::new(xi / (self.a * s2), p.y * radial, p.z * radial))
            }
        }
    }

    /// Crossing of the ray `origin + t·direction`, `t ≥ 0`, selected by the
    /// cylinder-first rule.
    ///
    /// The cylinder is tried first and its hits are accepted only tailward of
    /// the seam; otherwise the ellipsoid is tried and only dayward hits count.
    pub fn intersect(&self, origin: &Vec3, direction: &Vec3) -> MagnetoResult<Vec3> {
        let d = unitize(direction)?;
        let o = origin;
        let seam = self.seam();
        let at = |t: f64| o + d * t;

        let radius = self.tail_radius();
        let cyl = quadratic_roots(
            d.y * d.y + d.z * d.z,
            2.0 * (o.y * d.y + o.z * d.z),
            o.y * o.y + o.z * o.z - radius * radius,
        );
        if let Some(hit) = first_hit(cyl, |t| at(t).x < seam) {
            return Ok(at(hit));
        }

        let s2 = self.sigma0 * self.sigma0;
        let s2m = s2 - 1.0;
        let a2 = self.a * self.a;
        let xi0 = (o.x - self.x0) / self.a + 1.0;
        let dxi = d.x / self.a;
        let ell = quadratic_roots(
            dxi * dxi / s2 + (d.y * d.y + d.z * d.z) / (a2 * s2m),
            2.0 * xi0 * dxi / s2 + 2.0 * (o.y * d.y + o.z * d.z) / (a2 * s2m),
            xi0 * xi0 / s2 + (o.y * o.y + o.z * o.z) / (a2 * s2m) - 1.0,
        );
        if let Some(hit) = first_hit(ell, |t| at(t).x >= seam) {
            return Ok(at(hit));
        }

        Err(MagnetoError::NoIntersection(format!(
            "ray from {:?} along {:?} misses the magnetopause",
            (o.x, o.y, o.z),
            (d.x, d.y, d.z)
        )))
    }

    /// `field` inside the magnetopause, `fill` outside.
    pub fn gate<F: VectorField>(&self, field: F, fill: Vec3) -> Filter<F, Magnetopause> {
        filter(field, *self, fill)
    }
}

impl LocationPredicate for Magnetopause {
    fn test(&self, location: &Vec3) -> bool {
        self.contains(location)
    }
}

/// Real roots of `a t² + b t + c`, ascending.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let (t1, t2) = if q == 0.0 {
        (0.0, 0.0)
    } else {
        (q / a, c / q)
    };
    Some((t1.min(t2), t1.max(t2)))
}

fn first_hit(roots: Option<(f64, f64)>, accept: impl Fn(f64) -> bool) -> Option<f64> {
    let (t1, t2) = roots?;
    [t1, t2].into_iter().find(|&t| t >= 0.0 && accept(t))
}
