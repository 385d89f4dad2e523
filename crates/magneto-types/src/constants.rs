// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Equatorial surface field of the planetary dipole (nT)
pub const EARTH_DIPOLE_FIELD_NT: f64 = 30115.0;

/// Average solar-wind dynamic pressure the magnetopause is normalized to (nPa)
pub const REFERENCE_DYNAMIC_PRESSURE: f64 = 2.0;

/// Converts n[cm⁻³]·v²[km²/s²] into dynamic pressure in nPa (proton mass included).
pub const SOLAR_WIND_PRESSURE_FACTOR: f64 = 1.94e-6;

/// T96 magnetopause: tail radius scale at average pressure (R_E)
pub const MAGNETOPAUSE_A0: f64 = 70.0;

/// T96 magnetopause: ellipsoidal coordinate σ of the boundary
pub const MAGNETOPAUSE_SIGMA0: f64 = 1.08;

/// T96 magnetopause: x offset of the ellipsoid at average pressure (R_E)
pub const MAGNETOPAUSE_X0: f64 = 5.48;

/// T96 magnetopause: pressure scaling exponent (best-fit value)
pub const MAGNETOPAUSE_KAPPA: f64 = 0.14;

/// Hinge distance of the current-sheet bending at the equator (R_E)
pub const HINGE_DISTANCE: f64 = 7.5;

/// Quadratic latitude correction of the hinge distance (R_E)
pub const HINGE_QUADRATIC: f64 = -5.2;

/// Sharpness exponent ε of the saturating function Q(r)
pub const HINGE_EXPONENT: f64 = 3.0;

/// Radial scale of the warping term (R_E)
pub const WARP_LENGTH: f64 = 20.0;

/// Substitute for ρ or r on the symmetry axis before forming ratios.
/// NOTE: legacy value, kept as-is pending numerical review.
pub const AXIS_EPSILON: f64 = 1e-9;
