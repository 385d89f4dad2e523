// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Angle Conversions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sexagesimal (degree/minute/second and hour-angle) conversions.
//!
//! Components are range-checked eagerly; out-of-range input is a
//! configuration error, never silently wrapped.

use magneto_types::error::{MagnetoError, MagnetoResult};

fn check(component: &'static str, value: f64, limit: f64) -> MagnetoResult<()> {
    // NaN fails both comparisons and is rejected too
    if value >= 0.0 && value < limit {
        Ok(())
    } else {
        Err(MagnetoError::AngleOutOfRange {
            component,
            value,
            limit,
        })
    }
}

/// Degrees, arc-minutes, arc-seconds → decimal degrees.
///
/// `degrees ∈ [0, 360)`, `minutes, seconds ∈ [0, 60)`.
pub fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> MagnetoResult<f64> {
    check("degrees", degrees, 360.0)?;
    check("minutes", minutes, 60.0)?;
    check("seconds", seconds, 60.0)?;
    Ok(degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Hour angle (h, m, s) → decimal degrees, 15° per hour.
pub fn hms_to_degrees(hours: f64, minutes: f64, seconds: f64) -> MagnetoResult<f64> {
    check("hours", hours, 24.0)?;
    check("minutes", minutes, 60.0)?;
    check("seconds", seconds, 60.0)?;
    Ok(15.0 * (hours + minutes / 60.0 + seconds / 3600.0))
}

/// Decimal degrees → (degrees, minutes, seconds) after wrapping into `[0, 360)`.
pub fn degrees_to_dms(angle: f64) -> (f64, f64, f64) {
    let mut wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        wrapped = 0.0;
    }
    let degrees = wrapped.floor();
    let minutes_total = (wrapped - degrees) * 60.0;
    let minutes = minutes_total.floor();
    let seconds = ((minutes_total - minutes) * 60.0).clamp(0.0, 60.0 - f64::EPSILON * 60.0);
    (degrees, minutes, seconds)
}
