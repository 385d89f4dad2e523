// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Property-Based Tests (proptest) for magneto-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for magneto-types using proptest.
//!
//! Covers: configuration serialization roundtrip, eager validation of
//! magnetopause and deformation parameters.

use magneto_types::config::{MagnetopauseParams, ModelConfig, TwistWarpParams};
use proptest::prelude::*;

fn config_json(tilt: f64, pressure: f64, sigma0: f64, warp: f64, capacity: usize) -> String {
    format!(
        r#"{{
            "model_name": "prop",
            "dipole_tilt": {tilt},
            "dynamic_pressure": {pressure},
            "deformation": {{ "twist_warp": {{ "warp": {warp} }} }},
            "magnetopause": {{ "sigma0": {sigma0} }},
            "cache_capacity": {capacity}
        }}"#
    )
}

// ── Serialization Roundtrip ──────────────────────────────────────────

proptest! {
    /// Any valid configuration survives JSON serialization unchanged.
    #[test]
    fn config_roundtrip(
        tilt in -1.5f64..1.5,
        pressure in 0.1f64..20.0,
        sigma0 in 1.01f64..3.0,
        warp in -2.0f64..2.0,
        capacity in 1usize..100_000,
    ) {
        let cfg = ModelConfig::from_json_str(&config_json(tilt, pressure, sigma0, warp, capacity))
            .expect("valid config");
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back = ModelConfig::from_json_str(&json).expect("reparse");

        prop_assert_eq!(back.dipole_tilt, cfg.dipole_tilt);
        prop_assert_eq!(back.dynamic_pressure, cfg.dynamic_pressure);
        prop_assert_eq!(back.magnetopause.sigma0, cfg.magnetopause.sigma0);
        prop_assert_eq!(back.deformation.twist_warp.warp, cfg.deformation.twist_warp.warp);
        prop_assert_eq!(back.cache_capacity, capacity);
    }
}

// ── Validation ───────────────────────────────────────────────────────

proptest! {
    /// σ₀ ≤ 1 collapses the ellipsoid and is rejected as a configuration error.
    #[test]
    fn magnetopause_rejects_degenerate_sigma(sigma0 in -2.0f64..1.0) {
        let params = MagnetopauseParams { sigma0, ..MagnetopauseParams::default() };
        let err = params.validate().unwrap_err();
        prop_assert!(err.is_configuration());
    }

    /// Non-positive warp length is rejected regardless of the other terms.
    #[test]
    fn twist_warp_rejects_nonpositive_length(length in -10.0f64..=0.0, warp in -1.0f64..1.0) {
        let params = TwistWarpParams { warp, warp_length: length, twist: 0.0 };
        prop_assert!(params.validate().is_err());
    }

    /// Non-positive dynamic pressure never validates.
    #[test]
    fn config_rejects_nonpositive_pressure(pressure in -5.0f64..=0.0) {
        let json = config_json(0.0, pressure, 1.08, 0.0, 16);
        prop_assert!(ModelConfig::from_json_str(&json).is_err());
    }
}
