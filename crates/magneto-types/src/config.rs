// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    HINGE_DISTANCE, HINGE_EXPONENT, HINGE_QUADRATIC, MAGNETOPAUSE_A0, MAGNETOPAUSE_KAPPA,
    MAGNETOPAUSE_SIGMA0, MAGNETOPAUSE_X0, REFERENCE_DYNAMIC_PRESSURE, WARP_LENGTH,
};
use crate::error::{MagnetoError, MagnetoResult};
use serde::{Deserialize, Serialize};

/// Top-level model parameter set.
/// One instance per evaluation context; every field object built from it is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: String,
    /// Dipole tilt angle ψ (radians). Positive tilts the northern pole sunward.
    #[serde(default)]
    pub dipole_tilt: f64,
    /// Solar-wind dynamic pressure (nPa)
    #[serde(default = "default_dynamic_pressure")]
    pub dynamic_pressure: f64,
    #[serde(default)]
    pub deformation: DeformationConfig,
    #[serde(default)]
    pub magnetopause: MagnetopauseParams,
    /// Maximum number of distinct locations a memoized field keeps.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeformationConfig {
    #[serde(default)]
    pub bending: BendingParams,
    #[serde(default)]
    pub stretching: StretchParams,
    #[serde(default)]
    pub twist_warp: TwistWarpParams,
}

/// Current-sheet bending: R_H = hinge_distance + hinge_quadratic·(z/r)².
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BendingParams {
    #[serde(default = "default_hinge_distance")]
    pub hinge_distance: f64,
    #[serde(default = "default_hinge_quadratic")]
    pub hinge_quadratic: f64,
    #[serde(default = "default_hinge_exponent")]
    pub exponent: f64,
}

/// Azimuthal stretching: F = φ − S(ρ)·sin φ − β·ψ/Q(r), S(ρ) = α·ρ²/(ρ² + L²).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StretchParams {
    /// α
    #[serde(default)]
    pub amplitude: f64,
    /// L (R_E)
    #[serde(default = "default_stretch_length")]
    pub scale_length: f64,
    /// β
    #[serde(default)]
    pub tilt_coupling: f64,
    #[serde(default = "default_hinge_distance")]
    pub hinge_distance: f64,
    #[serde(default = "default_hinge_exponent")]
    pub exponent: f64,
}

/// Twist-warp: F = φ + G·ρ³/(ρ⁴ + L⁴)·cos φ·sin ψ + T·x.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TwistWarpParams {
    /// G
    #[serde(default)]
    pub warp: f64,
    /// L (R_E)
    #[serde(default = "default_warp_length")]
    pub warp_length: f64,
    /// T (radians per R_E)
    #[serde(default)]
    pub twist: f64,
}

/// Pressure-independent magnetopause shape, scaled by (P/P_avg)^κ at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MagnetopauseParams {
    #[serde(default = "default_a0")]
    pub a0: f64,
    #[serde(default = "default_sigma0")]
    pub sigma0: f64,
    #[serde(default = "default_x0")]
    pub x0: f64,
    #[serde(default = "default_kappa")]
    pub kappa: f64,
    #[serde(default = "default_dynamic_pressure")]
    pub reference_pressure: f64,
}

fn default_dynamic_pressure() -> f64 {
    REFERENCE_DYNAMIC_PRESSURE
}
fn default_cache_capacity() -> usize {
    1024
}
fn default_hinge_distance() -> f64 {
    HINGE_DISTANCE
}
fn default_hinge_quadratic() -> f64 {
    HINGE_QUADRATIC
}
fn default_hinge_exponent() -> f64 {
    HINGE_EXPONENT
}
fn default_stretch_length() -> f64 {
    10.0
}
fn default_warp_length() -> f64 {
    WARP_LENGTH
}
fn default_a0() -> f64 {
    MAGNETOPAUSE_A0
}
fn default_sigma0() -> f64 {
    MAGNETOPAUSE_SIGMA0
}
fn default_x0() -> f64 {
    MAGNETOPAUSE_X0
}
fn default_kappa() -> f64 {
    MAGNETOPAUSE_KAPPA
}

impl Default for BendingParams {
    fn default() -> Self {
        BendingParams {
            hinge_distance: default_hinge_distance(),
            hinge_quadratic: default_hinge_quadratic(),
            exponent: default_hinge_exponent(),
        }
    }
}

impl Default for StretchParams {
    fn default() -> Self {
        StretchParams {
            amplitude: 0.0,
            scale_length: default_stretch_length(),
            tilt_coupling: 0.0,
            hinge_distance: default_hinge_distance(),
            exponent: default_hinge_exponent(),
        }
    }
}

impl Default for TwistWarpParams {
    fn default() -> Self {
        TwistWarpParams {
            warp: 0.0,
            warp_length: default_warp_length(),
            twist: 0.0,
        }
    }
}

impl Default for MagnetopauseParams {
    fn default() -> Self {
        MagnetopauseParams {
            a0: default_a0(),
            sigma0: default_sigma0(),
            x0: default_x0(),
            kappa: default_kappa(),
            reference_pressure: default_dynamic_pressure(),
        }
    }
}

fn require_positive(name: &str, value: f64) -> MagnetoResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MagnetoError::ConfigError(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

fn require_finite(name: &str, value: f64) -> MagnetoResult<()> {
    if !value.is_finite() {
        return Err(MagnetoError::ConfigError(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

impl BendingParams {
    pub fn validate(&self) -> MagnetoResult<()> {
        require_positive("bending.hinge_distance", self.hinge_distance)?;
        require_finite("bending.hinge_quadratic", self.hinge_quadratic)?;
        require_positive("bending.exponent", self.exponent)?;
        // R_H at the pole must stay positive or Q(r) changes sign.
        require_positive(
            "bending.hinge_distance + bending.hinge_quadratic",
            self.hinge_distance + self.hinge_quadratic,
        )
    }
}

impl StretchParams {
    pub fn validate(&self) -> MagnetoResult<()> {
        require_finite("stretching.amplitude", self.amplitude)?;
        // S(ρ) < |α|, so |α| < 1 keeps ∂F/∂φ = 1 − S·cos φ positive and the map one-to-one.
        if self.amplitude.abs() >= 1.0 {
            return Err(MagnetoError::ConfigError(format!(
                "stretching.amplitude must satisfy |α| < 1, got {}",
                self.amplitude
            )));
        }
        require_positive("stretching.scale_length", self.scale_length)?;
        require_finite("stretching.tilt_coupling", self.tilt_coupling)?;
        require_positive("stretching.hinge_distance", self.hinge_distance)?;
        require_positive("stretching.exponent", self.exponent)
    }
}

impl TwistWarpParams {
    pub fn validate(&self) -> MagnetoResult<()> {
        require_finite("twist_warp.warp", self.warp)?;
        require_positive("twist_warp.warp_length", self.warp_length)?;
        require_finite("twist_warp.twist", self.twist)
    }
}

impl DeformationConfig {
    pub fn validate(&self) -> MagnetoResult<()> {
        self.bending.validate()?;
        self.stretching.validate()?;
        self.twist_warp.validate()
    }
}

impl MagnetopauseParams {
    pub fn validate(&self) -> MagnetoResult<()> {
        require_positive("magnetopause.a0", self.a0)?;
        require_finite("magnetopause.x0", self.x0)?;
        require_finite("magnetopause.kappa", self.kappa)?;
        require_positive("magnetopause.reference_pressure", self.reference_pressure)?;
        if !self.sigma0.is_finite() || self.sigma0 <= 1.0 {
            return Err(MagnetoError::ConfigError(format!(
                "magnetopause.sigma0 must be finite and > 1, got {}",
                self.sigma0
            )));
        }
        Ok(())
    }
}

impl ModelConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> MagnetoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> MagnetoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MagnetoResult<()> {
        require_finite("dipole_tilt", self.dipole_tilt)?;
        if self.dipole_tilt.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(MagnetoError::ConfigError(format!(
                "dipole_tilt must lie in (-π/2, π/2), got {}",
                self.dipole_tilt
            )));
        }
        require_positive("dynamic_pressure", self.dynamic_pressure)?;
        if self.cache_capacity == 0 {
            return Err(MagnetoError::ConfigError(
                "cache_capacity must be >= 1".to_string(),
            ));
        }
        self.deformation.validate()?;
        self.magnetopause.validate()
    }
}
