// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Model Assembly
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Everything a [`ModelConfig`] describes, built once and validated eagerly.

use crate::basis::BasisField;
use crate::cache::{cache, Cached};
use crate::combinators::Filter;
use crate::deform::{flux_preserving_basis, standard_pipeline, FluxPreservingBasis, StandardPipeline};
use crate::field::VectorField;
use crate::magnetopause::Magnetopause;
use crate::sources::Dipole;
use magneto_math::vector::Vec3;
use magneto_types::config::ModelConfig;
use magneto_types::error::MagnetoResult;
use tracing::info;

pub struct Magnetosphere {
    name: String,
    tilt: f64,
    pipeline: StandardPipeline,
    magnetopause: Magnetopause,
    cache_capacity: usize,
}

impl Magnetosphere {
    pub fn from_config(config: &ModelConfig) -> MagnetoResult<Self> {
        config.validate()?;
        let pipeline = standard_pipeline(config.dipole_tilt, &config.deformation)?;
        let magnetopause = Magnetopause::new(&config.magnetopause, config.dynamic_pressure)?;
        info!(
            model = %config.model_name,
            tilt = config.dipole_tilt,
            pressure = config.dynamic_pressure,
            "magnetosphere model ready"
        );
        Ok(Magnetosphere {
            name: config.model_name.clone(),
            tilt: config.dipole_tilt,
            pipeline,
            magnetopause,
            cache_capacity: config.cache_capacity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn pipeline(&self) -> &StandardPipeline {
        &self.pipeline
    }

    pub fn magnetopause(&self) -> &Magnetopause {
        &self.magnetopause
    }

    /// The planetary dipole at this model's tilt.
    pub fn dipole(&self) -> MagnetoResult<Dipole> {
        Dipole::earth(self.tilt)
    }

    /// `basis` carried through the deformation pipeline, flux preserved.
    pub fn deform_basis<B: BasisField>(&self, basis: B) -> FluxPreservingBasis<B, &StandardPipeline> {
        flux_preserving_basis(basis, &self.pipeline)
    }

    /// `field` zeroed outside the magnetopause and memoized.
    pub fn bounded<F: VectorField>(&self, field: F) -> MagnetoResult<Cached<Filter<F, Magnetopause>>> {
        cache(self.magnetopause.gate(field, Vec3::zeros()), self.cache_capacity)
    }
}
