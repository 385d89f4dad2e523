// ─────────────────────────────────────────────────────────────────────
// Magneto Field Core — Core Library
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Differentiable magnetospheric field model.
//!
//! Fields and their Jacobians, basis expansions, the bend/stretch/twist
//! deformation pipeline and the magnetopause boundary.

pub mod basis;
pub mod cache;
pub mod combinators;
pub mod deform;
pub mod field;
pub mod fitting;
pub mod magnetopause;
pub mod model;
pub mod scalar;
pub mod sources;
