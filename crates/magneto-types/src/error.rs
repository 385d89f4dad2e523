use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagnetoError {
    #[error("Cannot unitize the zero vector")]
    ZeroVector,

    #[error("No intersection: {0}")]
    NoIntersection(String),

    #[error("Basis function count mismatch: {left} != {right}")]
    BasisCountMismatch { left: usize, right: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Angle component {component} = {value} outside [0, {limit})")]
    AngleOutOfRange {
        component: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("Coefficient index {index} outside table range [{lower}, {upper})")]
    CoefficientOutOfRange { index: i64, lower: i64, upper: i64 },

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MagnetoError {
    /// Failures that come from evaluating outside a function's domain.
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::ZeroVector | Self::NoIntersection(_))
    }

    /// Failures caused by invalid parameters, checked when a value is built.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::BasisCountMismatch { .. }
                | Self::ConfigError(_)
                | Self::AngleOutOfRange { .. }
                | Self::CoefficientOutOfRange { .. }
        )
    }
}

pub type MagnetoResult<T> = Result<T, MagnetoError>;
