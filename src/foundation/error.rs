/// Convenience result type used across pathflow.
pub type FlowResult<T> = Result<T, FlowError>;

/// Top-level error taxonomy for batch operations.
///
/// Only structural problems surface here. Numeric degeneracies met while
/// deriving parameters or evaluating motion are recovered in place and
/// reported through [`crate::ParameterAdjustment`] and [`crate::MotionFallback`].
#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// No path was found on the selected source object.
    #[error("missing geometry: {0}")]
    MissingGeometry(String),

    /// The path has fewer than two vertices.
    #[error("insufficient geometry: path has {vertices} vertex(es), need at least 2")]
    InsufficientGeometry {
        /// Number of vertices found on the source.
        vertices: usize,
    },

    /// The sampled path has zero (or non-finite) total arc length.
    #[error("degenerate path: total arc length is {length}")]
    DegeneratePath {
        /// Measured arc length.
        length: f64,
    },

    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or parsing persisted data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Build a [`FlowError::MissingGeometry`] value.
    pub fn missing_geometry(msg: impl Into<String>) -> Self {
        Self::MissingGeometry(msg.into())
    }

    /// Build a [`FlowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error comes from the geometry itself rather than from
    /// configuration or IO.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            Self::MissingGeometry(_) | Self::InsufficientGeometry { .. } | Self::DegeneratePath { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
