/// Convenience result type used across Acuity.
pub type AcuityResult<T> = Result<T, AcuityError>;

/// Top-level error taxonomy used by the renderer, controls and configuration.
///
/// Conditions where nothing can be drawn yet (no target, no image) are not errors; they are
/// reported through [`RenderOutcome::NotReady`](crate::RenderOutcome::NotReady).
#[derive(thiserror::Error, Debug)]
pub enum AcuityError {
    /// Invalid caller-provided values (negative blur, non-finite input, bad config ranges).
    #[error("validation error: {0}")]
    Validation(String),

    /// The source image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Internal failures while rendering a view.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AcuityError {
    /// Build an [`AcuityError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AcuityError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`AcuityError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build an [`AcuityError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
