use inboxintel_core::ValidationError;
use thiserror::Error;

/// Failure modes of report generation.
///
/// Both variants are caller contract violations; neither is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("no campaigns supplied; at least one is required")]
    EmptyInput,
}

impl EngineError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, reason))
    }
}
