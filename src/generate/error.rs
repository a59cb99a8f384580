use crate::ai::LlmError;

/// Failure of one model's AI generation attempt. Never escapes the
/// generator; it selects the local synthetic path instead.
#[derive(thiserror::Error, Debug)]
pub enum ModelGenerationError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("invalid output: {0}")]
    InvalidOutput(String),
    #[error("expected {expected} records, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
    #[error("field {field} does not match its declared type ({expected})")]
    FieldMismatch { field: String, expected: String },
}

/// Run-level failure, raised before any model is generated.
#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("model name must not be empty")]
    EmptyModelName,
    #[error("duplicate model name: {0}")]
    DuplicateModel(String),
}
