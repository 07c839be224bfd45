use thiserror::Error;

/// Raised only when strict validation is enabled or a request is unusable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("field {field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{0} is required")]
    Required(&'static str),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history write failed: {0}")]
    WriteFailed(String),
}
