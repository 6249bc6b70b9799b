use thiserror::Error;

/// Rejections raised when a request identifier, signature or configured limit is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text that an identifier, signature or protocol name may not take.
    #[error("invalid {field}: '{value}'")]
    PatternMismatch {
        /// What was being parsed (`Tournament`, `signature`, ...).
        field: &'static str,
        /// Rejected text.
        value: String,
    },
    /// A configured limit outside its usable range, such as zero choices.
    #[error("{field} must be at least 1, got {value}")]
    OutOfBounds {
        /// Name of the limit.
        field: &'static str,
        /// Rejected value.
        value: String,
    },
}
