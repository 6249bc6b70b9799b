use thiserror::Error;

/// Broad category of a [`ChooseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller's parameters contradict each other.
    Configuration,
    /// The caller's choice list is out of bounds.
    Validation,
    /// The client produced an inconsistent request; a bug rather than bad input.
    Internal,
}

/// Errors raised while building a choose URL. No URL is produced.
#[derive(Error, Debug)]
pub enum ChooseError {
    /// TTL is longer than the expiration horizon.
    #[error("ttl ({ttl}s) must not exceed expiration horizon ({expiration_ttl}s)")]
    TtlExceedsExpiration {
        /// Requested TTL in seconds.
        ttl: u64,
        /// Expiration horizon in seconds.
        expiration_ttl: u64,
    },
    /// The choice list is empty.
    #[error("no choices supplied")]
    NoChoices,
    /// The choice list is longer than the configured maximum.
    #[error("too many choices supplied: {count} exceeds the maximum of {max}")]
    TooManyChoices {
        /// Number of choices supplied.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The assembled fields could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] preferred_canonical::CanonicalizationError),
}

impl ChooseError {
    /// Category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChooseError::TtlExceedsExpiration { .. } => ErrorKind::Configuration,
            ChooseError::NoChoices | ChooseError::TooManyChoices { .. } => ErrorKind::Validation,
            ChooseError::Canonicalization(_) => ErrorKind::Internal,
        }
    }
}

/// Errors raised while constructing a [`ClientConfig`](crate::ClientConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The endpoint is not an absolute URL.
    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        /// Endpoint as supplied.
        endpoint: String,
        /// Parse failure.
        source: url::ParseError,
    },
    /// The endpoint cannot carry a path (e.g. `mailto:`).
    #[error("endpoint '{0}' cannot be a base URL")]
    EndpointNotBase(String),
    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),
    /// An environment variable could not be parsed.
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVariable {
        /// Variable name.
        name: &'static str,
        /// Parse failure.
        reason: String,
    },
    /// A configured value is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Validation(#[from] preferred_canonical::ValidationError),
}
