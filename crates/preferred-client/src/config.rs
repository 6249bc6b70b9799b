//! Immutable client configuration.

use preferred_canonical::{Identity, ProtocolVariant, SigningAlgorithm, ValidationError};
use std::fmt;
use url::Url;

use crate::errors::ConfigError;

/// Production service base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.preferred-pictures.com";
/// Default upper bound on the number of choices per request.
pub const DEFAULT_MAX_CHOICES: usize = 35;
/// Default expiration horizon in seconds.
pub const DEFAULT_EXPIRATION_TTL: u64 = 3600;
/// Path segment of the choose operation.
pub const CHOOSE_PATH: &str = "choose";

/// Environment variable holding the account identity.
pub const ENV_IDENTITY: &str = "PREFERRED_IDENTITY";
/// Environment variable holding the signing secret.
pub const ENV_SECRET_KEY: &str = "PREFERRED_SECRET_KEY";
/// Environment variable overriding the endpoint.
pub const ENV_ENDPOINT: &str = "PREFERRED_ENDPOINT";
/// Environment variable overriding the maximum number of choices.
pub const ENV_MAX_CHOICES: &str = "PREFERRED_MAX_CHOICES";
/// Environment variable selecting the protocol variant.
pub const ENV_PROTOCOL: &str = "PREFERRED_PROTOCOL";

/// HMAC signing key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wraps raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Per-client settings, fixed at construction.
///
/// Cloning is cheap enough for per-thread copies, and a shared reference is
/// safe across threads since no operation mutates it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    identity: Identity,
    secret_key: SecretKey,
    max_choices: usize,
    endpoint: Url,
    choose_url: Url,
    variant: ProtocolVariant,
    algorithm: SigningAlgorithm,
}

impl ClientConfig {
    /// Creates a configuration with the production endpoint and default limits.
    pub fn new(identity: impl Into<Identity>, secret_key: impl Into<SecretKey>) -> Self {
        let endpoint = Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL");
        let choose_url = choose_url_for(&endpoint).expect("default endpoint can be a base");
        Self {
            identity: identity.into(),
            secret_key: secret_key.into(),
            max_choices: DEFAULT_MAX_CHOICES,
            endpoint,
            choose_url,
            variant: ProtocolVariant::default(),
            algorithm: SigningAlgorithm::default(),
        }
    }

    /// Replaces the service base URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        self.choose_url = choose_url_for(&parsed)?;
        self.endpoint = parsed;
        Ok(self)
    }

    /// Replaces the maximum number of choices per request. Zero is rejected.
    pub fn with_max_choices(mut self, max_choices: usize) -> Result<Self, ConfigError> {
        if max_choices == 0 {
            return Err(ValidationError::OutOfBounds {
                field: "max_choices",
                value: max_choices.to_string(),
            }
            .into());
        }
        self.max_choices = max_choices;
        Ok(self)
    }

    /// Selects the protocol variant the server expects.
    pub fn with_variant(mut self, variant: ProtocolVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Selects the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Builds a configuration from `PREFERRED_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let identity = lookup(ENV_IDENTITY).ok_or(ConfigError::MissingVariable(ENV_IDENTITY))?;
        let secret = lookup(ENV_SECRET_KEY).ok_or(ConfigError::MissingVariable(ENV_SECRET_KEY))?;
        let mut config = Self::new(Identity::parse(identity)?, secret);

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            config = config.with_endpoint(&endpoint)?;
        }
        if let Some(max) = lookup(ENV_MAX_CHOICES) {
            let max = max
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidVariable {
                    name: ENV_MAX_CHOICES,
                    reason: e.to_string(),
                })?;
            config = config.with_max_choices(max)?;
        }
        if let Some(protocol) = lookup(ENV_PROTOCOL) {
            let variant = protocol
                .trim()
                .parse::<ProtocolVariant>()
                .map_err(|e| ConfigError::InvalidVariable {
                    name: ENV_PROTOCOL,
                    reason: e.to_string(),
                })?;
            config = config.with_variant(variant);
        }
        Ok(config)
    }

    /// Account identifier.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Signing key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Maximum number of choices per request.
    pub fn max_choices(&self) -> usize {
        self.max_choices
    }

    /// Service base URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Base URL of the choose operation, without query.
    pub fn choose_url(&self) -> &Url {
        &self.choose_url
    }

    /// Protocol variant.
    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// Signing algorithm.
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }
}

fn choose_url_for(endpoint: &Url) -> Result<Url, ConfigError> {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ConfigError::EndpointNotBase(endpoint.to_string()))?
        .pop_if_empty()
        .push(CHOOSE_PATH);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_choose_url() {
        let config = ClientConfig::new("acct", "secret");
        assert_eq!(
            config.choose_url().as_str(),
            "https://api.preferred-pictures.com/choose"
        );
        assert_eq!(config.endpoint().as_str(), "https://api.preferred-pictures.com/");
        assert_eq!(config.max_choices(), DEFAULT_MAX_CHOICES);
        assert_eq!(config.algorithm(), SigningAlgorithm::HmacSha256);
        assert_eq!(
            config.with_algorithm(SigningAlgorithm::HmacSha256).algorithm(),
            SigningAlgorithm::HmacSha256
        );
    }

    #[test]
    fn endpoint_with_path_keeps_prefix() {
        let config = ClientConfig::new("acct", "secret")
            .with_endpoint("http://localhost:8080/v1/")
            .unwrap();
        assert_eq!(config.choose_url().as_str(), "http://localhost:8080/v1/choose");
    }

    #[test]
    fn rejects_relative_endpoint_and_zero_max() {
        assert!(matches!(
            ClientConfig::new("acct", "secret").with_endpoint("not a url"),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
        assert!(ClientConfig::new("acct", "secret").with_max_choices(0).is_err());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = ClientConfig::new("acct", "hunter2-secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2-secret"));
        assert!(printed.contains("REDACTED"));
        assert_eq!(config.secret_key().to_string(), "[REDACTED]");
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_IDENTITY, "acct"),
            (ENV_SECRET_KEY, "secret"),
            (ENV_MAX_CHOICES, "5"),
            (ENV_PROTOCOL, "legacy"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.max_choices(), 5);
        assert_eq!(config.variant(), ProtocolVariant::Legacy);
    }

    #[test]
    fn from_lookup_requires_secret() {
        let err = ClientConfig::from_lookup(|k| (k == ENV_IDENTITY).then(|| "acct".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVariable(ENV_SECRET_KEY)));
    }
}
