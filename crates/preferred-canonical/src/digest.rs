use hmac::{Hmac, Mac};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::sync::OnceLock;

use crate::canonicalizer::CanonicalString;
use crate::validation::ValidationError;

type HmacSha256 = Hmac<Sha256>;

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256 (the only algorithm the service accepts).
    #[default]
    #[serde(rename = "sha256")]
    HmacSha256,
}

impl SigningAlgorithm {
    /// Signs a canonical string keyed by `secret`.
    pub fn sign(self, secret: &[u8], message: &CanonicalString) -> Signature {
        match self {
            SigningAlgorithm::HmacSha256 => {
                let mut mac = keyed_mac(secret);
                mac.update(message.as_bytes());
                Signature(hex::encode(mac.finalize().into_bytes()))
            }
        }
    }

    /// Checks a signature in constant time.
    ///
    /// Returns `false` for malformed hex as well as for a wrong digest.
    pub fn verify(self, secret: &[u8], message: &CanonicalString, claimed: &Signature) -> bool {
        match self {
            SigningAlgorithm::HmacSha256 => {
                let Ok(bytes) = hex::decode(claimed.as_str()) else {
                    return false;
                };
                let mut mac = keyed_mac(secret);
                mac.update(message.as_bytes());
                mac.verify_slice(&bytes).is_ok()
            }
        }
    }
}

/// Lowercase hex HMAC-SHA256 digest of a canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

fn signature_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9a-f]{64}$").expect("invalid regex"))
}

impl Signature {
    /// Parses a validated signature (64 lowercase hex characters).
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !signature_pattern().is_match(&s) {
            return Err(ValidationError::PatternMismatch {
                field: "signature",
                value: s,
            });
        }
        Ok(Self(s))
    }

    /// Hex text of the signature.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn keyed_mac(secret: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size")
}

/// Signs a canonical string with the default algorithm (HMAC-SHA256).
pub fn sign(secret: &[u8], message: &CanonicalString) -> Signature {
    SigningAlgorithm::default().sign(secret, message)
}

/// Checks a signature with the default algorithm.
pub fn verify(secret: &[u8], message: &CanonicalString, claimed: &Signature) -> bool {
    SigningAlgorithm::default().verify(secret, message, claimed)
}
