//! Canonical signing primitives for Preferred Pictures choose requests.
//!
//! A choose request is signed by flattening its fields into one string in a
//! fixed order and computing HMAC-SHA256 over it. Client and server must agree
//! on that string byte for byte, so every rule that affects it lives in this
//! crate: field identifiers, both protocol variants, signature scope, and the
//! digest itself.
//!
#![deny(missing_docs)]

/// Canonical string construction.
pub mod canonicalizer;
/// HMAC signing and signature type.
pub mod digest;
/// Signing field identifiers, values, and the sparse field map.
pub mod fields;
/// Identifier newtypes.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;
/// Protocol variants and signature scope.
pub mod variant;

pub use canonicalizer::{CanonicalString, CanonicalizationError, Canonicalizer};
pub use digest::{sign, verify, Signature, SigningAlgorithm};
pub use fields::{FieldKind, FieldMap, FieldValue, SigningField};
pub use identifiers::{Identity, Tournament, Uid};
pub use validation::ValidationError;
pub use variant::{ProtocolVariant, Scope};
