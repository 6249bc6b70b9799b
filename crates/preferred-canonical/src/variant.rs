use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fields::{FieldKind, SigningField};
use crate::validation::ValidationError;

const CURRENT_ORDER: &[SigningField] = &[
    SigningField::ChoicesPrefix,
    SigningField::ChoicesSuffix,
    SigningField::Choices,
    SigningField::DestinationsPrefix,
    SigningField::DestinationsSuffix,
    SigningField::Destinations,
    SigningField::Expiration,
    SigningField::Go,
    SigningField::Json,
    SigningField::Tournament,
    SigningField::Ttl,
    SigningField::Uid,
];

const LEGACY_ORDER: &[SigningField] = &[
    SigningField::Choices,
    SigningField::Expiration,
    SigningField::Prefix,
    SigningField::Suffix,
    SigningField::Tournament,
    SigningField::Ttl,
    SigningField::Uid,
];

/// Wire protocol a server expects.
///
/// The two variants are not interchangeable: each server verifies against its
/// own canonical form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVariant {
    /// Array-valued choices and destinations, separate prefix/suffix per list.
    #[default]
    Current,
    /// Comma-joined choices scalar with a single prefix/suffix pair.
    Legacy,
}

impl ProtocolVariant {
    /// Fixed canonical field order.
    pub fn field_order(self) -> &'static [SigningField] {
        match self {
            ProtocolVariant::Current => CURRENT_ORDER,
            ProtocolVariant::Legacy => LEGACY_ORDER,
        }
    }

    /// Whether the field belongs to this variant.
    pub fn knows(self, field: SigningField) -> bool {
        self.field_order().contains(&field)
    }

    /// Representation of the choices list.
    pub fn choices_kind(self) -> FieldKind {
        match self {
            ProtocolVariant::Current => FieldKind::StringArray,
            ProtocolVariant::Legacy => FieldKind::Scalar,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVariant::Current => "current",
            ProtocolVariant::Legacy => "legacy",
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVariant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current" => Ok(ProtocolVariant::Current),
            "legacy" => Ok(ProtocolVariant::Legacy),
            other => Err(ValidationError::PatternMismatch {
                field: "protocol variant",
                value: other.to_string(),
            }),
        }
    }
}

/// Which fields a signature covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Every present field is signed.
    #[default]
    Full,
    /// `uid`, `expiration`, `json` and `go` are left unsigned.
    Limited,
}

impl Scope {
    /// Maps the caller's limited-signature flag to a scope.
    pub fn from_limited(limited: bool) -> Self {
        if limited {
            Scope::Limited
        } else {
            Scope::Full
        }
    }

    /// Whether the field contributes to the signed content under this scope.
    pub fn includes(self, field: SigningField) -> bool {
        match self {
            Scope::Full => true,
            Scope::Limited => !field.is_limited_exempt(),
        }
    }
}
