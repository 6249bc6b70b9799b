use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::variant::ProtocolVariant;

/// Separator placed between array elements when an array is flattened for signing.
///
/// Elements are not escaped. A value that itself contains a comma makes the
/// canonical string ambiguous; servers expect exactly this form.
pub const ARRAY_SEPARATOR: &str = ",";

/// Identifier of a slot in the canonical signature.
///
/// Variants are declared in the current protocol's canonical order, followed by
/// the legacy-only names. Ordering of the enum is used for map iteration only;
/// signing order always comes from [`ProtocolVariant::field_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningField {
    /// String concatenated in front of every choice by the server.
    ChoicesPrefix,
    /// String appended to every choice by the server.
    ChoicesSuffix,
    /// The candidate options.
    Choices,
    /// String concatenated in front of every destination by the server.
    DestinationsPrefix,
    /// String appended to every destination by the server.
    DestinationsSuffix,
    /// Destinations paired positionally with choices.
    Destinations,
    /// Unix timestamp (seconds) after which the request is rejected.
    Expiration,
    /// Redirect to the previously chosen destination.
    Go,
    /// Respond with JSON instead of a redirect.
    Json,
    /// Grouping under which choices are evaluated.
    Tournament,
    /// Seconds the server may cache its decision.
    Ttl,
    /// Correlation id linking this choice to a later action.
    Uid,
    /// Legacy name for the choices prefix.
    Prefix,
    /// Legacy name for the choices suffix.
    Suffix,
}

/// Representation of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A single string.
    Scalar,
    /// An ordered list of strings.
    StringArray,
}

impl SigningField {
    /// Query-string key for this field under the given protocol variant.
    pub fn name(self, variant: ProtocolVariant) -> &'static str {
        match self {
            SigningField::ChoicesPrefix => "choices_prefix",
            SigningField::ChoicesSuffix => "choices_suffix",
            SigningField::Choices => match variant {
                ProtocolVariant::Current => "choices[]",
                ProtocolVariant::Legacy => "choices",
            },
            SigningField::DestinationsPrefix => "destinations_prefix",
            SigningField::DestinationsSuffix => "destinations_suffix",
            SigningField::Destinations => "destinations[]",
            SigningField::Expiration => "expiration",
            SigningField::Go => "go",
            SigningField::Json => "json",
            SigningField::Tournament => "tournament",
            SigningField::Ttl => "ttl",
            SigningField::Uid => "uid",
            SigningField::Prefix => "prefix",
            SigningField::Suffix => "suffix",
        }
    }

    /// Expected value shape under the given protocol variant.
    pub fn kind(self, variant: ProtocolVariant) -> FieldKind {
        match self {
            SigningField::Choices => variant.choices_kind(),
            SigningField::Destinations => FieldKind::StringArray,
            _ => FieldKind::Scalar,
        }
    }

    /// Whether every request must carry this field.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            SigningField::Choices
                | SigningField::Expiration
                | SigningField::Tournament
                | SigningField::Uid
        )
    }

    /// Whether a limited signature leaves this field out of the signed content.
    pub fn is_limited_exempt(self) -> bool {
        matches!(
            self,
            SigningField::Uid | SigningField::Expiration | SigningField::Json | SigningField::Go
        )
    }
}

impl fmt::Display for SigningField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SigningField::ChoicesPrefix => "choices_prefix",
            SigningField::ChoicesSuffix => "choices_suffix",
            SigningField::Choices => "choices",
            SigningField::DestinationsPrefix => "destinations_prefix",
            SigningField::DestinationsSuffix => "destinations_suffix",
            SigningField::Destinations => "destinations",
            SigningField::Expiration => "expiration",
            SigningField::Go => "go",
            SigningField::Json => "json",
            SigningField::Tournament => "tournament",
            SigningField::Ttl => "ttl",
            SigningField::Uid => "uid",
            SigningField::Prefix => "prefix",
            SigningField::Suffix => "suffix",
        };
        f.write_str(name)
    }
}

/// Value stored for a present field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single string value.
    Scalar(String),
    /// Ordered list of strings.
    Array(Vec<String>),
}

impl FieldValue {
    /// Shape of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Scalar(_) => FieldKind::Scalar,
            FieldValue::Array(_) => FieldKind::StringArray,
        }
    }

    /// Flattens the value into its signing form.
    pub fn flatten(&self) -> String {
        match self {
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::Array(items) => items.join(ARRAY_SEPARATOR),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::Array(value)
    }
}

/// Sparse, typed map of signing fields.
///
/// A field is either present with a value or absent. There is no empty
/// placeholder: absent fields never reach the canonical string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: BTreeMap<SigningField, FieldValue>,
}

impl FieldMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    ///
    /// An empty array leaves the field absent, matching the query string,
    /// which carries no pair for it.
    pub fn set(&mut self, field: SigningField, value: impl Into<FieldValue>) -> &mut Self {
        match value.into() {
            FieldValue::Array(items) if items.is_empty() => {
                self.entries.remove(&field);
            }
            value => {
                self.entries.insert(field, value);
            }
        }
        self
    }

    /// Sets a field when a value is supplied; leaves it absent otherwise.
    pub fn set_opt<V: Into<FieldValue>>(
        &mut self,
        field: SigningField,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.set(field, value);
        }
        self
    }

    /// Sets a boolean flag.
    ///
    /// A true flag is stored as the literal `"true"`; a false or missing flag
    /// leaves the field absent. `"false"` is never encoded.
    pub fn set_flag(&mut self, field: SigningField, flag: Option<bool>) -> &mut Self {
        if flag == Some(true) {
            self.set(field, "true");
        }
        self
    }

    /// Removes a field, returning its previous value.
    pub fn remove(&mut self, field: SigningField) -> Option<FieldValue> {
        self.entries.remove(&field)
    }

    /// Returns the value of a field if present.
    pub fn get(&self, field: SigningField) -> Option<&FieldValue> {
        self.entries.get(&field)
    }

    /// Whether the field is present.
    pub fn contains(&self, field: SigningField) -> bool {
        self.entries.contains_key(&field)
    }

    /// Iterates over present fields in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (SigningField, &FieldValue)> {
        self.entries.iter().map(|(field, value)| (*field, value))
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_flag_is_absent() {
        let mut map = FieldMap::new();
        map.set_flag(SigningField::Json, Some(false));
        map.set_flag(SigningField::Go, None);
        assert!(map.is_empty());

        map.set_flag(SigningField::Go, Some(true));
        assert_eq!(
            map.get(SigningField::Go),
            Some(&FieldValue::Scalar("true".into()))
        );
    }

    #[test]
    fn empty_array_is_absent() {
        let mut map = FieldMap::new();
        map.set(SigningField::Destinations, vec!["x".to_string()]);
        map.set(SigningField::Destinations, Vec::<String>::new());
        map.set_opt(SigningField::Choices, Some(Vec::<String>::new()));
        assert!(!map.contains(SigningField::Destinations));
        assert!(map.is_empty());
    }

    #[test]
    fn array_flatten_does_not_escape_commas() {
        let value = FieldValue::Array(vec!["a,b".into(), "c".into()]);
        assert_eq!(value.flatten(), "a,b,c");
    }

    #[test]
    fn choices_name_depends_on_variant() {
        assert_eq!(SigningField::Choices.name(ProtocolVariant::Current), "choices[]");
        assert_eq!(SigningField::Choices.name(ProtocolVariant::Legacy), "choices");
        assert_eq!(
            SigningField::Choices.kind(ProtocolVariant::Legacy),
            FieldKind::Scalar
        );
    }
}
