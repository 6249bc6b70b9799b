use crate::fields::{FieldKind, FieldMap, SigningField};
use crate::variant::{ProtocolVariant, Scope};
use std::fmt;

/// Separator placed between field values in the canonical string.
pub const FIELD_SEPARATOR: &str = "/";

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// A field every request must carry is absent.
    #[error("required field {0} is missing")]
    MissingRequiredField(SigningField),
    /// The map holds a field the active protocol variant does not sign.
    #[error("field {field} is not part of the {variant} protocol")]
    UnknownField {
        /// Offending field.
        field: SigningField,
        /// Variant the map was canonicalized under.
        variant: ProtocolVariant,
    },
    /// A value's shape disagrees with the field kind.
    #[error("field {field} expects a {expected:?} value, got {actual:?}")]
    KindMismatch {
        /// Offending field.
        field: SigningField,
        /// Kind declared by the variant.
        expected: FieldKind,
        /// Kind that was supplied.
        actual: FieldKind,
    },
}

/// Canonical HMAC message and the fields that contributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalString {
    /// `/`-joined field values in canonical order.
    pub text: String,
    /// Fields that contributed, in traversal order.
    pub signed_fields: Vec<SigningField>,
}

impl CanonicalString {
    /// Message bytes for the MAC.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

impl fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Canonicalizer that emits deterministic signing input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonicalizer {
    variant: ProtocolVariant,
}

impl Canonicalizer {
    /// Creates a new canonicalizer for the provided protocol variant.
    pub fn new(variant: ProtocolVariant) -> Self {
        Self { variant }
    }

    /// Protocol variant this canonicalizer encodes.
    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// Produces the canonical string for `fields` under `scope`.
    ///
    /// Fields are visited in the variant's fixed order. Absent fields and
    /// fields outside the scope are skipped without leaving a placeholder.
    /// Array values are joined with `,` and not escaped.
    pub fn canonicalize(
        &self,
        fields: &FieldMap,
        scope: Scope,
    ) -> Result<CanonicalString, CanonicalizationError> {
        self.validate(fields)?;

        let order = self.variant.field_order();
        let mut parts = Vec::with_capacity(order.len());
        let mut signed_fields = Vec::with_capacity(order.len());
        for &field in order {
            if !scope.includes(field) {
                continue;
            }
            if let Some(value) = fields.get(field) {
                parts.push(value.flatten());
                signed_fields.push(field);
            }
        }

        Ok(CanonicalString {
            text: parts.join(FIELD_SEPARATOR),
            signed_fields,
        })
    }

    /// Checks presence of required fields and the shape of every value.
    fn validate(&self, fields: &FieldMap) -> Result<(), CanonicalizationError> {
        // Required fields are checked even when the scope leaves them unsigned.
        for &field in self.variant.field_order() {
            if field.is_required() && !fields.contains(field) {
                return Err(CanonicalizationError::MissingRequiredField(field));
            }
        }

        for (field, value) in fields.iter() {
            if !self.variant.knows(field) {
                return Err(CanonicalizationError::UnknownField {
                    field,
                    variant: self.variant,
                });
            }
            let expected = field.kind(self.variant);
            if value.kind() != expected {
                return Err(CanonicalizationError::KindMismatch {
                    field,
                    expected,
                    actual: value.kind(),
                });
            }
        }
        Ok(())
    }
}
