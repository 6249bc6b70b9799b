//! Choose-URL construction: validate, default, sign, serialize.

use chrono::{DateTime, Utc};
use preferred_canonical::{
    Canonicalizer, FieldMap, FieldValue, ProtocolVariant, Scope, Signature, SigningField, Uid,
};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::config::{ClientConfig, DEFAULT_EXPIRATION_TTL};
use crate::errors::ChooseError;
use crate::params::ChooseParams;

/// Query key carrying the account identity.
pub const IDENTITY_PARAM: &str = "identity";
/// Query key carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";
/// Query key flagging a limited signature.
pub const LIMITED_SIGNATURE_PARAM: &str = "limited_signature";

/// A signed choose request and the values a caller may need to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Complete choose URL.
    pub url: Url,
    /// Signature carried in the URL.
    pub signature: Signature,
    /// Correlation id carried in the URL.
    pub uid: Uid,
    /// Unix timestamp (seconds) at which the request expires.
    pub expiration: i64,
    /// Scope the signature was computed under.
    pub scope: Scope,
}

struct Assembled {
    fields: FieldMap,
    unsigned: FieldMap,
    scope: Scope,
    uid: Uid,
    expiration: i64,
}

/// Builds signed choose URLs for one account.
#[derive(Debug, Clone)]
pub struct ChooseClient {
    config: ClientConfig,
    canonicalizer: Canonicalizer,
}

impl ChooseClient {
    /// Creates a client over the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        let canonicalizer = Canonicalizer::new(config.variant());
        Self {
            config,
            canonicalizer,
        }
    }

    /// Configuration this client signs with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds a signed choose URL using the wall clock.
    pub fn create_choose_url(&self, params: &ChooseParams) -> Result<Url, ChooseError> {
        Ok(self.sign_choose(params, Utc::now())?.url)
    }

    /// Builds a signed choose URL as of `now`.
    pub fn create_choose_url_at(
        &self,
        params: &ChooseParams,
        now: DateTime<Utc>,
    ) -> Result<Url, ChooseError> {
        Ok(self.sign_choose(params, now)?.url)
    }

    /// Builds the canonical field map for a request without signing it.
    ///
    /// Returns the fields and the scope a signature would cover.
    pub fn assemble(
        &self,
        params: &ChooseParams,
        now: DateTime<Utc>,
    ) -> Result<(FieldMap, Scope), ChooseError> {
        let assembled = self.assemble_request(params, now)?;
        Ok((assembled.fields, assembled.scope))
    }

    fn assemble_request(
        &self,
        params: &ChooseParams,
        now: DateTime<Utc>,
    ) -> Result<Assembled, ChooseError> {
        let horizon = params.expiration_ttl.unwrap_or(DEFAULT_EXPIRATION_TTL);
        if let Some(ttl) = params.ttl {
            if ttl > horizon {
                return Err(ChooseError::TtlExceedsExpiration {
                    ttl,
                    expiration_ttl: horizon,
                });
            }
        }
        if params.choices.is_empty() {
            return Err(ChooseError::NoChoices);
        }
        if params.choices.len() > self.config.max_choices() {
            return Err(ChooseError::TooManyChoices {
                count: params.choices.len(),
                max: self.config.max_choices(),
            });
        }

        let uid = params
            .uid
            .clone()
            .unwrap_or_else(|| Uid::new(Uuid::new_v4().to_string()));
        let expiration = expiration_at(now, horizon);

        let mut fields = FieldMap::new();
        let mut unsigned = FieldMap::new();
        fields
            .set(SigningField::Expiration, expiration.to_string())
            .set(SigningField::Tournament, params.tournament.as_str())
            .set(SigningField::Uid, uid.as_str())
            .set_opt(SigningField::Ttl, params.ttl.map(|ttl| ttl.to_string()));

        match self.config.variant() {
            ProtocolVariant::Current => {
                fields
                    .set(SigningField::Choices, params.choices.clone())
                    .set_opt(SigningField::ChoicesPrefix, params.choices_prefix.clone())
                    .set_opt(SigningField::ChoicesSuffix, params.choices_suffix.clone())
                    .set_opt(SigningField::Destinations, params.destinations.clone())
                    .set_opt(
                        SigningField::DestinationsPrefix,
                        params.destinations_prefix.clone(),
                    )
                    .set_opt(
                        SigningField::DestinationsSuffix,
                        params.destinations_suffix.clone(),
                    )
                    .set_flag(SigningField::Go, params.go)
                    .set_flag(SigningField::Json, params.json);
            }
            ProtocolVariant::Legacy => {
                fields
                    .set(
                        SigningField::Choices,
                        FieldValue::Array(params.choices.clone()).flatten(),
                    )
                    .set_opt(SigningField::Prefix, params.choices_prefix.clone())
                    .set_opt(SigningField::Suffix, params.choices_suffix.clone());
                // No legacy slot signs these; they still travel in the query.
                unsigned
                    .set_opt(SigningField::Destinations, params.destinations.clone())
                    .set_opt(
                        SigningField::DestinationsPrefix,
                        params.destinations_prefix.clone(),
                    )
                    .set_opt(
                        SigningField::DestinationsSuffix,
                        params.destinations_suffix.clone(),
                    )
                    .set_flag(SigningField::Go, params.go)
                    .set_flag(SigningField::Json, params.json);
                if !unsigned.is_empty() {
                    debug!(
                        unsigned_fields = unsigned.len(),
                        "legacy protocol sends destinations, go and json unsigned"
                    );
                }
            }
        }

        Ok(Assembled {
            fields,
            unsigned,
            scope: Scope::from_limited(params.limited_signature),
            uid,
            expiration,
        })
    }

    /// Validates, signs, and serializes one choose request as of `now`.
    pub fn sign_choose(
        &self,
        params: &ChooseParams,
        now: DateTime<Utc>,
    ) -> Result<SignedRequest, ChooseError> {
        let Assembled {
            fields,
            unsigned,
            scope,
            uid,
            expiration,
        } = self.assemble_request(params, now)?;
        let canonical = self.canonicalizer.canonicalize(&fields, scope)?;
        let signature = self
            .config
            .algorithm()
            .sign(self.config.secret_key().expose(), &canonical);
        let url = self.serialize(&fields, &unsigned, scope, &signature);

        debug!(
            variant = %self.config.variant(),
            ?scope,
            uid = %uid,
            expiration,
            signed_fields = canonical.signed_fields.len(),
            choices = params.choices.len(),
            "signed choose request"
        );

        Ok(SignedRequest {
            url,
            signature,
            uid,
            expiration,
            scope,
        })
    }

    /// Writes signed fields, then unsigned extras, then identity and signature, into the query.
    fn serialize(
        &self,
        fields: &FieldMap,
        unsigned: &FieldMap,
        scope: Scope,
        signature: &Signature,
    ) -> Url {
        let variant = self.config.variant();
        let mut url = self.config.choose_url().clone();
        {
            let mut query = url.query_pairs_mut();
            let mut append = |field: SigningField, value: &FieldValue| match value {
                FieldValue::Scalar(value) => {
                    query.append_pair(field.name(variant), value);
                }
                FieldValue::Array(items) => {
                    for item in items {
                        query.append_pair(field.name(variant), item);
                    }
                }
            };
            for &field in variant.field_order() {
                if let Some(value) = fields.get(field) {
                    append(field, value);
                }
            }
            for &field in ProtocolVariant::Current.field_order() {
                if let Some(value) = unsigned.get(field) {
                    append(field, value);
                }
            }
            if scope == Scope::Limited {
                query.append_pair(LIMITED_SIGNATURE_PARAM, "true");
            }
            query.append_pair(IDENTITY_PARAM, self.config.identity().as_str());
            query.append_pair(SIGNATURE_PARAM, signature.as_str());
        }
        url
    }
}

/// `ceil(now)` in Unix seconds plus the horizon.
fn expiration_at(now: DateTime<Utc>, horizon: u64) -> i64 {
    let mut seconds = now.timestamp();
    if now.timestamp_subsec_nanos() > 0 {
        seconds += 1;
    }
    seconds.saturating_add(i64::try_from(horizon).unwrap_or(i64::MAX))
}
