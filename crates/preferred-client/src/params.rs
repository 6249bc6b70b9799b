use preferred_canonical::{Tournament, Uid};
use serde::{Deserialize, Serialize};

/// Caller inputs for one choose request.
///
/// Only `choices` and `tournament` are required. Every other field is sent
/// only when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseParams {
    /// Candidate options, in order.
    pub choices: Vec<String>,
    /// Prepended to each choice by the server.
    pub choices_prefix: Option<String>,
    /// Appended to each choice by the server.
    pub choices_suffix: Option<String>,
    /// Destinations paired positionally with choices.
    pub destinations: Option<Vec<String>>,
    /// Prepended to each destination by the server.
    pub destinations_prefix: Option<String>,
    /// Appended to each destination by the server.
    pub destinations_suffix: Option<String>,
    /// Grouping under which choices are evaluated.
    pub tournament: Tournament,
    /// Seconds the server may cache its decision.
    pub ttl: Option<u64>,
    /// Seconds from now until the request expires.
    pub expiration_ttl: Option<u64>,
    /// Ask for a JSON response instead of a redirect.
    pub json: Option<bool>,
    /// Ask for a redirect to the previously chosen destination.
    pub go: Option<bool>,
    /// Correlation id; generated when absent.
    pub uid: Option<Uid>,
    /// Sign only the fields that stay stable across calls.
    pub limited_signature: bool,
}

impl ChooseParams {
    /// Creates parameters with the required fields only.
    pub fn new<I, S>(choices: I, tournament: impl Into<Tournament>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            choices_prefix: None,
            choices_suffix: None,
            destinations: None,
            destinations_prefix: None,
            destinations_suffix: None,
            tournament: tournament.into(),
            ttl: None,
            expiration_ttl: None,
            json: None,
            go: None,
            uid: None,
            limited_signature: false,
        }
    }

    /// Sets the choices prefix.
    pub fn choices_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.choices_prefix = Some(prefix.into());
        self
    }

    /// Sets the choices suffix.
    pub fn choices_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.choices_suffix = Some(suffix.into());
        self
    }

    /// Sets the destinations list.
    pub fn destinations<I, S>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.destinations = Some(destinations.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the destinations prefix.
    pub fn destinations_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.destinations_prefix = Some(prefix.into());
        self
    }

    /// Sets the destinations suffix.
    pub fn destinations_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.destinations_suffix = Some(suffix.into());
        self
    }

    /// Sets the decision cache TTL in seconds.
    pub fn ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the expiration horizon in seconds.
    pub fn expiration_ttl(mut self, expiration_ttl: u64) -> Self {
        self.expiration_ttl = Some(expiration_ttl);
        self
    }

    /// Requests a JSON response.
    pub fn json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    /// Requests a redirect to the previously chosen destination.
    pub fn go(mut self, go: bool) -> Self {
        self.go = Some(go);
        self
    }

    /// Uses a caller-supplied correlation id.
    pub fn uid(mut self, uid: impl Into<Uid>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Narrows the signed field set.
    pub fn limited_signature(mut self, limited: bool) -> Self {
        self.limited_signature = limited;
        self
    }
}
