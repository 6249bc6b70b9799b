//! Arguments shared by the request-building commands.

use chrono::{DateTime, Utc};
use clap::Args;
use preferred_canonical::{ProtocolVariant, Tournament, Uid};
use preferred_client::{ChooseParams, ClientConfig};

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Account identity
    #[arg(long, env = "PREFERRED_IDENTITY")]
    pub identity: String,
    /// Signing secret
    #[arg(long, env = "PREFERRED_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,
    /// Service base URL (default: production)
    #[arg(long, env = "PREFERRED_ENDPOINT")]
    pub endpoint: Option<String>,
    /// Maximum number of choices per request (default: 35)
    #[arg(long, env = "PREFERRED_MAX_CHOICES")]
    pub max_choices: Option<usize>,
    /// Protocol variant: current or legacy
    #[arg(long, env = "PREFERRED_PROTOCOL", default_value = "current")]
    pub protocol: String,
}

impl ClientArgs {
    pub fn into_config(self) -> Result<ClientConfig, Box<dyn std::error::Error>> {
        let variant: ProtocolVariant = self
            .protocol
            .parse()
            .map_err(|e| format!("Invalid protocol: {}", e))?;
        let mut config = ClientConfig::new(self.identity, self.secret_key).with_variant(variant);
        if let Some(endpoint) = self.endpoint {
            config = config.with_endpoint(&endpoint)?;
        }
        if let Some(max) = self.max_choices {
            config = config.with_max_choices(max)?;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Tournament name
    #[arg(long)]
    pub tournament: String,
    /// Candidate option (repeat for each choice)
    #[arg(long = "choice")]
    pub choices: Vec<String>,
    /// Prefix the server prepends to each choice
    #[arg(long)]
    pub choices_prefix: Option<String>,
    /// Suffix the server appends to each choice
    #[arg(long)]
    pub choices_suffix: Option<String>,
    /// Destination paired with the choice at the same position (repeatable)
    #[arg(long = "destination")]
    pub destinations: Vec<String>,
    /// Prefix the server prepends to each destination
    #[arg(long)]
    pub destinations_prefix: Option<String>,
    /// Suffix the server appends to each destination
    #[arg(long)]
    pub destinations_suffix: Option<String>,
    /// Seconds the server may cache its decision
    #[arg(long)]
    pub ttl: Option<u64>,
    /// Seconds until the request expires (default: 3600)
    #[arg(long)]
    pub expiration_ttl: Option<u64>,
    /// Ask the service for a JSON response instead of a redirect
    #[arg(long)]
    pub json_response: bool,
    /// Redirect to the previously chosen destination
    #[arg(long)]
    pub go: bool,
    /// Correlation id (default: random UUIDv4)
    #[arg(long)]
    pub uid: Option<String>,
    /// Sign only the fields that stay stable across calls
    #[arg(long)]
    pub limited: bool,
    /// Sign as of this RFC 3339 instant instead of now
    #[arg(long)]
    pub at: Option<String>,
}

impl RequestArgs {
    pub fn now(&self) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
        match &self.at {
            Some(at) => Ok(DateTime::parse_from_rfc3339(at)
                .map_err(|e| format!("Invalid --at timestamp {}: {}", at, e))?
                .with_timezone(&Utc)),
            None => Ok(Utc::now()),
        }
    }

    pub fn into_params(self) -> Result<ChooseParams, Box<dyn std::error::Error>> {
        let tournament = Tournament::parse(self.tournament)
            .map_err(|e| format!("Invalid tournament: {}", e))?;
        let uid = self
            .uid
            .map(Uid::parse)
            .transpose()
            .map_err(|e| format!("Invalid uid: {}", e))?;
        Ok(ChooseParams {
            choices: self.choices,
            choices_prefix: self.choices_prefix,
            choices_suffix: self.choices_suffix,
            destinations: (!self.destinations.is_empty()).then_some(self.destinations),
            destinations_prefix: self.destinations_prefix,
            destinations_suffix: self.destinations_suffix,
            tournament,
            ttl: self.ttl,
            expiration_ttl: self.expiration_ttl,
            json: self.json_response.then_some(true),
            go: self.go.then_some(true),
            uid,
            limited_signature: self.limited,
        })
    }
}
