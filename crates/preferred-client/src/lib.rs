//! Signed choose URLs for the Preferred Pictures decision service.
//!
//! This crate provides:
//! - [`ClientConfig`], the immutable identity, secret, limits and endpoint
//! - [`ChooseParams`], the per-request inputs
//! - [`ChooseClient`], which validates inputs, fills defaults, signs the
//!   canonical field string and serializes everything into a URL
//!
//! No network call is made. The returned URL is handed to whatever HTTP
//! client the caller uses.
//!
//! ## Quick Start
//!
//! ```rust
//! use preferred_client::{ChooseClient, ChooseParams, ClientConfig};
//!
//! let client = ChooseClient::new(ClientConfig::new("testing-identity", "secret123"));
//! let params = ChooseParams::new(["red", "green", "blue"], "testing")
//!     .choices_prefix("https://example.com/jacket-")
//!     .choices_suffix(".jpg")
//!     .ttl(600);
//!
//! let url = client.create_choose_url(&params)?;
//! assert!(url.as_str().starts_with("https://api.preferred-pictures.com/choose?"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Choose-URL construction.
pub mod choose;
/// Client configuration.
pub mod config;
/// Error types for configuration and URL construction.
pub mod errors;
/// Per-request parameters.
pub mod params;

pub use choose::{ChooseClient, SignedRequest};
pub use config::{ClientConfig, SecretKey};
pub use errors::{ChooseError, ConfigError, ErrorKind};
pub use params::ChooseParams;
