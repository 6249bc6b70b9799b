//! Output formatting utilities.

use preferred_client::SignedRequest;
use serde_json::{json, Value};

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// JSON view of a signed request.
pub fn signed_request_json(signed: &SignedRequest) -> Value {
    json!({
        "url": signed.url.as_str(),
        "uid": signed.uid.as_str(),
        "expiration": signed.expiration,
        "signature": signed.signature.as_str(),
        "scope": signed.scope,
    })
}
