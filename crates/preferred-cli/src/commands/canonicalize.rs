//! Canonicalize command implementation.

use preferred_canonical::Canonicalizer;
use preferred_client::ChooseClient;

use crate::args::{ClientArgs, RequestArgs};

pub fn run(client: ClientArgs, request: RequestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = ChooseClient::new(client.into_config()?);
    let canonicalizer = Canonicalizer::new(client.config().variant());
    let now = request.now()?;
    let params = request.into_params()?;

    let (fields, scope) = client
        .assemble(&params, now)
        .map_err(|e| format!("Invalid request: {}", e))?;
    let canonical = canonicalizer
        .canonicalize(&fields, scope)
        .map_err(|e| format!("Canonicalization failed: {}", e))?;

    println!("{}", canonical);
    Ok(())
}
