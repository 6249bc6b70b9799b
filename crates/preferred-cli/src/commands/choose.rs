//! Choose command implementation.

use preferred_client::ChooseClient;

use crate::args::{ClientArgs, RequestArgs};
use crate::output::{format_json, signed_request_json};

pub fn run(
    client: ClientArgs,
    request: RequestArgs,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ChooseClient::new(client.into_config()?);
    let now = request.now()?;
    let params = request.into_params()?;

    let signed = client
        .sign_choose(&params, now)
        .map_err(|e| format!("Failed to build choose URL: {}", e))?;

    tracing::debug!(uid = %signed.uid, expiration = signed.expiration, "built choose URL");

    if json_output {
        println!("{}", format_json(&signed_request_json(&signed)));
    } else {
        println!("{}", signed.url);
    }
    Ok(())
}
