// Export OpenAPI specification as JSON
//
// Usage: cargo run --bin export-openapi > docs/api/openapi.json
//
// Generates the spec without starting the API server.

use anyhow::{Context, Result};
use rsvp_control_plane::openapi::ApiDoc;

fn main() -> Result<()> {
    let json = ApiDoc::to_json().context("Failed to serialize OpenAPI spec")?;
    println!("{}", json);
    Ok(())
}
