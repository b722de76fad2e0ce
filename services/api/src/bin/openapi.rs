//! services/api/src/bin/openapi.rs
//!
//! Writes the study-tracker API's OpenAPI 3.0 specification to
//! `openapi.json`, for generating clients without a running server.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = "openapi.json";
    std::fs::write(path, ApiDoc::openapi().to_pretty_json()?)?;
    println!("OpenAPI specification written to {path}");
    Ok(())
}
