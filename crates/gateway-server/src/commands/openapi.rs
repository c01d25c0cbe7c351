use std::path::PathBuf;

use shared::error::CommonError;
use tracing::info;

pub fn cmd_openapi(output: Option<PathBuf>) -> Result<(), CommonError> {
    let spec = gateway::generate_openapi_spec();
    let json = serde_json::to_string_pretty(&spec)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            info!("Wrote OpenAPI document to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
