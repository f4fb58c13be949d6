//! Write the gateway's OpenAPI document as JSON
//!
//! ```text
//! cargo run --bin export_openapi                        # stdout
//! cargo run --bin export_openapi -- --output api.json   # file
//! ```

use anyhow::Context;
use utoipa::OpenApi;
use wallet_ledger::gateway::openapi::ApiDoc;

fn main() -> anyhow::Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;

    let args: Vec<String> = std::env::args().collect();
    match args.iter().position(|a| a == "--output") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .context("--output needs a file path")?;
            std::fs::write(path, &json).with_context(|| format!("Failed to write {path}"))?;
            eprintln!("OpenAPI document written to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}
