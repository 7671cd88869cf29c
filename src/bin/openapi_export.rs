//! Writes the OpenAPI document for `/api/v1` to disk.

use std::{fs, path::PathBuf};

use clap::Parser;
use nagaribashi_express::openapi::ApiDocV1;
use utoipa::OpenApi;

#[derive(Parser)]
#[command(name = "openapi-export", about = "Export the API schema as JSON")]
struct Cli {
    /// Destination file; parent directories are created.
    #[arg(long, default_value = "openapi/nagaribashi-express.v1.json")]
    output: PathBuf,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let openapi = ApiDocV1::openapi();
    let json = if cli.compact {
        serde_json::to_string(&openapi)?
    } else {
        serde_json::to_string_pretty(&openapi)?
    };

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&cli.output, json)?;

    println!(
        "{} paths written to {}",
        openapi.paths.paths.len(),
        cli.output.display()
    );
    Ok(())
}
