//! Dashboard Builder Binary
//!
//! Writes the JSON chart specification of the unfiltered view of the cleaned file, so a
//! front end can draw the dashboard without running the analytics itself.
//!
//! Usage:
//!   build-dashboard                    # Writes streamboard-dashboard.json
//!   build-dashboard path/to/spec.json  # Writes to the given path

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

use streamboard::app::ViewSession;
use streamboard::config::Config;
use streamboard::constants::DEFAULT_CONFIG_FILE;

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let output_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("streamboard-dashboard.json"));

    let config = Config::load_with_env(DEFAULT_CONFIG_FILE)?;
    let mut session = ViewSession::open(config.paths.output.clone());
    let filters = session.default_filters()?;
    let spec = session.chart_spec(&filters)?;

    let json_string = serde_json::to_string_pretty(&spec)?;
    println!("{}", json_string);

    fs::write(&output_path, &json_string)
        .with_context(|| format!("Failed to write dashboard file {}", output_path.display()))?;

    eprintln!("✅ Dashboard generated successfully!");
    eprintln!("📄 Saved to: {}", output_path.display());
    Ok(())
}
