//! coursebid simulator
//!
//! Runs a seeded admission season and prints each round's settlement
//! report as one JSON line on stdout.
//!
//! Environment:
//! - `COURSEBID_CONFIG`: path to an `EngineConfig` JSON file (defaults otherwise)
//! - `COURSEBID_SIM_SEED`, `COURSEBID_SIM_STUDENTS`, `COURSEBID_SIM_COURSES`,
//!   `COURSEBID_SIM_ROUNDS`, `COURSEBID_SIM_ROUND_SECS`
//! - `COURSEBID_LOG_JSON`: log as JSON instead of text
//! - `RUST_LOG`: log filter (default `info`)

mod season;

use coursebid_types::{EngineConfig, Result};
use tracing_subscriber::EnvFilter;

use crate::season::{SimParams, run_season};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var_os("COURSEBID_LOG_JSON").is_some() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = if let Ok(path) = std::env::var("COURSEBID_CONFIG") {
        tracing::info!(%path, "loading config");
        EngineConfig::from_json_file(&path)?
    } else {
        tracing::info!("using default config");
        EngineConfig::default()
    };
    let params = SimParams::from_env()?;
    tracing::info!(?params, "starting season");

    for report in run_season(config, &params)? {
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
