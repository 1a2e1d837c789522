//! Scheduled quote bot: one run generates a unique quote and image and
//! posts them to every configured platform.

mod app;
mod config;
mod logging;

use anyhow::{Context, Result};
use bot_logging::{bot_error, bot_info};

use crate::config::BotConfig;
use crate::logging::LogSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv();

    logging::initialize(LogSettings::from_lookup(|name| std::env::var(name).ok()));
    match dotenv {
        Ok(path) => bot_info!("Loaded environment from {:?}", path),
        Err(err) if err.not_found() => {}
        Err(err) => bot_error!("Could not read .env: {}", err),
    }

    let config = BotConfig::from_env().context("invalid configuration")?;
    let cycle = app::build_cycle(&config)?;

    bot_info!("Starting publish cycle");
    let report = cycle.run().await.map_err(|err| {
        bot_error!("Cycle failed: {}", err);
        err
    })?;
    app::conclude(&report)
}
