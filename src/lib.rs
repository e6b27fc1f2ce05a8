pub mod api;
pub mod cli;
pub mod core;

use crate::api::ApiClient;
use crate::core::config::AppConfig;
use crate::core::types::{EtfListQuery, PricePeriod};
use anyhow::{Context, Result};
use tracing::{debug, info};

pub enum AppCommand {
    List(EtfListQuery),
    Show { code: String },
    Prices { code: String, period: PricePeriod },
    Holdings { code: String },
    Portfolio,
    Health,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ETF helper starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let api_config = config.api.clone().apply_env();
    let client = ApiClient::new(&api_config).context("Failed to create API client")?;

    match command {
        AppCommand::List(query) => cli::list::run(&client, &query).await,
        AppCommand::Show { code } => cli::detail::run(&client, &code).await,
        AppCommand::Prices { code, period } => cli::prices::run(&client, &code, period).await,
        AppCommand::Holdings { code } => cli::detail::run_holdings(&client, &code).await,
        AppCommand::Portfolio => cli::portfolio::run(&client, &config.portfolio).await,
        AppCommand::Health => cli::health::run(&client, client.base_url().as_str()).await,
    }
}
