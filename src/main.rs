use clap::Parser;
use edgewatch::adapters::BackendClient;
use edgewatch::cli::commands;
use edgewatch::cli::output::OutputMode;
use edgewatch::cli::{Cli, Commands};
use edgewatch::config::AppConfig;
use tracing::info;

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = load_config(&cli)?;

    match cli.command {
        Commands::Watch {
            interval_ms,
            status_port,
            json,
        } => {
            if let Some(ms) = interval_ms {
                cfg.sync.base_interval_ms = ms;
                cfg.sync.max_interval_ms = cfg.sync.max_interval_ms.max(ms);
            }
            if status_port.is_some() {
                cfg.status_port = status_port;
            }
            validate(&cfg)?;
            init_logging(&cfg.logging);
            info!("edgewatch watching {}", cfg.api.base_url);

            let client = BackendClient::from_config(&cfg.api)?;
            commands::run_watch(&cfg, client, OutputMode::from_json_flag(json)).await?;
        }
        Commands::Snapshot { json } => {
            validate(&cfg)?;
            init_logging_simple();
            let client = BackendClient::from_config(&cfg.api)?;
            commands::run_snapshot(&client, OutputMode::from_json_flag(json)).await?;
        }
        Commands::Predict {
            player_a,
            player_b,
            surface,
            odds_a,
            odds_b,
            json,
        } => {
            validate(&cfg)?;
            init_logging_simple();
            let client = BackendClient::from_config(&cfg.api)?;
            let odds = odds_a.zip(odds_b);
            commands::run_predict(
                &client,
                &player_a,
                &player_b,
                surface,
                odds,
                OutputMode::from_json_flag(json),
            )
            .await?;
        }
        Commands::Search { query, limit, json } => {
            if let Some(limit) = limit {
                cfg.search.limit = limit;
            }
            validate(&cfg)?;
            init_logging_simple();
            let client = BackendClient::from_config(&cfg.api)?;
            let mode = OutputMode::from_json_flag(json);
            match query {
                Some(q) => commands::run_search(&cfg, &client, &q, mode).await?,
                None => commands::run_search_interactive(&cfg, client, mode).await?,
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut cfg = AppConfig::load_from(&cli.config)?;
    if let Some(url) = &cli.api_url {
        cfg.api.base_url = url.clone();
    }
    Ok(cfg)
}

fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    cfg.validate()
        .map_err(|errors| anyhow::anyhow!("invalid configuration:\n  {}", errors.join("\n  ")))
}
