// src/main.rs
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::info;

use expense_tracker_lite::backend;
use expense_tracker_lite::config::Settings;
use expense_tracker_lite::database::db::{connection, migrate};
use expense_tracker_lite::services::currency_client::{check_rate, ExchangeRateHostClient};

/// Expense tracking API with base-currency normalization
#[derive(Parser)]
#[command(name = "expense-tracker", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Apply pending schema migrations
    Migrate,
    /// Connect to the database and print its clock
    CheckDb,
    /// Look up one FX rate to verify the API endpoint and credential
    CheckFx {
        #[arg(default_value = "USD")]
        source: String,
        #[arg(default_value = "CAD")]
        target: String,
    },
    /// Drop the expenses table and migration history
    Reset {
        /// Confirm the destructive reset
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("invalid configuration")?;
    let command = cli.command.unwrap_or(Command::Serve);

    // The FX check never touches the database.
    if let Command::CheckFx { source, target } = &command {
        let client = ExchangeRateHostClient::from_settings(&settings)?;
        check_rate(&client, source, target).await?;
        return Ok(());
    }

    let pool = connection::get_db_pool(&settings.database_url, settings.db_max_connections)
        .await
        .context("failed to connect to DATABASE_URL")?;

    match command {
        Command::Serve => {
            info!("Starting backend server...");
            backend::run_server(pool, settings).await?;
        }
        Command::Migrate => {
            migrate::run_migrations(&pool).await?;
        }
        Command::CheckDb => {
            let now = connection::server_time(&pool).await?;
            info!("Connected. Server time: {now}");
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("reset drops all expenses; re-run with --yes to confirm");
            }
            migrate::drop_schema(&pool).await?;
        }
        Command::CheckFx { .. } => {}
    }

    Ok(())
}
