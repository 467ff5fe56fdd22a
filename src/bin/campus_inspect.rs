use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use campus_data::error::Envelope;
use campus_data::ops::{notifications, sessions};
use campus_data::tokens::{self, Variant};
use campus_data::{config, BackendClient};

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect backend data and design tokens")]
struct Args {
    /// Path to YAML config file; falls back to BACKEND_URL / BACKEND_ANON_KEY
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate and print both token themes
    Tokens,
    /// Print active sessions
    Sessions,
    /// Print a user's enriched notifications
    Notifications {
        #[arg(long)]
        user: Uuid,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    if let Command::Tokens = args.command {
        let themes = [tokens::theme(Variant::Light), tokens::theme(Variant::Dark)];
        for theme in &themes {
            tokens::validate(theme).context("design tokens failed validation")?;
        }
        return print_json(&themes);
    }

    let cfg = match &args.config {
        Some(path) => config::load(Some(path))?,
        None => config::from_env()?,
    };
    let client = BackendClient::from_config(&cfg)?;
    info!(?client, "backend client ready");

    match args.command {
        Command::Sessions => {
            let envelope: Envelope<_> = sessions::fetch_active_sessions(&client).await.into();
            print_json(&envelope)
        }
        Command::Notifications { user } => {
            let envelope: Envelope<_> = notifications::fetch_notifications_with_limit(
                &client,
                user,
                cfg.enrichment.max_concurrency,
            )
            .await
            .into();
            print_json(&envelope)
        }
        Command::Tokens => Ok(()),
    }
}
