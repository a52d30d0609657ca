//! canroute command line entry point.
//!
//! Wires a SQLite-backed host store and an HTTPS probe into the resolver.
//! Logging goes to stderr so resolution output on stdout stays machine-readable.

use std::sync::Arc;

use anyhow::{Context, Result};
use canroute_core::{AppConfig, HostStore, Resolution, SqliteStore};
use canroute_resolver::{CanisterResolver, HttpProbe, ProbeConfig, ResolverConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "canroute")]
#[command(about = "Resolve domains to Internet Computer canisters", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a URL through the full pipeline
    Resolve {
        /// URL to resolve
        url: String,

        /// Keep the gateway the domain reports instead of rewriting it
        #[arg(long)]
        no_enforce: bool,

        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete expired rows from the host store
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let config = AppConfig::load()?;

    match args.command {
        Command::Resolve { url, no_enforce, json } => resolve(&config, &url, no_enforce, json).await,
        Command::Purge => purge(&config).await,
    }
}

async fn resolve(config: &AppConfig, input: &str, no_enforce: bool, json: bool) -> Result<()> {
    let url = Url::parse(input).with_context(|| format!("invalid URL {input:?}"))?;

    let store = SqliteStore::open(&config.db_path).await?;
    let probe = HttpProbe::new(ProbeConfig {
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
        ..ProbeConfig::default()
    })?;
    let resolver =
        CanisterResolver::new(ResolverConfig::from_app_config(config)?, Arc::new(store), Arc::new(probe));

    tracing::info!(%url, origin = %resolver.origin(), "resolving domain");
    let resolution = resolver.lookup_with(&url, !no_enforce).await?;

    if json {
        let value = match &resolution {
            Resolution::NotCanister => serde_json::json!({ "canister": false }),
            Resolution::Canister(location) => serde_json::json!({
                "canister": true,
                "canister_id": location.principal.to_text(),
                "gateway": location.gateway.as_str(),
            }),
        };
        println!("{value}");
        return Ok(());
    }

    match &resolution {
        Resolution::NotCanister => println!("{url} does not resolve to a canister"),
        Resolution::Canister(location) => {
            println!("canister: {}", location.principal.to_text());
            println!("gateway:  {}", location.gateway);
        }
    }

    Ok(())
}

async fn purge(config: &AppConfig) -> Result<()> {
    let store = SqliteStore::open(&config.db_path).await?;
    let removed = store.purge_expired().await?;
    println!("purged {removed} expired host entries");
    Ok(())
}
