use anyhow::Context;
use clap::Parser;
use ps_source::cli::{handle_command, SyncArgs};
use ps_source::graphql::DEFAULT_ENDPOINT;
use ps_source::logging::init_logging;
use ps_source::{Connector, ConnectorConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sync Prepr articles into a content node store", long_about = None)]
pub struct Cli {
    /// Prepr GraphQL access token
    #[arg(long, env = "PREPR_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[arg(long, env = "PREPR_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// HTTP request timeout (e.g. 30s, 2m)
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    timeout: Duration,
    /// Node storage backend: memory, or sqlite when built with the sqlite feature
    #[arg(long, default_value = "memory")]
    storage: String,
    /// Database file for file-backed storage
    #[arg(long, default_value = "prepr-sync.db")]
    database: PathBuf,
    #[arg(short, long)]
    verbose: bool,
    #[command(flatten)]
    args: SyncArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let storage = ps_storage::create_storage(&cli.storage, &cli.database)
        .await
        .with_context(|| format!("opening {} storage", cli.storage))?;
    info!("💾 Storage initialized (using {})", storage.backend.name());

    let connector = if cli.args.command.needs_connector() {
        let token = cli
            .token
            .clone()
            .context("a Prepr token is required, pass --token or set PREPR_TOKEN")?;
        let config = ConnectorConfig::new(token)?
            .with_endpoint(&cli.endpoint)?
            .with_timeout(cli.timeout);
        info!("🔌 Connector {} configured for {}", Connector::NAME, config.endpoint);
        Some(Connector::new(&config, storage.model.clone(), storage.cache.clone())?)
    } else {
        None
    };

    handle_command(cli.args, connector.as_ref(), storage.backend.as_ref()).await?;
    Ok(())
}
