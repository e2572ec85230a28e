use clap::{Args, Subcommand};
use ps_core::{Error, Result};
use ps_storage::StorageBackend;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use crate::connector::{Connector, EventOutcome, LifecycleEvent, WebhookEvent};

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: SyncCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SyncCommands {
    /// Fetch every article and replace all nodes (createAllNodes)
    Sync,
    /// Handle a webhook delivery (updateNodes)
    Update {
        /// JSON file holding the webhook body. Reads stdin when omitted.
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Run incremental syncs periodically
    Watch {
        /// Time between syncs (e.g. 30m, 1h, 1h 15m)
        #[arg(long, default_value = "1h", value_parser = humantime::parse_duration)]
        interval: Duration,
    },
    /// Print the node schema as JSON
    Schema,
    /// List stored nodes
    List,
}

impl SyncCommands {
    /// Whether the command talks to the CMS and therefore needs a token.
    pub fn needs_connector(&self) -> bool {
        matches!(self, SyncCommands::Sync | SyncCommands::Update { .. } | SyncCommands::Watch { .. })
    }
}

pub async fn read_webhook_event(path: Option<&PathBuf>) -> Result<WebhookEvent> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::InvalidEvent(format!("cannot read {}: {}", path.display(), e)))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .map_err(|e| Error::InvalidEvent(format!("cannot read stdin: {}", e)))?;
            raw
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

fn report(outcome: &EventOutcome) {
    match outcome {
        EventOutcome::Synced(report) => println!(
            "{} sync: fetched {}, stored {}, cursor {} (was {})",
            report.mode,
            report.fetched,
            report.stored,
            report.cursor,
            report.previous_cursor.as_deref().unwrap_or("unset")
        ),
        EventOutcome::Deleted(id) => println!("deleted {}", id),
    }
}

/// Runs a command. `connector` must be present for commands where
/// [`SyncCommands::needs_connector`] holds.
pub async fn handle_command(
    args: SyncArgs,
    connector: Option<&Connector>,
    storage: &dyn StorageBackend,
) -> Result<()> {
    let require = || connector.ok_or_else(|| Error::Config("Prepr API token is required".to_string()));

    match args.command {
        SyncCommands::Sync => {
            let outcome = require()?.handle(LifecycleEvent::CreateAllNodes).await?;
            report(&outcome);
        }
        SyncCommands::Update { event } => {
            let webhook = read_webhook_event(event.as_ref()).await?;
            let outcome = require()?.handle(LifecycleEvent::UpdateNodes(webhook)).await?;
            report(&outcome);
        }
        SyncCommands::Watch { interval } => {
            let connector = require()?;
            info!("Running incremental sync every {}", humantime::format_duration(interval));
            loop {
                match connector.manager().incremental_sync().await {
                    Ok(sync) => report(&EventOutcome::Synced(sync)),
                    Err(e) => error!("Sync failed: {}", e),
                }
                tokio::time::sleep(interval).await;
            }
        }
        SyncCommands::Schema => {
            println!("{}", serde_json::to_string_pretty(&Connector::schema())?);
        }
        SyncCommands::List => {
            let nodes = storage.list_nodes().await?;
            println!("{} nodes in {} storage", nodes.len(), storage.name());
            for node in nodes {
                println!("  {}  {}  {}", node.id, node.slug, node.title);
            }
        }
    }
    Ok(())
}
