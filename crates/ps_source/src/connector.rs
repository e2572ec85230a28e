//! The connector surface seen by the content engine: its options, the node
//! schema it produces, and dispatch of the two lifecycle events.

use ps_core::{Error, FieldSchema, FieldType, NodeModel, NodeSchema, Result, SyncCache};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use crate::fetcher::ArticleFetcher;
use crate::graphql::{GraphqlTransport, HttpTransport, DEFAULT_ENDPOINT};
use crate::manager::{SyncManager, SyncReport};

pub const DELETED_EVENT: &str = "content_item.deleted";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ConnectorConfig {
    pub token: String,
    pub endpoint: Url,
    pub timeout: Duration,
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ConnectorConfig {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Config("Prepr API token is required".to_string()));
        }
        Ok(Self {
            token,
            endpoint: parse_endpoint(DEFAULT_ENDPOINT)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).map_err(|e| Error::InvalidUrl(format!("{}: {}", endpoint, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!("{}: unsupported scheme {}", endpoint, scheme))),
    }
}

/// A configuration option the connector asks the host for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorOption {
    pub name: &'static str,
    pub description: &'static str,
    pub secret: bool,
    pub required: bool,
}

/// Body of a CMS webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub id: Option<String>,
}

impl WebhookEvent {
    pub fn is_deletion(&self) -> bool {
        self.event == DELETED_EVENT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// `createAllNodes`: a full build.
    CreateAllNodes,
    /// `updateNodes`: a webhook-triggered update.
    UpdateNodes(WebhookEvent),
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::CreateAllNodes => "createAllNodes",
            LifecycleEvent::UpdateNodes(_) => "updateNodes",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Synced(SyncReport),
    Deleted(String),
}

pub struct Connector {
    manager: SyncManager,
}

impl Connector {
    pub const NAME: &'static str = "prepr";

    pub fn new(config: &ConnectorConfig, model: Arc<dyn NodeModel>, cache: Arc<dyn SyncCache>) -> Result<Self> {
        let transport = HttpTransport::new(config.endpoint.clone(), config.token.clone(), config.timeout)?;
        Ok(Self::with_transport(Arc::new(transport), model, cache))
    }

    pub fn with_transport(
        transport: Arc<dyn GraphqlTransport>,
        model: Arc<dyn NodeModel>,
        cache: Arc<dyn SyncCache>,
    ) -> Self {
        let fetcher = ArticleFetcher::new(transport);
        Self {
            manager: SyncManager::new(fetcher, model, cache),
        }
    }

    pub fn manager(&self) -> &SyncManager {
        &self.manager
    }

    pub fn options() -> Vec<ConnectorOption> {
        vec![ConnectorOption {
            name: "token",
            description: "Prepr GraphQL access token",
            secret: true,
            required: true,
        }]
    }

    pub fn schema() -> NodeSchema {
        NodeSchema {
            name: "Article".to_string(),
            fields: vec![
                FieldSchema::object(
                    "authors",
                    vec![
                        FieldSchema::new("id", FieldType::String),
                        FieldSchema::new("name", FieldType::String),
                        FieldSchema::new("bio", FieldType::Text).optional(),
                    ],
                )
                .list(),
                FieldSchema::new("body", FieldType::Text),
                FieldSchema::object(
                    "categories",
                    vec![
                        FieldSchema::new("id", FieldType::String),
                        FieldSchema::new("slug", FieldType::String),
                        FieldSchema::new("title", FieldType::String),
                    ],
                )
                .list(),
                FieldSchema::new("slug", FieldType::String),
                FieldSchema::new("title", FieldType::String),
                FieldSchema::new("updated", FieldType::Datetime),
            ],
        }
    }

    pub async fn handle(&self, event: LifecycleEvent) -> Result<EventOutcome> {
        tracing::info!("📨 Handling {} event", event.name());
        match event {
            LifecycleEvent::CreateAllNodes => Ok(EventOutcome::Synced(self.manager.full_sync().await?)),
            LifecycleEvent::UpdateNodes(webhook) if webhook.is_deletion() => {
                let id = webhook
                    .payload
                    .id
                    .ok_or_else(|| Error::InvalidEvent(format!("{} without payload id", DELETED_EVENT)))?;
                self.manager.delete_node(&id).await?;
                Ok(EventOutcome::Deleted(id))
            }
            LifecycleEvent::UpdateNodes(_) => Ok(EventOutcome::Synced(self.manager.incremental_sync().await?)),
        }
    }
}
