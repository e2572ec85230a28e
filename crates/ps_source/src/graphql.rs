//! Wire types for the Prepr GraphQL API and the HTTP transport that carries them.

use async_trait::async_trait;
use ps_core::{Article, Error, GraphqlError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://graphql.prepr.io/";

/// Number of articles requested per page. Must match `limit` in [`ARTICLES_QUERY`].
pub const PAGE_SIZE: usize = 100;

pub const ARTICLES_QUERY: &str = r#"
query Articles($skip: Int, $where: ArticleWhereInput) {
  Articles(limit: 100, skip: $skip, where: $where) {
    total
    items {
      _id
      _slug
      _changed_on
      title
      authors {
        _id
        full_name
        bio
      }
      categories {
        _id
        _slug
        body
      }
      content {
        __typename
        ... on Assets {
          _id
          items {
            _type
            url
          }
        }
        ... on CodeBlock {
          _id
          code
          format
        }
        ... on Text {
          _id
          body
        }
      }
    }
  }
}
"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: ArticlesVariables,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlesVariables {
    pub skip: usize,
    #[serde(rename = "where")]
    pub filter: ArticlesFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlesFilter {
    #[serde(rename = "_changed_on_gte")]
    pub changed_on_gte: Option<String>,
}

impl GraphqlRequest {
    pub fn articles(skip: usize, since: Option<&str>) -> Self {
        Self {
            query: ARTICLES_QUERY,
            variables: ArticlesVariables {
                skip,
                filter: ArticlesFilter {
                    changed_on_gte: since.map(str::to_string),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesData {
    #[serde(rename = "Articles")]
    pub articles: Option<ArticlesPage>,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesPage {
    #[serde(default, deserialize_with = "ps_core::types::null_as_default")]
    pub items: Vec<Article>,
    pub total: usize,
}

/// Sends one GraphQL request and returns the decoded JSON document.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value>;
}

pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    token: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl HttpTransport {
    pub fn new(endpoint: Url, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            token: token.into(),
        })
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value> {
        tracing::debug!(
            "POST {} skip={} since={:?}",
            self.endpoint,
            request.variables.skip,
            request.variables.filter.changed_on_gte
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        // GraphQL servers may report query errors with a 4xx status; keep those
        // so the caller can enumerate them.
        let status_error = response.error_for_status_ref().err();
        if let Some(status_error) = status_error {
            let body = response.text().await.unwrap_or_default();
            return match serde_json::from_str::<Value>(&body) {
                Ok(document) if document.get("errors").is_some() => Ok(document),
                _ => Err(Error::Http(status_error)),
            };
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_variables_shape() {
        let request = GraphqlRequest::articles(200, Some("2024-01-01T00:00:00.000Z"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["variables"],
            json!({"skip": 200, "where": {"_changed_on_gte": "2024-01-01T00:00:00.000Z"}})
        );
    }

    #[test]
    fn test_missing_filter_is_null() {
        let value = serde_json::to_value(GraphqlRequest::articles(0, None)).unwrap();
        assert_eq!(value["variables"]["where"]["_changed_on_gte"], Value::Null);
    }

    #[test]
    fn test_query_page_size_matches() {
        assert!(ARTICLES_QUERY.contains(&format!("limit: {}", PAGE_SIZE)));
    }

    #[test]
    fn test_transport_debug_redacts_token() {
        let transport = HttpTransport::new(
            Url::parse(DEFAULT_ENDPOINT).unwrap(),
            "secret-token",
            Duration::from_secs(5),
        )
        .unwrap();
        let debug = format!("{:?}", transport);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
