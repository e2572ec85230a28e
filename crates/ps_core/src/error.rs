use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", describe_graphql_errors(.0))]
    Graphql(Vec<GraphqlError>),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pagination error: {0}")]
    Pagination(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<GraphqlLocation>,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlLocation {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.locations.is_empty() {
            let locations = self
                .locations
                .iter()
                .map(|l| format!("line {}, column {}", l.line, l.column))
                .collect::<Vec<_>>()
                .join("; ");
            write!(f, " ({})", locations)?;
        }
        Ok(())
    }
}

fn describe_graphql_errors(errors: &[GraphqlError]) -> String {
    let mut message = format!("GraphQL request failed with {} error(s):", errors.len());
    for (i, error) in errors.iter().enumerate() {
        message.push_str(&format!("\n{}. {}", i + 1, error));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graphql_error(message: &str, line: u32, column: u32) -> GraphqlError {
        GraphqlError {
            message: message.to_string(),
            locations: vec![GraphqlLocation { line, column }],
            extensions: None,
        }
    }

    #[test]
    fn test_graphql_errors_are_enumerated() {
        let error = Error::Graphql(vec![
            graphql_error("Unknown field \"foo\"", 3, 5),
            graphql_error("Invalid token", 1, 1),
        ]);
        let message = error.to_string();
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1. Unknown field \"foo\" (line 3, column 5)");
        assert_eq!(lines[2], "2. Invalid token (line 1, column 1)");
    }

    #[test]
    fn test_graphql_error_without_location() {
        let error = GraphqlError {
            message: "Internal error".to_string(),
            locations: vec![],
            extensions: None,
        };
        assert_eq!(error.to_string(), "Internal error");
    }

    #[test]
    fn test_graphql_error_deserializes_api_shape() {
        let json = r#"{"message":"Bad","locations":[{"line":2,"column":7}],"extensions":{"category":"graphql"}}"#;
        let error: GraphqlError = serde_json::from_str(json).unwrap();
        assert_eq!(error.locations, vec![GraphqlLocation { line: 2, column: 7 }]);
        assert_eq!(error.extensions.unwrap()["category"], "graphql");
    }
}
