use serde_json::Value;
use thiserror::Error;

use crate::models::ApiResultError;

/// Errors raised by the push client.
///
/// Transport-class failures are spread over `Transport` (bad status, body or envelope), `Http`
/// (connection and I/O), `Compression` and `Task`; [`PushError::is_transport`] groups them.
/// `Api` is the structured error reported inside a well-formed envelope.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Configuration error: {0}")]
    Config(String),
    /// Failure at the HTTP or envelope level, before any structured API error could be read
    #[error("{message}")]
    Transport {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Could not serialize request body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not compress request body: {0}")]
    Compression(#[source] std::io::Error),
    #[error("Chunk task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, PushError>;

impl PushError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        PushError::Transport {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// `true` for failures on the wire or in the envelope; `false` for `Api`, request serialization and caller errors
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PushError::Transport { .. } | PushError::Http(_) | PushError::Compression(_) | PushError::Task(_)
        )
    }

    /// HTTP status attached to a transport failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            PushError::Transport { status, .. } => *status,
            PushError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Structured error returned inside a well-formed envelope.
///
/// Carries the first entry of the `errors` list; any further entries are kept in `others`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: String,
    pub details: Option<Value>,
    pub stack: Option<String>,
    pub others: Vec<ApiResultError>,
}

impl ApiError {
    /// `None` when `errors` is empty
    pub fn from_result_errors(errors: Vec<ApiResultError>) -> Option<ApiError> {
        let mut errors = errors.into_iter();
        let first = errors.next()?;
        Some(ApiError {
            message: first.message,
            code: first.code,
            details: first.details,
            stack: first.stack,
            others: errors.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_class_groups_every_wire_failure() {
        assert!(PushError::transport("bad gateway").is_transport());
        assert!(PushError::Compression(std::io::Error::other("disk")).is_transport());

        let api = ApiError::from_result_errors(vec![ApiResultError {
            message: "bad".to_string(),
            code: "X".to_string(),
            details: None,
            stack: None,
        }])
        .unwrap();
        assert!(!PushError::Api(api).is_transport());
        assert!(!PushError::InvalidArgument("chunk size".to_string()).is_transport());
        assert!(!PushError::Config("token".to_string()).is_transport());
    }
}
