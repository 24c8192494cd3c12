use thiserror::Error;

/// Main error type for edgewatch
#[derive(Error, Debug)]
pub enum EdgewatchError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Backend error ({status}): {detail}")]
    Api { status: u16, detail: String },

    // Snapshot fetch errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Scheduler lifecycle
    #[error("Sync scheduler has been stopped")]
    SchedulerStopped,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for EdgewatchError
pub type Result<T> = std::result::Result<T, EdgewatchError>;

/// A single failed snapshot fetch.
///
/// The `Display` output is what ends up in `SyncState::last_error`, so every
/// variant renders as a message a user can read in a status banner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("duplicate record for match {match_id} side {side}")]
    DuplicateKey { match_id: String, side: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_messages_are_readable() {
        let err = TransportError::Status {
            status: 502,
            body: "Backend /value-bets failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "backend returned 502: Backend /value-bets failed"
        );

        let err = TransportError::InvalidRecord {
            index: 3,
            reason: "missing field `edge_a`".to_string(),
        };
        assert!(err.to_string().contains("index 3"));
    }

    #[test]
    fn test_transport_error_wraps_into_crate_error() {
        let err: EdgewatchError = TransportError::Decode("eof".to_string()).into();
        assert!(matches!(err, EdgewatchError::Transport(_)));
        assert_eq!(
            err.to_string(),
            "Transport error: malformed response body: eof"
        );
    }

    #[test]
    fn test_api_error_keeps_detail_verbatim() {
        let err = EdgewatchError::Api {
            status: 400,
            detail: "Giocatore non trovato: Foo".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error (400): Giocatore non trovato: Foo");
    }
}
