//! Typed error hierarchy for the operator console.
//!
//! `DeskError` covers the three failure families a view can hit:
//! - transport and HTTP failures talking to the operations API
//! - validation failures caught before any request is sent
//! - local lookups that miss (a task id not on the board, etc.)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeskError {
    #[error("Could not reach the operations API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to decode API response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for a local miss and for an HTTP 404 alike.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Http { status, .. } => *status == 404,
            _ => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for DeskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Transport(err)
        }
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_carries_status_and_message() {
        let err = DeskError::Http {
            status: 409,
            message: "task locked".to_string(),
        };
        assert!(err.to_string().contains("409"));
        assert!(err.to_string().contains("task locked"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_covers_local_and_http_404() {
        assert!(DeskError::not_found("Task", "t9").is_not_found());
        let http_404 = DeskError::Http {
            status: 404,
            message: "missing".into(),
        };
        assert!(http_404.is_not_found());
    }

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = DeskError::not_found("Client", "c42");
        assert_eq!(err.to_string(), "Client c42 not found");
    }

    #[test]
    fn validation_error_displays_bare_message() {
        let err = DeskError::validation("Password must be at least 8 characters");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Password must be at least 8 characters");
    }

    #[test]
    fn decode_error_converts_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DeskError = json_err.into();
        assert!(matches!(err, DeskError::Decode(_)));
    }

    #[test]
    fn desk_error_implements_std_error() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&DeskError::Config("bad url".into()));
    }
}
