use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Failure body returned by the generation service with a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub status: u16,
    pub message: String,
}

impl ServiceError {
    pub fn from_body(status: u16, body: ServiceErrorBody) -> Self {
        let message = body
            .error
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        Self { status, message }
    }
}
