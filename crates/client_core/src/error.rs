use std::path::PathBuf;

use shared::error::ServiceError;
use thiserror::Error;

pub const TRANSPORT_ERROR_MESSAGE: &str = "Could not reach the poster generation service";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "The poster generation service returned an unreadable response";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read image '{}': {source}", path.display())]
    ReadImage {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Server(#[from] ServiceError),
    #[error("malformed response body (status {status}): {source}")]
    MalformedBody {
        status: u16,
        source: serde_json::Error,
    },
    #[error("request to generation service failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GenerateError {
    /// Text shown to the user when a submission fails.
    ///
    /// Server-reported errors are passed through verbatim; everything else
    /// collapses to a fixed message so transport noise never reaches the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::ReadImage { path, source } => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                format!("Could not read {name}: {source}")
            }
            Self::Server(err) => err.message.clone(),
            Self::MalformedBody { .. } => MALFORMED_RESPONSE_MESSAGE.to_string(),
            Self::Transport(_) => TRANSPORT_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server(err) => Some(err.status),
            Self::MalformedBody { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::ReadImage { .. } => None,
        }
    }
}
