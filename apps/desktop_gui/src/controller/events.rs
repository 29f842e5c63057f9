//! UI/backend events and error modeling for the desktop controller.

use std::path::PathBuf;

use client_core::GenerateError;
use shared::domain::{PosterSet, SubmissionId};

use crate::media::PreviewImage;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Error(UiError),
    GenerationSettled {
        submission_id: SubmissionId,
        outcome: Result<PosterSet, UiError>,
    },
    PosterPreviewLoaded {
        url: String,
        image: PreviewImage,
    },
    PosterPreviewFailed {
        url: String,
        reason: String,
    },
    ImageInspected {
        path: PathBuf,
        size_bytes: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Precondition,
    Transport,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Submission,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        // Only command-queue and worker-startup text reaches this path; service
        // failures are classified in `from_generate_error`.
        let category = if message_lower.contains("disconnected")
            || message_lower.contains("queue is full")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_generate_error(err: &GenerateError) -> Self {
        let category = match err {
            GenerateError::Server(_) => UiErrorCategory::Server,
            GenerateError::MalformedBody { .. }
            | GenerateError::Transport(_)
            | GenerateError::ReadImage { .. } => UiErrorCategory::Transport,
        };
        Self {
            category,
            context: UiErrorContext::Submission,
            message: err.user_message(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Precondition => "Nothing to submit",
        UiErrorCategory::Transport => "Connection problem",
        UiErrorCategory::Server => "Generation service error",
        UiErrorCategory::Unknown => "Unexpected error",
    }
}
