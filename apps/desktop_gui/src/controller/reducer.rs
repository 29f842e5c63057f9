//! Session state machine: image selection plus the single-submission lifecycle.
//!
//! Events are applied one at a time in arrival order. Each application
//! returns at most one [`Effect`] for the shell to carry out.

use std::path::PathBuf;

use shared::domain::{PosterSet, SubmissionId};
use tracing::{debug, info, warn};

use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext};

pub const NO_IMAGE_SELECTED_MESSAGE: &str = "Please select an image first.";
const UPLOAD_FAILED_PREFIX: &str = "Upload failed: ";

/// Reference to the image the user picked. The bytes are read only when a
/// submission starts; the size is filled in later by the backend worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub display_name: String,
    pub size_bytes: Option<u64>,
}

impl SelectedImage {
    pub fn from_path(path: PathBuf) -> Self {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            display_name,
            size_bytes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Busy,
    Succeeded(PosterSet),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub category: UiErrorCategory,
    pub message: String,
}

impl Notification {
    pub fn no_image_selected() -> Self {
        Self {
            category: UiErrorCategory::Precondition,
            message: NO_IMAGE_SELECTED_MESSAGE.to_string(),
        }
    }

    pub fn upload_failed(err: &UiError) -> Self {
        Self {
            category: err.category(),
            message: err.message().to_string(),
        }
    }

    /// Full text shown in the blocking notification.
    pub fn text(&self) -> String {
        match self.category {
            UiErrorCategory::Precondition => self.message.clone(),
            _ => format!("{UPLOAD_FAILED_PREFIX}{}", self.message),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    ImageChosen(SelectedImage),
    ImageInspected {
        path: PathBuf,
        size_bytes: u64,
    },
    PickerCancelled,
    SubmitRequested,
    SubmissionSettled {
        submission_id: SubmissionId,
        outcome: Result<PosterSet, UiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    StartSubmission {
        submission_id: SubmissionId,
        image: SelectedImage,
    },
    Notify(Notification),
    InspectImage {
        path: PathBuf,
    },
}

#[derive(Debug, Default)]
pub struct Session {
    selected: Option<SelectedImage>,
    state: SubmissionState,
    in_flight: Option<SubmissionId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SubmissionState::Busy)
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight
    }

    pub fn apply(&mut self, event: SessionEvent) -> Effect {
        match event {
            SessionEvent::ImageChosen(image) => {
                debug!(path = %image.path.display(), "selected image");
                let effect = match image.size_bytes {
                    Some(_) => Effect::None,
                    None => Effect::InspectImage {
                        path: image.path.clone(),
                    },
                };
                self.selected = Some(image);
                effect
            }
            SessionEvent::ImageInspected { path, size_bytes } => {
                // A later pick may have replaced the image that was inspected.
                if let Some(selected) = self.selected.as_mut().filter(|image| image.path == path) {
                    selected.size_bytes = Some(size_bytes);
                }
                Effect::None
            }
            // The previous selection stays in place, like a file input whose
            // picker was dismissed.
            SessionEvent::PickerCancelled => Effect::None,
            SessionEvent::SubmitRequested => self.submit(),
            SessionEvent::SubmissionSettled {
                submission_id,
                outcome,
            } => self.settle(submission_id, outcome),
        }
    }

    fn submit(&mut self) -> Effect {
        let Some(image) = self.selected.clone() else {
            return Effect::Notify(Notification::no_image_selected());
        };
        if self.is_busy() {
            debug!("ignoring submit while a submission is outstanding");
            return Effect::None;
        }

        let submission_id = SubmissionId::new();
        info!(%submission_id, image = %image.display_name, "starting submission");
        self.state = SubmissionState::Busy;
        self.in_flight = Some(submission_id);
        Effect::StartSubmission {
            submission_id,
            image,
        }
    }

    fn settle(&mut self, submission_id: SubmissionId, outcome: Result<PosterSet, UiError>) -> Effect {
        if self.in_flight != Some(submission_id) {
            warn!(%submission_id, "dropping outcome for a submission that is not in flight");
            return Effect::None;
        }
        self.in_flight = None;

        match outcome {
            Ok(posters) => {
                info!(%submission_id, output_count = posters.outputs.len(), "submission succeeded");
                self.state = SubmissionState::Succeeded(posters);
                Effect::None
            }
            Err(err) => {
                warn!(%submission_id, "submission failed: {}", err.message());
                self.state = SubmissionState::Failed(err.message().to_string());
                Effect::Notify(Notification::upload_failed(&err))
            }
        }
    }
}

/// Outcome used when a submission command never reached the backend worker.
pub fn dispatch_failure(reason: impl Into<String>) -> UiError {
    UiError::from_message(UiErrorContext::Submission, reason)
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
