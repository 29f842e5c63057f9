//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use shared::domain::SubmissionId;

use crate::controller::reducer::SelectedImage;

#[derive(Debug)]
pub enum BackendCommand {
    GeneratePosters {
        submission_id: SubmissionId,
        image: SelectedImage,
    },
    FetchPosterPreview {
        url: String,
    },
    InspectImage {
        path: PathBuf,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::GeneratePosters { .. } => "generate_posters",
            BackendCommand::FetchPosterPreview { .. } => "fetch_poster_preview",
            BackendCommand::InspectImage { .. } => "inspect_image",
        }
    }
}
