//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, sync::Arc, thread};

use client_core::{ImageUpload, PosterClient, PosterService};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::SubmissionId;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::reducer::SelectedImage;
use crate::media::decode_preview_image;

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    server_url: String,
) -> thread::JoinHandle<()> {
    launch_with_service(cmd_rx, ui_tx, Arc::new(PosterClient::new(server_url)))
}

pub fn launch_with_service(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: Arc<dyn PosterService>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                let service = Arc::clone(&service);
                let ui_tx = ui_tx.clone();
                match cmd {
                    BackendCommand::GeneratePosters {
                        submission_id,
                        image,
                    } => {
                        tokio::spawn(async move {
                            generate_posters(service.as_ref(), &ui_tx, submission_id, image).await;
                        });
                    }
                    BackendCommand::FetchPosterPreview { url } => {
                        tokio::spawn(async move {
                            fetch_poster_preview(service.as_ref(), &ui_tx, url).await;
                        });
                    }
                    BackendCommand::InspectImage { path } => {
                        tokio::spawn(async move {
                            inspect_image(&ui_tx, path).await;
                        });
                    }
                }
            }
            tracing::debug!("ui command channel closed; backend worker exiting");
        });
    })
}

async fn generate_posters(
    service: &dyn PosterService,
    ui_tx: &Sender<UiEvent>,
    submission_id: SubmissionId,
    image: SelectedImage,
) {
    let outcome = match ImageUpload::from_path(&image.path).await {
        Ok(upload) => service.generate_posters(upload).await,
        Err(err) => Err(err),
    }
    .map_err(|err| {
        tracing::warn!(%submission_id, "generation failed: {err}");
        UiError::from_generate_error(&err)
    });

    // Blocking send: the UI must always learn that the submission settled.
    if ui_tx
        .send(UiEvent::GenerationSettled {
            submission_id,
            outcome,
        })
        .is_err()
    {
        tracing::debug!(%submission_id, "ui gone before submission settled");
    }
}

async fn fetch_poster_preview(service: &dyn PosterService, ui_tx: &Sender<UiEvent>, url: String) {
    let event = match service.fetch_poster(&url).await {
        Ok(bytes) => match decode_preview_image(&bytes) {
            Ok(image) => UiEvent::PosterPreviewLoaded { url, image },
            Err(reason) => UiEvent::PosterPreviewFailed {
                url,
                reason: format!("Failed to decode poster: {reason}"),
            },
        },
        Err(err) => UiEvent::PosterPreviewFailed {
            url,
            reason: format!("Failed to download poster: {err}"),
        },
    };
    // Blocking send: a dropped preview would leave its card loading forever.
    if ui_tx.send(event).is_err() {
        tracing::debug!("ui gone before poster preview arrived");
    }
}

async fn inspect_image(ui_tx: &Sender<UiEvent>, path: PathBuf) {
    match tokio::fs::metadata(&path).await {
        Ok(meta) => {
            let _ = ui_tx.send(UiEvent::ImageInspected {
                path,
                size_bytes: meta.len(),
            });
        }
        // The submission reports unreadable files; the label just shows no size.
        Err(err) => tracing::debug!(path = %path.display(), "could not inspect image: {err}"),
    }
}
