use std::{collections::HashMap, time::Duration};

use arboard::Clipboard;
use chrono::Local;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{
    dispatch_failure, Effect, Notification, SelectedImage, Session, SessionEvent,
    SubmissionState,
};
use crate::media::{PreviewImage, IMAGE_EXTENSIONS};
use crate::ui::view::{project, PosterCard, ResultView, View};

const APP_HEADING: &str = "Dynamic Book Poster Generator";
const GALLERY_CARD_WIDTH: f32 = 400.0;

enum PosterPreviewState {
    Loading,
    Ready {
        image: PreviewImage,
        texture: Option<egui::TextureHandle>,
    },
    Error(String),
}

pub struct PosterStudioApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    server_url: String,
    session: Session,
    notification: Option<Notification>,
    status: String,

    // Keyed by poster URL; rebuilt whenever a submission succeeds.
    poster_previews: HashMap<String, PosterPreviewState>,
}

impl PosterStudioApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            server_url,
            session: Session::new(),
            notification: None,
            status: "Choose a book cover to begin".to_string(),
            poster_previews: HashMap::new(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    tracing::error!(context = ?err.context(), "{}", err.message());
                    self.status = format!("{}: {}", err_label(err.category()), err.message());
                }
                UiEvent::GenerationSettled {
                    submission_id,
                    outcome,
                } => {
                    let current = self.session.in_flight() == Some(submission_id);
                    self.dispatch(SessionEvent::SubmissionSettled {
                        submission_id,
                        outcome,
                    });
                    if !current {
                        continue;
                    }
                    if let SubmissionState::Succeeded(posters) = self.session.state() {
                        self.status = format!(
                            "Generated {} poster(s) at {}",
                            posters.outputs.len(),
                            Local::now().format("%H:%M:%S")
                        );
                        self.request_poster_previews();
                    }
                }
                UiEvent::PosterPreviewLoaded { url, image } => {
                    if let Some(state) = self.poster_previews.get_mut(&url) {
                        *state = PosterPreviewState::Ready {
                            image,
                            texture: None,
                        };
                    }
                }
                UiEvent::ImageInspected { path, size_bytes } => {
                    self.dispatch(SessionEvent::ImageInspected { path, size_bytes });
                }
                UiEvent::PosterPreviewFailed { url, reason } => {
                    tracing::warn!(%url, "poster preview failed: {reason}");
                    if let Some(state) = self.poster_previews.get_mut(&url) {
                        *state = PosterPreviewState::Error(reason);
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let effect = self.session.apply(event);
        self.run_effect(effect);
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Notify(notification) => {
                self.status = notification.text();
                self.notification = Some(notification);
            }
            Effect::InspectImage { path } => {
                if let Err(reason) =
                    dispatch_backend_command(&self.cmd_tx, BackendCommand::InspectImage { path })
                {
                    tracing::debug!("image size unavailable: {reason}");
                }
            }
            Effect::StartSubmission {
                submission_id,
                image,
            } => {
                self.status = format!("Generating posters from {}", image.display_name);
                if let Err(reason) = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::GeneratePosters {
                        submission_id,
                        image,
                    },
                ) {
                    self.dispatch(SessionEvent::SubmissionSettled {
                        submission_id,
                        outcome: Err(dispatch_failure(reason)),
                    });
                }
            }
        }
    }

    fn request_poster_previews(&mut self) {
        self.poster_previews.clear();
        let Some(result) = project(&self.session, &self.server_url).result else {
            return;
        };
        for card in result.gallery {
            let state = match dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchPosterPreview {
                    url: card.url.clone(),
                },
            ) {
                Ok(()) => PosterPreviewState::Loading,
                Err(reason) => PosterPreviewState::Error(reason),
            };
            self.poster_previews.insert(card.url, state);
        }
    }

    fn pick_image(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Choose a book cover")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file();
        let event = match picked {
            Some(path) => SessionEvent::ImageChosen(SelectedImage::from_path(path)),
            None => SessionEvent::PickerCancelled,
        };
        self.dispatch(event);
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
            Ok(()) => self.status = format!("Copied {text}"),
            Err(err) => self.status = format!("Clipboard unavailable: {err}"),
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui, view: &View) {
        ui.horizontal(|ui| {
            if ui.button("Choose image…").clicked() {
                self.pick_image();
            }
            ui.label(egui::RichText::new(&view.selection_label).weak());
        });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            let button = egui::Button::new(egui::RichText::new(view.trigger.label).strong().size(16.0))
                .min_size(egui::vec2(180.0, 36.0));
            if ui.add_enabled(view.trigger.enabled, button).clicked() {
                self.dispatch(SessionEvent::SubmitRequested);
            }
            if view.trigger.busy {
                ui.add(egui::Spinner::new());
            }
        });
    }

    fn show_result(&mut self, ui: &mut egui::Ui, result: &ResultView) {
        ui.add_space(20.0);
        if let Some(title) = &result.title {
            ui.label(egui::RichText::new(title).strong().size(26.0));
        }
        if let Some(description) = &result.description {
            ui.label(egui::RichText::new(description).italics().size(18.0));
        }
        ui.add_space(20.0);

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(20.0, 20.0);
            for card in &result.gallery {
                self.show_poster_card(ui, card);
            }
        });
    }

    fn show_poster_card(&mut self, ui: &mut egui::Ui, card: &PosterCard) {
        let mut copy_clicked = false;

        egui::Frame::group(ui.style())
            .corner_radius(10.0)
            .inner_margin(egui::Margin::same(10))
            .show(ui, |ui| {
                ui.set_width(GALLERY_CARD_WIDTH);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new(&card.label).strong().size(15.0));
                    ui.add_space(6.0);

                    match self.poster_previews.get_mut(&card.url) {
                        Some(PosterPreviewState::Ready { image, texture }) => {
                            let texture = texture.get_or_insert_with(|| {
                                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                                    [image.width, image.height],
                                    &image.rgba,
                                );
                                ui.ctx().load_texture(
                                    format!("poster:{}", card.url),
                                    color_image,
                                    egui::TextureOptions::LINEAR,
                                )
                            });
                            let scale = (GALLERY_CARD_WIDTH / image.width.max(1) as f32).min(1.0);
                            let size =
                                egui::vec2(image.width as f32 * scale, image.height as f32 * scale);
                            ui.add(egui::Image::new(&*texture).fit_to_exact_size(size))
                                .on_hover_text(card.url.as_str());
                        }
                        Some(PosterPreviewState::Loading) | None => {
                            ui.add(egui::Spinner::new());
                        }
                        Some(PosterPreviewState::Error(reason)) => {
                            ui.label(egui::RichText::new("Preview unavailable").weak())
                                .on_hover_text(reason.as_str());
                            ui.small(card.url.as_str());
                        }
                    }

                    ui.add_space(6.0);
                    if ui.small_button("Copy URL").clicked() {
                        copy_clicked = true;
                    }
                });
            });

        if copy_clicked {
            self.copy_to_clipboard(&card.url);
        }
    }

    fn show_notification(&mut self, ctx: &egui::Context) {
        let Some(notification) = self.notification.clone() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("notification_modal")).show(ctx, |ui| {
            ui.set_width(360.0);
            ui.heading(err_label(notification.category));
            ui.add_space(6.0);
            ui.label(notification.text());
            ui.add_space(12.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.button("OK").clicked()
            })
            .inner
        });

        if modal.inner || modal.should_close() {
            self.notification = None;
        }
    }
}

impl eframe::App for PosterStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let view = project(&self.session, &self.server_url);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.small("Status:");
                ui.small(egui::RichText::new(&self.status).weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(egui::RichText::new(&self.server_url).weak());
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(12.0);
                        ui.heading(APP_HEADING);
                        ui.add_space(16.0);
                        self.show_controls(ui, &view);
                        if let Some(result) = &view.result {
                            self.show_result(ui, result);
                        }
                    });
                });
        });

        self.show_notification(ctx);

        let repaint_after = if self.session.is_busy() { 50 } else { 100 };
        ctx.request_repaint_after(Duration::from_millis(repaint_after));
    }
}
