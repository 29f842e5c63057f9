//! Pure projection of the session into what the window should show.

use client_core::poster_url;

use crate::controller::reducer::{Session, SubmissionState};
use crate::media::human_readable_bytes;

pub const GENERATE_LABEL: &str = "Generate Posters";
pub const GENERATING_LABEL: &str = "Generating...";
const NO_FILE_LABEL: &str = "No file chosen";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub selection_label: String,
    pub trigger: TriggerView,
    pub result: Option<ResultView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerView {
    pub enabled: bool,
    pub busy: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub title: Option<String>,
    pub description: Option<String>,
    pub gallery: Vec<PosterCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterCard {
    pub label: String,
    pub url: String,
}

pub fn project(session: &Session, server_url: &str) -> View {
    let selection_label = match session.selected_image() {
        Some(image) => match image.size_bytes {
            Some(size) => format!("{} ({})", image.display_name, human_readable_bytes(size)),
            None => image.display_name.clone(),
        },
        None => NO_FILE_LABEL.to_string(),
    };

    let busy = session.is_busy();
    let trigger = TriggerView {
        enabled: !busy,
        busy,
        label: if busy { GENERATING_LABEL } else { GENERATE_LABEL },
    };

    let result = match session.state() {
        SubmissionState::Succeeded(posters) => Some(ResultView {
            title: non_empty(&posters.title),
            description: non_empty(&posters.description),
            gallery: posters
                .outputs
                .iter()
                .enumerate()
                .map(|(index, output)| PosterCard {
                    label: format!("Poster {}", index + 1),
                    url: poster_url(server_url, output),
                })
                .collect(),
        }),
        SubmissionState::Idle | SubmissionState::Busy | SubmissionState::Failed(_) => None,
    };

    View {
        selection_label,
        trigger,
        result,
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::{UiError, UiErrorContext};
    use crate::controller::reducer::{Effect, SelectedImage, SessionEvent};
    use shared::domain::{OutputFileId, PosterSet, SubmissionId};
    use std::path::PathBuf;

    const BASE: &str = "http://127.0.0.1:5001";

    fn session_with_image() -> Session {
        let mut session = Session::new();
        session.apply(SessionEvent::ImageChosen(SelectedImage {
            path: PathBuf::from("/covers/book.png"),
            display_name: "book.png".to_string(),
            size_bytes: Some(1536),
        }));
        session
    }

    fn start(session: &mut Session) -> SubmissionId {
        match session.apply(SessionEvent::SubmitRequested) {
            Effect::StartSubmission { submission_id, .. } => submission_id,
            other => panic!("expected submission to start, got {other:?}"),
        }
    }

    fn settle_with(session: &mut Session, posters: PosterSet) {
        let submission_id = start(session);
        session.apply(SessionEvent::SubmissionSettled {
            submission_id,
            outcome: Ok(posters),
        });
    }

    #[test]
    fn idle_shows_only_controls() {
        let view = project(&Session::new(), BASE);
        assert_eq!(view.selection_label, "No file chosen");
        assert_eq!(
            view.trigger,
            TriggerView {
                enabled: true,
                busy: false,
                label: "Generate Posters"
            }
        );
        assert!(view.result.is_none());
    }

    #[test]
    fn busy_disables_trigger_and_hides_results() {
        let mut session = session_with_image();
        start(&mut session);

        let view = project(&session, BASE);
        assert!(!view.trigger.enabled);
        assert!(view.trigger.busy);
        assert_eq!(view.trigger.label, "Generating...");
        assert!(view.result.is_none());
        assert_eq!(view.selection_label, "book.png (1.5 KB)");
    }

    #[test]
    fn success_renders_title_description_and_gallery() {
        let mut session = session_with_image();
        settle_with(
            &mut session,
            PosterSet {
                title: "Dune".to_string(),
                description: "A desert planet.".to_string(),
                outputs: vec![OutputFileId::from("p1.png"), OutputFileId::from("p2.png")],
            },
        );

        let result = project(&session, BASE).result.expect("result section");
        assert_eq!(result.title.as_deref(), Some("Dune"));
        assert_eq!(result.description.as_deref(), Some("A desert planet."));
        assert_eq!(
            result.gallery,
            vec![
                PosterCard {
                    label: "Poster 1".to_string(),
                    url: "http://127.0.0.1:5001/static/output/p1.png".to_string(),
                },
                PosterCard {
                    label: "Poster 2".to_string(),
                    url: "http://127.0.0.1:5001/static/output/p2.png".to_string(),
                },
            ]
        );
    }

    #[test]
    fn gallery_keeps_received_order_and_numbering() {
        let mut session = session_with_image();
        settle_with(
            &mut session,
            PosterSet {
                title: String::new(),
                description: String::new(),
                outputs: vec![
                    OutputFileId::from("a.png"),
                    OutputFileId::from("b.png"),
                    OutputFileId::from("c.png"),
                ],
            },
        );

        let result = project(&session, BASE).result.expect("result section");
        assert!(result.title.is_none());
        assert!(result.description.is_none());
        let rendered: Vec<(&str, &str)> = result
            .gallery
            .iter()
            .map(|card| (card.label.as_str(), card.url.rsplit('/').next().unwrap_or("")))
            .collect();
        assert_eq!(
            rendered,
            [
                ("Poster 1", "a.png"),
                ("Poster 2", "b.png"),
                ("Poster 3", "c.png")
            ]
        );
    }

    #[test]
    fn failure_replaces_gallery_and_reenables_trigger() {
        let mut session = session_with_image();
        settle_with(
            &mut session,
            PosterSet {
                title: "Dune".to_string(),
                description: String::new(),
                outputs: vec![OutputFileId::from("p1.png")],
            },
        );
        let submission_id = start(&mut session);
        session.apply(SessionEvent::SubmissionSettled {
            submission_id,
            outcome: Err(UiError::from_message(
                UiErrorContext::Submission,
                "Could not reach the poster generation service",
            )),
        });

        let view = project(&session, BASE);
        assert!(view.result.is_none());
        assert!(view.trigger.enabled);
        assert_eq!(view.trigger.label, "Generate Posters");
    }
}
