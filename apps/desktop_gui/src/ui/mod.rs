//! UI layer for the desktop client: the egui shell and the pure view projection.

pub mod app;
pub mod view;

pub use app::PosterStudioApp;
