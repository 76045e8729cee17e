// src/lib.rs
//! Diorama
//!
//! An interactive 3D vignette viewer built on wgpu and winit: scenes of
//! clickable props loaded behind a progress bar, with ray picking, scene
//! navigation and popup text.

pub mod app;
pub mod assets;
pub mod gfx;
pub mod interaction;
pub mod scenes;
pub mod session;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::DioramaApp;

/// Creates the application for a named vignette, when one exists.
pub fn vignette(name: &str) -> Option<DioramaApp> {
    let config = scenes::by_name(name)?;
    Some(pollster::block_on(DioramaApp::new(config)))
}

/// Creates the room vignette application
pub fn room() -> DioramaApp {
    pollster::block_on(DioramaApp::new(scenes::room::config()))
}

/// Creates the goodnews vignette application
pub fn goodnews() -> DioramaApp {
    pollster::block_on(DioramaApp::new(scenes::goodnews::config()))
}
