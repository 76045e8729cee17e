//! Overlay widgets for a vignette session
//!
//! Two pieces of chrome: the loading screen shown until the readiness
//! gate reveals, and the popup window some props open. Both are plain
//! imgui windows drawn by the app's UI callback.

use imgui::{Condition, Ui, WindowFlags};

use crate::interaction::dispatch::PopupState;

/// Centered loading panel with the batch progress bar.
pub fn draw_loading(ui: &Ui, title: &str, progress: f32, display_size: [f32; 2]) {
    let panel = [360.0, 110.0];
    let position = [
        (display_size[0] - panel[0]) * 0.5,
        (display_size[1] - panel[1]) * 0.5,
    ];

    ui.window("loading")
        .position(position, Condition::Always)
        .size(panel, Condition::Always)
        .flags(
            WindowFlags::NO_TITLE_BAR
                | WindowFlags::NO_RESIZE
                | WindowFlags::NO_MOVE
                | WindowFlags::NO_COLLAPSE,
        )
        .build(|| {
            ui.text(title);
            ui.spacing();
            imgui::ProgressBar::new(progress.clamp(0.0, 1.0))
                .size([panel[0] - 16.0, 28.0])
                .overlay_text(format!("{:.0}%", progress * 100.0))
                .build(ui);
        });
}

/// The scene popup. Dismissed only through its Close button; scene clicks
/// never close it.
pub fn draw_popup(ui: &Ui, popup: &mut PopupState, display_size: [f32; 2]) {
    if !popup.is_visible() {
        return;
    }

    let panel = [420.0, 260.0];
    let position = [
        (display_size[0] - panel[0]) * 0.5,
        (display_size[1] - panel[1]) * 0.5,
    ];

    let mut close_requested = false;
    ui.window("letter")
        .position(position, Condition::Appearing)
        .size(panel, Condition::Appearing)
        .flags(WindowFlags::NO_COLLAPSE | WindowFlags::NO_RESIZE)
        .build(|| {
            ui.text_wrapped(popup.text());
            ui.spacing();
            ui.separator();
            if ui.button("Close") {
                close_requested = true;
            }
        });

    if close_requested {
        popup.close();
    }
}
