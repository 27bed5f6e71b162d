// src/gui/components/pager.rs
use eframe::egui;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Prev,
    Next,
}

/// Prev / label / Next. Returns the button pressed this frame, if any.
pub fn draw(ui: &mut egui::Ui, label: &str, has_prev: bool, has_next: bool, enabled: bool) -> Option<Turn> {
    let mut turn = None;
    ui.horizontal(|ui| {
        if ui.add_enabled(enabled && has_prev, egui::Button::new("◀ Prev")).clicked() {
            turn = Some(Turn::Prev);
        }
        ui.label(label);
        if ui.add_enabled(enabled && has_next, egui::Button::new("Next ▶")).clicked() {
            turn = Some(Turn::Next);
        }
    });
    turn
}
