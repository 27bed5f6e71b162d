// src/gui/pages/mod.rs
use eframe::egui;

use crate::config::options::PageKind;
use crate::gui::app::App;

pub mod hot;
pub mod search;
pub mod user;

pub trait Page: Send + Sync + 'static {
    fn label(&self) -> &'static str;
    fn kind(&self) -> PageKind;

    /// Draw the page's controls above the export bar. Buttons start
    /// background tasks through `gui::actions`.
    fn draw_controls(&self, ui: &mut egui::Ui, app: &mut App);

    /// Shown in place of the table before anything has loaded.
    fn empty_message(&self) -> &'static str {
        "Nothing loaded yet"
    }
}
