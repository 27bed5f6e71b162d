// src/gui/pages/hot.rs
use eframe::egui;

use crate::{
    config::options::PageKind::{self, *},
    gui::{actions, app::App},
};

use super::Page;

pub struct HotTab;
pub static PAGE: HotTab = HotTab;

impl Page for HotTab {
    fn label(&self) -> &'static str { "Hot Games" }
    fn kind(&self) -> PageKind { HotGames }

    fn empty_message(&self) -> &'static str {
        "Press Load to fetch BGG's current hot list."
    }

    fn draw_controls(&self, ui: &mut egui::Ui, app: &mut App) {
        let ctx = ui.ctx().clone();
        ui.horizontal(|ui| {
            if ui.add_enabled(!app.running, egui::Button::new("Load")).clicked() {
                actions::hot(app, &ctx, false);
            }
            if ui
                .add_enabled(!app.running, egui::Button::new("Refresh"))
                .on_hover_text("Ignore the 10-minute cache")
                .clicked()
            {
                actions::hot(app, &ctx, true);
            }
            if let Some(age) = app.hot_cache.age() {
                ui.weak(format!("fetched {} min ago", age.as_secs() / 60));
            }
        });
    }
}
