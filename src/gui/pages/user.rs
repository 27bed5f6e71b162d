// src/gui/pages/user.rs
use eframe::egui;

use crate::{
    config::options::{
        CollectionKind,
        PageKind::{self, *},
    },
    gui::{actions, app::App, components::pager},
};

use super::Page;

pub struct UserTab;
pub static PAGE: UserTab = UserTab;

impl Page for UserTab {
    fn label(&self) -> &'static str { "Your Games" }
    fn kind(&self) -> PageKind { YourGames }

    fn empty_message(&self) -> &'static str {
        "Enter your BGG username, then Reveal a list or ask for recommendations."
    }

    fn draw_controls(&self, ui: &mut egui::Ui, app: &mut App) {
        let ctx = ui.ctx().clone();

        ui.horizontal(|ui| {
            ui.label("BGG username:");
            ui.add(egui::TextEdit::singleline(&mut app.state.gui.username).desired_width(200.0));

            let kind = &mut app.state.options.collection;
            let before = *kind;
            egui::ComboBox::from_id_salt("collection_kind")
                .selected_text(kind.label())
                .show_ui(ui, |ui| {
                    for k in CollectionKind::ALL {
                        ui.selectable_value(kind, k, k.label());
                    }
                });
            if *kind != before {
                logf!("UI: Collection list → {:?}", kind);
            }

            if ui.add_enabled(!app.running, egui::Button::new("Reveal")).clicked() {
                actions::reveal(app, &ctx);
            }
            if ui.add_enabled(!app.running, egui::Button::new("Recommend")).clicked() {
                actions::recommend(app, &ctx);
            }
        });

        if !app.showing_collection || app.collection.is_empty() {
            return;
        }
        let pages = app.collection.len().div_ceil(crate::config::consts::PAGE_SIZE);
        let label = format!("Page {} of {}", app.state.gui.collection_page + 1, pages);
        let has_prev = app.state.gui.collection_page > 0;
        match pager::draw(ui, &label, has_prev, app.collection_has_next(), true) {
            Some(pager::Turn::Prev) => {
                app.state.gui.collection_page -= 1;
                app.show_collection_page();
            }
            Some(pager::Turn::Next) => {
                app.state.gui.collection_page += 1;
                app.show_collection_page();
            }
            None => {}
        }
    }
}
