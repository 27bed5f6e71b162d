// src/gui/pages/search.rs
use eframe::egui;

use crate::{
    config::options::PageKind::{self, *},
    gui::{
        actions,
        app::App,
        components::{filters, pager},
    },
    search::SearchFilters,
};

use super::Page;

pub struct SearchTab;
pub static PAGE: SearchTab = SearchTab;

impl Page for SearchTab {
    fn label(&self) -> &'static str { "Search" }
    fn kind(&self) -> PageKind { Search }

    fn empty_message(&self) -> &'static str {
        "Enter a title or open the filters, then press Search."
    }

    fn draw_controls(&self, ui: &mut egui::Ui, app: &mut App) {
        let ctx = ui.ctx().clone();
        let mut go = false;

        ui.horizontal(|ui| {
            ui.label("Search:");
            let resp = ui.add(
                egui::TextEdit::singleline(&mut app.state.options.search.query)
                    .hint_text("Game title")
                    .desired_width(320.0),
            );
            go |= resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            go |= ui.add_enabled(!app.running, egui::Button::new("Search")).clicked();

            if ui.button("Reset").clicked() {
                app.state.options.search = SearchFilters::default();
                app.state.gui.search_page = 0;
                logf!("UI: Filters reset");
            }
            ui.toggle_value(&mut app.state.gui.filters_open, "Filters");
        });

        if app.state.gui.filters_open {
            filters::draw(ui, app);
        }

        if go && !app.running {
            app.state.gui.search_page = 0;
            actions::search(app, &ctx);
        }

        let Some(res) = &app.search_result else { return };
        if res.total == 0 {
            return;
        }
        let label = format!("Page {} of {}", res.page + 1, res.page_count());
        match pager::draw(ui, &label, res.has_prev(), res.has_next(), !app.running) {
            Some(pager::Turn::Prev) => {
                app.state.gui.search_page = app.state.gui.search_page.saturating_sub(1);
                actions::search(app, &ctx);
            }
            Some(pager::Turn::Next) => {
                app.state.gui.search_page += 1;
                actions::search(app, &ctx);
            }
            None => {}
        }
    }
}
