// src/gui/components/tabs.rs
//
// Renders the top tabs and performs the tab switch itself. The default
// export file name follows the tab until the user types their own path.

use eframe::egui;

use crate::config::options::PageKind;
use crate::gui::{actions, app::App, router};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let ctx = ui.ctx().clone();

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let cur = app.current_index();

        for (idx, page) in router::all_pages().iter().enumerate() {
            let selected = idx == cur;

            if ui.selectable_label(selected, page.label()).clicked() && !selected {
                let prev = app.current_page_kind();
                app.set_current_index(idx);
                let kind = page.kind();
                logf!("UI: Tab switch {:?} → {:?}", prev, kind);

                let export = &mut app.state.options.export;
                export.set_default_stem_for(kind);
                if !app.out_path_dirty {
                    app.out_path_text = export.out_path().to_string_lossy().into_owned();
                }

                // Hot list loads on first visit
                if kind == PageKind::HotGames && !app.views.contains_key(&kind) && !app.running {
                    actions::hot(app, &ctx, false);
                }
            }
        }
    });
}
