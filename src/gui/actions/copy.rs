// src/gui/actions/copy.rs
use eframe::egui;
use crate::{gui::app::App, file};

pub fn copy(app: &mut App, ui_ctx: &egui::Context) {
    let kind = app.current_page_kind();

    let Some(view) = app.current_view().filter(|v| !v.is_empty()) else {
        app.status("Nothing to copy");
        logd!("Copy: Clicked, but there's nothing to copy");
        return;
    };

    logf!("Copy: page={:?}, rows={}, headers={}", kind, view.rows.len(), view.headers.len());
    let txt = file::export_text(&app.state.options.export, view);

    ui_ctx.copy_text(txt);
    app.status("Copied to clipboard");
}
