// src/gui/actions/export.rs
use crate::{gui::app::App, file};

pub fn export(app: &mut App) {
    // normalize out_path first (mutates app) before any &app borrows
    if app.out_path_dirty {
        app.state.options.export.set_path(&app.out_path_text);
        logf!(
            "Export: Out path set → {}",
            app.state.options.export.out_path().display()
        );
        app.out_path_dirty = false;
    }

    let kind = app.current_page_kind();

    let status_msg = match app.current_view().filter(|v| !v.is_empty()) {
        None => {
            logd!("Export: Clicked, but there's nothing to export");
            s!("Nothing to export")
        }
        Some(view) => {
            logf!("Export: Begin page={:?}, rows={}", kind, view.rows.len());
            match file::write_export(&app.state.options.export, view) {
                Ok(path) => {
                    logf!("Export: OK → {}", path.display());
                    format!("Exported {} rows to {}", view.rows.len(), path.display())
                }
                Err(e) => {
                    loge!("Export: Error: {}", e);
                    format!("Export error: {e}")
                }
            }
        }
    };

    // the text field shows what was actually written
    app.out_path_text = app.state.options.export.out_path().to_string_lossy().into_owned();
    app.status(status_msg);
}
