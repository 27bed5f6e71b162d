// src/gui/components/data_table.rs
//
// Draws the current tab's table. Purely a view over `App::views`.

use eframe::egui::{self, Align, Layout, RichText};
use egui_extras::{Column, TableBuilder};

use crate::data::DataSet;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &App) {
    let page = app.current_page();
    let kind = page.kind();

    let Some(view) = app.current_view().filter(|v| !v.headers.is_empty()) else {
        ui.add_space(12.0);
        ui.weak(page.empty_message());
        return;
    };

    let cols = view.headers.len();
    let numeric: Vec<bool> = (0..cols).map(|c| is_numeric(view, c)).collect();

    // Reserve space for scroll bars instead of floating them over the rows
    {
        let s = &mut ui.style_mut().spacing.scroll;
        s.floating = false;
        s.bar_width = 10.0;
        s.handle_min_length = 48.0;
    }

    let avail_h = ui.available_height();
    egui::ScrollArea::horizontal()
        .id_salt(("table_hscroll", kind))
        .show(ui, |ui| {
            let mut table = TableBuilder::new(ui)
                .striped(true)
                .min_scrolled_height(0.0)
                .max_scroll_height(avail_h)
                .cell_layout(Layout::left_to_right(Align::Center))
                .id_salt(("table_state", kind, cols));

            for h in &view.headers {
                table = table.column(Column::initial(initial_width(h)).resizable(true).clip(true).at_least(24.0));
            }

            table
                .header(24.0, |mut header| {
                    for h in &view.headers {
                        header.col(|ui| {
                            ui.add(egui::Label::new(RichText::new(h).strong()).selectable(false));
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, view.rows.len(), |mut row| {
                        let cells = &view.rows[row.index()];
                        for (c, &num) in numeric.iter().enumerate() {
                            let text = cells.get(c).map(String::as_str).unwrap_or("");
                            row.col(|ui| {
                                if num {
                                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                        ui.label(text);
                                    });
                                } else {
                                    ui.add(egui::Label::new(text).truncate());
                                }
                            });
                        }
                    });
                });
        });
}

/// Right-align a column when every non-empty cell is a number.
fn is_numeric(view: &DataSet, col: usize) -> bool {
    let mut any = false;
    for r in &view.rows {
        match r.get(col).map(|s| s.trim()) {
            Some("") | None => {}
            Some(s) if s.parse::<f64>().is_ok() => any = true,
            Some(_) => return false,
        }
    }
    any
}

fn initial_width(header: &str) -> f32 {
    match header {
        "No." => 44.0,
        "Title" => 240.0,
        "Reason" => 460.0,
        "Type / Category" | "Designers" | "Artists" | "Publishers" | "Mechanics" => 180.0,
        _ => 90.0,
    }
}
