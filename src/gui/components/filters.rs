// src/gui/components/filters.rs
//
// The collapsible Search filters panel. Edits `options.search` in place;
// nothing runs until Search is pressed.

use std::ops::RangeInclusive;

use eframe::egui;

use crate::config::consts::{COMPLEXITY_STEP, DEFAULT_MAX_COMPLEXITY};
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let f = &mut app.state.options.search;

    egui::Grid::new("search_filters")
        .num_columns(4)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            ui.label("Min players");
            opt_number(ui, &mut f.min_players, 1, 1..=20);
            ui.label("Max players");
            opt_number(ui, &mut f.max_players, 4, 1..=100);
            ui.end_row();

            ui.label("Min duration (min)");
            opt_number(ui, &mut f.min_duration, 30, 0..=1200);
            ui.label("Max duration (min)");
            opt_number(ui, &mut f.max_duration, 120, 0..=1200);
            ui.end_row();

            ui.label("Year from");
            opt_number(ui, &mut f.min_year, 2000, -3500..=2100);
            ui.label("Year to");
            opt_number(ui, &mut f.max_year, 2025, -3500..=2100);
            ui.end_row();

            ui.label("Categories");
            multiselect(ui, "filter_categories", &app.categories, &mut f.categories);
            ui.label("Mechanics");
            multiselect(ui, "filter_mechanics", &app.mechanics, &mut f.mechanics);
            ui.end_row();

            ui.label("Designers");
            ui.text_edit_singleline(&mut f.designers);
            ui.label("Artists");
            ui.text_edit_singleline(&mut f.artists);
            ui.end_row();

            ui.label("Publishers");
            ui.text_edit_singleline(&mut f.publishers);
            ui.label("Title");
            ui.add_enabled(
                f.query.trim().is_empty(),
                egui::TextEdit::singleline(&mut f.title),
            )
            .on_disabled_hover_text("The search box takes priority");
            ui.end_row();

            ui.label("Max complexity");
            ui.add(egui::Slider::new(&mut f.max_complexity, 1.0..=DEFAULT_MAX_COMPLEXITY).step_by(COMPLEXITY_STEP));
            ui.label("Min age");
            opt_number(ui, &mut f.min_age, 8, 0..=21);
            ui.end_row();

            ui.label("Max results");
            ui.horizontal(|ui| {
                ui.add(egui::DragValue::new(&mut f.max_results).range(0..=100_000));
                if f.max_results == 0 {
                    ui.weak("unlimited");
                }
            });
            ui.end_row();
        });
}

/// Checkbox + number; unchecked means "no filter".
fn opt_number(ui: &mut egui::Ui, value: &mut Option<i64>, default: i64, range: RangeInclusive<i64>) {
    ui.horizontal(|ui| {
        let mut on = value.is_some();
        if ui.checkbox(&mut on, "").changed() {
            *value = on.then_some(value.unwrap_or(default));
        }
        match value.as_mut() {
            Some(v) => {
                ui.add(egui::DragValue::new(v).range(range));
            }
            None => {
                ui.weak("any");
            }
        }
    });
}

fn multiselect(ui: &mut egui::Ui, id: &str, options: &[String], selected: &mut Vec<String>) {
    let text = match selected.len() {
        0 => s!("Any"),
        1 => selected[0].clone(),
        n => format!("{n} selected"),
    };
    egui::ComboBox::from_id_salt(id)
        .selected_text(text)
        .width(200.0)
        .show_ui(ui, |ui| {
            if options.is_empty() {
                ui.weak("No values in the games database");
            }
            for o in options {
                let mut on = selected.contains(o);
                if ui.checkbox(&mut on, o.as_str()).changed() {
                    if on {
                        selected.push(o.clone());
                    } else {
                        selected.retain(|s| s != o);
                    }
                }
            }
        });
}
