//! Month calendar with per-day notes

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText};

use crate::app::OrganizerApp;
use crate::core::calendar::today;

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
const CELL_SIZE: [f32; 2] = [30.0, 28.0];
const ACCENT: Color32 = Color32::from_rgb(0, 200, 220);

/// Calendar panel
pub struct CalendarPanel;

impl CalendarPanel {
    /// Show the calendar panel
    pub fn show(ui: &mut egui::Ui, app: &mut OrganizerApp) {
        ui.horizontal(|ui| {
            if ui.button("\u{25C0}").on_hover_text("Previous month").clicked() {
                app.month = app.month.prev();
            }
            ui.strong(app.month.label());
            if ui.button("\u{25B6}").on_hover_text("Next month").clicked() {
                app.month = app.month.next();
            }
        });

        ui.separator();

        let today = today();
        let cells = app.month.cells();

        egui::Grid::new("calendar_grid")
            .num_columns(7)
            .spacing([2.0, 2.0])
            .show(ui, |ui| {
                for day in WEEKDAYS {
                    ui.weak(day);
                }
                ui.end_row();

                for week in cells.chunks(7) {
                    for cell in week {
                        match cell {
                            Some(date) => Self::show_day(ui, app, *date, today),
                            None => {
                                ui.label("");
                            }
                        }
                    }
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.weak("Right-click a day to edit its note");
    }

    fn show_day(ui: &mut egui::Ui, app: &mut OrganizerApp, date: NaiveDate, today: NaiveDate) {
        let mut text = RichText::new(date.day().to_string());
        if date == today {
            text = text.color(ACCENT).strong();
        }

        let response = ui.add_sized(CELL_SIZE, egui::Button::new(text).frame(false));

        let has_note = app.notes.has(date);
        let note = app.notes.get(date).unwrap_or_default().to_string();
        let response = if has_note {
            let dot = response.rect.center_bottom() - egui::vec2(0.0, 3.0);
            ui.painter().circle_filled(dot, 2.0, ACCENT);
            response.on_hover_text(note.as_str())
        } else {
            response
        };

        if response.double_clicked() {
            app.note_dialog.open(date, &note);
        }

        response.context_menu(|ui| {
            if ui.button("Edit note").clicked() {
                app.note_dialog.open(date, &note);
                ui.close();
            }
            if ui
                .add_enabled(has_note, egui::Button::new("Delete note"))
                .clicked()
            {
                app.notes.remove(date);
                app.notes_changed = true;
                ui.close();
            }
        });
    }
}
