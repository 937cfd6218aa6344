//! Modal dialogs: note editing, confirmation and error reporting

use chrono::NaiveDate;
use eframe::egui;

/// What the user did with the note dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteOutcome {
    Save(NaiveDate, String),
    Cancel,
}

/// Editor for one day's note
#[derive(Debug, Default)]
pub struct NoteDialog {
    date: Option<NaiveDate>,
    text: String,
    focus_pending: bool,
}

impl NoteDialog {
    pub fn open(&mut self, date: NaiveDate, existing: &str) {
        self.date = Some(date);
        self.text = existing.to_string();
        self.focus_pending = true;
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<NoteOutcome> {
        let date = self.date?;
        let editor_id = egui::Id::new("note_dialog_text");
        let mut outcome = None;

        egui::Window::new(format!("Note for {}", date.format("%B %-d, %Y")))
            .id(egui::Id::new("note_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                // Escape only counts while the editor has focus
                let escape = ui.memory(|m| m.has_focus(editor_id))
                    && ui.input(|i| i.key_pressed(egui::Key::Escape));
                if escape {
                    outcome = Some(NoteOutcome::Cancel);
                }

                let editor = ui.add(
                    egui::TextEdit::multiline(&mut self.text)
                        .id(editor_id)
                        .desired_rows(8)
                        .desired_width(320.0),
                );
                if self.focus_pending {
                    self.focus_pending = !editor.has_focus();
                    editor.request_focus();
                }

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        outcome = Some(NoteOutcome::Cancel);
                    }
                    if ui.button("Save").clicked() {
                        outcome = Some(NoteOutcome::Save(date, self.text.clone()));
                    }
                });
            });

        if outcome.is_some() {
            self.date = None;
            self.text.clear();
        }
        outcome
    }
}

/// Yes/no question shown over everything else
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    message: Option<String>,
}

impl ConfirmDialog {
    pub fn ask(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Returns `Some(true)` on confirm, `Some(false)` on cancel
    pub fn show(&mut self, ctx: &egui::Context) -> Option<bool> {
        let message = self.message.as_ref()?;
        let mut answer = None;

        egui::Window::new("Confirm")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message.as_str());
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("No").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if answer.is_some() {
            self.message = None;
        }
        answer
    }
}

/// Shows failed user actions; the app keeps running
#[derive(Debug, Default)]
pub struct ErrorDialog {
    message: Option<String>,
}

impl ErrorDialog {
    pub fn report(&mut self, err: &anyhow::Error) {
        tracing::error!("{:#}", err);
        self.message = Some(format!("{err:#}"));
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(message) = self.message.as_ref() else {
            return;
        };
        let mut dismissed = false;

        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Something went wrong:");
                ui.colored_label(ui.visuals().error_fg_color, message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.message = None;
        }
    }
}
