//! Main application state and UI coordination

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use eframe::egui;

use crate::core::board::Board;
use crate::core::calendar::{today, MonthCursor, Notes};
use crate::core::config::{AppConfig, CategoryData};
use crate::core::paths::AppPaths;
use crate::core::storage::Storage;
use crate::core::watcher::RENAME_SETTLE;
use crate::ui::calendar::CalendarPanel;
use crate::ui::category_window::{CategoryAction, CategoryWindow};
use crate::ui::dialogs::{ConfirmDialog, ErrorDialog, NoteDialog, NoteOutcome};

/// Offset between newly created category windows
const CASCADE_STEP: f32 = 30.0;

/// Main application state
pub struct OrganizerApp {
    /// Where config and storage live
    pub paths: AppPaths,
    /// Main window top-left, in screen points
    pub main_pos: egui::Pos2,
    /// Open categories
    pub board: Board,
    /// Calendar notes
    pub notes: Notes,
    /// Month shown by the calendar
    pub month: MonthCursor,
    /// Set when notes were edited this frame
    pub notes_changed: bool,
    /// Whether the calendar panel is folded away
    pub folded: bool,
    pub note_dialog: NoteDialog,
    pub confirm_clear: ConfirmDialog,
    pub error_dialog: ErrorDialog,
}

impl OrganizerApp {
    /// Prepare state before the window opens: create folders, load config,
    /// drop last month's notes and pull category files off the desktop.
    pub fn startup(paths: AppPaths) -> Result<Self> {
        paths.ensure_dirs()?;

        let config = AppConfig::load_from(&paths.config_file());
        let month = MonthCursor::current();
        let mut notes = Notes::from_map(config.calendar_notes);
        let pruned = notes.prune_outside(month);

        let board = Board::load(Storage::from_paths(&paths), config.categories);

        let app = Self {
            paths,
            main_pos: egui::pos2(config.main_x, config.main_y),
            board,
            notes,
            month,
            notes_changed: false,
            folded: false,
            note_dialog: NoteDialog::default(),
            confirm_clear: ConfirmDialog::default(),
            error_dialog: ErrorDialog::default(),
        };

        if pruned > 0 {
            tracing::info!("Removed {} notes from previous months", pruned);
            if let Err(e) = app.save_config() {
                tracing::warn!("{:#}", e);
            }
        }

        Ok(app)
    }

    /// Hook into the running UI: start watchers that wake the UI thread
    pub fn attach(mut self, cc: &eframe::CreationContext<'_>) -> Self {
        let ctx = cc.egui_ctx.clone();
        self.board
            .start_watchers(Some(Arc::new(move || ctx.request_repaint())));
        self
    }

    /// Build the persisted document from the current state
    pub fn to_config(&self, categories: Vec<CategoryData>) -> AppConfig {
        AppConfig {
            main_x: self.main_pos.x,
            main_y: self.main_pos.y,
            calendar_notes: self.notes.to_map(),
            categories,
        }
    }

    /// Save the current state without moving any files
    pub fn save_config(&self) -> Result<()> {
        let path = self.paths.config_file();
        self.to_config(self.board.snapshot())
            .save_to(&path)
            .with_context(|| format!("Could not save settings to {}", path.display()))
    }

    /// Add a category window, cascading from the previous one
    pub fn create_category(&mut self) -> Result<()> {
        let count = self.board.len() + 1;
        let offset = CASCADE_STEP * count as f32;

        let mut data = CategoryData::new(format!("Category {count}"));
        data.x = 240.0 + offset;
        data.y = 60.0 + offset;
        self.board.create(data);
        self.save_config()
    }

    /// Carry out one request from a category window
    pub fn apply(&mut self, action: CategoryAction) -> Result<()> {
        match action {
            CategoryAction::Open(path) => {
                open::that(&path).with_context(|| format!("Could not open {}", path.display()))?;
            }
            CategoryAction::MoveHere { name, to } => {
                self.board.assign(&name, &to);
            }
            CategoryAction::ReturnToDesktop { id, name } => {
                if !self.board.return_file(&id, &name) {
                    bail!("Could not return {} to the desktop", name);
                }
            }
            CategoryAction::AddFiles { id } => {
                let picked = rfd::FileDialog::new()
                    .set_directory(self.board.storage().desktop_dir())
                    .pick_files();
                if let Some(files) = picked {
                    self.adopt_files(&files, &id)?;
                }
            }
            CategoryAction::NewCategory => self.create_category()?,
            CategoryAction::Delete { id } => {
                self.board.delete(&id);
                self.save_config()?;
            }
        }
        Ok(())
    }

    /// Move dropped or picked files into a category
    pub fn adopt_files(&mut self, files: &[PathBuf], id: &str) -> Result<()> {
        let failed: Vec<String> = files
            .iter()
            .filter(|path| self.board.adopt_path(path, id).is_none())
            .map(|path| path.display().to_string())
            .collect();

        if !failed.is_empty() {
            bail!("Could not move into storage:\n{}", failed.join("\n"));
        }
        Ok(())
    }

    /// Files dropped from the OS go to the category window under the pointer
    fn handle_os_drops(&mut self, ctx: &egui::Context) {
        let (files, pointer) = ctx.input(|i| {
            let files: Vec<PathBuf> = i
                .raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect();
            (files, i.pointer.latest_pos())
        });
        if files.is_empty() {
            return;
        }

        let layer = pointer.and_then(|pos| ctx.layer_id_at(pos));
        let target = layer.and_then(|layer| {
            self.board
                .categories()
                .iter()
                .find(|c| CategoryWindow::window_id(c.id()) == layer.id)
                .map(|c| c.id().to_string())
        });

        match target {
            Some(id) => {
                if let Err(e) = self.adopt_files(&files, &id) {
                    self.error_dialog.report(&e);
                }
            }
            None => tracing::info!("Ignoring {} files dropped outside any category", files.len()),
        }
    }

    fn track_main_window(&mut self, ctx: &egui::Context) {
        if let Some(rect) = ctx.input(|i| i.viewport().outer_rect) {
            self.main_pos = rect.min;
        }
    }

    /// Render the top toolbar
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(today().format("%Y-%m-%d").to_string());
                ui.separator();

                if ui.button("New category").clicked() {
                    if let Err(e) = self.create_category() {
                        self.error_dialog.report(&e);
                    }
                }

                let fold_label = if self.folded { "\u{25BC} Calendar" } else { "\u{25B2} Calendar" };
                if ui.button(fold_label).on_hover_text("Fold or unfold the calendar").clicked() {
                    self.folded = !self.folded;
                }

                if ui
                    .add_enabled(!self.notes.is_empty(), egui::Button::new("Clear all notes"))
                    .clicked()
                {
                    self.confirm_clear.ask("Clear the notes of every day?");
                }
            });
        });
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(NoteOutcome::Save(date, text)) = self.note_dialog.show(ctx) {
            self.notes.set(date, &text);
            self.notes_changed = true;
        }

        if self.confirm_clear.show(ctx) == Some(true) {
            self.notes.clear();
            self.notes_changed = true;
        }

        self.error_dialog.show(ctx);
    }
}

impl eframe::App for OrganizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.track_main_window(ctx);

        // Storage changes made outside the app
        self.board.poll_watchers();
        self.board.refresh_changed();
        if self.board.watch_pending() {
            ctx.request_repaint_after(RENAME_SETTLE);
        }

        self.handle_os_drops(ctx);

        self.render_toolbar(ctx);

        if !self.folded {
            egui::SidePanel::left("calendar")
                .resizable(false)
                .default_width(240.0)
                .show(ctx, |ui| {
                    CalendarPanel::show(ui, self);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.board.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(80.0);
                    ui.label("No categories yet");
                    ui.label("Create one, then drop desktop files onto it");
                });
            }
        });

        let mut actions = Vec::new();
        for category in self.board.categories_mut() {
            CategoryWindow::show(ctx, category, &mut actions);
        }
        for action in actions {
            if let Err(e) = self.apply(action) {
                self.error_dialog.report(&e);
            }
        }
        self.board.refresh_changed();

        self.render_dialogs(ctx);

        if std::mem::take(&mut self.notes_changed) {
            if let Err(e) = self.save_config() {
                self.error_dialog.report(&e);
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let categories = self.board.shutdown();
        let path = self.paths.config_file();
        match self.to_config(categories).save_to(&path) {
            Ok(()) => tracing::info!("Desktop Organizer stopped"),
            Err(e) => tracing::error!("Failed to save config on exit: {}", e),
        }
    }
}
