//! Floating window showing one category's files

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::core::category::{Category, FileIcon};

const DEFAULT_POS: f32 = 100.0;
const DEFAULT_SIZE: [f32; 2] = [280.0, 200.0];
const ICON_SIZE: [f32; 2] = [72.0, 64.0];
const MAX_LABEL_CHARS: usize = 14;

/// Something the user asked for inside a category window.
///
/// Collected while drawing and applied by the app afterwards, once the
/// board is no longer borrowed.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryAction {
    Open(PathBuf),
    MoveHere { name: String, to: String },
    ReturnToDesktop { id: String, name: String },
    AddFiles { id: String },
    NewCategory,
    Delete { id: String },
}

/// Drag payload for moving an icon between windows
#[derive(Debug, Clone)]
pub struct FileDrag {
    pub name: String,
}

/// Category window
pub struct CategoryWindow;

impl CategoryWindow {
    /// Stable egui id of a category's window, also its layer id
    pub fn window_id(category_id: &str) -> egui::Id {
        egui::Id::new(("category", category_id))
    }

    /// Show the window and record its geometry back into the category
    pub fn show(ctx: &egui::Context, category: &mut Category, actions: &mut Vec<CategoryAction>) {
        let data = &category.data;
        let pos = egui::pos2(
            if data.x > 0.0 { data.x } else { DEFAULT_POS },
            if data.y > 0.0 { data.y } else { DEFAULT_POS },
        );
        let size = if data.width > 0.0 && data.height > 0.0 {
            egui::vec2(data.width, data.height)
        } else {
            DEFAULT_SIZE.into()
        };

        let response = egui::Window::new(data.title.clone())
            .id(Self::window_id(&data.id))
            .default_pos(pos)
            .default_size(size)
            .collapsible(true)
            .resizable(true)
            .show(ctx, |ui| Self::contents(ui, category, actions));

        if let Some(inner) = response {
            let rect = inner.response.rect;
            category.data.x = rect.min.x;
            category.data.y = rect.min.y;
            // Collapsed windows report only their title bar
            if inner.inner.is_some() {
                category.data.width = rect.width();
                category.data.height = rect.height();
            }
        }
    }

    fn contents(ui: &mut egui::Ui, category: &mut Category, actions: &mut Vec<CategoryAction>) {
        let id = category.id().to_string();

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut category.data.title)
                    .desired_width(ui.available_width() - 32.0),
            );
            ui.menu_button("\u{22EF}", |ui| {
                if ui.button("New category").clicked() {
                    actions.push(CategoryAction::NewCategory);
                    ui.close();
                }
                if ui.button("Add files...").clicked() {
                    actions.push(CategoryAction::AddFiles { id: id.clone() });
                    ui.close();
                }
                ui.separator();
                if ui.button("Delete category").clicked() {
                    actions.push(CategoryAction::Delete { id: id.clone() });
                    ui.close();
                }
            });
        });

        ui.separator();

        let (_, dropped) = ui.dnd_drop_zone::<FileDrag, ()>(egui::Frame::NONE, |ui| {
            ui.set_min_size(ui.available_size());
            egui::ScrollArea::vertical()
                .id_salt(("category_scroll", &id))
                .show(ui, |ui| {
                    if category.icons().is_empty() {
                        ui.weak("Drop files here");
                    }
                    ui.horizontal_wrapped(|ui| {
                        for icon in category.icons() {
                            Self::show_icon(ui, &id, icon, actions);
                        }
                    });
                });
        });

        if let Some(payload) = dropped {
            actions.push(CategoryAction::MoveHere {
                name: payload.name.clone(),
                to: id,
            });
        }
    }

    fn show_icon(ui: &mut egui::Ui, id: &str, icon: &FileIcon, actions: &mut Vec<CategoryAction>) {
        let label = format!("{}\n{}", glyph_for(&icon.name), shorten(&icon.name));
        let response = ui
            .add_sized(
                ICON_SIZE,
                egui::Button::new(label)
                    .frame(false)
                    .sense(egui::Sense::click_and_drag()),
            )
            .on_hover_text(&icon.name);

        response.dnd_set_drag_payload(FileDrag {
            name: icon.name.clone(),
        });

        if response.double_clicked() {
            actions.push(CategoryAction::Open(icon.path.clone()));
        }

        response.context_menu(|ui| {
            if ui.button("Open").clicked() {
                actions.push(CategoryAction::Open(icon.path.clone()));
                ui.close();
            }
            if ui.button("Return to desktop").clicked() {
                actions.push(CategoryAction::ReturnToDesktop {
                    id: id.to_string(),
                    name: icon.name.clone(),
                });
                ui.close();
            }
        });
    }
}

/// Pick a glyph for a file by extension
pub fn glyph_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "md" | "doc" | "docx" | "pdf" | "rtf" | "odt" => "\u{1F4DD}",
        "xls" | "xlsx" | "csv" | "ods" => "\u{1F4CA}",
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" => "\u{1F5BC}",
        "mp3" | "wav" | "flac" | "ogg" => "\u{1F3B5}",
        "mp4" | "mkv" | "avi" | "mov" => "\u{1F3AC}",
        "zip" | "rar" | "7z" | "gz" | "tar" => "\u{1F4E6}",
        "exe" | "lnk" | "url" | "bat" | "msi" => "\u{2699}",
        _ => "\u{1F4C4}",
    }
}

/// Trim long names so icons keep their width
fn shorten(name: &str) -> String {
    if name.chars().count() <= MAX_LABEL_CHARS {
        return name.to_string();
    }
    let head: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
    format!("{head}\u{2026}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs() {
        assert_eq!(glyph_for("Report.PDF"), "\u{1F4DD}");
        assert_eq!(glyph_for("setup.exe"), "\u{2699}");
        assert_eq!(glyph_for("README"), "\u{1F4C4}");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("a.txt"), "a.txt");
        let long = shorten("quarterly-report-final.docx");
        assert_eq!(long.chars().count(), MAX_LABEL_CHARS);
        assert!(long.ends_with('\u{2026}'));
    }
}
