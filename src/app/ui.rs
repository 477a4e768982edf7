use super::{ExtractLanguage, PdfUploader};
use crate::utils::color::{status_color, ColorExt, PROGRESS_FILL};
use crate::utils::file_size::format_size;
use eframe::egui::{self, Color32, RichText};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

enum UiAction {
    PickFile,
    DroppedFile(PathBuf),
    ClearSelection,
    CancelUpload,
    Extract,
    CopyTempFilename,
    SetLanguage(ExtractLanguage),
    DismissAlert,
    CloseManualCopy,
}

/// Registers `path` as a fallback font so CJK status text renders.
pub fn install_fallback_font(ctx: &egui::Context, path: &Path) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not load font {}: {}", path.display(), e);
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("fallback".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("fallback".to_owned());
    }
    ctx.set_fonts(fonts);
    info!("Loaded fallback font {}", path.display());
}

impl PdfUploader {
    pub fn setup_fonts(&self, ctx: &egui::Context) {
        if let Some(path) = &self.font_path {
            install_fallback_font(ctx, path);
        }
    }

    pub fn render(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        if let Some(path) = ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone())) {
            actions.push(UiAction::DroppedFile(path));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.heading(self.locale.title());
                });
                ui.add_space(20.0);

                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        if ui.button(self.locale.choose_file()).clicked() {
                            actions.push(UiAction::PickFile);
                        }
                        if !self.model.file_name_display.is_empty() {
                            let size = self.selected_size.map(format_size).unwrap_or_default();
                            ui.label(format!("{} ({})", self.model.file_name_display, size));
                            if ui.small_button(self.locale.clear()).clicked() {
                                actions.push(UiAction::ClearSelection);
                            }
                        }
                    });

                    let status = &self.model.upload_status;
                    if status.visible {
                        ui.add_space(6.0);
                        ui.horizontal(|ui| {
                            ui.colored_label(status_color(status.class), &status.text);
                            if self.controller.is_uploading()
                                && ui.small_button(self.locale.cancel()).clicked()
                            {
                                actions.push(UiAction::CancelUpload);
                            }
                        });
                    }
                });

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.label(self.locale.language_label());
                    for language in [ExtractLanguage::En, ExtractLanguage::Cn] {
                        if ui
                            .radio(self.language == language, language.label(self.locale))
                            .clicked()
                        {
                            actions.push(UiAction::SetLanguage(language));
                        }
                    }
                });

                if !self.model.form.temp_filename.is_empty() {
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        ui.label(self.locale.uploaded_as());
                        ui.monospace(&self.model.form.temp_filename);
                        let label = if self.copy_feedback.is_showing(Instant::now()) {
                            self.locale.copied()
                        } else {
                            self.locale.copy()
                        };
                        if ui.small_button(label).clicked() {
                            actions.push(UiAction::CopyTempFilename);
                        }
                    });
                }

                ui.add_space(16.0);
                ui.vertical_centered(|ui| {
                    let button = &self.model.extract_button;
                    match button.processing {
                        Some(percent) => {
                            let fill = Color32::from_hex(PROGRESS_FILL).unwrap_or(Color32::LIGHT_BLUE);
                            ui.add(
                                egui::ProgressBar::new(percent as f32 / 100.0)
                                    .text(&button.label)
                                    .fill(fill)
                                    .desired_width(200.0),
                            );
                        }
                        None => {
                            let extract = egui::Button::new(&button.label).min_size(egui::vec2(200.0, 40.0));
                            if ui.add_enabled(button.enabled, extract).clicked() {
                                actions.push(UiAction::Extract);
                            }
                        }
                    }
                });

                let results = &self.model.results_section;
                if results.active {
                    ui.add_space(16.0);
                    ui.group(|ui| {
                        ui.set_width(ui.available_width());
                        if results.body.is_empty() {
                            ui.spinner();
                        } else {
                            ui.label(RichText::new(&results.body).monospace());
                        }
                    });
                }
            });
        });

        self.render_dialogs(ctx, &mut actions);

        if self.copy_feedback.is_showing(Instant::now()) {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        for action in actions {
            self.apply(action, ctx);
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        if let Some(message) = &self.alert {
            egui::Window::new("⚠")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        actions.push(UiAction::DismissAlert);
                    }
                });
        }

        if let Some(text) = &mut self.copy_buffer.pending {
            egui::Window::new(self.locale.copy())
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.add(egui::TextEdit::singleline(text).desired_width(320.0));
                    if ui.button("OK").clicked() {
                        actions.push(UiAction::CloseManualCopy);
                    }
                });
        }
    }

    fn apply(&mut self, action: UiAction, ctx: &egui::Context) {
        match action {
            UiAction::PickFile => self.pick_file(),
            UiAction::DroppedFile(path) => self.select_path(&path),
            UiAction::ClearSelection => self.on_file_selected(None),
            UiAction::CancelUpload => {
                self.cancel_upload();
            }
            UiAction::Extract => {
                self.submit_extraction();
            }
            UiAction::CopyTempFilename => self.copy_temp_filename(),
            UiAction::SetLanguage(language) => self.language = language,
            UiAction::DismissAlert => self.alert = None,
            UiAction::CloseManualCopy => self.copy_buffer.pending = None,
        }
        ctx.request_repaint();
    }
}
