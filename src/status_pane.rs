// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::status::{DiagnosticLevel, SystemStatus};
use quake_feed::DatasetState;

const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(130, 130, 130);
const VALUE_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 200, 200);
const HEADER_COLOR: egui::Color32 = egui::Color32::from_rgb(150, 150, 150);
const OK_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 255, 100);
const PENDING_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 200, 100);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);

pub struct StatusPane {
    pub visible: bool,
    pub collapsed: bool,
}

impl StatusPane {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            collapsed: false,
        }
    }

    /// Render the status pane as a floating window
    pub fn render(&mut self, ctx: &egui::Context, status: &SystemStatus) {
        if !self.visible {
            // Show a small button to re-open the status pane when hidden
            egui::Window::new("show_status")
                .title_bar(false)
                .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -30.0))
                .fixed_size(egui::vec2(140.0, 35.0))
                .resizable(false)
                .frame(pane_frame(ctx, 200))
                .show(ctx, |ui| {
                    if ui
                        .button(
                            egui::RichText::new("📊 Show Status")
                                .color(egui::Color32::from_rgb(150, 200, 220))
                                .size(11.0),
                        )
                        .clicked()
                    {
                        self.visible = true;
                    }
                });
            return;
        }

        let screen_height = ctx.screen_rect().height();

        egui::Window::new("Status")
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -30.0))
            .fixed_size(egui::vec2(
                280.0,
                if self.collapsed { 40.0 } else { screen_height.min(420.0) },
            ))
            .resizable(false)
            .collapsible(false)
            .title_bar(false)
            .frame(pane_frame(ctx, 230))
            .show(ctx, |ui| {
                // Header with collapse and close buttons
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("◈ STATUS")
                            .color(egui::Color32::from_rgb(100, 180, 220))
                            .size(12.0)
                            .strong(),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .button(egui::RichText::new("✕").size(12.0).color(ERROR_COLOR))
                            .on_hover_text("Hide status pane")
                            .clicked()
                        {
                            self.visible = false;
                        }

                        ui.add_space(4.0);

                        let collapse_icon = if self.collapsed { "▼" } else { "▲" };
                        if ui
                            .button(egui::RichText::new(collapse_icon).size(10.0))
                            .on_hover_text(if self.collapsed { "Expand" } else { "Collapse" })
                            .clicked()
                        {
                            self.collapsed = !self.collapsed;
                        }
                    });
                });

                if self.collapsed {
                    return;
                }

                ui.separator();

                egui::ScrollArea::vertical()
                    .max_height(screen_height.min(380.0))
                    .show(ui, |ui| {
                        render_data_section(ui, status);
                        ui.add_space(6.0);
                        render_base_map_section(ui, status);
                        ui.add_space(6.0);
                        render_performance_section(ui, status);
                        ui.add_space(6.0);
                        render_diagnostics_section(ui, status);
                    });
            });
    }
}

fn pane_frame(ctx: &egui::Context, alpha: u8) -> egui::Frame {
    egui::Frame::window(&ctx.style())
        .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, alpha))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
        .corner_radius(6.0)
}

fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).color(HEADER_COLOR).size(10.0).strong());
    ui.add_space(3.0);
}

fn render_dataset_row(ui: &mut egui::Ui, name: &str, state: &DatasetState, unit: &str, url: &str) {
    ui.horizontal(|ui| {
        let (icon, color) = match state {
            DatasetState::Pending => ("⏳", PENDING_COLOR),
            DatasetState::Loaded(_) => ("✓", OK_COLOR),
            DatasetState::Failed(_) => ("✕", ERROR_COLOR),
        };
        ui.label(egui::RichText::new(icon).color(color).size(10.0));
        ui.label(egui::RichText::new(name).color(LABEL_COLOR).size(9.0))
            .on_hover_text(url);

        let text = match state {
            DatasetState::Pending => "Loading...".to_string(),
            DatasetState::Loaded(count) => format!("{} {}", count, unit),
            DatasetState::Failed(_) => "Unavailable".to_string(),
        };
        let label = ui.label(egui::RichText::new(text).color(VALUE_COLOR).size(8.0).monospace());
        if let DatasetState::Failed(reason) = state {
            label.on_hover_text(reason);
        }
    });
}

fn render_data_section(ui: &mut egui::Ui, status: &SystemStatus) {
    section_header(ui, "DATA");

    render_dataset_row(ui, "Earthquakes:", &status.earthquakes, "markers", &status.earthquake_url);
    render_dataset_row(ui, "Plates:", &status.plates, "geometries", &status.plates_url);

    if status.skipped_features > 0 {
        ui.label(
            egui::RichText::new(format!("{} features skipped", status.skipped_features))
                .color(PENDING_COLOR)
                .size(8.0),
        );
    }

    if let Some(seconds) = status.load_seconds() {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Loaded in:").color(LABEL_COLOR).size(9.0));
            ui.label(
                egui::RichText::new(format!("{:.1}s", seconds))
                    .color(VALUE_COLOR)
                    .size(9.0)
                    .monospace(),
            );
        });
    }
}

fn render_base_map_section(ui: &mut egui::Ui, status: &SystemStatus) {
    section_header(ui, "BASE MAP");

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Style:").color(LABEL_COLOR).size(9.0));
        ui.label(
            egui::RichText::new(&status.base_layer_name)
                .color(VALUE_COLOR)
                .size(9.0)
                .monospace(),
        );
    });

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Tiles:").color(LABEL_COLOR).size(9.0));
        let (text, color) = if !status.has_access_token {
            ("no access token".to_string(), ERROR_COLOR)
        } else if status.tile_errors > 0 {
            (format!("{} failed", status.tile_errors), PENDING_COLOR)
        } else if status.tiles_loading {
            ("loading".to_string(), PENDING_COLOR)
        } else {
            ("ok".to_string(), OK_COLOR)
        };
        ui.label(egui::RichText::new(text).color(color).size(9.0).monospace());
    });
}

fn render_performance_section(ui: &mut egui::Ui, status: &SystemStatus) {
    section_header(ui, "PERFORMANCE");

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Frame:").color(LABEL_COLOR).size(9.0));

        let frame_color = if status.average_update_duration_ms < 16.0 {
            OK_COLOR
        } else if status.average_update_duration_ms < 33.0 {
            PENDING_COLOR
        } else {
            ERROR_COLOR
        };

        ui.label(
            egui::RichText::new(format!(
                "{:.1}ms ({:.0} FPS)",
                status.average_update_duration_ms,
                1000.0 / status.average_update_duration_ms.max(0.1)
            ))
            .color(frame_color)
            .size(9.0)
            .monospace(),
        );
    });
}

fn render_diagnostics_section(ui: &mut egui::Ui, status: &SystemStatus) {
    section_header(ui, "DIAGNOSTICS");

    if status.diagnostics.is_empty() {
        ui.label(
            egui::RichText::new("No messages")
                .color(egui::Color32::from_rgb(100, 100, 100))
                .size(8.0)
                .italics(),
        );
        return;
    }

    // Each line is approximately 14 pixels tall (icon + text + spacing)
    let line_height = 14.0;
    let max_visible_lines = 6;

    egui::ScrollArea::vertical()
        .id_salt("diagnostics")
        .max_height(line_height * max_visible_lines as f32)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            // Newest first
            for diagnostic in status.diagnostics.iter().rev() {
                ui.horizontal(|ui| {
                    let (icon, color) = match diagnostic.level {
                        DiagnosticLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
                        DiagnosticLevel::Warning => ("⚠", PENDING_COLOR),
                        DiagnosticLevel::Error => ("✕", ERROR_COLOR),
                    };

                    ui.label(egui::RichText::new(icon).color(color).size(9.0));

                    let time_str = diagnostic.timestamp.format("%H:%M:%S").to_string();
                    ui.label(
                        egui::RichText::new(time_str)
                            .color(egui::Color32::from_rgb(100, 100, 100))
                            .size(8.0)
                            .monospace(),
                    );

                    ui.label(
                        egui::RichText::new(truncate(&diagnostic.message, 30))
                            .color(egui::Color32::from_rgb(180, 180, 180))
                            .size(8.0),
                    )
                    .on_hover_text(&diagnostic.message);
                });
            }
        });
}

fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() > max_chars {
        let head: String = message.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("Zürich Zürich", 4), "Züri...");
    }
}
