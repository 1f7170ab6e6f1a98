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

//! Floating map controls: layer switcher, zoom buttons and depth legend.

use quake_feed::{BaseLayer, Corner, Legend, MapSession, Rgb};

/// What the user asked for in the layer control this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    None,
    BaseLayerChanged(BaseLayer),
    Export,
}

pub fn to_color32(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

fn control_frame(ctx: &egui::Context) -> egui::Frame {
    egui::Frame::window(&ctx.style())
        .fill(egui::Color32::from_rgba_unmultiplied(255, 255, 255, 235))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(180)))
        .corner_radius(5.0)
}

/// Base layer radio buttons and overlay checkboxes, top right
pub fn layer_control(ctx: &egui::Context, session: &mut MapSession, can_export: bool) -> ControlAction {
    let mut action = ControlAction::None;

    egui::Window::new("Layers")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0))
        .resizable(false)
        .collapsible(true)
        .frame(control_frame(ctx))
        .show(ctx, |ui| {
            ui.visuals_mut().override_text_color = Some(egui::Color32::from_gray(30));

            let mut selected = session.base_layer();
            for layer in BaseLayer::ALL {
                ui.radio_value(&mut selected, layer, layer.display_name());
            }
            if selected != session.base_layer() {
                session.select_base_layer(selected);
                action = ControlAction::BaseLayerChanged(selected);
            }

            if !session.overlays().is_empty() {
                ui.separator();
            }

            // Collect first so toggling doesn't alias the overlay list
            let overlays: Vec<(&'static str, bool)> = session
                .overlays()
                .iter()
                .map(|o| (o.name, o.visible))
                .collect();
            for (name, visible) in overlays {
                let mut checked = visible;
                if ui.checkbox(&mut checked, name).changed() {
                    session.set_overlay_visible(name, checked);
                }
            }

            ui.separator();
            if ui
                .add_enabled(can_export, egui::Button::new("Export…"))
                .on_hover_text("Save the loaded events as an HTML report")
                .clicked()
            {
                action = ControlAction::Export;
            }
        });

    action
}

/// Zoom in/out buttons, top left
pub fn zoom_control(ctx: &egui::Context, session: &mut MapSession) {
    egui::Window::new("zoom_control")
        .title_bar(false)
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .frame(control_frame(ctx))
        .show(ctx, |ui| {
            let size = egui::vec2(26.0, 26.0);
            let plus = egui::Button::new(egui::RichText::new("+").size(16.0).color(egui::Color32::BLACK));
            if ui.add_sized(size, plus).on_hover_text("Zoom in").clicked() {
                session.view.zoom_by(1.0);
            }
            let minus = egui::Button::new(egui::RichText::new("−").size(16.0).color(egui::Color32::BLACK));
            if ui.add_sized(size, minus).on_hover_text("Zoom out").clicked() {
                session.view.zoom_by(-1.0);
            }
        });
}

fn corner_anchor(corner: Corner) -> (egui::Align2, egui::Vec2) {
    match corner {
        Corner::TopLeft => (egui::Align2::LEFT_TOP, egui::vec2(10.0, 80.0)),
        Corner::TopRight => (egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 10.0)),
        Corner::BottomLeft => (egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -30.0)),
        Corner::BottomRight => (egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -30.0)),
    }
}

/// Static legend window, one swatch per entry
pub fn legend(ctx: &egui::Context, legend: &Legend) {
    let (align, offset) = corner_anchor(legend.corner);

    egui::Window::new("legend")
        .title_bar(false)
        .anchor(align, offset)
        .resizable(false)
        .interactable(false)
        .frame(control_frame(ctx))
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(legend.title)
                    .strong()
                    .color(egui::Color32::from_gray(30)),
            );
            for entry in &legend.entries {
                ui.horizontal(|ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, to_color32(entry.color));
                    ui.label(egui::RichText::new(entry.label).color(egui::Color32::from_gray(30)));
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_color32() {
        assert_eq!(to_color32(Rgb(245, 86, 7)), egui::Color32::from_rgb(245, 86, 7));
    }

    #[test]
    fn test_legend_corner_is_bottom_left() {
        let (align, _) = corner_anchor(Legend::depth().corner);
        assert_eq!(align, egui::Align2::LEFT_BOTTOM);
    }
}
