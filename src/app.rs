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

use std::time::Instant;

use log::{error, info, warn};
use quake_feed::{
    GeoPoint, Loader, LoaderConfig, MapSession, MapView, Pipeline, SessionOptions,
    EARTHQUAKES_OVERLAY, MARKER_FILL_OPACITY, MARKER_STROKE_WEIGHT, PLATES_OVERLAY,
    PLATE_LINE_COLOR, PLATE_LINE_WEIGHT,
};
use walkers::sources::TileSource;

use crate::config::AppConfig;
use crate::controls::{self, to_color32, ControlAction};
use crate::export;
use crate::mapbox_tiles::MapboxTileSource;
use crate::status::{DiagnosticLevel, SystemStatus};
use crate::status_pane::StatusPane;
use crate::tiles::{TileManager, WebMercator, TILE_SIZE};

const MAP_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(200, 220, 240);
const USGS_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/";

/// Everything resolved at startup from config and command line
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub loader: LoaderConfig,
    pub session: SessionOptions,
    pub access_token: Option<String>,
}

/// Maps between geographic and screen coordinates for one frame.
///
/// Positions are placed on the world copy nearest the view center, so
/// markers stay visible when panning across the antimeridian.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    center_x: f64,
    center_y: f64,
    zoom: f64,
    screen_center: egui::Pos2,
}

impl Projection {
    pub fn new(view: &MapView, screen_center: egui::Pos2) -> Self {
        let zoom = f64::from(view.zoom);
        Self {
            center_x: WebMercator::lon_to_x(view.center.lon, zoom) * f64::from(TILE_SIZE),
            center_y: WebMercator::lat_to_y(view.center.lat, zoom) * f64::from(TILE_SIZE),
            zoom,
            screen_center,
        }
    }

    fn world_size(&self) -> f64 {
        f64::from(TILE_SIZE) * 2_f64.powf(self.zoom)
    }

    pub fn to_screen(&self, point: GeoPoint) -> egui::Pos2 {
        let world = self.world_size();
        let mut dx = WebMercator::lon_to_x(point.lon, self.zoom) * f64::from(TILE_SIZE) - self.center_x;
        dx -= world * (dx / world).round();
        let dy = WebMercator::lat_to_y(point.lat, self.zoom) * f64::from(TILE_SIZE) - self.center_y;
        self.screen_center + egui::vec2(dx as f32, dy as f32)
    }

    pub fn from_screen(&self, pos: egui::Pos2) -> GeoPoint {
        let offset = pos - self.screen_center;
        let x = (self.center_x + f64::from(offset.x)) / f64::from(TILE_SIZE);
        let y = (self.center_y + f64::from(offset.y)) / f64::from(TILE_SIZE);
        GeoPoint::new(
            WebMercator::y_to_lat(y, self.zoom),
            WebMercator::x_to_lon(x, self.zoom),
        )
    }

    /// Project a polyline, splitting it where it jumps across the world edge
    pub fn project_path(&self, path: &[GeoPoint]) -> Vec<Vec<egui::Pos2>> {
        let half_world = (self.world_size() / 2.0) as f32;
        let mut segments = Vec::new();
        let mut current: Vec<egui::Pos2> = Vec::with_capacity(path.len());

        for point in path {
            let pos = self.to_screen(*point);
            if let Some(last) = current.last() {
                if (pos.x - last.x).abs() > half_world {
                    segments.push(std::mem::take(&mut current));
                }
            }
            current.push(pos);
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments.retain(|s| s.len() >= 2);
        segments
    }
}

/// Zoom by `delta` levels keeping the location under `anchor` in place
pub fn zoom_about(view: &mut MapView, delta: f32, anchor: egui::Pos2, screen_center: egui::Pos2) {
    let before = Projection::new(view, screen_center).from_screen(anchor);
    view.zoom_by(delta);
    let after = Projection::new(view, screen_center);
    let drift = after.to_screen(before) - anchor;
    view.set_center(after.from_screen(screen_center + drift));
}

/// Pan so the map follows a drag of `delta` pixels
pub fn pan_by(view: &mut MapView, delta: egui::Vec2, screen_center: egui::Pos2) {
    let projection = Projection::new(view, screen_center);
    view.set_center(projection.from_screen(screen_center - delta));
}

pub struct QuakeMapApp {
    config: AppConfig,
    loader: Loader,
    pipeline: Pipeline,
    status: SystemStatus,
    status_pane: StatusPane,
    tile_manager: TileManager,
    access_token: Option<String>,
    earthquake_url: String,
    tile_error: Option<String>,
    selected: Option<usize>,
    popup_anchor: Option<egui::Pos2>,
}

impl QuakeMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, settings: LaunchSettings) -> Self {
        let ctx = cc.egui_ctx.clone();
        let loader = Loader::spawn(settings.loader.clone(), move || ctx.request_repaint());

        let base_layer = settings.session.base_layer;
        let source = settings
            .access_token
            .clone()
            .map(|token| MapboxTileSource::new(base_layer, token));

        let mut status = SystemStatus::new(
            settings.loader.earthquake_url.clone(),
            settings.loader.plates_url.clone(),
        );
        status.base_layer_name = base_layer.display_name().to_string();
        status.has_access_token = source.is_some();
        if source.is_none() {
            warn!("No Mapbox access token configured; base map tiles are disabled");
            status.add_diagnostic(
                DiagnosticLevel::Error,
                format!("No Mapbox access token ({})", crate::config::ACCESS_TOKEN_ENV),
            );
        }
        status.add_diagnostic(DiagnosticLevel::Info, "Fetching earthquakes and plates".to_string());

        info!("Loading earthquakes from {}", settings.loader.earthquake_url);

        Self {
            status_pane: StatusPane::new(config.status_pane_visible),
            config,
            loader,
            pipeline: Pipeline::new(settings.session),
            status,
            tile_manager: TileManager::new(source),
            access_token: settings.access_token,
            earthquake_url: settings.loader.earthquake_url,
            tile_error: None,
            selected: None,
            popup_anchor: None,
        }
    }

    /// Drain loader events into the pipeline
    fn poll_loader(&mut self) {
        while let Some(event) = self.loader.try_recv() {
            let dataset = event.dataset();
            if let Some(err) = self.pipeline.apply(event) {
                error!("Failed to load {}: {}", dataset, err);
                self.status.record_load_error(dataset, &err);
            }
        }
        self.status.sync_datasets(&self.pipeline);
    }

    fn draw_map(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        let center = rect.center();

        painter.rect_filled(rect, 0.0, MAP_BACKGROUND);

        let Some(session) = self.pipeline.session_mut() else {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                "Loading earthquake data…",
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(60),
            );
            self.popup_anchor = None;
            return;
        };

        // Pan and zoom
        if response.dragged() {
            pan_by(&mut session.view, response.drag_delta(), center);
        }
        if response.hovered() {
            let (zoom_delta, scroll) = ui.input(|i| (i.zoom_delta(), i.smooth_scroll_delta.y));
            let change = zoom_delta.log2() + scroll / 200.0;
            if change.abs() > 0.001 {
                let anchor = response.hover_pos().unwrap_or(center);
                zoom_about(&mut session.view, change, anchor, center);
            }
        }
        if response.double_clicked() {
            let anchor = response.interact_pointer_pos().unwrap_or(center);
            zoom_about(&mut session.view, 1.0, anchor, center);
        }

        // Base map
        let view = session.view;
        let mut tiles_rendered = 0;
        for (tile_id, offset_x, offset_y, tile_px) in TileManager::get_visible_tiles(
            view.center.lat,
            view.center.lon,
            view.zoom,
            rect.width(),
            rect.height(),
        ) {
            if let Some(texture) = self.tile_manager.get_tile(tile_id, ui.ctx()) {
                let tile_rect = egui::Rect::from_min_size(
                    center + egui::vec2(offset_x, offset_y),
                    egui::vec2(tile_px, tile_px),
                );
                painter.image(
                    texture.id(),
                    tile_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
                tiles_rendered += 1;
            }
        }

        let tile_errors = self.tile_manager.get_error_count();
        let tiles_loading = self.tile_manager.has_loading_tiles();
        self.status.update_tiles(tiles_loading, tile_errors);
        if self.tile_manager.source().is_none() {
            self.tile_error = Some(format!(
                "No Mapbox access token: set {} or pass --access-token",
                crate::config::ACCESS_TOKEN_ENV
            ));
        } else if tile_errors > 0 {
            self.tile_error = Some(format!("Failed to load {} tiles", tile_errors));
        } else if tiles_loading {
            self.tile_error = Some("Loading map tiles...".to_string());
        } else if tiles_rendered > 0 {
            self.tile_error = None;
        }

        let projection = Projection::new(&view, center);

        // Plate boundaries under the markers
        if session.is_overlay_visible(PLATES_OVERLAY) {
            if let Some(plates) = session.plates() {
                let stroke = egui::Stroke::new(PLATE_LINE_WEIGHT, to_color32(PLATE_LINE_COLOR));
                for path in plates.paths() {
                    for segment in projection.project_path(path) {
                        painter.add(egui::Shape::line(segment, stroke));
                    }
                }
            }
        }

        // Earthquake markers
        self.popup_anchor = None;
        if session.is_overlay_visible(EARTHQUAKES_OVERLAY) {
            if let Some(layer) = session.earthquakes() {
                let pointer = response.hover_pos();
                let mut hovered: Option<(usize, egui::Pos2, f32)> = None;

                for (index, entry) in layer.entries().iter().enumerate() {
                    let pos = projection.to_screen(entry.marker.position);
                    let radius = entry.marker.radius as f32;
                    if !rect.expand(radius + MARKER_STROKE_WEIGHT).contains(pos) {
                        continue;
                    }

                    let color = to_color32(entry.marker.color);
                    painter.circle(
                        pos,
                        radius,
                        color.gamma_multiply(MARKER_FILL_OPACITY),
                        egui::Stroke::new(MARKER_STROKE_WEIGHT, color),
                    );

                    // Last drawn is on top, so it wins the hit test
                    if pointer.is_some_and(|p| entry.marker.contains(f64::from(p.distance(pos)))) {
                        hovered = Some((index, pos, radius));
                    }
                    if self.selected == Some(index) {
                        self.popup_anchor = Some(pos - egui::vec2(0.0, radius));
                    }
                }

                if let Some((_, pos, radius)) = hovered {
                    painter.circle_stroke(
                        pos,
                        radius,
                        egui::Stroke::new(MARKER_STROKE_WEIGHT, egui::Color32::WHITE),
                    );
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }

                if response.clicked() {
                    self.selected = hovered.map(|(index, _, _)| index);
                    self.popup_anchor = hovered.map(|(_, pos, radius)| pos - egui::vec2(0.0, radius));
                }
            }
        }

        if let Some(ref message) = self.tile_error {
            draw_banner(&painter, rect, message);
        }
    }

    fn draw_popup(&mut self, ctx: &egui::Context) {
        let (Some(index), Some(anchor)) = (self.selected, self.popup_anchor) else {
            return;
        };
        let Some(entry) = self
            .pipeline
            .session()
            .and_then(MapSession::earthquakes)
            .and_then(|layer| layer.get(index))
        else {
            self.selected = None;
            return;
        };

        let mut close = false;
        egui::Area::new(egui::Id::new("quake_popup"))
            .fixed_pos(anchor - egui::vec2(0.0, 6.0))
            .pivot(egui::Align2::CENTER_BOTTOM)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(260.0);
                    ui.horizontal(|ui| {
                        ui.heading(&entry.popup.title);
                        if ui.small_button("✕").clicked() {
                            close = true;
                        }
                    });
                    ui.separator();
                    for line in &entry.popup.lines {
                        ui.label(line);
                    }
                });
            });

        if close {
            self.selected = None;
        }
    }

    fn draw_attribution(&self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("attribution"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-4.0, -4.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_white_alpha(200))
                    .inner_margin(egui::Margin::symmetric(4, 1))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = 6.0;
                            if let Some(source) = self.tile_manager.source() {
                                let attribution = source.attribution();
                                open_on_click(ui.link(attribution.text), attribution.url);
                            }
                            open_on_click(ui.link("USGS"), USGS_URL);
                        });
                    });
            });
    }

    fn switch_base_layer(&mut self, layer: quake_feed::BaseLayer) {
        self.status.base_layer_name = layer.display_name().to_string();
        if let Some(token) = &self.access_token {
            self.tile_manager
                .set_source(MapboxTileSource::new(layer, token.clone()));
        }
        self.config.base_layer = layer;
        self.save_config();
    }

    fn export(&mut self) {
        let Some(session) = self.pipeline.session() else {
            return;
        };
        match export::export_with_dialog(session, &self.earthquake_url) {
            Ok(Some(path)) => self.status.add_diagnostic(
                DiagnosticLevel::Info,
                format!("Exported to {}", path.display()),
            ),
            Ok(None) => {}
            Err(e) => {
                error!("Export failed: {}", e);
                self.status
                    .add_diagnostic(DiagnosticLevel::Error, format!("Export failed: {}", e));
            }
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            warn!("Failed to save config: {}", e);
        }
    }
}

fn open_on_click(response: egui::Response, url: &str) {
    if response.on_hover_text(url).clicked() {
        if let Err(e) = webbrowser::open(url) {
            warn!("Failed to open {}: {}", url, e);
        }
    }
}

fn draw_banner(painter: &egui::Painter, rect: egui::Rect, message: &str) {
    let is_error = message.starts_with("Failed") || message.starts_with("No ");
    let bg_color = if is_error {
        egui::Color32::from_rgb(220, 50, 50)
    } else {
        egui::Color32::from_rgb(255, 200, 100)
    };

    let pos = rect.center_top() + egui::vec2(0.0, 20.0);
    let galley = painter.layout_no_wrap(
        message.to_string(),
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
    let padding = egui::vec2(12.0, 6.0);
    let bubble = egui::Rect::from_center_size(pos, galley.size() + padding * 2.0);

    painter.rect_filled(bubble, 5.0, bg_color);
    painter.galley(bubble.min + padding, galley, egui::Color32::WHITE);
}

impl eframe::App for QuakeMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let frame_start = Instant::now();

        self.poll_loader();

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_map(ui);
            });

        let mut action = ControlAction::None;
        if let Some(session) = self.pipeline.session_mut() {
            let can_export = session.earthquakes().is_some();
            action = controls::layer_control(ctx, session, can_export);
            controls::zoom_control(ctx, session);
            controls::legend(ctx, session.legend());
        }
        match action {
            ControlAction::BaseLayerChanged(layer) => self.switch_base_layer(layer),
            ControlAction::Export => self.export(),
            ControlAction::None => {}
        }

        self.draw_popup(ctx);
        self.draw_attribution(ctx);

        let pane_visible = self.status_pane.visible;
        self.status_pane.render(ctx, &self.status);
        if self.status_pane.visible != pane_visible {
            self.config.status_pane_visible = self.status_pane.visible;
            self.save_config();
        }

        self.status
            .update_performance(frame_start.elapsed().as_secs_f64() * 1000.0);
    }
}
