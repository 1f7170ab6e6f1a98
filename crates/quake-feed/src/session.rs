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

//! Map session: the single owner of view state, base layers, overlays and
//! the legend for one run of the viewer.
//!
//! Everything that mutates what is on the map goes through a
//! `&mut MapSession`, so there is no ambient map instance to race against.

use log::info;
use serde::{Deserialize, Serialize};

use crate::layer::{EarthquakeLayer, PlateLayer};
use crate::legend::Legend;
use crate::quake::GeoPoint;

/// Default view center (continental United States).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 37.09,
    lon: -95.71,
};

pub const DEFAULT_ZOOM: f32 = 5.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 18.0;

pub const EARTHQUAKES_OVERLAY: &str = "Earthquakes";
pub const PLATES_OVERLAY: &str = "Tectonic Plates";

/// Mapbox styles offered as base maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaseLayer {
    #[default]
    Streets,
    Dark,
    Outdoors,
    Satellite,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 4] = [
        BaseLayer::Streets,
        BaseLayer::Dark,
        BaseLayer::Outdoors,
        BaseLayer::Satellite,
    ];

    /// Label shown in the layer control.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            BaseLayer::Streets => "Street Map",
            BaseLayer::Dark => "Dark Map",
            BaseLayer::Outdoors => "Outdoors",
            BaseLayer::Satellite => "Satellite",
        }
    }

    /// Mapbox style id.
    #[must_use]
    pub fn style_id(self) -> &'static str {
        match self {
            BaseLayer::Streets => "mapbox/streets-v11",
            BaseLayer::Dark => "mapbox/dark-v10",
            BaseLayer::Outdoors => "mapbox/outdoors-v11",
            BaseLayer::Satellite => "mapbox/satellite-v9",
        }
    }

    /// 256px raster tile URL for this style.
    #[must_use]
    pub fn tile_url(self, access_token: &str, zoom: u8, x: u32, y: u32) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/{}/tiles/256/{}/{}/{}?access_token={}",
            self.style_id(),
            zoom,
            x,
            y,
            access_token
        )
    }

    #[must_use]
    pub fn max_zoom(self) -> u8 {
        18
    }
}

/// Center and zoom of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f32,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapView {
    /// Change zoom by `delta` levels, clamped to the supported range.
    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Move the center, clamping latitude to the Web Mercator limit and
    /// wrapping longitude into [-180, 180).
    pub fn set_center(&mut self, center: GeoPoint) {
        let lat = center.lat.clamp(-85.0, 85.0);
        let lon = (center.lon + 180.0).rem_euclid(360.0) - 180.0;
        self.center = GeoPoint::new(lat, lon);
    }
}

/// Initial settings for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub view: MapView,
    pub base_layer: BaseLayer,
    /// Whether the plate-boundary overlay starts visible.
    pub show_plates: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            view: MapView::default(),
            base_layer: BaseLayer::default(),
            show_plates: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayKind {
    Earthquakes(EarthquakeLayer),
    Plates(PlateLayer),
}

/// A named overlay that can be toggled in the layer control.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub name: &'static str,
    pub visible: bool,
    pub kind: OverlayKind,
}

#[derive(Debug, Clone)]
pub struct MapSession {
    pub view: MapView,
    base_layer: BaseLayer,
    overlays: Vec<Overlay>,
    legend: Legend,
    show_plates: bool,
}

impl MapSession {
    /// Create the map with its base layers, the earthquake overlay (when
    /// available) and the legend.
    #[must_use]
    pub fn assemble(options: SessionOptions, earthquakes: Option<EarthquakeLayer>) -> Self {
        let mut overlays = Vec::new();
        if let Some(layer) = earthquakes {
            info!("Assembling map with {} earthquake markers", layer.len());
            overlays.push(Overlay {
                name: EARTHQUAKES_OVERLAY,
                visible: true,
                kind: OverlayKind::Earthquakes(layer),
            });
        } else {
            info!("Assembling map without earthquake overlay");
        }

        let mut view = MapView::default();
        view.set_center(options.view.center);
        view.zoom = options.view.zoom.clamp(MIN_ZOOM, MAX_ZOOM);

        Self {
            view,
            base_layer: options.base_layer,
            overlays,
            legend: Legend::depth(),
            show_plates: options.show_plates,
        }
    }

    /// Add the plate-boundary overlay, replacing an existing one.
    pub fn add_plate_layer(&mut self, layer: PlateLayer) {
        info!(
            "Adding plate boundary layer ({} geometries)",
            layer.geometry_count()
        );
        let overlay = Overlay {
            name: PLATES_OVERLAY,
            visible: self.show_plates,
            kind: OverlayKind::Plates(layer),
        };
        match self
            .overlays
            .iter_mut()
            .find(|o| matches!(o.kind, OverlayKind::Plates(_)))
        {
            Some(existing) => *existing = overlay,
            None => self.overlays.push(overlay),
        }
    }

    #[must_use]
    pub fn base_layer(&self) -> BaseLayer {
        self.base_layer
    }

    /// Exactly one base layer is active; selecting one replaces the other.
    pub fn select_base_layer(&mut self, layer: BaseLayer) {
        if self.base_layer != layer {
            info!("Base layer: {}", layer.display_name());
            self.base_layer = layer;
        }
    }

    #[must_use]
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Toggle an overlay by name. Returns false if no such overlay exists.
    pub fn set_overlay_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.overlays.iter_mut().find(|o| o.name == name) {
            Some(overlay) => {
                overlay.visible = visible;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_overlay_visible(&self, name: &str) -> bool {
        self.overlays.iter().any(|o| o.name == name && o.visible)
    }

    #[must_use]
    pub fn earthquakes(&self) -> Option<&EarthquakeLayer> {
        self.overlays.iter().find_map(|o| match &o.kind {
            OverlayKind::Earthquakes(layer) => Some(layer),
            OverlayKind::Plates(_) => None,
        })
    }

    #[must_use]
    pub fn plates(&self) -> Option<&PlateLayer> {
        self.overlays.iter().find_map(|o| match &o.kind {
            OverlayKind::Plates(layer) => Some(layer),
            OverlayKind::Earthquakes(_) => None,
        })
    }

    #[must_use]
    pub fn legend(&self) -> &Legend {
        &self.legend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view_and_layers() {
        let session = MapSession::assemble(SessionOptions::default(), Some(EarthquakeLayer::default()));
        assert_eq!(session.view.center, GeoPoint::new(37.09, -95.71));
        assert!((session.view.zoom - 5.0).abs() < f32::EPSILON);
        assert_eq!(session.base_layer(), BaseLayer::Streets);
        assert_eq!(session.overlays().len(), 1);
        assert!(session.is_overlay_visible(EARTHQUAKES_OVERLAY));
        assert_eq!(session.legend(), &Legend::depth());
    }

    #[test]
    fn test_single_active_base_layer() {
        let mut session = MapSession::assemble(SessionOptions::default(), None);
        for layer in BaseLayer::ALL {
            session.select_base_layer(layer);
            assert_eq!(session.base_layer(), layer);
        }
    }

    #[test]
    fn test_overlays_toggle_independently() {
        let mut session = MapSession::assemble(SessionOptions::default(), Some(EarthquakeLayer::default()));
        session.add_plate_layer(PlateLayer::default());

        assert!(session.set_overlay_visible(EARTHQUAKES_OVERLAY, false));
        assert!(!session.is_overlay_visible(EARTHQUAKES_OVERLAY));
        assert!(session.is_overlay_visible(PLATES_OVERLAY));
        assert!(!session.set_overlay_visible("Volcanoes", true));
    }

    #[test]
    fn test_plate_layer_replaced_not_duplicated() {
        let mut session = MapSession::assemble(SessionOptions::default(), None);
        session.add_plate_layer(PlateLayer::default());
        session.add_plate_layer(PlateLayer::default());
        assert_eq!(session.overlays().len(), 1);
        assert!(session.plates().is_some());
        assert!(session.earthquakes().is_none());
    }

    #[test]
    fn test_hidden_plates_option() {
        let options = SessionOptions {
            show_plates: false,
            ..Default::default()
        };
        let mut session = MapSession::assemble(options, None);
        session.add_plate_layer(PlateLayer::default());
        assert!(!session.is_overlay_visible(PLATES_OVERLAY));
    }

    #[test]
    fn test_tile_url() {
        assert_eq!(
            BaseLayer::Dark.tile_url("pk.test", 5, 7, 12),
            "https://api.mapbox.com/styles/v1/mapbox/dark-v10/tiles/256/5/7/12?access_token=pk.test"
        );
    }

    #[test]
    fn test_view_clamps_and_wraps() {
        let mut view = MapView::default();
        view.set_center(GeoPoint::new(89.0, 190.0));
        assert!((view.center.lat - 85.0).abs() < 1e-9);
        assert!((view.center.lon + 170.0).abs() < 1e-9);

        view.zoom_by(100.0);
        assert!((view.zoom - MAX_ZOOM).abs() < f32::EPSILON);
    }
}
