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

//! Overlay layers built from GeoJSON documents.
//!
//! - [`EarthquakeLayer`]: one marker plus popup per earthquake feature
//! - [`PlateLayer`]: plate-boundary geometry flattened into polylines

use geojson::{Feature, GeoJson, Geometry, Value};
use log::{debug, warn};

use crate::depth::Rgb;
use crate::marker::CircleMarker;
use crate::popup::Popup;
use crate::quake::{Earthquake, GeoPoint};

/// Default path color for plate boundaries.
pub const PLATE_LINE_COLOR: Rgb = Rgb(51, 136, 255);

/// Default path width for plate boundaries.
pub const PLATE_LINE_WEIGHT: f32 = 3.0;

/// An earthquake with its visual and interactive representation.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeEntry {
    pub quake: Earthquake,
    pub marker: CircleMarker,
    pub popup: Popup,
}

impl QuakeEntry {
    #[must_use]
    pub fn new(quake: Earthquake) -> Self {
        let marker = CircleMarker::for_quake(&quake);
        let popup = Popup::for_quake(&quake);
        Self { quake, marker, popup }
    }
}

/// Composite overlay of earthquake markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EarthquakeLayer {
    entries: Vec<QuakeEntry>,
    skipped: usize,
}

impl EarthquakeLayer {
    /// Build from features, skipping any that cannot be placed on the map.
    #[must_use]
    pub fn from_features(features: &[Feature]) -> Self {
        let mut layer = Self::default();
        for feature in features {
            match Earthquake::from_feature(feature) {
                Ok(quake) => layer.entries.push(QuakeEntry::new(quake)),
                Err(e) => {
                    warn!("Skipping earthquake feature {:?}: {}", feature.id, e);
                    layer.skipped += 1;
                }
            }
        }
        debug!(
            "Built earthquake layer: {} markers, {} skipped",
            layer.entries.len(),
            layer.skipped
        );
        layer
    }

    /// Build from a FeatureCollection or a single Feature. Bare geometries
    /// carry no event properties and yield an empty layer.
    #[must_use]
    pub fn from_geojson(geojson: &GeoJson) -> Self {
        match geojson {
            GeoJson::FeatureCollection(fc) => Self::from_features(&fc.features),
            GeoJson::Feature(f) => Self::from_features(std::slice::from_ref(f)),
            GeoJson::Geometry(_) => {
                warn!("Earthquake feed is a bare geometry, no events to show");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Features that were dropped while building.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn entries(&self) -> &[QuakeEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QuakeEntry> {
        self.entries.get(index)
    }
}

/// Plate boundaries as polylines, drawn with default styling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlateLayer {
    paths: Vec<Vec<GeoPoint>>,
    geometry_count: usize,
}

impl PlateLayer {
    #[must_use]
    pub fn from_geojson(geojson: &GeoJson) -> Self {
        let mut layer = Self::default();
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in &fc.features {
                    if let Some(geometry) = &feature.geometry {
                        layer.add_geometry(geometry);
                    }
                }
            }
            GeoJson::Feature(f) => {
                if let Some(geometry) = &f.geometry {
                    layer.add_geometry(geometry);
                }
            }
            GeoJson::Geometry(g) => layer.add_geometry(g),
        }
        debug!(
            "Built plate layer: {} geometries, {} paths",
            layer.geometry_count,
            layer.paths.len()
        );
        layer
    }

    fn add_geometry(&mut self, geometry: &Geometry) {
        if let Value::GeometryCollection(members) = &geometry.value {
            for member in members {
                self.add_geometry(member);
            }
            return;
        }

        self.geometry_count += 1;
        match &geometry.value {
            Value::LineString(line) => self.push_path(line),
            Value::MultiLineString(lines) => lines.iter().for_each(|l| self.push_path(l)),
            Value::Polygon(rings) => rings.iter().for_each(|r| self.push_path(r)),
            Value::MultiPolygon(polygons) => polygons
                .iter()
                .flatten()
                .for_each(|r| self.push_path(r)),
            Value::Point(_) | Value::MultiPoint(_) | Value::GeometryCollection(_) => {}
        }
    }

    fn push_path(&mut self, positions: &[Vec<f64>]) {
        let path: Vec<GeoPoint> = positions
            .iter()
            .filter_map(|p| GeoPoint::from_position(p))
            .collect();
        if path.len() >= 2 {
            self.paths.push(path);
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[Vec<GeoPoint>] {
        &self.paths
    }

    /// Number of source geometries (GeometryCollections are flattened).
    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.geometry_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAKES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type":"Feature","id":"a","properties":{"place":"A","time":1609459200000,"mag":6.1},
             "geometry":{"type":"Point","coordinates":[-95.0,37.0,35.2]}},
            {"type":"Feature","id":"b","properties":{"place":"B","time":1609459300000,"mag":4.2},
             "geometry":{"type":"Point","coordinates":[-120.5,38.1,8.0]}},
            {"type":"Feature","id":"c","properties":{"place":"C","time":1609459400000,"mag":5.0},
             "geometry":{"type":"Point","coordinates":[142.3,38.3,120.0]}}
        ]
    }"#;

    #[test]
    fn test_feature_count_round_trip() {
        let geojson: GeoJson = QUAKES.parse().unwrap();
        let GeoJson::FeatureCollection(fc) = &geojson else {
            panic!("fixture is a collection");
        };
        let layer = EarthquakeLayer::from_geojson(&geojson);
        assert_eq!(layer.len(), fc.features.len());
        assert_eq!(layer.skipped(), 0);
    }

    #[test]
    fn test_entries_carry_marker_and_popup() {
        let layer = EarthquakeLayer::from_geojson(&QUAKES.parse().unwrap());
        let first = layer.get(0).unwrap();
        assert!((first.marker.radius - 61.0).abs() < 1e-9);
        assert_eq!(first.marker.color, Rgb(31, 217, 22));
        assert_eq!(first.popup.title, "A");

        let deep = layer.entries().iter().find(|e| e.popup.title == "C").unwrap();
        assert_eq!(deep.marker.color, Rgb(191, 6, 24));
    }

    #[test]
    fn test_unplaceable_features_are_counted() {
        let geojson: GeoJson = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"mag":1.0},"geometry":null},
            {"type":"Feature","properties":{"mag":2.0},
             "geometry":{"type":"Point","coordinates":[1.0,2.0,3.0]}}
        ]}"#
        .parse()
        .unwrap();
        let layer = EarthquakeLayer::from_geojson(&geojson);
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.skipped(), 1);
    }

    #[test]
    fn test_plate_layer_flattens_polygons() {
        let geojson: GeoJson = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"PlateName":"Africa"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,0]]]}},
            {"type":"Feature","properties":{"PlateName":"Antarctica"},
             "geometry":{"type":"MultiPolygon","coordinates":[
                [[[20,-60],[30,-60],[30,-70],[20,-60]]],
                [[[40,-60],[50,-60],[50,-70],[40,-60]]]
             ]}},
            {"type":"Feature","properties":{},
             "geometry":{"type":"LineString","coordinates":[[100,5],[101,6]]}}
        ]}"#
        .parse()
        .unwrap();
        let layer = PlateLayer::from_geojson(&geojson);
        assert_eq!(layer.geometry_count(), 3);
        assert_eq!(layer.paths().len(), 4);
        assert_eq!(layer.paths()[0][1], GeoPoint::new(0.0, 10.0));
    }

    #[test]
    fn test_plate_layer_accepts_geometry_collection() {
        let geojson: GeoJson = r#"{"type":"GeometryCollection","geometries":[
            {"type":"LineString","coordinates":[[0,0],[1,1]]},
            {"type":"MultiLineString","coordinates":[[[2,2],[3,3]],[[4,4],[5,5]]]}
        ]}"#
        .parse()
        .unwrap();
        let layer = PlateLayer::from_geojson(&geojson);
        assert_eq!(layer.geometry_count(), 2);
        assert_eq!(layer.paths().len(), 3);
    }
}
