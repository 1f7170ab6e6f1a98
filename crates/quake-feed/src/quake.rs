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

//! Earthquake event model extracted from USGS GeoJSON features.

use chrono::{DateTime, Utc};
use geojson::{Feature, Value};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a GeoJSON position (`[lon, lat, ...]`).
    #[must_use]
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] => Some(Self::new(*lat, *lon)),
            _ => None,
        }
    }
}

/// Reasons a feature cannot be turned into an [`Earthquake`].
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("feature geometry is not a point")]
    NotAPoint,

    #[error("point has {0} coordinate(s), expected at least 2")]
    MissingCoordinates(usize),
}

/// One reported earthquake.
#[derive(Debug, Clone, PartialEq)]
pub struct Earthquake {
    /// Feed event id, when present.
    pub id: Option<String>,
    /// Human-readable location, e.g. "10km SSW of Example Town".
    pub place: Option<String>,
    /// Origin time.
    pub time: Option<DateTime<Utc>>,
    pub magnitude: Option<f64>,
    pub position: GeoPoint,
    /// Hypocenter depth in km (third coordinate).
    pub depth: Option<f64>,
}

impl Earthquake {
    /// Extract an earthquake from a GeoJSON feature.
    ///
    /// Properties are read leniently: absent or non-numeric `mag`/`time`
    /// become `None` rather than failing the whole feature. Only the point
    /// geometry is mandatory.
    pub fn from_feature(feature: &Feature) -> Result<Self, FeatureError> {
        let geometry = feature.geometry.as_ref().ok_or(FeatureError::MissingGeometry)?;
        let Value::Point(coords) = &geometry.value else {
            return Err(FeatureError::NotAPoint);
        };
        let position =
            GeoPoint::from_position(coords).ok_or(FeatureError::MissingCoordinates(coords.len()))?;
        let depth = coords.get(2).copied().filter(|d| d.is_finite());

        let props = feature.properties.as_ref();
        let place = props
            .and_then(|p| p.get("place"))
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        let magnitude = props
            .and_then(|p| p.get("mag"))
            .and_then(JsonValue::as_f64);
        let time = props
            .and_then(|p| p.get("time"))
            .and_then(JsonValue::as_i64)
            .and_then(DateTime::from_timestamp_millis);
        let id = match &feature.id {
            Some(geojson::feature::Id::String(s)) => Some(s.clone()),
            Some(geojson::feature::Id::Number(n)) => Some(n.to_string()),
            None => None,
        };

        Ok(Self {
            id,
            place,
            time,
            magnitude,
            position,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;

    fn feature(json: &str) -> Feature {
        match json.parse::<GeoJson>().unwrap() {
            GeoJson::Feature(f) => f,
            other => panic!("expected feature, got {other:?}"),
        }
    }

    #[test]
    fn test_from_feature() {
        let f = feature(
            r#"{"type":"Feature","id":"us7000abcd",
                "properties":{"place":"10km SSW of Example Town","time":1609459200000,"mag":6.1},
                "geometry":{"type":"Point","coordinates":[-95.0,37.0,35.2]}}"#,
        );
        let quake = Earthquake::from_feature(&f).unwrap();
        assert_eq!(quake.id.as_deref(), Some("us7000abcd"));
        assert_eq!(quake.place.as_deref(), Some("10km SSW of Example Town"));
        assert_eq!(quake.magnitude, Some(6.1));
        assert_eq!(quake.depth, Some(35.2));
        assert_eq!(quake.position, GeoPoint::new(37.0, -95.0));
        assert_eq!(quake.time.unwrap().timestamp_millis(), 1_609_459_200_000);
    }

    #[test]
    fn test_missing_properties_are_none() {
        let f = feature(
            r#"{"type":"Feature","properties":{"mag":null,"time":"yesterday"},
                "geometry":{"type":"Point","coordinates":[10.0,20.0]}}"#,
        );
        let quake = Earthquake::from_feature(&f).unwrap();
        assert_eq!(quake.magnitude, None);
        assert_eq!(quake.time, None);
        assert_eq!(quake.depth, None);
        assert_eq!(quake.place, None);
    }

    #[test]
    fn test_rejects_unplaceable_features() {
        let no_geometry = feature(r#"{"type":"Feature","properties":{},"geometry":null}"#);
        assert_eq!(
            Earthquake::from_feature(&no_geometry),
            Err(FeatureError::MissingGeometry)
        );

        let line = feature(
            r#"{"type":"Feature","properties":{},
                "geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}"#,
        );
        assert_eq!(Earthquake::from_feature(&line), Err(FeatureError::NotAPoint));
    }
}
