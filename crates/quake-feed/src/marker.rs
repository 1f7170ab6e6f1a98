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

//! Circle markers sized by magnitude and colored by depth.

use crate::depth::{depth_color_opt, Rgb};
use crate::quake::{Earthquake, GeoPoint};

/// Screen pixels of radius per unit of magnitude.
pub const MAGNITUDE_RADIUS_SCALE: f64 = 10.0;

/// Radius used when the magnitude is missing, non-finite or not positive.
pub const MIN_MARKER_RADIUS: f64 = 1.0;

/// Outline width in pixels.
pub const MARKER_STROKE_WEIGHT: f32 = 3.0;

/// Fill opacity (0.0 - 1.0).
pub const MARKER_FILL_OPACITY: f32 = 0.2;

/// A circular marker in screen-pixel radius, anchored at a geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleMarker {
    pub position: GeoPoint,
    pub radius: f64,
    pub color: Rgb,
}

impl CircleMarker {
    #[must_use]
    pub fn for_quake(quake: &Earthquake) -> Self {
        Self {
            position: quake.position,
            radius: marker_radius(quake.magnitude),
            color: depth_color_opt(quake.depth),
        }
    }

    /// Whether a screen-space distance from the marker center falls inside it.
    #[must_use]
    pub fn contains(&self, distance_px: f64) -> bool {
        distance_px <= self.radius
    }
}

/// Radius for a magnitude: exactly `10 * m` for positive magnitudes.
#[must_use]
pub fn marker_radius(magnitude: Option<f64>) -> f64 {
    match magnitude {
        Some(m) if m.is_finite() && m > 0.0 => m * MAGNITUDE_RADIUS_SCALE,
        _ => MIN_MARKER_RADIUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake(magnitude: Option<f64>, depth: Option<f64>) -> Earthquake {
        Earthquake {
            id: None,
            place: None,
            time: None,
            magnitude,
            position: GeoPoint::new(37.0, -95.0),
            depth,
        }
    }

    #[test]
    fn test_radius_scales_with_magnitude() {
        assert!((marker_radius(Some(6.1)) - 61.0).abs() < 1e-9);
        assert!((marker_radius(Some(0.05)) - 0.5).abs() < 1e-12);
        for m in [0.1, 1.0, 2.5, 4.4, 7.9, 9.5] {
            assert_eq!(marker_radius(Some(m)), m * 10.0);
        }
    }

    #[test]
    fn test_radius_guard() {
        assert_eq!(marker_radius(None), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(Some(0.0)), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(Some(-1.2)), MIN_MARKER_RADIUS);
        assert_eq!(marker_radius(Some(f64::NAN)), MIN_MARKER_RADIUS);
    }

    #[test]
    fn test_marker_for_quake() {
        let marker = CircleMarker::for_quake(&quake(Some(6.1), Some(35.2)));
        assert!((marker.radius - 61.0).abs() < 1e-9);
        assert_eq!(marker.color, Rgb(31, 217, 22));
        assert_eq!(marker.position, GeoPoint::new(37.0, -95.0));
        assert!(marker.contains(60.0));
        assert!(!marker.contains(62.0));
    }
}
