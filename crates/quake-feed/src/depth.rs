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

//! Depth-to-color mapping for earthquake markers.
//!
//! Hypocenter depth (km) is bucketed into six fixed bands. Boundary values
//! belong to the shallower band, so `10.0` is in the first band and
//! `10.01` is in the second.

use std::fmt;

/// An opaque RGB color, independent of any UI toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS functional notation, e.g. `rgb(74, 183, 255)`.
    #[must_use]
    pub fn css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Color used when a depth is missing or not a number.
pub const UNKNOWN_DEPTH_COLOR: Rgb = Rgb(128, 128, 128);

/// One of the six depth ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthBand {
    /// d <= 10
    Shallow,
    /// 10 < d <= 30
    Shallow30,
    /// 30 < d <= 50
    Intermediate50,
    /// 50 < d <= 70
    Intermediate70,
    /// 70 < d <= 90
    Deep90,
    /// d > 90
    Deep,
}

/// A row of the threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSpec {
    pub band: DepthBand,
    /// Inclusive upper bound; `None` for the open-ended last band.
    pub upper_km: Option<f64>,
    pub color: Rgb,
    pub label: &'static str,
}

/// Ordered threshold table, shallowest first.
pub const DEPTH_BANDS: [BandSpec; 6] = [
    BandSpec {
        band: DepthBand::Shallow,
        upper_km: Some(10.0),
        color: Rgb(74, 183, 255),
        label: "-10 to 10",
    },
    BandSpec {
        band: DepthBand::Shallow30,
        upper_km: Some(30.0),
        color: Rgb(74, 255, 189),
        label: "10 to 30",
    },
    BandSpec {
        band: DepthBand::Intermediate50,
        upper_km: Some(50.0),
        color: Rgb(31, 217, 22),
        label: "30 to 50",
    },
    BandSpec {
        band: DepthBand::Intermediate70,
        upper_km: Some(70.0),
        color: Rgb(245, 170, 7),
        label: "50 to 70",
    },
    BandSpec {
        band: DepthBand::Deep90,
        upper_km: Some(90.0),
        color: Rgb(245, 86, 7),
        label: "70 to 90",
    },
    BandSpec {
        band: DepthBand::Deep,
        upper_km: None,
        color: Rgb(191, 6, 24),
        label: "Deeper than 90",
    },
];

impl DepthBand {
    /// Band for a depth in km. `None` only for NaN.
    #[must_use]
    pub fn for_depth(depth: f64) -> Option<Self> {
        if depth.is_nan() {
            return None;
        }
        DEPTH_BANDS
            .iter()
            .find(|spec| spec.upper_km.map_or(true, |upper| depth <= upper))
            .map(|spec| spec.band)
    }

    fn spec(self) -> &'static BandSpec {
        // The table holds every variant exactly once.
        DEPTH_BANDS
            .iter()
            .find(|spec| spec.band == self)
            .unwrap_or(&DEPTH_BANDS[DEPTH_BANDS.len() - 1])
    }

    #[must_use]
    pub fn color(self) -> Rgb {
        self.spec().color
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        self.spec().label
    }
}

/// Marker color for a depth in km.
#[must_use]
pub fn depth_color(depth: f64) -> Rgb {
    DepthBand::for_depth(depth).map_or(UNKNOWN_DEPTH_COLOR, DepthBand::color)
}

/// Like [`depth_color`] but for a depth that may be absent from the feed.
#[must_use]
pub fn depth_color_opt(depth: Option<f64>) -> Rgb {
    depth.map_or(UNKNOWN_DEPTH_COLOR, depth_color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenarios() {
        assert_eq!(depth_color(5.0), Rgb(74, 183, 255));
        assert_eq!(depth_color(10.0), Rgb(74, 183, 255));
        assert_eq!(depth_color(10.01), Rgb(74, 255, 189));
        assert_eq!(depth_color(95.0), Rgb(191, 6, 24));
    }

    #[test]
    fn test_boundaries_resolve_to_lower_band() {
        assert_eq!(DepthBand::for_depth(10.0), Some(DepthBand::Shallow));
        assert_eq!(DepthBand::for_depth(30.0), Some(DepthBand::Shallow30));
        assert_eq!(DepthBand::for_depth(50.0), Some(DepthBand::Intermediate50));
        assert_eq!(DepthBand::for_depth(70.0), Some(DepthBand::Intermediate70));
        assert_eq!(DepthBand::for_depth(90.0), Some(DepthBand::Deep90));
        assert_eq!(DepthBand::for_depth(90.000_001), Some(DepthBand::Deep));
    }

    #[test]
    fn test_negative_and_extreme_depths() {
        assert_eq!(DepthBand::for_depth(-3.5), Some(DepthBand::Shallow));
        assert_eq!(DepthBand::for_depth(f64::NEG_INFINITY), Some(DepthBand::Shallow));
        assert_eq!(DepthBand::for_depth(f64::INFINITY), Some(DepthBand::Deep));
        assert_eq!(DepthBand::for_depth(700.0), Some(DepthBand::Deep));
    }

    #[test]
    fn test_nan_and_missing_use_fallback() {
        assert_eq!(DepthBand::for_depth(f64::NAN), None);
        assert_eq!(depth_color(f64::NAN), UNKNOWN_DEPTH_COLOR);
        assert_eq!(depth_color_opt(None), UNKNOWN_DEPTH_COLOR);
        assert_eq!(depth_color_opt(Some(35.2)), Rgb(31, 217, 22));
    }

    #[test]
    fn test_every_depth_hits_exactly_one_palette_color() {
        let palette: Vec<Rgb> = DEPTH_BANDS.iter().map(|b| b.color).collect();
        let mut depth = -50.0;
        while depth < 200.0 {
            let color = depth_color(depth);
            assert_eq!(palette.iter().filter(|c| **c == color).count(), 1, "depth {depth}");
            depth += 0.25;
        }
    }

    #[test]
    fn test_css() {
        assert_eq!(Rgb(245, 86, 7).css(), "rgb(245, 86, 7)");
        assert_eq!(DepthBand::Deep.label(), "Deeper than 90");
    }
}
