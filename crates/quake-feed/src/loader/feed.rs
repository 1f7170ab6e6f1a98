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

//! USGS summary feed selection.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const USGS_SUMMARY_BASE: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

/// PB2002 plate boundaries (Bird, 2003) as GeoJSON.
pub const PLATE_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_plates.json";

/// Minimum magnitude class of a summary feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedMagnitude {
    Significant,
    M4_5,
    M2_5,
    M1_0,
    All,
}

impl FeedMagnitude {
    const ALL: [FeedMagnitude; 5] = [
        FeedMagnitude::Significant,
        FeedMagnitude::M4_5,
        FeedMagnitude::M2_5,
        FeedMagnitude::M1_0,
        FeedMagnitude::All,
    ];

    fn as_str(self) -> &'static str {
        match self {
            FeedMagnitude::Significant => "significant",
            FeedMagnitude::M4_5 => "4.5",
            FeedMagnitude::M2_5 => "2.5",
            FeedMagnitude::M1_0 => "1.0",
            FeedMagnitude::All => "all",
        }
    }
}

/// Time window of a summary feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedPeriod {
    Hour,
    Day,
    Week,
    Month,
}

impl FeedPeriod {
    const ALL: [FeedPeriod; 4] = [
        FeedPeriod::Hour,
        FeedPeriod::Day,
        FeedPeriod::Week,
        FeedPeriod::Month,
    ];

    fn as_str(self) -> &'static str {
        match self {
            FeedPeriod::Hour => "hour",
            FeedPeriod::Day => "day",
            FeedPeriod::Week => "week",
            FeedPeriod::Month => "month",
        }
    }
}

/// One of the USGS real-time summary feeds, e.g. `significant_month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feed {
    pub magnitude: FeedMagnitude,
    pub period: FeedPeriod,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            magnitude: FeedMagnitude::Significant,
            period: FeedPeriod::Month,
        }
    }
}

impl Feed {
    #[must_use]
    pub fn url(self) -> String {
        format!("{USGS_SUMMARY_BASE}/{self}.geojson")
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.magnitude.as_str(), self.period.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown feed '{0}', expected e.g. significant_month, 4.5_week or all_day")]
pub struct FeedParseError(String);

impl FromStr for Feed {
    type Err = FeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let (mag, period) = normalized
            .rsplit_once('_')
            .ok_or_else(|| FeedParseError(s.to_string()))?;
        let magnitude = FeedMagnitude::ALL
            .into_iter()
            .find(|m| m.as_str() == mag)
            .ok_or_else(|| FeedParseError(s.to_string()))?;
        let period = FeedPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == period)
            .ok_or_else(|| FeedParseError(s.to_string()))?;
        Ok(Self { magnitude, period })
    }
}
