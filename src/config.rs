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

//! Application configuration management.
//!
//! Persistent settings are stored as TOML via `confy`. The Mapbox access
//! token can come from the command line, the `MAPBOX_ACCESS_TOKEN`
//! environment variable or the config file, in that order of precedence.

use log::warn;
use quake_feed::{BaseLayer, Feed, GeoPoint, LoaderConfig, MapView, SessionOptions, PLATE_BOUNDARIES_URL};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "quakemap";
const CONFIG_NAME: &str = "config";

/// Environment variable holding the Mapbox access token.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Mapbox access token (optional, env var takes precedence)
    #[serde(default)]
    pub mapbox_access_token: Option<String>,

    /// USGS summary feed name, e.g. "significant_month"
    #[serde(default = "default_feed")]
    pub feed: String,

    /// Full earthquake feed URL, overrides `feed` when set
    #[serde(default)]
    pub earthquake_feed_url: Option<String>,

    /// Plate boundary GeoJSON URL
    #[serde(default = "default_plates_url")]
    pub plate_boundaries_url: String,

    /// Base map selected on startup
    #[serde(default)]
    pub base_layer: BaseLayer,

    /// Initial map center latitude
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,

    /// Initial map center longitude
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,

    /// Initial zoom level (1.0 - 18.0)
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,

    /// Show the plate boundary overlay once loaded
    #[serde(default = "default_true")]
    pub show_plate_boundaries: bool,

    /// Status pane visible on startup
    #[serde(default = "default_true")]
    pub status_pane_visible: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_feed() -> String {
    Feed::default().to_string()
}

fn default_plates_url() -> String {
    PLATE_BOUNDARIES_URL.to_string()
}

fn default_center_latitude() -> f64 {
    quake_feed::session::DEFAULT_CENTER.lat
}

fn default_center_longitude() -> f64 {
    quake_feed::session::DEFAULT_CENTER.lon
}

fn default_zoom() -> f32 {
    quake_feed::session::DEFAULT_ZOOM
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            mapbox_access_token: None,
            feed: default_feed(),
            earthquake_feed_url: None,
            plate_boundaries_url: default_plates_url(),
            base_layer: BaseLayer::default(),
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            default_zoom: default_zoom(),
            show_plate_boundaries: true,
            status_pane_visible: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Earthquake feed URL: explicit URL, else the named feed, else the default feed.
    pub fn earthquake_url(&self) -> String {
        if let Some(url) = self.earthquake_feed_url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        match self.feed.parse::<Feed>() {
            Ok(feed) => feed.url(),
            Err(e) => {
                warn!("{}; using {}", e, Feed::default());
                Feed::default().url()
            }
        }
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            earthquake_url: self.earthquake_url(),
            plates_url: self.plate_boundaries_url.clone(),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            view: MapView {
                center: GeoPoint::new(self.center_latitude, self.center_longitude),
                zoom: self.default_zoom,
            },
            base_layer: self.base_layer,
            show_plates: self.show_plate_boundaries,
        }
    }

    /// Resolve the access token from CLI, environment, then config
    pub fn resolve_access_token(&self, cli_token: Option<&str>) -> Option<String> {
        let env_token = std::env::var(ACCESS_TOKEN_ENV).ok();
        pick_token(cli_token, env_token.as_deref(), self.mapbox_access_token.as_deref())
    }
}

fn pick_token(cli: Option<&str>, env: Option<&str>, config: Option<&str>) -> Option<String> {
    [cli, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.feed, "significant_month");
        assert_eq!(
            config.earthquake_url(),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/significant_month.geojson"
        );
        let options = config.session_options();
        assert_eq!(options.view.center, GeoPoint::new(37.09, -95.71));
        assert!(options.show_plates);
    }

    #[test]
    fn test_explicit_url_wins_over_feed() {
        let config = AppConfig {
            feed: "all_hour".to_string(),
            earthquake_feed_url: Some("http://localhost:8000/q.geojson".to_string()),
            ..Default::default()
        };
        assert_eq!(config.earthquake_url(), "http://localhost:8000/q.geojson");

        let config = AppConfig {
            feed: "all_hour".to_string(),
            ..Default::default()
        };
        assert!(config.earthquake_url().ends_with("/all_hour.geojson"));
    }

    #[test]
    fn test_unknown_feed_falls_back() {
        let config = AppConfig {
            feed: "everything_forever".to_string(),
            ..Default::default()
        };
        assert!(config.earthquake_url().ends_with("/significant_month.geojson"));
    }

    #[test]
    fn test_token_precedence() {
        assert_eq!(pick_token(Some("cli"), Some("env"), Some("cfg")).as_deref(), Some("cli"));
        assert_eq!(pick_token(None, Some("env"), Some("cfg")).as_deref(), Some("env"));
        assert_eq!(pick_token(Some("  "), Some(""), Some("cfg")).as_deref(), Some("cfg"));
        assert_eq!(pick_token(None, None, None), None);
    }
}
