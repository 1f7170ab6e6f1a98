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

mod app;
mod config;
mod controls;
mod export;
mod mapbox_tiles;
mod status;
mod status_pane;
mod tiles;

use app::{LaunchSettings, QuakeMapApp};
use clap::Parser;
use config::AppConfig;
use log::{info, warn};
use quake_feed::Feed;

/// Map of recent earthquakes and tectonic plate boundaries.
#[derive(Parser, Debug)]
#[command(name = "quakemap", version, about)]
struct Cli {
    /// USGS summary feed, e.g. significant_month, 4.5_week, all_day.
    #[arg(long = "feed", value_name = "FEED")]
    feed: Option<Feed>,
    /// Earthquake GeoJSON URL (overrides --feed).
    #[arg(long = "feed-url", value_name = "URL")]
    feed_url: Option<String>,
    /// Plate boundary GeoJSON URL.
    #[arg(long = "plates-url", value_name = "URL")]
    plates_url: Option<String>,
    /// Mapbox access token (overrides MAPBOX_ACCESS_TOKEN and the config file).
    #[arg(long = "access-token", value_name = "TOKEN")]
    access_token: Option<String>,
    /// Initial zoom level.
    #[arg(long = "zoom", value_name = "LEVEL")]
    zoom: Option<f32>,
    /// Start with the plate boundary overlay hidden.
    #[arg(long = "no-plates", action = clap::ArgAction::SetTrue)]
    no_plates: bool,
    /// Print the config file location and exit.
    #[arg(long = "print-config-path", action = clap::ArgAction::SetTrue)]
    print_config_path: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the stored config
    fn launch_settings(&self, config: &AppConfig, access_token: Option<String>) -> LaunchSettings {
        let mut loader = config.loader_config();
        if let Some(feed) = self.feed {
            loader.earthquake_url = feed.url();
        }
        if let Some(url) = &self.feed_url {
            loader.earthquake_url.clone_from(url);
        }
        if let Some(url) = &self.plates_url {
            loader.plates_url.clone_from(url);
        }

        let mut session = config.session_options();
        if let Some(zoom) = self.zoom {
            session.view.zoom = zoom;
        }
        if self.no_plates {
            session.show_plates = false;
        }

        LaunchSettings {
            loader,
            session,
            access_token,
        }
    }
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.print_config_path {
        match AppConfig::get_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => eprintln!("Failed to locate config file: {}", e),
        }
        return Ok(());
    }

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let access_token = config.resolve_access_token(cli.access_token.as_deref());
    let settings = cli.launch_settings(&config, access_token);

    info!("Starting QuakeMap...");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("QuakeMap"),
        ..Default::default()
    };

    eframe::run_native(
        "QuakeMap",
        options,
        Box::new(move |cc| Ok(Box::new(QuakeMapApp::new(cc, config, settings)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_follow_config() {
        let cli = Cli::parse_from(["quakemap"]);
        let settings = cli.launch_settings(&AppConfig::default(), None);
        assert!(settings.loader.earthquake_url.ends_with("/significant_month.geojson"));
        assert!(settings.session.show_plates);
        assert!((settings.session.view.zoom - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "quakemap",
            "--feed",
            "4.5_week",
            "--plates-url",
            "http://localhost/plates.json",
            "--zoom",
            "3",
            "--no-plates",
        ]);
        let settings = cli.launch_settings(&AppConfig::default(), Some("pk.x".to_string()));
        assert!(settings.loader.earthquake_url.ends_with("/4.5_week.geojson"));
        assert_eq!(settings.loader.plates_url, "http://localhost/plates.json");
        assert!(!settings.session.show_plates);
        assert!((settings.session.view.zoom - 3.0).abs() < f32::EPSILON);
        assert_eq!(settings.access_token.as_deref(), Some("pk.x"));
    }

    #[test]
    fn test_feed_url_beats_feed() {
        let cli = Cli::parse_from([
            "quakemap",
            "--feed",
            "all_day",
            "--feed-url",
            "http://localhost/q.geojson",
        ]);
        let settings = cli.launch_settings(&AppConfig::default(), None);
        assert_eq!(settings.loader.earthquake_url, "http://localhost/q.geojson");
    }

    #[test]
    fn test_rejects_unknown_feed() {
        assert!(Cli::try_parse_from(["quakemap", "--feed", "everything"]).is_err());
    }
}
