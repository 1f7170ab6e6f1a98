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

//! HTML report of the loaded events.

use log::info;
use quake_feed::{escape_html, MapSession};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const DEFAULT_FILE_NAME: &str = "earthquakes.html";

/// Build a standalone HTML page: the depth legend followed by one popup
/// block per event. Feed text is escaped by the popup builder.
pub fn build_report(session: &MapSession, source_url: &str) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Earthquakes</title>\n\
         <style>.legend i{display:inline-block;width:18px;height:18px;margin-right:8px;opacity:0.7}\
         .quake{border-bottom:1px solid #ccc;padding:4px 0}</style>\n</head>\n<body>\n",
    );

    let _ = writeln!(out, "<p>Source: {}</p>", escape_html(source_url));
    out.push_str(&session.legend().html());
    out.push('\n');

    match session.earthquakes() {
        Some(layer) => {
            let _ = writeln!(out, "<p>{} events</p>", layer.len());
            for entry in layer.entries() {
                let _ = writeln!(out, "<div class=\"quake\">{}</div>", entry.popup.html());
            }
        }
        None => out.push_str("<p>Earthquake feed unavailable</p>\n"),
    }

    out.push_str("</body>\n</html>\n");
    out
}

/// Ask for a destination and write the report there.
///
/// Returns the written path, or `None` if the dialog was cancelled.
pub fn export_with_dialog(
    session: &MapSession,
    source_url: &str,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export earthquakes")
        .set_file_name(DEFAULT_FILE_NAME)
        .add_filter("HTML", &["html", "htm"])
        .save_file()
    else {
        return Ok(None);
    };

    write_report(session, source_url, &path)?;
    Ok(Some(path))
}

pub fn write_report(
    session: &MapSession,
    source_url: &str,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, build_report(session, source_url))?;
    info!("Exported report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_feed::{EarthquakeLayer, SessionOptions};

    fn layer_with_place(place: &str) -> EarthquakeLayer {
        let json = format!(
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature",
                "properties":{{"place":{place:?},"time":1609459200000,"mag":6.1}},
                "geometry":{{"type":"Point","coordinates":[142.3,38.1,35.2]}}}}]}}"#
        );
        EarthquakeLayer::from_geojson(&json.parse().unwrap())
    }

    #[test]
    fn test_report_contains_legend_and_escaped_popups() {
        let session = MapSession::assemble(
            SessionOptions::default(),
            Some(layer_with_place("<b>Near</b> Coast")),
        );
        let html = build_report(&session, "http://feed?a=1&b=2");

        assert!(html.contains("<h4>Depth</h4>"));
        assert!(html.contains("Deeper than 90"));
        assert!(html.contains("<h3>&lt;b&gt;Near&lt;/b&gt; Coast</h3>"));
        assert!(html.contains("<p>Magnitude: 6.1</p>"));
        assert!(html.contains("http://feed?a=1&amp;b=2"));
        assert!(!html.contains("<b>Near</b>"));
    }

    #[test]
    fn test_report_without_earthquakes() {
        let session = MapSession::assemble(SessionOptions::default(), None);
        let html = build_report(&session, "http://feed");
        assert!(html.contains("Earthquake feed unavailable"));
        assert!(html.contains("<div class=\"legend\">"));
    }
}
