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

//! Popup content for a single earthquake.
//!
//! Content is kept structured so the viewer can lay it out natively, and
//! rendered to markup only for exports. Feed text is always escaped on the
//! markup path.

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::quake::Earthquake;

/// Date layout used in popups, always UTC.
pub const POPUP_TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S UTC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    /// Heading line (place name).
    pub title: String,
    /// Body lines: date, magnitude, depth.
    pub lines: Vec<String>,
}

impl Popup {
    #[must_use]
    pub fn for_quake(quake: &Earthquake) -> Self {
        let title = quake
            .place
            .clone()
            .unwrap_or_else(|| "Unknown location".to_string());
        let time = quake
            .time
            .map_or_else(|| "Unknown time".to_string(), format_time);
        let magnitude = quake
            .magnitude
            .map_or_else(|| "unknown".to_string(), |m| m.to_string());
        let depth = quake
            .depth
            .map_or_else(|| "unknown".to_string(), |d| d.to_string());

        Self {
            title,
            lines: vec![
                time,
                format!("Magnitude: {magnitude}"),
                format!("Depth: {depth}"),
            ],
        }
    }

    /// Plain text, title first, one line per entry.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = self.title.clone();
        for line in &self.lines {
            out.push('\n');
            out.push_str(line);
        }
        out
    }

    /// Escaped HTML fragment.
    #[must_use]
    pub fn html(&self) -> String {
        let mut out = format!("<h3>{}</h3><hr>", escape_html(&self.title));
        for line in &self.lines {
            let _ = write!(out, "<p>{}</p>", escape_html(line));
        }
        out
    }
}

#[must_use]
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format(POPUP_TIME_FORMAT).to_string()
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
