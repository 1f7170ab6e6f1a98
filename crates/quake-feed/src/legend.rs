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

//! Static depth legend.

use std::fmt::Write as _;

use crate::depth::{Rgb, DEPTH_BANDS};

/// Screen corner a control is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corner {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub color: Rgb,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Legend {
    pub title: &'static str,
    pub corner: Corner,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// The depth key, one row per band, anchored bottom-left.
    #[must_use]
    pub fn depth() -> Self {
        Self {
            title: "Depth",
            corner: Corner::BottomLeft,
            entries: DEPTH_BANDS
                .iter()
                .map(|band| LegendEntry {
                    color: band.color,
                    label: band.label,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn html(&self) -> String {
        let mut out = format!("<div class=\"legend\"><h4>{}</h4>", self.title);
        for entry in &self.entries {
            let _ = write!(
                out,
                "<i style=\"background: {}\"></i><span>{}</span><br>",
                entry.color, entry.label
            );
        }
        out.push_str("</div>");
        out
    }
}

impl Default for Legend {
    fn default() -> Self {
        Self::depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_legend_rows() {
        let legend = Legend::depth();
        assert_eq!(legend.corner, Corner::BottomLeft);
        assert_eq!(legend.entries.len(), 6);
        assert_eq!(legend.entries[0].label, "-10 to 10");
        assert_eq!(legend.entries[5].label, "Deeper than 90");
        assert_eq!(legend.entries[2].color, Rgb(31, 217, 22));
    }

    #[test]
    fn test_building_twice_is_identical_and_independent() {
        let a = Legend::depth();
        let mut b = Legend::depth();
        assert_eq!(a, b);
        assert_eq!(a.html(), b.html());

        b.entries.pop();
        assert_eq!(a.entries.len(), 6);
    }

    #[test]
    fn test_html() {
        let html = Legend::depth().html();
        assert!(html.starts_with("<div class=\"legend\"><h4>Depth</h4>"));
        assert!(html.contains(
            "<i style=\"background: rgb(74, 183, 255)\"></i><span>-10 to 10</span><br>"
        ));
        assert_eq!(html.matches("<i style=").count(), 6);
    }
}
