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

//! Earthquake map core: loading, styling and session state.
//!
//! This library holds everything about the earthquake map that does not
//! depend on a UI toolkit. It is organised in layers that can be used on
//! their own:
//!
//! - **Styling**: [`depth_color`], [`CircleMarker`], [`Popup`], [`Legend`]
//! - **Layers**: [`EarthquakeLayer`] and [`PlateLayer`] built from GeoJSON
//! - **Session**: [`MapSession`] owns view state, base layers and overlays
//! - **Loading**: [`Loader`] fetches both datasets concurrently, and
//!   [`Pipeline`] joins the results into a session regardless of order
//!
//! # Quick Start
//!
//! ```no_run
//! use quake_feed::{Loader, LoaderConfig, Pipeline, SessionOptions};
//!
//! let loader = Loader::spawn(LoaderConfig::default(), || {});
//! let mut pipeline = Pipeline::new(SessionOptions::default());
//!
//! while !pipeline.is_settled() {
//!     if let Some(event) = loader.try_recv() {
//!         if let Some(err) = pipeline.apply(event) {
//!             eprintln!("load failed: {err}");
//!         }
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//!
//! if let Some(quakes) = pipeline.session().and_then(|s| s.earthquakes()) {
//!     for entry in quakes.entries() {
//!         println!("{}", entry.popup.text());
//!     }
//! }
//! ```
//!
//! ## Styling only
//!
//! ```
//! use quake_feed::{depth_color, marker_radius, Rgb};
//!
//! assert_eq!(depth_color(35.2), Rgb(31, 217, 22));
//! assert!((marker_radius(Some(6.1)) - 61.0).abs() < 1e-9);
//! ```

pub mod depth;
pub mod layer;
pub mod legend;
pub mod loader;
pub mod marker;
pub mod pipeline;
pub mod popup;
pub mod quake;
pub mod session;

pub use depth::{depth_color, depth_color_opt, DepthBand, Rgb, DEPTH_BANDS, UNKNOWN_DEPTH_COLOR};
pub use layer::{EarthquakeLayer, PlateLayer, QuakeEntry, PLATE_LINE_COLOR, PLATE_LINE_WEIGHT};
pub use legend::{Corner, Legend, LegendEntry};
pub use loader::{
    fetch_geojson, Feed, FeedParseError, LoadError, LoadEvent, Loader, LoaderConfig,
    PLATE_BOUNDARIES_URL,
};
pub use marker::{marker_radius, CircleMarker, MARKER_FILL_OPACITY, MARKER_STROKE_WEIGHT};
pub use pipeline::{DatasetState, Pipeline};
pub use popup::{escape_html, Popup};
pub use quake::{Earthquake, FeatureError, GeoPoint};
pub use session::{
    BaseLayer, MapSession, MapView, Overlay, OverlayKind, SessionOptions, EARTHQUAKES_OVERLAY,
    PLATES_OVERLAY,
};
