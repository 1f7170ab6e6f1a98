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

use chrono::{DateTime, Utc};
use quake_feed::{DatasetState, LoadError, Pipeline};
use std::collections::VecDeque;

const MAX_DIAGNOSTICS: usize = 50;

/// Diagnostic message with timestamp
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Load progress, tile health and diagnostics shown in the status pane
#[derive(Debug)]
pub struct SystemStatus {
    pub earthquake_url: String,
    pub plates_url: String,

    // Dataset progress, mirrored from the pipeline
    pub earthquakes: DatasetState,
    pub plates: DatasetState,
    pub skipped_features: usize,

    pub started_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,

    // Base map
    pub base_layer_name: String,
    pub has_access_token: bool,
    pub tiles_loading: bool,
    pub tile_errors: usize,

    // Diagnostic messages (keep last 50)
    pub diagnostics: VecDeque<DiagnosticMessage>,

    // Performance metrics
    pub last_update_duration_ms: f64,
    pub average_update_duration_ms: f64,
}

impl SystemStatus {
    pub fn new(earthquake_url: String, plates_url: String) -> Self {
        Self {
            earthquake_url,
            plates_url,
            earthquakes: DatasetState::Pending,
            plates: DatasetState::Pending,
            skipped_features: 0,
            started_at: Utc::now(),
            settled_at: None,
            base_layer_name: String::new(),
            has_access_token: false,
            tiles_loading: false,
            tile_errors: 0,
            diagnostics: VecDeque::with_capacity(MAX_DIAGNOSTICS),
            last_update_duration_ms: 0.0,
            average_update_duration_ms: 0.0,
        }
    }

    /// Copy dataset states from the pipeline, logging transitions
    pub fn sync_datasets(&mut self, pipeline: &Pipeline) {
        let earthquakes = pipeline.earthquakes_state().clone();
        if earthquakes != self.earthquakes {
            if let DatasetState::Loaded(count) = earthquakes {
                self.add_diagnostic(
                    DiagnosticLevel::Info,
                    format!("Earthquakes loaded: {} markers", count),
                );
            }
            self.earthquakes = earthquakes;
        }

        let plates = pipeline.plates_state().clone();
        if plates != self.plates {
            if let DatasetState::Loaded(count) = plates {
                self.add_diagnostic(
                    DiagnosticLevel::Info,
                    format!("Plate boundaries loaded: {} geometries", count),
                );
            }
            self.plates = plates;
        }

        if let Some(layer) = pipeline.session().and_then(|s| s.earthquakes()) {
            if layer.skipped() != self.skipped_features {
                self.skipped_features = layer.skipped();
                self.add_diagnostic(
                    DiagnosticLevel::Warning,
                    format!("Skipped {} features without a point", layer.skipped()),
                );
            }
        }

        if self.settled_at.is_none() && pipeline.is_settled() {
            self.settled_at = Some(Utc::now());
        }
    }

    /// Record a failed fetch
    pub fn record_load_error(&mut self, dataset: &str, error: &LoadError) {
        self.add_diagnostic(
            DiagnosticLevel::Error,
            format!("{} failed: {}", dataset, error),
        );
    }

    /// Seconds from startup until both datasets settled
    pub fn load_seconds(&self) -> Option<f64> {
        self.settled_at
            .map(|settled| (settled - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    pub fn update_tiles(&mut self, loading: bool, errors: usize) {
        if errors > self.tile_errors {
            self.add_diagnostic(
                DiagnosticLevel::Warning,
                format!("{} base map tiles failed", errors - self.tile_errors),
            );
        }
        self.tiles_loading = loading;
        self.tile_errors = errors;
    }

    /// Add a diagnostic message
    pub fn add_diagnostic(&mut self, level: DiagnosticLevel, message: String) {
        let diagnostic = DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        };

        self.diagnostics.push_back(diagnostic);

        // Keep only the last N messages
        while self.diagnostics.len() > MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
    }

    /// Update performance metrics
    pub fn update_performance(&mut self, duration_ms: f64) {
        self.last_update_duration_ms = duration_ms;

        // Simple moving average
        const ALPHA: f64 = 0.1; // Smoothing factor
        if self.average_update_duration_ms == 0.0 {
            self.average_update_duration_ms = duration_ms;
        } else {
            self.average_update_duration_ms =
                ALPHA * duration_ms + (1.0 - ALPHA) * self.average_update_duration_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_feed::{EarthquakeLayer, LoadEvent, SessionOptions};

    fn status() -> SystemStatus {
        SystemStatus::new("http://feed".to_string(), "http://plates".to_string())
    }

    #[test]
    fn test_diagnostics_are_capped() {
        let mut status = status();
        for i in 0..(MAX_DIAGNOSTICS + 10) {
            status.add_diagnostic(DiagnosticLevel::Info, format!("message {}", i));
        }
        assert_eq!(status.diagnostics.len(), MAX_DIAGNOSTICS);
        assert_eq!(status.diagnostics.front().unwrap().message, "message 10");
    }

    #[test]
    fn test_sync_datasets_records_transitions_once() {
        let mut status = status();
        let mut pipeline = Pipeline::new(SessionOptions::default());
        pipeline.apply(LoadEvent::Earthquakes(Ok(EarthquakeLayer::default())));

        status.sync_datasets(&pipeline);
        status.sync_datasets(&pipeline);

        assert_eq!(status.earthquakes, DatasetState::Loaded(0));
        assert_eq!(status.plates, DatasetState::Pending);
        assert_eq!(status.diagnostics.len(), 1);
        assert!(status.load_seconds().is_none());
    }

    #[test]
    fn test_settled_after_both_results() {
        let mut status = status();
        let mut pipeline = Pipeline::new(SessionOptions::default());
        pipeline.apply(LoadEvent::Earthquakes(Ok(EarthquakeLayer::default())));
        let err = pipeline
            .apply(LoadEvent::PlateBoundaries(Err(LoadError::Task("boom".to_string()))))
            .unwrap();
        status.record_load_error("Plate boundaries", &err);
        status.sync_datasets(&pipeline);

        assert!(matches!(status.plates, DatasetState::Failed(_)));
        assert!(status.load_seconds().is_some());
        assert!(status
            .diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error && d.message.contains("boom")));
    }

    #[test]
    fn test_tile_errors_logged_on_increase() {
        let mut status = status();
        status.update_tiles(true, 0);
        status.update_tiles(false, 3);
        status.update_tiles(false, 3);
        assert_eq!(status.tile_errors, 3);
        assert_eq!(status.diagnostics.len(), 1);
    }
}
