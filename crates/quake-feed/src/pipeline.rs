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

//! Joins the two fetch results into one [`MapSession`].
//!
//! The map is assembled when the earthquake result arrives. A plate layer
//! that arrives first is held back and added as soon as the session exists,
//! so the final state does not depend on which fetch wins.

use log::{debug, warn};

use crate::layer::{EarthquakeLayer, PlateLayer};
use crate::loader::{LoadError, LoadEvent};
use crate::session::{MapSession, SessionOptions};

/// Progress of one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DatasetState {
    #[default]
    Pending,
    /// Loaded with this many items (markers or geometries).
    Loaded(usize),
    Failed(String),
}

#[derive(Debug)]
pub struct Pipeline {
    options: SessionOptions,
    session: Option<MapSession>,
    deferred_plates: Option<PlateLayer>,
    earthquakes: DatasetState,
    plates: DatasetState,
}

impl Pipeline {
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            session: None,
            deferred_plates: None,
            earthquakes: DatasetState::Pending,
            plates: DatasetState::Pending,
        }
    }

    /// Apply one fetch result. Returns the error for the caller to surface,
    /// if the fetch failed.
    pub fn apply(&mut self, event: LoadEvent) -> Option<LoadError> {
        match event {
            LoadEvent::Earthquakes(Ok(layer)) => {
                if self.session.is_some() {
                    warn!("Map already assembled, ignoring repeated earthquake result");
                    return None;
                }
                self.earthquakes = DatasetState::Loaded(layer.len());
                self.assemble(Some(layer));
                None
            }
            LoadEvent::Earthquakes(Err(e)) => {
                warn!("Earthquake feed unavailable, showing map without it: {}", e);
                self.earthquakes = DatasetState::Failed(e.to_string());
                self.assemble(None);
                Some(e)
            }
            LoadEvent::PlateBoundaries(Ok(layer)) => {
                self.plates = DatasetState::Loaded(layer.geometry_count());
                match self.session.as_mut() {
                    Some(session) => session.add_plate_layer(layer),
                    None => {
                        debug!("Map not assembled yet, deferring plate layer");
                        self.deferred_plates = Some(layer);
                    }
                }
                None
            }
            LoadEvent::PlateBoundaries(Err(e)) => {
                self.plates = DatasetState::Failed(e.to_string());
                Some(e)
            }
        }
    }

    fn assemble(&mut self, earthquakes: Option<EarthquakeLayer>) {
        if self.session.is_some() {
            return;
        }
        let mut session = MapSession::assemble(self.options, earthquakes);
        if let Some(plates) = self.deferred_plates.take() {
            session.add_plate_layer(plates);
        }
        self.session = Some(session);
    }

    #[must_use]
    pub fn session(&self) -> Option<&MapSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut MapSession> {
        self.session.as_mut()
    }

    #[must_use]
    pub fn earthquakes_state(&self) -> &DatasetState {
        &self.earthquakes
    }

    #[must_use]
    pub fn plates_state(&self) -> &DatasetState {
        &self.plates
    }

    /// Both datasets have either loaded or failed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.earthquakes != DatasetState::Pending && self.plates != DatasetState::Pending
    }
}
