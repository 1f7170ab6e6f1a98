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

use quake_feed::BaseLayer;
use walkers::sources::{Attribution, TileSource};
use walkers::TileId;

/// Tile source for one Mapbox style.
/// Every style needs the same access token.
pub struct MapboxTileSource {
    layer: BaseLayer,
    access_token: String,
}

impl MapboxTileSource {
    pub fn new(layer: BaseLayer, access_token: String) -> Self {
        Self {
            layer,
            access_token,
        }
    }

    pub fn layer(&self) -> BaseLayer {
        self.layer
    }
}

impl TileSource for MapboxTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.layer
            .tile_url(&self.access_token, tile_id.zoom, tile_id.x, tile_id.y)
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© Mapbox © OpenStreetMap",
            url: "https://www.mapbox.com/about/maps/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        self.layer.max_zoom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url_uses_style_and_token() {
        let source = MapboxTileSource::new(BaseLayer::Satellite, "pk.secret".to_string());
        let url = source.tile_url(TileId { x: 3, y: 5, zoom: 4 });
        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/tiles/256/4/3/5?access_token=pk.secret"
        );
    }
}
