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

//! Base map tile fetching, caching, and Web Mercator projection utilities.

use egui::{ColorImage, TextureHandle};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use walkers::sources::TileSource;
use walkers::TileId;

use crate::mapbox_tiles::MapboxTileSource;

pub const TILE_SIZE: u32 = 256;
const CACHE_DURATION_DAYS: u64 = 7;

/// Latitude where the Web Mercator world becomes square
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Web Mercator projection utilities
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to Web Mercator Y in tile units at `zoom`.
    /// Latitudes beyond the projection limit land on the world edge.
    pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
        let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let n = 2_f64.powf(zoom);
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to Web Mercator X in tile units at `zoom`
    pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        ((lon + 180.0) / 360.0) * n
    }

    /// Convert tile units back to latitude
    pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        let lat_rad = ((std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh()).atan();
        lat_rad.to_degrees()
    }

    /// Convert tile units back to longitude
    pub fn x_to_lon(x: f64, zoom: f64) -> f64 {
        let n = 2_f64.powf(zoom);
        x / n * 360.0 - 180.0
    }
}

pub enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

type TileMap = Arc<Mutex<HashMap<String, TileState>>>;

/// Fetches and caches tiles for the active base layer.
///
/// Tiles are keyed by URL, so switching styles never mixes imagery. A
/// fresh tile map is created on every switch and in-flight downloads for
/// the previous style land in the discarded map.
pub struct TileManager {
    cache_dir: PathBuf,
    source: Option<MapboxTileSource>,
    tiles: TileMap,
}

impl TileManager {
    pub fn new(source: Option<MapboxTileSource>) -> Self {
        let cache_dir = Self::get_cache_dir();

        // Create cache directory if it doesn't exist
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory: {}", e);
        }

        // Clean up old tiles
        Self::cleanup_old_tiles(&cache_dir);

        Self {
            cache_dir,
            source,
            tiles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn get_cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("quakemap");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path) {
        let now = SystemTime::now();
        let max_age = Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60);

        if let Ok(entries) = fs::read_dir(cache_dir) {
            for entry in entries.flatten() {
                let expired = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age > max_age);
                if expired {
                    let _ = fs::remove_file(entry.path());
                    debug!("Removed old tile cache: {:?}", entry.path());
                }
            }
        }
    }

    /// Replace the tile source, e.g. after the user picks another base map
    pub fn set_source(&mut self, source: MapboxTileSource) {
        self.source = Some(source);
        self.tiles = Arc::new(Mutex::new(HashMap::new()));
    }

    pub fn source(&self) -> Option<&MapboxTileSource> {
        self.source.as_ref()
    }

    pub fn max_zoom(&self) -> u8 {
        self.source.as_ref().map_or(18, TileSource::max_zoom)
    }

    /// Get cache filename based on hash of URL
    fn cache_filename(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Get tile from memory or disk cache, or queue it for download
    pub fn get_tile(&self, tile_id: TileId, ctx: &egui::Context) -> Option<TextureHandle> {
        let url = self.source.as_ref()?.tile_url(tile_id);
        let mut tiles = self.tiles.lock().ok()?;

        match tiles.get(&url) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading | TileState::Failed) => None,
            None => {
                let cache_path = self.cache_dir.join(Self::cache_filename(&url));

                if cache_path.exists() {
                    match load_texture(&fs::read(&cache_path).unwrap_or_default(), ctx, tile_id) {
                        Ok(texture) => {
                            tiles.insert(url, TileState::Loaded(texture.clone()));
                            return Some(texture);
                        }
                        Err(e) => warn!("Failed to load cached tile: {}", e),
                    }
                }

                tiles.insert(url.clone(), TileState::Loading);
                self.queue_download(tile_id, url, ctx.clone());
                None
            }
        }
    }

    fn queue_download(&self, tile_id: TileId, url: String, ctx: egui::Context) {
        let tiles = Arc::clone(&self.tiles);
        let cache_path = self.cache_dir.join(Self::cache_filename(&url));

        std::thread::spawn(move || {
            let state = match download_tile(&url, &cache_path) {
                Ok(bytes) => match load_texture(&bytes, &ctx, tile_id) {
                    Ok(texture) => TileState::Loaded(texture),
                    Err(e) => {
                        warn!("Failed to decode tile image: {}", e);
                        TileState::Failed
                    }
                },
                Err(e) => {
                    warn!("Failed to fetch tile {}/{}/{}: {}", tile_id.zoom, tile_id.x, tile_id.y, e);
                    TileState::Failed
                }
            };

            if let Ok(mut tiles) = tiles.lock() {
                tiles.insert(url, state);
            }
            ctx.request_repaint();
        });
    }

    /// Get all tiles needed for a viewport with their screen offsets from
    /// the viewport center, in pixels at `zoom`'s scale
    pub fn get_visible_tiles(
        center_lat: f64,
        center_lon: f64,
        zoom: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Vec<(TileId, f32, f32, f32)> {
        let mut tiles = Vec::new();

        let tile_zoom = zoom.floor().max(0.0);
        let scale = 2_f32.powf(zoom - tile_zoom);
        let tile_px = TILE_SIZE as f32 * scale;
        let tile_zoom_f64 = f64::from(tile_zoom);

        // Center in tile units at the integer zoom
        let center_tile_x = WebMercator::lon_to_x(center_lon, tile_zoom_f64);
        let center_tile_y = WebMercator::lat_to_y(center_lat, tile_zoom_f64);

        // Calculate how many tiles we need in each direction
        let tiles_wide = (viewport_width / tile_px).ceil() as i64 + 2;
        let tiles_high = (viewport_height / tile_px).ceil() as i64 + 2;

        let start_x = center_tile_x.floor() as i64 - tiles_wide / 2;
        let start_y = center_tile_y.floor() as i64 - tiles_high / 2;

        let max_tile = 1_i64 << (tile_zoom as u32);

        for dy in 0..tiles_high {
            for dx in 0..tiles_wide {
                let tile_x = start_x + dx;
                let tile_y = start_y + dy;

                // Latitude doesn't wrap
                if tile_y < 0 || tile_y >= max_tile {
                    continue;
                }

                // Longitude wraps around
                let wrapped_x = tile_x.rem_euclid(max_tile);
                let id = TileId {
                    x: wrapped_x as u32,
                    y: tile_y as u32,
                    zoom: tile_zoom as u8,
                };

                let offset_x = (tile_x as f64 - center_tile_x) as f32 * tile_px;
                let offset_y = (tile_y as f64 - center_tile_y) as f32 * tile_px;

                tiles.push((id, offset_x, offset_y, tile_px));
            }
        }

        tiles
    }

    pub fn has_loading_tiles(&self) -> bool {
        self.tiles
            .lock()
            .map(|tiles| tiles.values().any(|state| matches!(state, TileState::Loading)))
            .unwrap_or(false)
    }

    pub fn get_error_count(&self) -> usize {
        self.tiles
            .lock()
            .map(|tiles| tiles.values().filter(|state| matches!(state, TileState::Failed)).count())
            .unwrap_or(0)
    }
}

fn download_tile(url: &str, cache_path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()).into());
    }
    let bytes = response.bytes()?.to_vec();

    if let Err(e) = fs::write(cache_path, &bytes) {
        warn!("Failed to save tile to cache: {}", e);
    }
    Ok(bytes)
}

fn load_texture(
    bytes: &[u8],
    ctx: &egui::Context,
    tile_id: TileId,
) -> Result<TextureHandle, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

    Ok(ctx.load_texture(
        format!("tile_{}_{}/{}", tile_id.zoom, tile_id.x, tile_id.y),
        color_image,
        egui::TextureOptions::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_round_trip() {
        for (lat, lon) in [(37.09, -95.71), (-33.9, 151.2), (0.0, 0.0), (64.1, -21.9)] {
            let x = WebMercator::lon_to_x(lon, 5.0);
            let y = WebMercator::lat_to_y(lat, 5.0);
            assert!((WebMercator::x_to_lon(x, 5.0) - lon).abs() < 1e-9);
            assert!((WebMercator::y_to_lat(y, 5.0) - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mercator_origin() {
        assert!((WebMercator::lon_to_x(-180.0, 0.0)).abs() < 1e-12);
        assert!((WebMercator::lat_to_y(0.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polar_latitudes_clamp_to_world_edge() {
        let bottom = WebMercator::lat_to_y(-90.0, 3.0);
        let top = WebMercator::lat_to_y(90.0, 3.0);
        assert!(bottom.is_finite() && top.is_finite());
        assert!((bottom - 8.0).abs() < 1e-6);
        assert!(top.abs() < 1e-6);
        assert!((WebMercator::lat_to_y(-MAX_LATITUDE, 3.0) - bottom).abs() < 1e-12);
    }

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let tiles = TileManager::get_visible_tiles(37.09, -95.71, 5.0, 800.0, 600.0);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|(id, _, _, px)| id.zoom == 5 && (*px - 256.0).abs() < f32::EPSILON));
        assert!(tiles.iter().any(|(_, x, y, px)| *x <= 0.0 && *x + px >= 0.0 && *y <= 0.0 && *y + px >= 0.0));
    }

    #[test]
    fn test_visible_tiles_wrap_longitude() {
        let tiles = TileManager::get_visible_tiles(0.0, 179.9, 2.0, 1024.0, 256.0);
        assert!(tiles.iter().all(|(id, _, _, _)| id.x < 4 && id.y < 4));
        assert!(tiles.iter().any(|(id, _, _, _)| id.x == 0));
    }

    #[test]
    fn test_fractional_zoom_scales_tiles() {
        let tiles = TileManager::get_visible_tiles(10.0, 10.0, 5.5, 512.0, 512.0);
        let px = 256.0 * 2_f32.powf(0.5);
        assert!(tiles.iter().all(|(id, _, _, p)| id.zoom == 5 && (*p - px).abs() < 1e-3));
    }
}
