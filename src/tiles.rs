use egui::{ColorImage, TextureHandle};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

const TILE_SIZE: u32 = 256;
const CACHE_DURATION_DAYS: u64 = 7;

/// Web Mercator projection utilities
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to a fractional tile Y coordinate at the given zoom
    pub fn lat_to_y(lat: f64, zoom: u8) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powi(zoom as i32);
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to a fractional tile X coordinate at the given zoom
    pub fn lon_to_x(lon: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(zoom as i32);
        ((lon + 180.0) / 360.0) * n
    }

    /// Ground resolution in meters per pixel at the given latitude and zoom
    pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
        // Earth circumference at the equator over one 256px tile row
        156_543.033_92 * lat.to_radians().cos() / 2_f64.powf(zoom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Get the tile URL from the OSM standard layer
    pub fn url(&self) -> String {
        let subdomain = ['a', 'b', 'c'][((self.x + self.y) % 3) as usize];
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            subdomain, self.zoom, self.x, self.y
        )
    }

    /// Get cache filename based on hash of URL
    fn cache_filename(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url().as_bytes());
        let hash = hasher.finalize();
        format!("{:x}", hash)
    }
}

pub enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

pub struct TileManager {
    cache_dir: PathBuf,
    tiles: Arc<Mutex<HashMap<TileCoord, TileState>>>,
    download_queue: Arc<Mutex<Vec<TileCoord>>>,
}

impl Default for TileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TileManager {
    pub fn new() -> Self {
        let cache_dir = Self::get_cache_dir();

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory: {}", e);
        }

        Self::cleanup_old_tiles(&cache_dir);

        Self {
            cache_dir,
            tiles: Arc::new(Mutex::new(HashMap::new())),
            download_queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn get_cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("rover-desktop");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path) {
        let now = SystemTime::now();
        let max_age = Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60);

        if let Ok(entries) = fs::read_dir(cache_dir) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    if let Ok(modified) = metadata.modified() {
                        if let Ok(age) = now.duration_since(modified) {
                            if age > max_age {
                                let _ = fs::remove_file(entry.path());
                                debug!("Removed expired tile cache entry: {:?}", entry.path());
                            }
                        }
                    }
                }
            }
        }
    }

    fn decode_tile(bytes: &[u8]) -> Result<ColorImage, String> {
        let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
        let rgba = img.to_rgba8();
        Ok(ColorImage::from_rgba_unmultiplied(
            [TILE_SIZE as usize, TILE_SIZE as usize],
            &rgba.into_raw(),
        ))
    }

    /// Get tile from cache or queue for download
    pub fn get_tile(&self, coord: TileCoord, ctx: &egui::Context) -> Option<TextureHandle> {
        let mut tiles = self.tiles.lock().unwrap();

        match tiles.get(&coord) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading) | Some(TileState::Failed) => None,
            None => {
                let cache_path = self.cache_dir.join(format!("{}.png", coord.cache_filename()));

                if cache_path.exists() {
                    match fs::read(&cache_path)
                        .map_err(|e| e.to_string())
                        .and_then(|bytes| Self::decode_tile(&bytes))
                    {
                        Ok(color_image) => {
                            let texture = ctx.load_texture(
                                format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
                                color_image,
                                Default::default(),
                            );
                            tiles.insert(coord, TileState::Loaded(texture.clone()));
                            Some(texture)
                        }
                        Err(e) => {
                            warn!("Failed to load cached tile: {}", e);
                            tiles.insert(coord, TileState::Loading);
                            self.queue_download(coord, ctx.clone());
                            None
                        }
                    }
                } else {
                    tiles.insert(coord, TileState::Loading);
                    self.queue_download(coord, ctx.clone());
                    None
                }
            }
        }
    }

    fn queue_download(&self, coord: TileCoord, ctx: egui::Context) {
        let mut queue = self.download_queue.lock().unwrap();
        if !queue.contains(&coord) {
            queue.push(coord);

            let tiles = self.tiles.clone();
            let cache_dir = self.cache_dir.clone();

            std::thread::spawn(move || {
                Self::download_tile(coord, tiles, cache_dir, ctx);
            });
        }
    }

    fn download_tile(
        coord: TileCoord,
        tiles: Arc<Mutex<HashMap<TileCoord, TileState>>>,
        cache_dir: PathBuf,
        ctx: egui::Context,
    ) {
        let url = coord.url();
        debug!("Downloading tile: {}", url);

        let result = reqwest::blocking::get(&url)
            .map_err(|e| e.to_string())
            .and_then(|response| {
                if response.status().is_success() {
                    response.bytes().map_err(|e| e.to_string())
                } else {
                    Err(format!("HTTP {}", response.status()))
                }
            });

        let state = match result {
            Ok(bytes) => {
                let cache_path = cache_dir.join(format!("{}.png", coord.cache_filename()));
                if let Err(e) = fs::write(&cache_path, &bytes) {
                    warn!("Failed to save tile to cache: {}", e);
                }

                match Self::decode_tile(&bytes) {
                    Ok(color_image) => {
                        let texture = ctx.load_texture(
                            format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
                            color_image,
                            Default::default(),
                        );
                        ctx.request_repaint();
                        TileState::Loaded(texture)
                    }
                    Err(e) => {
                        warn!("Failed to decode tile image: {}", e);
                        TileState::Failed
                    }
                }
            }
            Err(e) => {
                warn!("Failed to fetch tile {}: {}", url, e);
                TileState::Failed
            }
        };

        tiles.lock().unwrap().insert(coord, state);
    }

    /// Get all tiles needed for a viewport
    pub fn get_visible_tiles(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Vec<(TileCoord, f32, f32)> {
        let mut tiles = Vec::new();

        let center_tile_x = WebMercator::lon_to_x(center_lon, zoom);
        let center_tile_y = WebMercator::lat_to_y(center_lat, zoom);

        let tiles_wide = (viewport_width / TILE_SIZE as f32).ceil() as i32 + 2;
        let tiles_high = (viewport_height / TILE_SIZE as f32).ceil() as i32 + 2;

        let start_x = center_tile_x.floor() as i32 - tiles_wide / 2;
        let start_y = center_tile_y.floor() as i32 - tiles_high / 2;

        let max_tile = 2_i32.pow(zoom as u32);

        for dy in 0..tiles_high {
            for dx in 0..tiles_wide {
                let tile_x = start_x + dx;
                let tile_y = start_y + dy;

                // Longitude wraps around; latitude doesn't
                let wrapped_x = ((tile_x % max_tile) + max_tile) % max_tile;

                if tile_y >= 0 && tile_y < max_tile {
                    let coord = TileCoord::new(wrapped_x as u32, tile_y as u32, zoom);

                    let offset_x = (tile_x as f64 - center_tile_x) * TILE_SIZE as f64;
                    let offset_y = (tile_y as f64 - center_tile_y) * TILE_SIZE as f64;

                    tiles.push((coord, offset_x as f32, offset_y as f32));
                }
            }
        }

        tiles
    }

    pub fn has_loading_tiles(&self) -> bool {
        let tiles = self.tiles.lock().unwrap();
        tiles.values().any(|state| matches!(state, TileState::Loading))
    }

    pub fn get_error_count(&self) -> usize {
        let tiles = self.tiles.lock().unwrap();
        tiles.values().filter(|state| matches!(state, TileState::Failed)).count()
    }
}
