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

//! Map view: basemap tiles, the rover track, and the current-fix marker.
//!
//! The tile layer is a startup capability. When the map is disabled, no
//! tile manager exists and every map-dependent path — including the
//! auto-center toggle — is inert; the panel renders a placeholder instead.

use egui::{Align2, Color32, FontId, Stroke, Ui};
use log::info;

use crate::telemetry::TelemetrySnapshot;
use crate::tiles::{TileManager, WebMercator};

const TILE_PIXEL_SIZE: f32 = 256.0;
const MIN_ZOOM: f32 = 3.0;
const MAX_ZOOM: f32 = 19.0;

const TRACK_COLOR: Color32 = Color32::from_rgb(0x00, 0xff, 0xff);
const MARKER_OUTLINE: Color32 = Color32::BLACK;

/// Map widget state. Lives for the whole session.
pub struct MapView {
    tiles: Option<TileManager>,
    center_lat: f64,
    center_lon: f64,
    zoom: f32,
    pub auto_center: bool,
    tile_error: Option<String>,
}

impl MapView {
    /// Create the map view. With `enabled` false no tile manager is
    /// constructed and [`MapView::show`] only draws a placeholder.
    pub fn new(enabled: bool, default_zoom: f32, auto_center: bool) -> Self {
        if !enabled {
            info!("Map tiles unavailable - map rendering disabled");
        }
        Self {
            tiles: enabled.then(TileManager::new),
            // Initial viewport before the first fix arrives.
            center_lat: 41.1176,
            center_lon: -74.0075,
            zoom: default_zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            auto_center,
            tile_error: None,
        }
    }

    /// Whether the tile layer was available at startup.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.tiles.is_some()
    }

    /// Draw the map for this frame.
    pub fn show(&mut self, ui: &mut Ui, snapshot: &TelemetrySnapshot) {
        let Some(tile_manager) = &self.tiles else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("Map disabled")
                        .color(Color32::from_rgb(108, 117, 125))
                        .size(14.0),
                );
            });
            return;
        };

        // Follow the latest valid fix at the current zoom. A disabled
        // toggle leaves the viewport wherever the user dragged it.
        if self.auto_center {
            if let Some((lat, lon)) = snapshot.position {
                self.center_lat = lat;
                self.center_lon = lon;
            }
        }

        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), ui.available_height()),
            egui::Sense::click_and_drag(),
        );
        let rect = response.rect;
        let center = rect.center();

        painter.rect_filled(rect, 0.0, Color32::from_rgb(200, 220, 240));

        let zoom_delta = ui.ctx().input(|i| i.zoom_delta());
        if (zoom_delta - 1.0).abs() > 0.001 {
            self.zoom = (self.zoom + zoom_delta.log2()).clamp(MIN_ZOOM, MAX_ZOOM);
        }

        let tile_zoom = self.zoom.round() as u8;

        let visible_tiles = tile_manager.get_visible_tiles(
            self.center_lat,
            self.center_lon,
            tile_zoom,
            rect.width(),
            rect.height(),
        );

        let mut tiles_rendered = 0;
        for (tile_coord, offset_x, offset_y) in visible_tiles {
            if let Some(texture) = tile_manager.get_tile(tile_coord, ui.ctx()) {
                let tile_rect = egui::Rect::from_min_size(
                    egui::pos2(center.x + offset_x, center.y + offset_y),
                    egui::vec2(TILE_PIXEL_SIZE, TILE_PIXEL_SIZE),
                );
                painter.image(
                    texture.id(),
                    tile_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
                tiles_rendered += 1;
            }
        }

        if tile_manager.get_error_count() > 0 {
            self.tile_error = Some(format!(
                "Failed to load {} tiles",
                tile_manager.get_error_count()
            ));
        } else if tile_manager.has_loading_tiles() {
            self.tile_error = Some("Loading map tiles...".to_string());
        } else if tiles_rendered > 0 {
            self.tile_error = None;
        }

        if response.dragged() {
            let delta = response.drag_delta();
            let scale = 2.0_f64.powf(self.zoom as f64);
            let lat_per_pixel = 180.0 / (TILE_PIXEL_SIZE as f64 * scale);
            let lon_per_pixel = 360.0 / (TILE_PIXEL_SIZE as f64 * scale);

            let cos_lat = self.center_lat.to_radians().cos();

            self.center_lat += delta.y as f64 * lat_per_pixel;
            self.center_lon -= delta.x as f64 * lon_per_pixel / cos_lat.max(0.1);
            self.center_lat = self.center_lat.clamp(-85.0, 85.0);
        }

        let to_screen = |lat: f64, lon: f64| -> egui::Pos2 {
            let tile_x = WebMercator::lon_to_x(lon, tile_zoom);
            let tile_y = WebMercator::lat_to_y(lat, tile_zoom);
            let center_tile_x = WebMercator::lon_to_x(self.center_lon, tile_zoom);
            let center_tile_y = WebMercator::lat_to_y(self.center_lat, tile_zoom);

            egui::pos2(
                center.x + ((tile_x - center_tile_x) * TILE_PIXEL_SIZE as f64) as f32,
                center.y + ((tile_y - center_tile_y) * TILE_PIXEL_SIZE as f64) as f32,
            )
        };

        // Track polyline, oldest to newest
        if snapshot.track.len() >= 2 {
            let points: Vec<egui::Pos2> = snapshot
                .track
                .iter()
                .map(|p| to_screen(p.lat, p.lon))
                .collect();
            painter.add(egui::Shape::line(points, Stroke::new(3.0, TRACK_COLOR)));
        }

        // Current fix: accuracy circle underneath, marker on top
        if let Some((lat, lon)) = snapshot.position {
            let pos = to_screen(lat, lon);
            let marker_color = snapshot.quality.marker_color();

            let hdop = snapshot.latest.as_ref().and_then(|r| r.hdop).unwrap_or(0.0);
            // Simple visualization heuristic, not a confidence interval
            let accuracy_m = (hdop * 1.5).max(0.8);
            let meters_per_pixel =
                WebMercator::meters_per_pixel(lat, self.zoom as f64).max(1e-9);
            let accuracy_px = (accuracy_m / meters_per_pixel) as f32;

            painter.circle_filled(
                pos,
                accuracy_px,
                Color32::from_rgba_unmultiplied(
                    marker_color.r(),
                    marker_color.g(),
                    marker_color.b(),
                    30,
                ),
            );
            painter.circle_stroke(pos, accuracy_px, Stroke::new(1.0, marker_color));

            if rect.contains(pos) {
                painter.circle_filled(pos, 8.0, marker_color);
                painter.circle_stroke(pos, 8.0, Stroke::new(2.0, MARKER_OUTLINE));
            }
        }

        painter.text(
            rect.left_top() + egui::vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            "Drag to pan | Pinch to zoom",
            FontId::proportional(12.0),
            Color32::BLACK,
        );

        painter.text(
            rect.right_bottom() + egui::vec2(-10.0, -10.0),
            Align2::RIGHT_BOTTOM,
            "© OpenStreetMap contributors",
            FontId::proportional(10.0),
            Color32::from_black_alpha(180),
        );

        if let Some(ref error_msg) = self.tile_error {
            let is_error = error_msg.contains("Failed");
            let bg_color = if is_error {
                Color32::from_rgb(220, 50, 50)
            } else {
                Color32::from_rgb(255, 200, 100)
            };

            let error_pos = rect.center_top() + egui::vec2(0.0, 20.0);
            let text_galley = painter.layout_no_wrap(
                error_msg.clone(),
                FontId::proportional(12.0),
                Color32::WHITE,
            );

            let padding = egui::vec2(12.0, 6.0);
            let bubble_rect =
                egui::Rect::from_center_size(error_pos, text_galley.size() + padding * 2.0);

            painter.rect_filled(bubble_rect, 5.0, bg_color);
            painter.text(
                error_pos,
                Align2::CENTER_CENTER,
                error_msg,
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
    }
}
