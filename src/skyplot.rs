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

//! Satellite sky plot: polar (azimuth, elevation) to drawing-surface
//! coordinates, plus the widget that paints it.
//!
//! Elevation 90° projects to the center, elevation 0° to the rim, and
//! azimuth 0° (north) to the top of the surface. Entries with negative or
//! non-finite angles are kept in the output but flagged not visible —
//! callers skip them when drawing.

use egui::{Align2, Color32, FontId, Sense, Stroke, Ui};
use rover_client::SatelliteObservation;

/// Drawing surface edge length in points.
pub const SKY_SIZE: f32 = 170.0;
/// Horizon-ring radius.
pub const SKY_RADIUS: f64 = 80.0;
/// Surface center, both axes.
pub const SKY_CENTER: f64 = 85.0;

const RING_RADII: [f32; 3] = [30.0, 55.0, 80.0];

/// One projected satellite.
///
/// `x`/`y` are meaningful only when `visible` is true.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPoint {
    pub id: i64,
    pub x: f32,
    pub y: f32,
    pub color: Color32,
    pub visible: bool,
}

/// Dot color: green for satellites used in the fix, amber for merely tracked.
#[must_use]
pub fn dot_color(used: bool) -> Color32 {
    if used {
        Color32::from_rgb(0x00, 0xff, 0x00)
    } else {
        Color32::from_rgb(0xff, 0xaa, 0x00)
    }
}

/// Project observations onto a surface with the given radius and center.
///
/// Elevation is only validated against the negative sentinel; a value above
/// 90° yields a negative radius and is drawn as-is rather than clamped.
#[must_use]
pub fn project_at(
    observations: &[SatelliteObservation],
    radius: f64,
    cx: f64,
    cy: f64,
) -> Vec<SkyPoint> {
    observations
        .iter()
        .map(|sat| {
            if !sat.el.is_finite() || !sat.az.is_finite() || sat.el < 0.0 || sat.az < 0.0 {
                return SkyPoint {
                    id: sat.id,
                    x: cx as f32,
                    y: cy as f32,
                    color: dot_color(sat.used),
                    visible: false,
                };
            }

            let r = (90.0 - sat.el) / 90.0 * radius;
            let rad = (sat.az - 90.0).to_radians();
            SkyPoint {
                id: sat.id,
                x: (cx + r * rad.cos()) as f32,
                y: (cy + r * rad.sin()) as f32,
                color: dot_color(sat.used),
                visible: true,
            }
        })
        .collect()
}

/// Project against the reference 170×170 surface.
#[must_use]
pub fn project(observations: &[SatelliteObservation]) -> Vec<SkyPoint> {
    project_at(observations, SKY_RADIUS, SKY_CENTER, SKY_CENTER)
}

/// Draw the sky plot: background disc, rings, crosshair, then one dot and
/// id label per visible satellite. The decoration is static and repainted
/// every frame regardless of data.
pub fn show(ui: &mut Ui, observations: &[SatelliteObservation]) {
    let (response, painter) = ui.allocate_painter(egui::vec2(SKY_SIZE, SKY_SIZE), Sense::hover());
    let rect = response.rect;
    let origin = rect.min;
    let center = origin + egui::vec2(SKY_CENTER as f32, SKY_CENTER as f32);

    painter.circle_filled(center, SKY_SIZE / 2.0, Color32::from_rgb(0x11, 0x11, 0x11));

    let ring_stroke = Stroke::new(1.0, Color32::from_rgb(0x44, 0x44, 0x44));
    for radius in RING_RADII {
        painter.circle_stroke(center, radius, ring_stroke);
    }
    painter.line_segment(
        [center - egui::vec2(0.0, 80.0), center + egui::vec2(0.0, 80.0)],
        ring_stroke,
    );
    painter.line_segment(
        [center - egui::vec2(80.0, 0.0), center + egui::vec2(80.0, 0.0)],
        ring_stroke,
    );

    for point in project(observations) {
        if !point.visible {
            continue;
        }
        let pos = origin + egui::vec2(point.x, point.y);
        painter.circle_filled(pos, 4.0, point.color);
        painter.text(
            pos + egui::vec2(6.0, 4.0),
            Align2::LEFT_CENTER,
            point.id.to_string(),
            FontId::monospace(10.0),
            Color32::from_rgb(0xdd, 0xdd, 0xdd),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sat(id: i64, az: f64, el: f64, used: bool) -> SatelliteObservation {
        SatelliteObservation { id, az, el, used }
    }

    #[test]
    fn test_zenith_projects_to_center_regardless_of_azimuth() {
        for az in [0.0, 90.0, 123.4, 359.9] {
            let points = project(&[sat(1, az, 90.0, true)]);
            assert!(points[0].visible);
            assert!((points[0].x - 85.0).abs() < 1e-4, "az {az}");
            assert!((points[0].y - 85.0).abs() < 1e-4, "az {az}");
        }
    }

    #[test]
    fn test_horizon_north_projects_to_top_of_rim() {
        let points = project(&[sat(2, 0.0, 0.0, false)]);
        assert!(points[0].visible);
        assert!((points[0].x - 85.0).abs() < 1e-4);
        assert!((points[0].y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_horizon_east_projects_to_right_of_rim() {
        let points = project(&[sat(3, 90.0, 0.0, false)]);
        assert!((points[0].x - 165.0).abs() < 1e-4);
        assert!((points[0].y - 85.0).abs() < 1e-4);
    }

    #[test]
    fn test_negative_angles_not_visible() {
        let points = project(&[
            sat(4, -1.0, 45.0, true),
            sat(5, 45.0, -1.0, true),
            sat(6, f64::NAN, 45.0, true),
            sat(7, 45.0, f64::NAN, true),
        ]);
        assert!(points.iter().all(|p| !p.visible));
        // Excluded from rendering, not discarded from the record.
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_over_range_elevation_accepted_as_is() {
        // el > 90 gives a negative radius; the point lands mirrored past
        // the center rather than being clamped.
        let points = project(&[sat(8, 0.0, 135.0, true)]);
        assert!(points[0].visible);
        assert!(points[0].y > 85.0);
    }

    #[test]
    fn test_dot_colors() {
        let points = project(&[sat(9, 10.0, 50.0, true), sat(10, 20.0, 50.0, false)]);
        assert_eq!(points[0].color, Color32::from_rgb(0x00, 0xff, 0x00));
        assert_eq!(points[1].color, Color32::from_rgb(0xff, 0xaa, 0x00));
    }

    #[test]
    fn test_caller_parameterized_surface() {
        let points = project_at(&[sat(11, 0.0, 0.0, true)], 40.0, 50.0, 50.0);
        assert!((points[0].x - 50.0).abs() < 1e-4);
        assert!((points[0].y - 10.0).abs() < 1e-4);
    }
}
