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

//! Heading compass state and widget.

use egui::{Align2, Color32, FontId, Sense, Stroke, Ui};

/// Widget diameter in points.
pub const COMPASS_SIZE: f32 = 150.0;

const NEEDLE_LENGTH: f32 = 58.0;
const TAIL_LENGTH: f32 = 14.0;

/// Last rendered compass rotation.
///
/// An invalid heading (absent or non-finite) freezes the needle at its
/// previous rotation instead of resetting it — a rover sitting still stops
/// reporting heading, and snapping the needle to north would read as a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompassState {
    rotation_deg: Option<f64>,
}

impl CompassState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a heading sample. Absent or non-finite values are ignored.
    pub fn update(&mut self, heading_deg: Option<f64>) {
        if let Some(heading) = heading_deg {
            if heading.is_finite() {
                self.rotation_deg = Some(heading);
            }
        }
    }

    /// Needle rotation in degrees clockwise from north, if one was ever valid.
    #[must_use]
    pub fn rotation_deg(&self) -> Option<f64> {
        self.rotation_deg
    }

    /// Readout under the widget: one decimal place, `---` before first fix.
    #[must_use]
    pub fn heading_text(&self) -> String {
        match self.rotation_deg {
            Some(heading) => format!("{heading:.1}"),
            None => "---".to_string(),
        }
    }
}

/// Draw the compass rose with the needle tinted by fix quality.
pub fn show(ui: &mut Ui, state: &CompassState, needle_tint: Color32) {
    let (response, painter) =
        ui.allocate_painter(egui::vec2(COMPASS_SIZE, COMPASS_SIZE), Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = COMPASS_SIZE / 2.0 - 3.0;

    painter.circle_filled(center, radius, Color32::WHITE);
    painter.circle_stroke(center, radius, Stroke::new(3.0, Color32::from_rgb(85, 85, 85)));

    for (label, dx, dy) in [
        ("N", 0.0, -1.0),
        ("S", 0.0, 1.0),
        ("E", 1.0, 0.0),
        ("W", -1.0, 0.0),
    ] {
        painter.text(
            center + egui::vec2(dx, dy) * (radius - 10.0),
            Align2::CENTER_CENTER,
            label,
            FontId::proportional(12.0),
            Color32::from_rgb(33, 37, 41),
        );
    }

    if let Some(rotation) = state.rotation_deg() {
        let angle = rotation.to_radians();
        let dir = egui::vec2(angle.sin() as f32, -angle.cos() as f32);
        painter.line_segment(
            [center - dir * TAIL_LENGTH, center + dir * NEEDLE_LENGTH],
            Stroke::new(4.0, needle_tint),
        );
        painter.circle_filled(center, 4.0, Color32::from_rgb(33, 37, 41));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_valid_heading() {
        let mut state = CompassState::new();
        state.update(Some(45.06));
        assert_eq!(state.rotation_deg(), Some(45.06));
        assert_eq!(state.heading_text(), "45.1");
    }

    #[test]
    fn test_invalid_heading_freezes() {
        let mut state = CompassState::new();
        state.update(Some(180.0));
        state.update(None);
        assert_eq!(state.rotation_deg(), Some(180.0));
        state.update(Some(f64::NAN));
        assert_eq!(state.rotation_deg(), Some(180.0));
        state.update(Some(f64::INFINITY));
        assert_eq!(state.rotation_deg(), Some(180.0));
    }

    #[test]
    fn test_no_heading_before_first_sample() {
        let mut state = CompassState::new();
        assert_eq!(state.heading_text(), "---");
        state.update(Some(f64::NAN));
        // Freeze, not reset: still no rotation because none was ever valid.
        assert_eq!(state.rotation_deg(), None);
        assert_eq!(state.heading_text(), "---");
    }

    #[test]
    fn test_rotation_not_range_checked() {
        let mut state = CompassState::new();
        state.update(Some(725.5));
        assert_eq!(state.rotation_deg(), Some(725.5));
        assert_eq!(state.heading_text(), "725.5");
    }
}
