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

//! Fix quality classification.
//!
//! The rover reports its position solution as a free-form label ("RTK FIX",
//! "RTK FLOAT", "DGPS", ...). Classification is an ordered substring match:
//! labels can carry more than one token, so the first match wins rather than
//! the categories being exclusive. "RTK FIX" must be tested before "FLOAT",
//! and "GPS" before "DGPS" to match the firmware's own ordering.

use egui::Color32;

/// Severity tier of the current position solution, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixQuality {
    /// Fixed-integer RTK solution.
    RtkFixed,
    /// Float RTK solution.
    RtkFloat,
    /// Autonomous GPS solution.
    Gps,
    /// Differential GPS solution. Unreachable from `classify` as long as
    /// every DGPS label also contains "GPS"; kept for the color table.
    #[allow(dead_code)]
    Dgps,
    /// No usable solution.
    #[default]
    NoFix,
}

impl FixQuality {
    /// Classify a fix label. `None` and the empty string classify as [`FixQuality::NoFix`].
    #[must_use]
    pub fn classify(label: Option<&str>) -> Self {
        let label = label.unwrap_or("");
        if label.contains("RTK FIX") {
            Self::RtkFixed
        } else if label.contains("FLOAT") {
            Self::RtkFloat
        } else if label.contains("GPS") {
            Self::Gps
        } else if label.contains("DGPS") {
            Self::Dgps
        } else {
            Self::NoFix
        }
    }

    /// Color for the status badge. No-fix shows neutral gray here.
    #[must_use]
    pub fn badge_color(self) -> Color32 {
        match self {
            Self::RtkFixed => Color32::from_rgb(0x28, 0xa7, 0x45),
            Self::RtkFloat => Color32::from_rgb(0xff, 0xc1, 0x07),
            Self::Gps => Color32::from_rgb(0x0d, 0x6e, 0xfd),
            Self::Dgps => Color32::from_rgb(0x0d, 0xca, 0xf0),
            Self::NoFix => Color32::from_rgb(0x6c, 0x75, 0x7d),
        }
    }

    /// Color for the map marker and track tint. No-fix shows alarm red here.
    ///
    /// The two tables diverge only on the no-fix entry; that divergence is
    /// intentional and mirrors the device's own UI.
    #[must_use]
    pub fn marker_color(self) -> Color32 {
        match self {
            Self::NoFix => Color32::from_rgb(0xdc, 0x35, 0x45),
            other => other.badge_color(),
        }
    }

    /// Label shown in the badge when the device sends no fix string.
    pub const NO_FIX_LABEL: &'static str = "NO FIX";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tiers() {
        assert_eq!(FixQuality::classify(Some("RTK FIX")), FixQuality::RtkFixed);
        assert_eq!(FixQuality::classify(Some("RTK FLOAT")), FixQuality::RtkFloat);
        assert_eq!(FixQuality::classify(Some("GPS")), FixQuality::Gps);
        assert_eq!(FixQuality::classify(Some("NO FIX")), FixQuality::NoFix);
    }

    #[test]
    fn test_classify_priority_order() {
        // A label carrying both tokens classifies by the higher-priority one.
        assert_eq!(
            FixQuality::classify(Some("RTK FIX (was FLOAT)")),
            FixQuality::RtkFixed
        );
        // "DGPS" contains "GPS", so the GPS arm wins by ordering.
        assert_eq!(FixQuality::classify(Some("DGPS")), FixQuality::Gps);
    }

    #[test]
    fn test_classify_missing_label() {
        assert_eq!(FixQuality::classify(None), FixQuality::NoFix);
        assert_eq!(FixQuality::classify(Some("")), FixQuality::NoFix);
    }

    #[test]
    fn test_no_fix_colors_diverge() {
        // Gray badge, red marker. Both views agree on tier, not on color.
        assert_ne!(
            FixQuality::NoFix.badge_color(),
            FixQuality::NoFix.marker_color()
        );
        assert_eq!(
            FixQuality::RtkFixed.badge_color(),
            FixQuality::RtkFixed.marker_color()
        );
    }
}
