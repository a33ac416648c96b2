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

use chrono::Utc;
use egui::{Color32, RichText, Ui};

use crate::fix::FixQuality;
use crate::telemetry::TelemetrySnapshot;

const LABEL_COLOR: Color32 = Color32::from_rgb(130, 130, 130);
const VALUE_COLOR: Color32 = Color32::from_rgb(200, 200, 200);
const SECTION_COLOR: Color32 = Color32::from_rgb(150, 150, 150);

pub struct StatusPane;

impl StatusPane {
    /// Draw the fix badge: label text on the badge color table's tint.
    pub fn badge(ui: &mut Ui, snapshot: &TelemetrySnapshot) {
        let label = snapshot
            .latest
            .as_ref()
            .and_then(|r| r.fix.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FixQuality::NO_FIX_LABEL.to_string());

        egui::Frame::new()
            .fill(snapshot.quality.badge_color())
            .corner_radius(10.0)
            .inner_margin(egui::Margin::symmetric(10, 4))
            .show(ui, |ui| {
                ui.label(
                    RichText::new(label)
                        .color(Color32::WHITE)
                        .size(12.0)
                        .strong(),
                );
            });
    }

    /// Draw the live status card sections.
    pub fn render(ui: &mut Ui, snapshot: &TelemetrySnapshot) {
        let record = snapshot.latest.as_ref();

        Self::section(ui, "FIX");
        Self::row(ui, "Sats:", fmt_u32(record.and_then(|r| r.sats)));
        Self::row(ui, "HDOP:", fmt_f64(record.and_then(|r| r.hdop), 1));
        Self::row(
            ui,
            "RTCM:",
            record
                .and_then(|r| r.rtcmtime)
                .map_or_else(unknown, |t| format!("{t:.0}s ago")),
        );

        ui.add_space(6.0);
        Self::section(ui, "MOTION");
        Self::row(ui, "Speed:", fmt_f64(record.and_then(|r| r.speed_kn), 1) + " kn");
        Self::row(ui, "Heading:", snapshot.compass.heading_text() + "°");

        ui.add_space(6.0);
        Self::section(ui, "POSITION");
        Self::row_mono(ui, "Lat:", fmt_f64(record.and_then(|r| r.lat), 6));
        Self::row_mono(ui, "Lon:", fmt_f64(record.and_then(|r| r.lon), 6));
        Self::row(ui, "Track:", format!("{} pts", snapshot.track.len()));

        ui.add_space(6.0);
        Self::section(ui, "LINK");
        let wifi = match (
            record.and_then(|r| r.wifi.clone()),
            record.and_then(|r| r.rssi),
        ) {
            (Some(wifi), Some(rssi)) => format!("{wifi} ({rssi} dBm)"),
            (Some(wifi), None) => wifi,
            _ => unknown(),
        };
        Self::row(ui, "Wi-Fi:", wifi);
        Self::row_mono(ui, "IP:", fmt_str(record.and_then(|r| r.ip.clone())));
        Self::row(ui, "NTRIP:", fmt_str(record.and_then(|r| r.ntrip.clone())));

        ui.add_space(6.0);
        Self::section(ui, "POLLS");
        Self::row(
            ui,
            "OK / failed:",
            format!("{} / {}", snapshot.polls_ok, snapshot.polls_failed),
        );
        let age = snapshot
            .last_update
            .map_or_else(unknown, |t| {
                format_age((Utc::now() - t).num_seconds().max(0) as u64)
            });
        Self::row(ui, "Updated:", age);
    }

    fn section(ui: &mut Ui, title: &str) {
        ui.label(RichText::new(title).color(SECTION_COLOR).size(9.0).strong());
        ui.add_space(2.0);
    }

    fn row(ui: &mut Ui, label: &str, value: String) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(label).color(LABEL_COLOR).size(9.0));
            ui.label(RichText::new(value).color(VALUE_COLOR).size(9.0));
        });
    }

    fn row_mono(ui: &mut Ui, label: &str, value: String) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(label).color(LABEL_COLOR).size(9.0));
            ui.label(
                RichText::new(value)
                    .color(VALUE_COLOR)
                    .size(9.0)
                    .monospace(),
            );
        });
    }
}

fn unknown() -> String {
    "---".to_string()
}

fn fmt_u32(value: Option<u32>) -> String {
    value.map_or_else(unknown, |v| v.to_string())
}

fn fmt_f64(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(unknown, |v| format!("{v:.decimals$}"))
}

fn fmt_str(value: Option<String>) -> String {
    value.filter(|s| !s.is_empty()).unwrap_or_else(unknown)
}

fn format_age(seconds: u64) -> String {
    let minutes = seconds / 60;
    if minutes > 0 {
        format!("{}m {}s ago", minutes, seconds % 60)
    } else {
        format!("{seconds}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_missing_values() {
        assert_eq!(fmt_u32(None), "---");
        assert_eq!(fmt_f64(None, 1), "---");
        assert_eq!(fmt_str(Some(String::new())), "---");
    }

    #[test]
    fn test_fmt_precision() {
        assert_eq!(fmt_f64(Some(0.7512), 1), "0.8");
        assert_eq!(fmt_f64(Some(41.1176), 6), "41.117600");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(12), "12s ago");
        assert_eq!(format_age(75), "1m 15s ago");
    }
}
