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

//! Rover telemetry state, owned by the polling loop.
//!
//! [`RoverTelemetry`] is the single mutation point for everything a poll
//! cycle produces: the latest record, fix classification, last valid
//! position, the bounded track, and compass state. The UI never mutates it;
//! each frame takes a [`TelemetrySnapshot`] under a short lock.

pub mod track;

use chrono::{DateTime, Utc};
use rover_client::StatusRecord;

use crate::compass::CompassState;
use crate::fix::FixQuality;
use track::{TrackBuffer, TrackPoint};

/// Poll-side telemetry state. Initialized empty with no-fix defaults.
#[derive(Debug, Default)]
pub struct RoverTelemetry {
    latest: Option<StatusRecord>,
    quality: FixQuality,
    position: Option<(f64, f64)>,
    track: TrackBuffer,
    compass: CompassState,
    applied_seq: u64,
    polls_ok: u64,
    polls_failed: u64,
    last_update: Option<DateTime<Utc>>,
}

/// Read-only copy of the telemetry state for one UI frame.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub latest: Option<StatusRecord>,
    pub quality: FixQuality,
    pub position: Option<(f64, f64)>,
    pub track: Vec<TrackPoint>,
    pub compass: CompassState,
    pub polls_ok: u64,
    pub polls_failed: u64,
    pub last_update: Option<DateTime<Utc>>,
}

impl RoverTelemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one successfully fetched status record.
    ///
    /// `seq` is the poll tick that issued the request. A response whose tick
    /// is not newer than the last applied one lost the race to a later
    /// response and is dropped wholesale — returns false, state untouched.
    pub fn apply_status(&mut self, seq: u64, record: StatusRecord) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;

        self.quality = FixQuality::classify(record.fix.as_deref());
        self.compass.update(record.heading_deg);

        if let (Some(lat), Some(lon)) = (record.lat, record.lon) {
            // append() enforces the same validity rules the marker uses:
            // finite coordinates, and (0, 0) means the fix is degenerate.
            if self.track.append(lat, lon) {
                self.position = Some((lat, lon));
            }
        }

        self.latest = Some(record);
        self.polls_ok += 1;
        self.last_update = Some(Utc::now());
        true
    }

    /// Record a failed poll. Nothing else changes: the view stays stale
    /// rather than degrading, and the next tick is the retry.
    pub fn poll_failed(&mut self) {
        self.polls_failed += 1;
    }

    #[must_use]
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            latest: self.latest.clone(),
            quality: self.quality,
            position: self.position,
            track: self.track.points().iter().copied().collect(),
            compass: self.compass,
            polls_ok: self.polls_ok,
            polls_failed: self.polls_failed,
            last_update: self.last_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skyplot;
    use egui::Color32;
    use rover_client::SatelliteObservation;

    fn rtk_record() -> StatusRecord {
        StatusRecord {
            fix: Some("RTK FIX".to_string()),
            lat: Some(41.1),
            lon: Some(-74.0),
            sats_detail: vec![SatelliteObservation {
                id: 5,
                az: 0.0,
                el: 90.0,
                used: true,
            }],
            ..StatusRecord::default()
        }
    }

    #[test]
    fn test_apply_status_end_to_end() {
        let mut telemetry = RoverTelemetry::new();
        assert!(telemetry.apply_status(1, rtk_record()));

        let snap = telemetry.snapshot();
        assert_eq!(snap.quality, FixQuality::RtkFixed);
        assert_eq!(snap.quality.badge_color(), Color32::from_rgb(0x28, 0xa7, 0x45));
        assert_eq!(snap.quality.marker_color(), Color32::from_rgb(0x28, 0xa7, 0x45));
        assert_eq!(snap.position, Some((41.1, -74.0)));
        assert_eq!(snap.track.len(), 1);
        assert_eq!(snap.track[0], TrackPoint { lat: 41.1, lon: -74.0 });

        // One used satellite at the zenith: one green dot at the center.
        let points = skyplot::project(&snap.latest.unwrap().sats_detail);
        assert_eq!(points.len(), 1);
        assert!(points[0].visible);
        assert_eq!(points[0].color, Color32::from_rgb(0x00, 0xff, 0x00));
        assert!((points[0].x - 85.0).abs() < 1e-4);
        assert!((points[0].y - 85.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_position_never_appends() {
        let mut telemetry = RoverTelemetry::new();
        let record = StatusRecord {
            lat: Some(0.0),
            lon: Some(0.0),
            ..rtk_record()
        };
        assert!(telemetry.apply_status(1, record));

        let snap = telemetry.snapshot();
        // Still classified, but no marker position and no track growth.
        assert_eq!(snap.quality, FixQuality::RtkFixed);
        assert_eq!(snap.position, None);
        assert!(snap.track.is_empty());
    }

    #[test]
    fn test_missing_coordinates_skip_position_only() {
        let mut telemetry = RoverTelemetry::new();
        let record = StatusRecord {
            lat: None,
            lon: None,
            heading_deg: Some(90.0),
            ..rtk_record()
        };
        assert!(telemetry.apply_status(1, record));
        let snap = telemetry.snapshot();
        assert!(snap.track.is_empty());
        assert_eq!(snap.compass.rotation_deg(), Some(90.0));
    }

    #[test]
    fn test_poll_failure_leaves_state_unchanged() {
        let mut telemetry = RoverTelemetry::new();
        telemetry.apply_status(1, rtk_record());
        let before = telemetry.snapshot();

        telemetry.poll_failed();

        let after = telemetry.snapshot();
        assert_eq!(after.track.len(), before.track.len());
        assert_eq!(after.compass, before.compass);
        assert_eq!(after.quality, before.quality);
        assert_eq!(after.position, before.position);
        assert_eq!(after.polls_failed, before.polls_failed + 1);
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut telemetry = RoverTelemetry::new();
        assert!(telemetry.apply_status(3, rtk_record()));

        let stale = StatusRecord {
            fix: Some("NO FIX".to_string()),
            lat: Some(12.0),
            lon: Some(34.0),
            ..StatusRecord::default()
        };
        assert!(!telemetry.apply_status(2, stale));

        let snap = telemetry.snapshot();
        assert_eq!(snap.quality, FixQuality::RtkFixed);
        assert_eq!(snap.track.len(), 1);
        assert_eq!(snap.polls_ok, 1);
    }

    #[test]
    fn test_compass_freeze_across_cycles() {
        let mut telemetry = RoverTelemetry::new();
        let mut record = rtk_record();
        record.heading_deg = Some(45.06);
        telemetry.apply_status(1, record);

        let mut next = rtk_record();
        next.heading_deg = None;
        telemetry.apply_status(2, next);

        let snap = telemetry.snapshot();
        assert_eq!(snap.compass.rotation_deg(), Some(45.06));
        assert_eq!(snap.compass.heading_text(), "45.1");
    }
}
