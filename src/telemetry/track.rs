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

//! Bounded position-history buffer for the map track.

use std::collections::VecDeque;

/// One recorded rover position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Append-only FIFO of recent valid positions, capped at [`TrackBuffer::CAPACITY`].
///
/// Consecutive duplicate points are kept; the only removal is head eviction
/// once the buffer is full.
#[derive(Debug, Default, Clone)]
pub struct TrackBuffer {
    points: VecDeque<TrackPoint>,
}

impl TrackBuffer {
    /// Maximum number of retained points.
    pub const CAPACITY: usize = 500;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position. No-op when either coordinate is non-finite or when
    /// both are exactly zero — the firmware reports (0, 0) before it has a fix.
    ///
    /// Returns whether the point was recorded. The cap is re-enforced on
    /// every append, not just at the boundary crossing.
    pub fn append(&mut self, lat: f64, lon: f64) -> bool {
        if !lat.is_finite() || !lon.is_finite() {
            return false;
        }
        if lat == 0.0 && lon == 0.0 {
            return false;
        }
        self.points.push_back(TrackPoint { lat, lon });
        while self.points.len() > Self::CAPACITY {
            self.points.pop_front();
        }
        true
    }

    /// Points in insertion order, oldest first.
    #[must_use]
    pub fn points(&self) -> &VecDeque<TrackPoint> {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_order() {
        let mut track = TrackBuffer::new();
        assert!(track.append(41.0, -74.0));
        assert!(track.append(41.1, -74.1));
        let points: Vec<_> = track.points().iter().copied().collect();
        assert_eq!(points[0], TrackPoint { lat: 41.0, lon: -74.0 });
        assert_eq!(points[1], TrackPoint { lat: 41.1, lon: -74.1 });
    }

    #[test]
    fn test_append_rejects_origin() {
        let mut track = TrackBuffer::new();
        assert!(!track.append(0.0, 0.0));
        assert!(track.is_empty());
        // A single zero coordinate is a legitimate position.
        assert!(track.append(0.0, -74.0));
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_append_rejects_non_finite() {
        let mut track = TrackBuffer::new();
        assert!(!track.append(f64::NAN, -74.0));
        assert!(!track.append(41.0, f64::INFINITY));
        assert!(!track.append(f64::NEG_INFINITY, f64::NAN));
        assert!(track.is_empty());
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut track = TrackBuffer::new();
        for i in 0..(TrackBuffer::CAPACITY + 1) {
            assert!(track.append(40.0 + i as f64 * 1e-5, -74.0));
        }
        assert_eq!(track.len(), TrackBuffer::CAPACITY);
        // The very first point is the one evicted.
        let head = *track.points().front().unwrap();
        assert_eq!(head.lat, 40.0 + 1e-5);
        let tail = *track.points().back().unwrap();
        assert_eq!(tail.lat, 40.0 + TrackBuffer::CAPACITY as f64 * 1e-5);
    }

    #[test]
    fn test_duplicates_kept() {
        let mut track = TrackBuffer::new();
        assert!(track.append(41.0, -74.0));
        assert!(track.append(41.0, -74.0));
        assert_eq!(track.len(), 2);
    }
}
