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

//! Data model for the rover's JSON API.
//!
//! Field names match the device firmware exactly. The firmware omits fields
//! it cannot compute yet (heading before the first fix, RTCM age before the
//! first correction), so every numeric field is optional and a missing value
//! deserializes to `None` rather than failing the whole record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding device responses.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
}

/// One satellite as reported in the status record's `sats_detail` list.
///
/// Azimuth and elevation are degrees; the firmware uses negative values as
/// "not yet known" sentinels, and a missing field is treated the same way.
/// Sentinel entries stay in the record — rendering skips them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SatelliteObservation {
    /// Satellite id (PRN).
    #[serde(default)]
    pub id: i64,
    /// Azimuth in degrees, 0-360, 0 = north.
    #[serde(default = "unknown_angle")]
    pub az: f64,
    /// Elevation in degrees above the horizon, 0-90.
    #[serde(default = "unknown_angle")]
    pub el: f64,
    /// Whether this satellite contributes to the position solution.
    #[serde(default)]
    pub used: bool,
}

fn unknown_angle() -> f64 {
    -1.0
}

/// One complete telemetry sample from `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StatusRecord {
    /// Position solution label, e.g. "RTK FIX", "RTK FLOAT", "GPS".
    #[serde(default)]
    pub fix: Option<String>,
    /// Satellites used in the solution.
    #[serde(default)]
    pub sats: Option<u32>,
    /// Horizontal dilution of precision.
    #[serde(default)]
    pub hdop: Option<f64>,
    /// Ground speed in knots.
    #[serde(default)]
    pub speed_kn: Option<f64>,
    /// Heading in degrees clockwise from north, absent before first motion.
    #[serde(default)]
    pub heading_deg: Option<f64>,
    /// Latitude in WGS84 degrees. (0, 0) together with `lon` means no fix.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in WGS84 degrees.
    #[serde(default)]
    pub lon: Option<f64>,
    /// Seconds since the last RTCM correction was applied.
    #[serde(default)]
    pub rtcmtime: Option<f64>,
    /// Connected Wi-Fi network name.
    #[serde(default)]
    pub wifi: Option<String>,
    /// Wi-Fi signal strength in dBm.
    #[serde(default)]
    pub rssi: Option<i32>,
    /// Device IP address on the local network.
    #[serde(default)]
    pub ip: Option<String>,
    /// NTRIP caster connection state label.
    #[serde(default)]
    pub ntrip: Option<String>,
    /// Per-satellite detail for the sky plot.
    #[serde(default)]
    pub sats_detail: Vec<SatelliteObservation>,
}

impl StatusRecord {
    /// Decode a status record from a JSON body.
    pub fn from_json(body: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Persistent device configuration as served by `GET /config` and accepted
/// by `POST /save`. All fields are plain strings; the form round-trips them
/// without interpretation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Wi-Fi network name.
    #[serde(default)]
    pub ssid: String,
    /// Wi-Fi password, empty for open networks.
    #[serde(default)]
    pub wpass: String,
    /// NTRIP caster host.
    #[serde(default)]
    pub nhost: String,
    /// NTRIP caster port.
    #[serde(default)]
    pub nport: String,
    /// NTRIP mountpoint.
    #[serde(default)]
    pub nmount: String,
    /// NTRIP username.
    #[serde(default)]
    pub nuser: String,
    /// NTRIP password.
    #[serde(default)]
    pub npass: String,
}

impl DeviceConfig {
    /// Decode a device config from a JSON body.
    pub fn from_json(body: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Decode the `GET /scan` response: an ordered list of network names.
pub fn parse_network_list(body: &str) -> Result<Vec<String>, ParseError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_status() {
        let body = r#"{
            "fix": "RTK FIX", "sats": 14, "hdop": 0.7, "speed_kn": 0.2,
            "heading_deg": 182.4, "lat": 41.1176, "lon": -74.0075,
            "rtcmtime": 1.5, "wifi": "shop-net", "rssi": -61,
            "ip": "192.168.1.41", "ntrip": "connected",
            "sats_detail": [
                {"id": 5, "az": 120.0, "el": 63.0, "used": true},
                {"id": 23, "az": 301.5, "el": 12.0, "used": false}
            ]
        }"#;
        let record = StatusRecord::from_json(body).unwrap();
        assert_eq!(record.fix.as_deref(), Some("RTK FIX"));
        assert_eq!(record.sats, Some(14));
        assert_eq!(record.lat, Some(41.1176));
        assert_eq!(record.sats_detail.len(), 2);
        assert!(record.sats_detail[0].used);
        assert_eq!(record.sats_detail[1].id, 23);
    }

    #[test]
    fn test_parse_status_missing_fields() {
        // Before the first fix the firmware omits most numeric fields.
        let record = StatusRecord::from_json(r#"{"fix": "NO FIX", "sats": 0}"#).unwrap();
        assert_eq!(record.fix.as_deref(), Some("NO FIX"));
        assert_eq!(record.heading_deg, None);
        assert_eq!(record.lat, None);
        assert!(record.sats_detail.is_empty());
    }

    #[test]
    fn test_parse_empty_object() {
        let record = StatusRecord::from_json("{}").unwrap();
        assert_eq!(record, StatusRecord::default());
    }

    #[test]
    fn test_parse_status_rejects_garbage() {
        assert!(StatusRecord::from_json("not json").is_err());
        assert!(StatusRecord::from_json("[1,2,3]").is_err());
    }

    #[test]
    fn test_satellite_missing_angles_become_sentinels() {
        let record =
            StatusRecord::from_json(r#"{"sats_detail": [{"id": 7, "used": true}]}"#).unwrap();
        let sat = &record.sats_detail[0];
        assert_eq!(sat.az, -1.0);
        assert_eq!(sat.el, -1.0);
        assert!(sat.used);
    }

    #[test]
    fn test_parse_device_config() {
        let body = r#"{
            "ssid": "shop-net", "wpass": "hunter2",
            "nhost": "rtn.dot.ny.gov", "nport": "8080",
            "nmount": "net_msm_vrs", "nuser": "rover", "npass": "secret"
        }"#;
        let config = DeviceConfig::from_json(body).unwrap();
        assert_eq!(config.ssid, "shop-net");
        assert_eq!(config.nport, "8080");
    }

    #[test]
    fn test_parse_device_config_partial() {
        let config = DeviceConfig::from_json(r#"{"ssid": "shop-net"}"#).unwrap();
        assert_eq!(config.ssid, "shop-net");
        assert_eq!(config.nhost, "");
    }

    #[test]
    fn test_parse_network_list() {
        let networks = parse_network_list(r#"["shop-net", "guest", "shop-net-5g"]"#).unwrap();
        assert_eq!(networks, vec!["shop-net", "guest", "shop-net-5g"]);
    }

    #[test]
    fn test_parse_network_list_empty() {
        assert!(parse_network_list("[]").unwrap().is_empty());
    }
}
