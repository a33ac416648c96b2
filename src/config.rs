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

//! Application configuration management.
//!
//! Persistent desktop preferences in TOML via confy. This is the
//! application's own config — the rover's stored settings live on the
//! device and are edited through the configuration form instead.

use serde::{Deserialize, Serialize};

/// Default device base URL (the rover's AP-mode address)
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Base URL of the rover device
    #[serde(default = "default_device_url")]
    pub device_url: String,

    /// Recenter the map on the latest fix after every poll
    #[serde(default = "default_true")]
    pub auto_center: bool,

    /// Render the basemap and track (needs network access for tiles)
    #[serde(default = "default_true")]
    pub map_enabled: bool,

    /// Default map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,

    /// Status poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// Default value functions for serde
fn default_device_url() -> String {
    DEFAULT_DEVICE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_zoom() -> f32 {
    18.0
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_url: default_device_url(),
            auto_center: true,
            map_enabled: true,
            default_zoom: default_zoom(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("rover-desktop", "config")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("rover-desktop", "config", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.device_url, DEFAULT_DEVICE_URL);
        assert!(config.auto_center);
        assert!(config.map_enabled);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_old_config_files_stay_loadable() {
        // Fields added later must not break a config written before them.
        let config: AppConfig = toml::from_str("device_url = \"http://rover.local\"").unwrap();
        assert_eq!(config.device_url, "http://rover.local");
        assert_eq!(config.default_zoom, 18.0);
    }
}
