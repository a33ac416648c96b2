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

//! Client library for the RTK rover HTTP API.
//!
//! The rover firmware serves a small JSON API: a once-per-second status
//! record, a Wi-Fi scan list, the stored configuration, and a handful of
//! control endpoints. This crate provides two layers that can be used
//! independently:
//!
//! - **Protocol layer**: serde data model and parsing for the device JSON
//!   ([`StatusRecord`], [`SatelliteObservation`], [`DeviceConfig`])
//! - **HTTP layer**: [`DeviceClient`], an async wrapper over every endpoint
//!
//! # Quick Start
//!
//! ```no_run
//! use rover_client::DeviceClient;
//!
//! # async fn example() -> Result<(), rover_client::ClientError> {
//! let client = DeviceClient::new("http://192.168.4.1");
//! let status = client.status().await?;
//! println!("fix: {:?}, sats: {:?}", status.fix, status.sats);
//! # Ok(())
//! # }
//! ```
//!
//! # Protocol Layer Only
//!
//! ```
//! use rover_client::StatusRecord;
//!
//! let record = StatusRecord::from_json(r#"{"fix": "RTK FIX", "sats": 12}"#).unwrap();
//! assert_eq!(record.sats, Some(12));
//! ```

pub mod http;
pub mod protocol;

pub use http::{ClientError, DeviceClient};
pub use protocol::{parse_network_list, DeviceConfig, ParseError, SatelliteObservation, StatusRecord};
