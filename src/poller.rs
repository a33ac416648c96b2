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

//! Fixed-cadence status polling.
//!
//! A dedicated runtime thread ticks once per interval and issues one status
//! request per tick, tagged with the tick's sequence number. Responses are
//! applied through [`RoverTelemetry::apply_status`], which drops any that
//! resolve after a newer tick already landed. A failed poll is swallowed:
//! one debug line, a counter bump, and the view stays stale until the next
//! tick. No request deadline is set beyond the transport's own.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info};
use rover_client::DeviceClient;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::telemetry::RoverTelemetry;

/// Handle to the polling runtime. Dropping it stops the loop.
pub struct Poller {
    cancel_token: CancellationToken,
    handle: tokio::runtime::Handle,
}

impl Poller {
    /// Start polling `client` every `interval`, applying results into
    /// `telemetry` and nudging `ctx` to repaint after each applied record.
    pub fn spawn(
        client: DeviceClient,
        telemetry: Arc<Mutex<RoverTelemetry>>,
        interval: Duration,
        ctx: egui::Context,
    ) -> Self {
        let runtime = tokio::runtime::Runtime::new()
            .expect("Failed to create polling runtime");
        let handle = runtime.handle().clone();
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        info!("Starting status poll of {} every {:?}", client.base_url(), interval);

        std::thread::spawn(move || {
            runtime.block_on(run(client, telemetry, interval, ctx, token));
        });

        Self {
            cancel_token,
            handle,
        }
    }

    /// Runtime handle for one-shot device requests (scan, config, control).
    #[must_use]
    pub fn runtime(&self) -> &tokio::runtime::Handle {
        &self.handle
    }

    /// Stop the polling loop. In-flight requests run to completion and are
    /// then discarded by the sequence guard.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    client: DeviceClient,
    telemetry: Arc<Mutex<RoverTelemetry>>,
    interval: Duration,
    ctx: egui::Context,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Polling loop stopped");
                return;
            }
            _ = ticker.tick() => {
                seq += 1;
                // Ticks never wait on a slow response; ordering is resolved
                // by the sequence number when responses land.
                tokio::spawn(poll_once(
                    client.clone(),
                    Arc::clone(&telemetry),
                    seq,
                    ctx.clone(),
                ));
            }
        }
    }
}

async fn poll_once(
    client: DeviceClient,
    telemetry: Arc<Mutex<RoverTelemetry>>,
    seq: u64,
    ctx: egui::Context,
) {
    match client.status().await {
        Ok(record) => {
            let applied = telemetry
                .lock()
                .expect("Telemetry lock poisoned - unrecoverable state")
                .apply_status(seq, record);
            if applied {
                ctx.request_repaint();
            } else {
                debug!("Discarded stale status response from tick {}", seq);
            }
        }
        Err(e) => {
            debug!("Status poll {} failed: {}", seq, e);
            telemetry
                .lock()
                .expect("Telemetry lock poisoned - unrecoverable state")
                .poll_failed();
        }
    }
}
