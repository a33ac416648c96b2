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

//! Rover configuration form: Wi-Fi network selection plus NTRIP caster
//! settings, with the reboot and factory-reset controls underneath.
//!
//! Two one-shot fetches run at startup: the network scan and the stored
//! device config. The stored SSID is matched against the scan list only
//! once both results are in, whatever order they arrive — there is no
//! timing assumption between the two.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

use egui::{Color32, RichText, Ui};
use log::debug;
use rover_client::{DeviceClient, DeviceConfig};

const ALERT_DURATION: Duration = Duration::from_secs(5);

/// Results arriving from background device requests.
#[derive(Debug)]
pub enum FormEvent {
    NetworksLoaded(Result<Vec<String>, String>),
    ConfigLoaded(Result<DeviceConfig, String>),
    SaveFinished(Result<(), String>),
    ControlFinished {
        action: &'static str,
        result: Result<(), String>,
    },
}

#[derive(Debug)]
struct Alert {
    message: String,
    success: bool,
    shown_at: Instant,
}

/// Form state, separate from the transport so it can be driven directly.
#[derive(Debug, Default)]
pub struct FormState {
    pub fields: DeviceConfig,
    pub networks: Vec<String>,
    stored_ssid: Option<String>,
    networks_loaded: bool,
    pub scanning: bool,
    alert: Option<Alert>,
}

impl FormState {
    fn apply(&mut self, event: FormEvent, now: Instant) {
        match event {
            FormEvent::NetworksLoaded(Ok(networks)) => {
                self.networks = networks;
                self.networks_loaded = true;
                self.scanning = false;
                self.apply_stored_selection();
            }
            FormEvent::NetworksLoaded(Err(e)) => {
                debug!("Network scan failed: {}", e);
                self.scanning = false;
            }
            FormEvent::ConfigLoaded(Ok(config)) => {
                self.stored_ssid = Some(config.ssid.clone());
                self.fields = config;
                self.apply_stored_selection();
            }
            FormEvent::ConfigLoaded(Err(e)) => {
                debug!("Config fetch failed: {}", e);
            }
            FormEvent::SaveFinished(result) => {
                self.alert = Some(match result {
                    Ok(()) => Alert {
                        message: "Configuration saved successfully.".to_string(),
                        success: true,
                        shown_at: now,
                    },
                    Err(_) => Alert {
                        message: "Failed to save configuration.".to_string(),
                        success: false,
                        shown_at: now,
                    },
                });
            }
            FormEvent::ControlFinished { action, result } => {
                self.alert = Some(match result {
                    Ok(()) => Alert {
                        message: format!("{action} requested."),
                        success: true,
                        shown_at: now,
                    },
                    Err(_) => Alert {
                        message: format!("{action} request failed."),
                        success: false,
                        shown_at: now,
                    },
                });
            }
        }
    }

    /// Select the stored SSID once both the scan list and the stored config
    /// are present. A stored network that no longer appears in the scan is
    /// left in the field verbatim.
    fn apply_stored_selection(&mut self) {
        if !self.networks_loaded {
            return;
        }
        if let Some(ssid) = self.stored_ssid.take() {
            self.fields.ssid = ssid;
        }
    }

    /// The selected entry of the scan list, if the current field matches one.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.networks
            .iter()
            .find(|n| **n == self.fields.ssid)
            .map(String::as_str)
    }

    fn alert_text(&self, now: Instant) -> Option<(&str, bool)> {
        self.alert
            .as_ref()
            .filter(|a| now.duration_since(a.shown_at) < ALERT_DURATION)
            .map(|a| (a.message.as_str(), a.success))
    }
}

/// The configuration card: owns the form state and the request plumbing.
pub struct ConfigForm {
    state: FormState,
    client: DeviceClient,
    runtime: tokio::runtime::Handle,
    events_tx: Sender<FormEvent>,
    events_rx: Receiver<FormEvent>,
}

impl ConfigForm {
    pub fn new(client: DeviceClient, runtime: tokio::runtime::Handle) -> Self {
        let (events_tx, events_rx) = channel();
        Self {
            state: FormState::default(),
            client,
            runtime,
            events_tx,
            events_rx,
        }
    }

    /// Kick off the two startup one-shots: network scan and config fetch.
    pub fn start_loading(&mut self) {
        self.scan();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.config().await.map_err(|e| e.to_string());
            let _ = tx.send(FormEvent::ConfigLoaded(result));
        });
    }

    fn scan(&mut self) {
        self.state.scanning = true;
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.scan_networks().await.map_err(|e| e.to_string());
            let _ = tx.send(FormEvent::NetworksLoaded(result));
        });
    }

    fn save(&self) {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let fields = self.state.fields.clone();
        self.runtime.spawn(async move {
            let result = client.save_config(&fields).await;
            if result.is_ok() {
                // Nudge the device to reconnect with the new settings;
                // its failure is deliberately ignored.
                let retry_client = client.clone();
                tokio::spawn(async move {
                    if let Err(e) = retry_client.retry_network().await {
                        debug!("Network retry signal failed: {}", e);
                    }
                });
            }
            let _ = tx.send(FormEvent::SaveFinished(result.map_err(|e| e.to_string())));
        });
    }

    fn control(&self, action: &'static str) {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = match action {
                "Factory reset" => client.factory_reset().await,
                _ => client.reboot().await,
            };
            let _ = tx.send(FormEvent::ControlFinished {
                action,
                result: result.map_err(|e| e.to_string()),
            });
        });
    }

    fn process_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.events_rx.try_recv() {
            self.state.apply(event, now);
        }
    }

    /// Draw the configuration card for this frame.
    pub fn render(&mut self, ui: &mut Ui) {
        self.process_events();

        ui.label(RichText::new("Wi-Fi").color(Color32::from_rgb(108, 117, 125)).size(11.0));
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("ssid")
                .width(180.0)
                .selected_text(self.state.fields.ssid.clone())
                .show_ui(ui, |ui| {
                    let networks = self.state.networks.clone();
                    for network in networks {
                        ui.selectable_value(
                            &mut self.state.fields.ssid,
                            network.clone(),
                            network,
                        );
                    }
                });
            let rescan = ui
                .add_enabled(!self.state.scanning, egui::Button::new("Rescan"))
                .clicked();
            if rescan {
                self.scan();
            }
        });
        if self.state.networks_loaded
            && !self.state.fields.ssid.is_empty()
            && self.state.selection().is_none()
        {
            ui.label(
                RichText::new("Stored network not found in scan")
                    .color(Color32::from_rgb(0xff, 0xc1, 0x07))
                    .size(8.0),
            );
        }
        text_field(ui, "Wi-Fi Password", &mut self.state.fields.wpass);

        ui.add_space(8.0);
        ui.label(RichText::new("NTRIP").color(Color32::from_rgb(108, 117, 125)).size(11.0));
        text_field(ui, "Caster Host", &mut self.state.fields.nhost);
        ui.horizontal(|ui| {
            ui.label(RichText::new("Port").size(9.0));
            ui.add(egui::TextEdit::singleline(&mut self.state.fields.nport).desired_width(60.0));
            ui.label(RichText::new("Mountpoint").size(9.0));
            ui.add(egui::TextEdit::singleline(&mut self.state.fields.nmount).desired_width(120.0));
        });
        text_field(ui, "Username", &mut self.state.fields.nuser);
        text_field(ui, "Password", &mut self.state.fields.npass);

        ui.add_space(8.0);
        if ui.button("Save & Reboot").clicked() {
            self.save();
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Reboot").clicked() {
                self.control("Reboot");
            }
            if ui
                .button(RichText::new("Factory Reset").color(Color32::from_rgb(0xdc, 0x35, 0x45)))
                .clicked()
            {
                self.control("Factory reset");
            }
        });

        if let Some((message, success)) = self.state.alert_text(Instant::now()) {
            let (bg, fg) = if success {
                (Color32::from_rgb(0xd4, 0xed, 0xda), Color32::from_rgb(0x15, 0x57, 0x24))
            } else {
                (Color32::from_rgb(0xf8, 0xd7, 0xda), Color32::from_rgb(0x72, 0x1c, 0x24))
            };
            ui.add_space(6.0);
            egui::Frame::new()
                .fill(bg)
                .corner_radius(6.0)
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.label(RichText::new(message).color(fg).size(10.0));
                });
        }
    }
}

fn text_field(ui: &mut Ui, label: &str, value: &mut String) {
    ui.label(RichText::new(label).size(9.0));
    ui.add(egui::TextEdit::singleline(value).desired_width(f32::INFINITY));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_config() -> DeviceConfig {
        DeviceConfig {
            ssid: "shop-net".to_string(),
            nhost: "rtn.dot.ny.gov".to_string(),
            ..DeviceConfig::default()
        }
    }

    fn networks() -> Vec<String> {
        vec!["guest".to_string(), "shop-net".to_string()]
    }

    #[test]
    fn test_selection_waits_for_both_results() {
        let mut state = FormState::default();
        let now = Instant::now();

        state.apply(FormEvent::ConfigLoaded(Ok(stored_config())), now);
        // Scan not in yet: no list entry to match against.
        assert_eq!(state.selection(), None);

        state.apply(FormEvent::NetworksLoaded(Ok(networks())), now);
        assert_eq!(state.selection(), Some("shop-net"));
    }

    #[test]
    fn test_selection_applies_in_reverse_arrival_order() {
        let mut state = FormState::default();
        let now = Instant::now();

        state.apply(FormEvent::NetworksLoaded(Ok(networks())), now);
        state.apply(FormEvent::ConfigLoaded(Ok(stored_config())), now);
        assert_eq!(state.selection(), Some("shop-net"));
    }

    #[test]
    fn test_stored_network_missing_from_scan_kept_verbatim() {
        let mut state = FormState::default();
        let now = Instant::now();

        let mut config = stored_config();
        config.ssid = "old-net".to_string();
        state.apply(FormEvent::ConfigLoaded(Ok(config)), now);
        state.apply(FormEvent::NetworksLoaded(Ok(networks())), now);

        assert_eq!(state.fields.ssid, "old-net");
        assert_eq!(state.selection(), None);
    }

    #[test]
    fn test_rescan_does_not_reapply_stored_selection() {
        let mut state = FormState::default();
        let now = Instant::now();

        state.apply(FormEvent::NetworksLoaded(Ok(networks())), now);
        state.apply(FormEvent::ConfigLoaded(Ok(stored_config())), now);

        // User picks a different network, then rescans.
        state.fields.ssid = "guest".to_string();
        state.apply(FormEvent::NetworksLoaded(Ok(networks())), now);
        assert_eq!(state.fields.ssid, "guest");
    }

    #[test]
    fn test_save_alert_auto_dismisses() {
        let mut state = FormState::default();
        let now = Instant::now();

        state.apply(FormEvent::SaveFinished(Ok(())), now);
        assert_eq!(
            state.alert_text(now),
            Some(("Configuration saved successfully.", true))
        );
        assert!(state.alert_text(now + Duration::from_secs(4)).is_some());
        assert_eq!(state.alert_text(now + Duration::from_secs(6)), None);
    }

    #[test]
    fn test_save_failure_alert() {
        let mut state = FormState::default();
        let now = Instant::now();

        state.apply(FormEvent::SaveFinished(Err("boom".to_string())), now);
        assert_eq!(
            state.alert_text(now),
            Some(("Failed to save configuration.", false))
        );
    }

    #[test]
    fn test_scan_failure_clears_scanning_flag() {
        let mut state = FormState::default();
        state.scanning = true;
        state.apply(
            FormEvent::NetworksLoaded(Err("timeout".to_string())),
            Instant::now(),
        );
        assert!(!state.scanning);
        assert!(state.networks.is_empty());
    }
}
