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

mod compass;
mod config;
mod fix;
mod map;
mod poller;
mod skyplot;
mod status_pane;
mod telemetry;
mod tiles;
mod ui;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use eframe::egui;
use log::{info, warn};
use rover_client::DeviceClient;

use config::AppConfig;
use map::MapView;
use poller::Poller;
use status_pane::StatusPane;
use telemetry::RoverTelemetry;
use ui::ConfigForm;

/// Live telemetry dashboard for RTK rover devices
#[derive(Parser, Debug)]
#[command(name = "rover-desktop", version)]
struct Args {
    /// Device base URL, overriding the stored configuration
    #[arg(long)]
    device_url: Option<String>,

    /// Disable the map entirely (no tile fetching)
    #[arg(long)]
    no_map: bool,

    /// Poll interval in milliseconds, overriding the stored configuration
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let args = Args::parse();

    let mut app_config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    if let Some(device_url) = args.device_url {
        app_config.device_url = device_url;
    }
    if args.no_map {
        app_config.map_enabled = false;
    }
    if let Some(interval) = args.poll_interval_ms {
        app_config.poll_interval_ms = interval.max(100);
    }

    info!("Starting Rover Desktop, device at {}", app_config.device_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("RTK Rover"),
        ..Default::default()
    };

    eframe::run_native(
        "RTK Rover",
        options,
        Box::new(move |cc| Ok(Box::new(RoverApp::new(cc, app_config)))),
    )
}

struct RoverApp {
    telemetry: Arc<Mutex<RoverTelemetry>>,
    // Field order matters: the poller must drop before the runtime users go.
    poller: Poller,
    map: MapView,
    config_form: ConfigForm,
}

impl RoverApp {
    fn new(cc: &eframe::CreationContext<'_>, app_config: AppConfig) -> Self {
        let telemetry = Arc::new(Mutex::new(RoverTelemetry::new()));
        let client = DeviceClient::new(app_config.device_url.clone());

        let poller = Poller::spawn(
            client.clone(),
            Arc::clone(&telemetry),
            Duration::from_millis(app_config.poll_interval_ms),
            cc.egui_ctx.clone(),
        );

        let mut config_form = ConfigForm::new(client, poller.runtime().clone());
        config_form.start_loading();

        let map = MapView::new(
            app_config.map_enabled,
            app_config.default_zoom,
            app_config.auto_center,
        );

        Self {
            telemetry,
            poller,
            map,
            config_form,
        }
    }

    fn draw_telemetry_panel(&mut self, ui: &mut egui::Ui, snapshot: &telemetry::TelemetrySnapshot) {
        ui.horizontal(|ui| {
            ui.heading("RTK Rover");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                StatusPane::badge(ui, snapshot);
            });
        });

        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            StatusPane::render(ui, snapshot);

            ui.add_space(8.0);
            ui.separator();

            ui.columns(2, |columns| {
                columns[0].vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("Compass")
                            .color(egui::Color32::from_rgb(108, 117, 125))
                            .size(11.0),
                    );
                    // The needle shares the marker tint: red on no fix.
                    compass::show(ui, &snapshot.compass, snapshot.quality.marker_color());
                    ui.label(
                        egui::RichText::new(format!("{}°", snapshot.compass.heading_text()))
                            .monospace(),
                    );
                });
                columns[1].vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new("Sky Plot")
                            .color(egui::Color32::from_rgb(108, 117, 125))
                            .size(11.0),
                    );
                    let observations = snapshot
                        .latest
                        .as_ref()
                        .map(|r| r.sats_detail.as_slice())
                        .unwrap_or_default();
                    skyplot::show(ui, observations);
                    ui.label(
                        egui::RichText::new("Green = used in fix, Orange = tracked")
                            .color(egui::Color32::from_rgb(108, 117, 125))
                            .size(8.0),
                    );
                });
            });

            ui.add_space(8.0);
            let mut auto_center = self.map.auto_center;
            ui.add_enabled(
                self.map.is_enabled(),
                egui::Checkbox::new(&mut auto_center, "Auto-center map"),
            );
            if self.map.is_enabled() {
                self.map.auto_center = auto_center;
            }

            ui.add_space(8.0);
            egui::CollapsingHeader::new("Configuration")
                .default_open(false)
                .show(ui, |ui| {
                    self.config_form.render(ui);
                });
        });
    }
}

impl eframe::App for RoverApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The poller nudges a repaint on fresh data; this keeps the
        // "updated Ns ago" readouts moving between polls.
        ctx.request_repaint_after(Duration::from_millis(500));

        let snapshot = self
            .telemetry
            .lock()
            .expect("Telemetry lock poisoned - unrecoverable state")
            .snapshot();

        egui::SidePanel::left("telemetry_panel")
            .min_width(340.0)
            .resizable(true)
            .show(ctx, |ui| {
                self.draw_telemetry_panel(ui, &snapshot);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                self.map.show(ui, &snapshot);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Shutting down");
        self.poller.stop();
    }
}
