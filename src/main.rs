//! `notch-hud` - notch indicator core
//!
//! Wires the platform backends to the notch controller and runs it on the main thread. Until a
//! renderer is attached, state snapshots are written to the log.

use anyhow::{Context, Result};
use notch_hud::{
    bus::SignalBus,
    clipboard::SystemClipboard,
    config::{AppConfig, ConfigManager},
    controller::{ControllerHandle, HudCoordinator, NotchController, NotchState},
    hardware::{self, BrightnessReader, VolumeReader},
    monitor::{BrightnessMonitor, ClipboardPoller, HardwareWatcher},
    utils,
};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// Snapshots buffered for the renderer before the controller starts coalescing
const STATE_CHANNEL_CAPACITY: usize = 32;

/// Main entry point for the application
fn main() -> Result<()> {
    utils::init_logging().context("Failed to initialize logging system")?;
    info!("notch-hud v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = ConfigManager::load().context("Failed to load application configuration")?;
    info!(
        "Configuration loaded: HUD enabled = {}",
        config.preferences.hud_enabled
    );

    let (state_tx, state_rx) = mpsc::sync_channel::<NotchState>(STATE_CHANNEL_CAPACITY);
    let (mut controller, handle, audio) = build_controller(&config, state_tx);

    let sink: Arc<ControllerHandle> = Arc::new(handle);
    let watcher = HardwareWatcher::new(audio, sink.clone());
    watcher.start_monitoring();

    let mut brightness_monitor = BrightnessMonitor::new(
        hardware::system_brightness(&config.monitoring),
        sink,
        config.monitoring.brightness_poll_interval(),
    );
    brightness_monitor.start();

    let _renderer = spawn_log_renderer(state_rx).context("Failed to start state logger")?;

    info!("Starting notch controller");
    controller.run();

    watcher.stop_monitoring();
    brightness_monitor.stop();

    info!("notch-hud shutting down");
    Ok(())
}

/// Build the bus, poller, HUD coordinator and controller from `config`.
///
/// Returns the audio subsystem as well so the watcher shares it with the volume reader.
fn build_controller(
    config: &AppConfig,
    state_tx: mpsc::SyncSender<NotchState>,
) -> (
    NotchController,
    ControllerHandle,
    Arc<dyn hardware::AudioSubsystem>,
) {
    let bus = SignalBus::new();
    let audio = hardware::system_audio(config.monitoring.audio_poll_interval());

    let poller = ClipboardPoller::new(Box::new(SystemClipboard::new()), bus.clone());
    let hud = HudCoordinator::new(
        VolumeReader::new(Arc::clone(&audio)),
        BrightnessReader::new(hardware::system_brightness(&config.monitoring)),
        config.preferences.hud_enabled,
    );

    let (controller, handle) =
        NotchController::new(&config.preferences, bus, poller, hud, state_tx);
    (controller, handle, audio)
}

/// Stand-in renderer: log every snapshot until the controller drops its sender
fn spawn_log_renderer(state_rx: mpsc::Receiver<NotchState>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("state-logger".to_string())
        .spawn(move || {
            for state in state_rx {
                match serde_json::to_string(&state) {
                    Ok(json) => info!("State: {}", json),
                    Err(e) => debug!("Failed to serialize state snapshot: {}", e),
                }
            }
            debug!("State channel closed");
        })
}
