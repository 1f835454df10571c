//! Integration tests for `notch-hud`
//!
//! Exercises the clipboard history, HUD timing, overlay debouncing and audio device following
//! across component boundaries, using scripted platform backends.

use crossbeam_channel::{Receiver, Sender, unbounded};
use notch_hud::{
    bus::{SignalBus, SignalSink, Topic},
    clipboard::{ClipboardHost, HISTORY_CAPACITY},
    config::{AppConfig, ConfigManager, UserPreferences},
    controller::{
        ControllerHandle, ControllerMessage, HUD_HIDE_DELAY, HudCoordinator, HudIcon,
        NotchController, NotchState, OVERLAY_CLOSE_DELAY,
    },
    error::{NotchError, Result, StringError},
    hardware::{
        AudioEndpoint, AudioObject, AudioProperty, AudioSubsystem, BrightnessReader,
        BrightnessSource, DeviceId, ListenerId, PolledAudioSubsystem, PropertyListener,
        UnavailableBrightness, VolumeReader,
    },
    monitor::{BrightnessMonitor, CLIPBOARD_POLL_INTERVAL, ClipboardPoller, HardwareWatcher},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Scripted backends
// ---------------------------------------------------------------------------

/// Clipboard whose content the test sets directly
#[derive(Clone, Default)]
struct ScriptedClipboard(Arc<Mutex<(u64, Option<String>)>>);

impl ScriptedClipboard {
    fn copy(&self, text: &str) {
        let mut state = self.0.lock();
        state.0 += 1;
        state.1 = Some(text.to_string());
    }
}

impl ClipboardHost for ScriptedClipboard {
    fn change_count(&mut self) -> Result<u64> {
        Ok(self.0.lock().0)
    }

    fn read_text(&mut self) -> Result<Option<String>> {
        Ok(self.0.lock().1.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.copy(text);
        Ok(())
    }
}

/// Audio subsystem with manually fired listeners
#[derive(Default)]
struct ScriptedAudio {
    device: Mutex<u32>,
    volume: Mutex<f32>,
    muted: Mutex<bool>,
    listeners: Mutex<HashMap<u64, (AudioObject, AudioProperty, PropertyListener)>>,
    next_id: AtomicU64,
}

impl ScriptedAudio {
    fn with_device(device: u32) -> Arc<Self> {
        let audio = Self::default();
        *audio.device.lock() = device;
        Arc::new(audio)
    }

    fn fire(&self, object: AudioObject, property: AudioProperty) {
        let matching: Vec<PropertyListener> = self
            .listeners
            .lock()
            .values()
            .filter(|(o, p, _)| *o == object && *p == property)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect();
        for listener in matching {
            listener();
        }
    }

    fn listeners_on(&self, object: AudioObject) -> usize {
        self.listeners
            .lock()
            .values()
            .filter(|(o, _, _)| *o == object)
            .count()
    }
}

impl AudioSubsystem for ScriptedAudio {
    fn default_output_device(&self) -> Result<DeviceId> {
        Ok(DeviceId(*self.device.lock()))
    }

    fn has_property(&self, _object: AudioObject, _property: AudioProperty) -> bool {
        true
    }

    fn add_listener(
        &self,
        object: AudioObject,
        property: AudioProperty,
        listener: PropertyListener,
    ) -> Result<ListenerId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .insert(id, (object, property, listener));
        Ok(ListenerId(id))
    }

    fn remove_listener(&self, id: ListenerId) -> Result<()> {
        self.listeners.lock().remove(&id.0);
        Ok(())
    }

    fn volume_scalar(&self, _device: DeviceId) -> Result<f32> {
        Ok(*self.volume.lock())
    }

    fn is_muted(&self, _device: DeviceId) -> Result<bool> {
        Ok(*self.muted.lock())
    }
}

/// Sink that records every posted topic on a channel
struct RecordingSink(Sender<Topic>);

impl SignalSink for RecordingSink {
    fn post(&self, topic: Topic) {
        let _ = self.0.send(topic);
    }
}

fn recording_sink() -> (Arc<dyn SignalSink>, Receiver<Topic>) {
    let (tx, rx) = unbounded();
    (Arc::new(RecordingSink(tx)), rx)
}

struct Harness {
    controller: NotchController,
    _handle: ControllerHandle,
    clipboard: ScriptedClipboard,
    audio: Arc<ScriptedAudio>,
    states: mpsc::Receiver<NotchState>,
}

fn harness(preferences: &UserPreferences) -> Harness {
    let bus = SignalBus::new();
    let clipboard = ScriptedClipboard::default();
    let audio = ScriptedAudio::with_device(1);
    let poller = ClipboardPoller::new(Box::new(clipboard.clone()), bus.clone());
    let hud = HudCoordinator::new(
        VolumeReader::new(Arc::clone(&audio) as Arc<dyn AudioSubsystem>),
        BrightnessReader::new(Arc::new(UnavailableBrightness) as Arc<dyn BrightnessSource>),
        true,
    );
    let (state_tx, states) = mpsc::sync_channel(256);
    let (controller, handle) = NotchController::new(preferences, bus, poller, hud, state_tx);
    Harness {
        controller,
        _handle: handle,
        clipboard,
        audio,
        states,
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn history_texts(state: &NotchState) -> Vec<&str> {
    state.history.iter().map(|entry| entry.text()).collect()
}

// ---------------------------------------------------------------------------
// Clipboard history
// ---------------------------------------------------------------------------

/// Copying A, B, then A again keeps one A at the front
#[test]
fn test_clipboard_duplicate_moves_to_front() {
    let mut h = harness(&UserPreferences::default());
    let t0 = Instant::now();
    h.controller.start(t0);

    for (step, text) in (1u32..).zip(["A", "B", "A"]) {
        h.clipboard.copy(text);
        h.controller.advance(t0 + CLIPBOARD_POLL_INTERVAL * step);
    }

    assert_eq!(history_texts(&h.controller.state()), vec!["A", "B"]);
}

/// Eleven distinct copies keep the ten most recent
#[test]
fn test_clipboard_history_is_bounded() {
    let mut h = harness(&UserPreferences::default());
    let t0 = Instant::now();
    h.controller.start(t0);

    for i in 1..=11u32 {
        h.clipboard.copy(&format!("T{i}"));
        h.controller.advance(t0 + CLIPBOARD_POLL_INTERVAL * i);
    }

    let state = h.controller.state();
    assert_eq!(state.history.len(), HISTORY_CAPACITY);
    assert_eq!(state.history[0].text(), "T11");
    assert!(!history_texts(&state).contains(&"T1"));
}

/// Each history change publishes exactly one clipboard-changed
#[test]
fn test_clipboard_changes_are_published_on_bus() {
    let mut h = harness(&UserPreferences::default());
    let (tx, rx) = unbounded();
    h.controller
        .bus()
        .subscribe(Topic::ClipboardChanged, move |topic| {
            let _ = tx.send(topic);
        });

    let t0 = Instant::now();
    h.controller.start(t0);
    h.clipboard.copy("first");
    h.controller.advance(t0 + CLIPBOARD_POLL_INTERVAL);
    h.controller.advance(t0 + CLIPBOARD_POLL_INTERVAL * 2);

    assert_eq!(rx.try_iter().count(), 1);
}

/// Picking an entry copies it and the next sample moves it to the front
#[test]
fn test_copy_request_round_trips_through_clipboard() {
    let mut h = harness(&UserPreferences::default());
    let t0 = Instant::now();
    h.controller.start(t0);
    h.clipboard.copy("old");
    h.controller.advance(t0 + CLIPBOARD_POLL_INTERVAL);
    h.clipboard.copy("new");
    h.controller.advance(t0 + CLIPBOARD_POLL_INTERVAL * 2);

    h.controller
        .handle_message(ControllerMessage::Copy("old".to_string()), t0 + ms(1100));
    h.controller
        .handle_message(ControllerMessage::CloseOverlay, t0 + ms(1100));
    h.controller.advance(t0 + CLIPBOARD_POLL_INTERVAL * 3);

    assert_eq!(history_texts(&h.controller.state()), vec!["old", "new"]);
}

// ---------------------------------------------------------------------------
// HUD timing
// ---------------------------------------------------------------------------

/// A single volume event shows the speaker HUD and clears it at 1.5 s
#[test]
fn test_volume_hud_lifecycle() {
    let mut h = harness(&UserPreferences::default());
    *h.audio.volume.lock() = 0.5;
    let t0 = Instant::now();
    h.controller.start(t0);

    h.controller
        .handle_message(ControllerMessage::Signal(Topic::VolumeChanged), t0);
    let state = h.controller.state();
    assert_eq!(state.volume.icon, HudIcon::Speaker);
    assert_eq!(state.volume.value, Some(0.5));

    h.controller.advance(t0 + ms(1499));
    assert!(h.controller.state().volume.is_active());

    h.controller.advance(t0 + HUD_HIDE_DELAY);
    let state = h.controller.state();
    assert_eq!(state.volume.icon, HudIcon::None);
    assert_eq!(state.volume.value, None);
}

/// Events at 0 s and 1.0 s keep the HUD up at 1.6 s; it clears at 2.5 s
#[test]
fn test_volume_hud_last_event_wins() {
    let mut h = harness(&UserPreferences::default());
    let t0 = Instant::now();
    h.controller.start(t0);

    h.controller
        .handle_message(ControllerMessage::Signal(Topic::VolumeChanged), t0);
    h.controller.advance(t0 + ms(1000));
    h.controller
        .handle_message(ControllerMessage::Signal(Topic::VolumeChanged), t0 + ms(1000));

    h.controller.advance(t0 + ms(1600));
    assert!(h.controller.state().volume.is_active());

    h.controller.advance(t0 + ms(2499));
    assert!(h.controller.state().volume.is_active());
    h.controller.advance(t0 + ms(2500));
    assert!(!h.controller.state().volume.is_active());
}

/// Muted output shows 0.0 for the initial read and every refresh
#[test]
fn test_muted_volume_shows_zero() {
    let mut h = harness(&UserPreferences::default());
    *h.audio.volume.lock() = 0.8;
    *h.audio.muted.lock() = true;
    let t0 = Instant::now();
    h.controller.start(t0);

    h.controller
        .handle_message(ControllerMessage::Signal(Topic::VolumeChanged), t0);
    for tick in 0..=10u64 {
        h.controller.advance(t0 + ms(100 * tick));
        assert_eq!(h.controller.state().volume.value, Some(0.0));
    }
}

/// With the HUD preference off, events never produce a HUD
#[test]
fn test_hud_disabled_by_preference() {
    let preferences = UserPreferences {
        hud_enabled: false,
        ..UserPreferences::default()
    };
    let mut h = harness(&preferences);
    let t0 = Instant::now();
    h.controller.start(t0);

    h.controller
        .handle_message(ControllerMessage::Signal(Topic::VolumeChanged), t0);
    h.controller
        .handle_message(ControllerMessage::Signal(Topic::BrightnessChanged), t0);
    let state = h.controller.state();
    assert!(!state.volume.is_active());
    assert!(!state.brightness.is_active());
}

/// Brightness falls back to 1.0 when no backlight is readable
#[test]
fn test_brightness_hud_uses_default_level() {
    let mut h = harness(&UserPreferences::default());
    let t0 = Instant::now();
    h.controller.start(t0);
    h.controller
        .handle_message(ControllerMessage::Signal(Topic::BrightnessChanged), t0);

    let state = h.controller.state();
    assert_eq!(state.brightness.icon, HudIcon::Brightness);
    assert_eq!(state.brightness.value, Some(1.0));
    assert!(!state.volume.is_active());
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Moving from the indicator to the list within the grace period never hides the overlay, and
/// the final leave hides it exactly once
#[test]
fn test_overlay_hover_handoff_hides_once() {
    let mut h = harness(&UserPreferences::default());
    let t0 = Instant::now();
    h.clipboard.copy("something");
    h.controller.start(t0);
    while h.states.try_recv().is_ok() {}

    let steps = [
        (ms(0), ControllerMessage::IndicatorHover(true)),
        (ms(50), ControllerMessage::IndicatorHover(false)),
        (ms(200), ControllerMessage::HistoryHover(true)),
        (ms(900), ControllerMessage::HistoryHover(false)),
    ];
    for (offset, message) in steps {
        h.controller.advance(t0 + offset);
        h.controller.handle_message(message, t0 + offset);
    }
    for offset in (900..=1500).step_by(50) {
        h.controller.advance(t0 + ms(offset));
    }

    let visibility: Vec<bool> = h.states.try_iter().map(|s| s.overlay_visible).collect();
    let hides = visibility.windows(2).filter(|w| w[0] && !w[1]).count();
    assert_eq!(hides, 1);
    assert_eq!(visibility.last(), Some(&false));
    assert!(!h.controller.state().overlay_visible);
}

/// Closing the overlay hides it immediately regardless of hover
#[test]
fn test_overlay_close_signal() {
    let mut h = harness(&UserPreferences::default());
    let t0 = Instant::now();
    h.clipboard.copy("something");
    h.controller.start(t0);

    h.controller
        .handle_message(ControllerMessage::HistoryHover(true), t0);
    assert!(h.controller.state().overlay_visible);

    h.controller
        .handle_message(ControllerMessage::CloseOverlay, t0 + ms(10));
    assert!(!h.controller.state().overlay_visible);

    h.controller.advance(t0 + ms(10) + OVERLAY_CLOSE_DELAY);
    assert!(!h.controller.state().overlay_visible);
}

// ---------------------------------------------------------------------------
// Hardware watcher
// ---------------------------------------------------------------------------

/// After a default-device switch, a change on the old device produces nothing and a change on
/// the new device produces exactly one signal
#[test]
fn test_device_switch_no_double_delivery() {
    let audio = ScriptedAudio::with_device(10);
    let (sink, rx) = recording_sink();
    let watcher = HardwareWatcher::new(Arc::clone(&audio) as Arc<dyn AudioSubsystem>, sink);
    watcher.start_monitoring();

    *audio.device.lock() = 20;
    audio.fire(AudioObject::System, AudioProperty::DefaultOutputDevice);

    assert_eq!(audio.listeners_on(AudioObject::Device(DeviceId(10))), 0);
    assert_eq!(audio.listeners_on(AudioObject::Device(DeviceId(20))), 2);

    audio.fire(AudioObject::Device(DeviceId(10)), AudioProperty::VolumeScalar);
    audio.fire(AudioObject::Device(DeviceId(20)), AudioProperty::VolumeScalar);

    let received: Vec<Topic> = rx.try_iter().collect();
    assert_eq!(received, vec![Topic::VolumeChanged]);
}

/// Stopping without starting, and stopping twice, are both no-ops
#[test]
fn test_watcher_stop_is_safe() {
    let audio = ScriptedAudio::with_device(0);
    let (sink, _rx) = recording_sink();
    let watcher = HardwareWatcher::new(Arc::clone(&audio) as Arc<dyn AudioSubsystem>, sink);
    watcher.stop_monitoring();
    watcher.start_monitoring();
    watcher.stop_monitoring();
    watcher.stop_monitoring();
    assert_eq!(audio.listeners.lock().len(), 0);
}

/// Endpoint sampled by the polling adapter; clones share the volume
#[derive(Clone, Default)]
struct SampledEndpoint {
    volume: Arc<Mutex<f32>>,
}

impl AudioEndpoint for SampledEndpoint {
    fn default_output_device(&self) -> Result<DeviceId> {
        Ok(DeviceId(4))
    }

    fn volume_scalar(&self, _device: DeviceId) -> Result<f32> {
        Ok(*self.volume.lock())
    }

    fn is_muted(&self, _device: DeviceId) -> Result<bool> {
        Ok(false)
    }
}

/// A volume change on a sampled endpoint reaches the sink from the sampling thread
#[test]
fn test_polled_volume_change_reaches_sink() {
    let endpoint = SampledEndpoint::default();
    let audio: Arc<dyn AudioSubsystem> =
        Arc::new(PolledAudioSubsystem::new(endpoint.clone(), ms(5)));
    let (sink, rx) = recording_sink();
    let watcher = HardwareWatcher::new(audio, sink);
    watcher.start_monitoring();
    assert_eq!(watcher.current_device(), DeviceId(4));

    // Let the sampler take its baseline
    thread::sleep(ms(50));
    *endpoint.volume.lock() = 0.75;

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(Topic::VolumeChanged));
    watcher.stop_monitoring();
}

// ---------------------------------------------------------------------------
// Brightness monitor
// ---------------------------------------------------------------------------

struct AdjustableBrightness(Mutex<f32>);

impl BrightnessSource for AdjustableBrightness {
    fn brightness(&self) -> Result<f32> {
        Ok(*self.0.lock())
    }
}

/// A brightness change is posted from the monitor thread
#[test]
fn test_brightness_monitor_posts_changes() {
    let source = Arc::new(AdjustableBrightness(Mutex::new(0.5)));
    let (sink, rx) = recording_sink();
    let mut monitor = BrightnessMonitor::new(
        Arc::clone(&source) as Arc<dyn BrightnessSource>,
        sink,
        ms(5),
    );
    monitor.start();

    thread::sleep(ms(50));
    *source.0.lock() = 0.9;

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(Topic::BrightnessChanged));
    monitor.stop();
}

// ---------------------------------------------------------------------------
// Controller loop
// ---------------------------------------------------------------------------

/// A signal posted from a foreign thread is marshaled onto the loop, shown, then hidden
#[test]
fn test_marshaled_signal_drives_running_loop() {
    let (setup_tx, setup_rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let Harness {
            mut controller,
            _handle: handle,
            states,
            ..
        } = harness(&UserPreferences::default());
        setup_tx.send((handle, states)).unwrap();
        controller.run();
    });
    let (handle, states) = setup_rx.recv().unwrap();

    let poster = handle.clone();
    let posted_at = Instant::now();
    thread::spawn(move || poster.post(Topic::VolumeChanged))
        .join()
        .unwrap();

    let shown = states
        .iter()
        .find(|state| state.volume.is_active())
        .expect("volume HUD shown");
    assert_eq!(shown.volume.icon, HudIcon::Speaker);

    let hidden = states
        .iter()
        .find(|state| !state.volume.is_active())
        .expect("volume HUD hidden");
    assert_eq!(hidden.volume.value, None);
    assert!(posted_at.elapsed() >= HUD_HIDE_DELAY);

    handle.shutdown();
    worker.join().unwrap();
}

// ---------------------------------------------------------------------------
// Configuration and errors
// ---------------------------------------------------------------------------

/// Missing and corrupt config files both yield defaults
#[test]
fn test_config_fallbacks() {
    let dir = tempfile::tempdir().unwrap();

    let missing = ConfigManager::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(missing, AppConfig::default());

    let corrupt_path = dir.path().join("config.json");
    std::fs::write(&corrupt_path, "{ not json").unwrap();
    let corrupt = ConfigManager::load_from(&corrupt_path).unwrap();
    assert_eq!(corrupt, AppConfig::default());
}

/// A partial config keeps explicit values and defaults the rest
#[test]
fn test_config_partial_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"preferences":{"hud_enabled":false},"monitoring":{"audio_poll_interval_ms":5}}"#,
    )
    .unwrap();

    let config = ConfigManager::load_from(&path).unwrap();
    assert!(!config.preferences.hud_enabled);
    assert!(config.preferences.force_notch_size);
    assert_eq!(config.monitoring.audio_poll_interval(), ms(25));
}

/// Error chains keep their source
#[test]
fn test_error_sources_are_preserved() {
    use std::error::Error as _;

    let error = NotchError::ListenerRegistration {
        property: "mute",
        source: StringError::new("device busy"),
    };
    assert_eq!(
        error.source().map(ToString::to_string),
        Some("device busy".to_string())
    );
    assert!(!error.is_transient());
    assert!(NotchError::audio_property("volume", "gone").is_transient());
}
