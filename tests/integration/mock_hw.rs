//! Mock adapters for integration tests.
//!
//! Every port gets a recording implementation so tests can assert on the
//! full interaction history without touching real hardware.

use std::collections::HashMap;

use fermbox::app::events::AppEvent;
use fermbox::app::ports::{ActuatorPort, EventSink, Renderer, SensorBus, SettingsPort};
use fermbox::{SensorError, SettingsError};

// ── Sensor bus ────────────────────────────────────────────────

/// Scripted 1-Wire bus: serves a settable temperature and records every
/// conversion request and resolution change.
pub struct MockBus {
    pub temperature_c: f32,
    pub connected: bool,
    pub conversions: u32,
    pub resolutions: Vec<u8>,
}

impl MockBus {
    pub fn new(temperature_c: f32) -> Self {
        Self {
            temperature_c,
            connected: true,
            conversions: 0,
            resolutions: Vec::new(),
        }
    }
}

impl SensorBus for MockBus {
    fn request_conversion(&mut self) {
        self.conversions += 1;
    }

    fn set_resolution(&mut self, bits: u8) {
        self.resolutions.push(bits);
    }

    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        if self.connected {
            Ok(self.temperature_c)
        } else {
            Err(SensorError::Disconnected)
        }
    }
}

// ── Actuators ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Heater(bool),
    Cooler(bool),
    HeatLed(bool),
    CoolLed(bool),
    AllOff,
}

#[derive(Default)]
pub struct MockActuators {
    pub heater: bool,
    pub cooler: bool,
    pub heat_led: bool,
    pub cool_led: bool,
    pub calls: Vec<ActuatorCall>,
}

impl ActuatorPort for MockActuators {
    fn set_heater(&mut self, on: bool) {
        self.heater = on;
        self.calls.push(ActuatorCall::Heater(on));
    }

    fn set_cooler(&mut self, on: bool) {
        self.cooler = on;
        self.calls.push(ActuatorCall::Cooler(on));
    }

    fn set_heat_indicator(&mut self, on: bool) {
        self.heat_led = on;
        self.calls.push(ActuatorCall::HeatLed(on));
    }

    fn set_cool_indicator(&mut self, on: bool) {
        self.cool_led = on;
        self.calls.push(ActuatorCall::CoolLed(on));
    }

    fn is_heater_on(&self) -> bool {
        self.heater
    }

    fn is_cooler_on(&self) -> bool {
        self.cooler
    }

    fn all_off(&mut self) {
        self.heater = false;
        self.cooler = false;
        self.heat_led = false;
        self.cool_led = false;
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── Settings ──────────────────────────────────────────────────

/// In-memory settings store with typed maps.
#[derive(Default)]
pub struct MockSettings {
    pub ints: HashMap<String, i32>,
    pub floats: HashMap<String, f32>,
    pub strings: HashMap<String, String>,
    /// When set, every write fails (storage-fault injection).
    pub fail_writes: bool,
}

impl MockSettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsPort for MockSettings {
    fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.ints.get(key).copied().unwrap_or(default)
    }

    fn set_i32(&mut self, key: &str, value: i32) -> Result<(), SettingsError> {
        if self.fail_writes {
            return Err(SettingsError::IoError);
        }
        self.ints.insert(key.to_string(), value);
        Ok(())
    }

    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.floats.get(key).copied().unwrap_or(default)
    }

    fn set_f32(&mut self, key: &str, value: f32) -> Result<(), SettingsError> {
        if self.fail_writes {
            return Err(SettingsError::IoError);
        }
        self.floats.insert(key.to_string(), value);
        Ok(())
    }

    fn get_string(&self, key: &str, default: &str) -> heapless::String<32> {
        let value = self.strings.get(key).map_or(default, String::as_str);
        let mut s = heapless::String::new();
        let _ = s.push_str(&value[..value.len().min(32)]);
        s
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        if self.fail_writes {
            return Err(SettingsError::IoError);
        }
        self.strings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ── Renderer ──────────────────────────────────────────────────

/// Records draw traffic; geometry matches the 128×64 panel with the 6×10
/// font so screen layout code behaves exactly as in production.
#[derive(Default)]
pub struct CaptureRenderer {
    pub clears: u32,
    pub region_clears: u32,
    pub flushes: u32,
    pub texts: Vec<String>,
    pub boxes: u32,
    pub lines: u32,
    pub pixels: u32,
}

impl CaptureRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any drawn text contains `needle`.
    pub fn drew_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.contains(needle))
    }
}

impl Renderer for CaptureRenderer {
    fn width(&self) -> i32 {
        128
    }

    fn height(&self) -> i32 {
        64
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn clear_region(&mut self, _x: i32, _y: i32, _w: i32, _h: i32) {
        self.region_clears += 1;
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn draw_text(&mut self, _x: i32, _y: i32, text: &str) {
        self.texts.push(text.to_string());
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * 6
    }

    fn line_height(&self) -> i32 {
        12
    }

    fn draw_box(&mut self, _x: i32, _y: i32, _w: i32, _h: i32, _filled: bool) {
        self.boxes += 1;
    }

    fn draw_line(&mut self, _x0: i32, _y0: i32, _x1: i32, _y1: i32) {
        self.lines += 1;
    }

    fn draw_pixel(&mut self, _x: i32, _y: i32) {
        self.pixels += 1;
    }

    fn draw_bitmap(&mut self, _x: i32, _y: i32, _w: i32, _h: i32, _data: &[u8]) {}
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct VecSink {
    pub events: Vec<AppEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_mode_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::ModeChanged { .. }))
            .count()
    }

    pub fn count_screen_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::ScreenChanged { .. }))
            .count()
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
