//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! logger (UART / USB-CDC in production). The web front end's status cache
//! would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | mode={:?} | T={:.1}\u{00b0}C | band={}..{} | \
                     heater={} cooler={} | sensor={} | screen={:?}",
                    s.mode,
                    s.temperature_c,
                    s.lower_limit_c,
                    s.upper_limit_c,
                    if s.heater_on { "ON" } else { "off" },
                    if s.cooler_on { "ON" } else { "off" },
                    if s.sensor_ok { "OK" } else { "FAULT" },
                    s.active_screen,
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            AppEvent::ScreenChanged { from, to } => {
                info!("SCREEN | {:?} -> {:?}", from, to);
            }
            AppEvent::SensorFault => {
                warn!("SENSOR | fault — holding last reading, polling halted");
            }
            AppEvent::ProcessEnded { completed } => {
                info!(
                    "RUN | ended ({})",
                    if *completed { "complete" } else { "stopped" }
                );
            }
            AppEvent::TargetSaved { key, value } => {
                info!("SAVE | {} = {}", key, value);
            }
            AppEvent::Started(screen) => {
                info!("START | initial_screen={:?}", screen);
            }
        }
    }
}
