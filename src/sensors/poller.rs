//! Non-blocking temperature poller.
//!
//! A DS18B20 conversion takes up to 750 ms — far too long to wait inside a
//! loop that also services the encoder and the display. The poller splits
//! every read into request → timed wait → fetch, advancing at most one
//! transition per [`update`](SensorPoller::update) call:
//!
//! ```text
//! Stopped ──start_polling──▶ WaitingConversion ──delay elapsed──▶ ReadingTemp
//!                                   ▲                                 │
//!                                   └──── ok: store, re-request ──────┤
//!                                                                     │ err
//!                                                                  Error
//! ```
//!
//! The first conversion runs at 9 bits (94 ms) so the display has a value
//! quickly; after the first successful read the poller raises the bus to
//! 12 bits (750 ms) for steady-state precision.
//!
//! Error is terminal until the next explicit `start_polling()` — the tick
//! never retries on its own. `temperature()` keeps returning the last good
//! reading in every state, so callers never special-case a fault just to
//! draw a number.

use log::{info, warn};

use crate::app::ports::SensorBus;

/// Extra wait added between read cycles when slow polling is enabled
/// (screens that only glance at the temperature don't need 1 Hz updates).
pub const SLOW_POLL_PAD_MS: u64 = 4_250;

/// Poller state, one conversion in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Not polling; no conversion in flight.
    Stopped,
    /// Conversion requested, waiting out the conversion delay.
    WaitingConversion,
    /// Delay elapsed; result will be fetched on the next update.
    ReadingTemp,
    /// A read failed. Terminal until `start_polling()` is called again.
    Error,
}

/// DS18B20 conversion resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Bits9,
    Bits10,
    Bits11,
    Bits12,
}

impl Resolution {
    /// Worst-case conversion time at this resolution.
    pub const fn conversion_delay_ms(self) -> u64 {
        match self {
            Self::Bits9 => 94,
            Self::Bits10 => 188,
            Self::Bits11 => 375,
            Self::Bits12 => 750,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits9 => 9,
            Self::Bits10 => 10,
            Self::Bits11 => 11,
            Self::Bits12 => 12,
        }
    }
}

/// Non-blocking sensor polling state machine.
pub struct SensorPoller {
    state: PollState,
    resolution: Resolution,
    /// Last good reading (°C). Sticky across failures.
    last_temperature: f32,
    /// Timestamp of the in-flight conversion request.
    request_ms: u64,
    slow_poll: bool,
    /// Extra wait applied to the in-flight conversion (captured at request
    /// time so toggling slow poll mid-wait doesn't shorten a pending delay).
    pad_ms: u64,
    reading_count: u32,
}

impl SensorPoller {
    pub fn new() -> Self {
        Self {
            state: PollState::Stopped,
            resolution: Resolution::Bits9,
            last_temperature: 0.0,
            request_ms: 0,
            slow_poll: false,
            pad_ms: 0,
            reading_count: 0,
        }
    }

    /// Begin (or restart) polling. Drops back to the fast 9-bit first
    /// conversion and clears a latched Error.
    pub fn start_polling(&mut self, bus: &mut dyn SensorBus, now_ms: u64) {
        self.resolution = Resolution::Bits9;
        bus.set_resolution(self.resolution.bits());
        self.issue_request(bus, now_ms);
        info!("Sensor polling started at {} bits", self.resolution.bits());
    }

    /// Stop polling from any state. Any in-flight conversion result is
    /// discarded.
    pub fn stop_polling(&mut self) {
        self.state = PollState::Stopped;
    }

    /// Widen (or restore) the effective polling cadence. Takes effect from
    /// the next conversion request.
    pub fn set_slow_polling(&mut self, slow: bool) {
        self.slow_poll = slow;
    }

    /// Advance the state machine by at most one transition. Non-blocking.
    pub fn update(&mut self, bus: &mut dyn SensorBus, now_ms: u64) {
        match self.state {
            PollState::Stopped | PollState::Error => {}

            PollState::WaitingConversion => {
                let delay = self.resolution.conversion_delay_ms() + self.pad_ms;
                if now_ms.saturating_sub(self.request_ms) >= delay {
                    self.state = PollState::ReadingTemp;
                }
            }

            PollState::ReadingTemp => match bus.read_celsius() {
                Ok(celsius) => {
                    self.last_temperature = celsius;
                    self.reading_count = self.reading_count.wrapping_add(1);
                    if self.resolution != Resolution::Bits12 {
                        // First good sample arrived fast; all further ones
                        // trade latency for precision.
                        self.resolution = Resolution::Bits12;
                        bus.set_resolution(self.resolution.bits());
                    }
                    self.issue_request(bus, now_ms);
                }
                Err(e) => {
                    warn!("Sensor read failed: {e} — polling halted");
                    self.state = PollState::Error;
                }
            },
        }
    }

    /// Last known-good temperature (°C), regardless of current state.
    pub fn temperature(&self) -> f32 {
        self.last_temperature
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Count of successful reads, for new-sample detection by consumers.
    pub fn reading_count(&self) -> u32 {
        self.reading_count
    }

    pub fn is_polling(&self) -> bool {
        matches!(
            self.state,
            PollState::WaitingConversion | PollState::ReadingTemp
        )
    }

    // ── Internal ──────────────────────────────────────────────

    fn issue_request(&mut self, bus: &mut dyn SensorBus, now_ms: u64) {
        bus.request_conversion();
        self.request_ms = now_ms;
        self.pad_ms = if self.slow_poll { SLOW_POLL_PAD_MS } else { 0 };
        self.state = PollState::WaitingConversion;
    }
}

impl Default for SensorPoller {
    fn default() -> Self {
        Self::new()
    }
}
