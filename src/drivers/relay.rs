//! Relay driver for the heater and cooler outputs.
//!
//! Thin wrapper over an `embedded-hal` output pin that tracks the
//! commanded state. The relay board is active-HIGH; pin errors are logged
//! and the cached state keeps the last *commanded* value so the control
//! layer retries the level on the next write.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    label: &'static str,
    on: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Construct with the relay de-energised.
    pub fn new(mut pin: P, label: &'static str) -> Self {
        if pin.set_low().is_err() {
            warn!("{}: failed to init relay pin low", label);
        }
        Self {
            pin,
            label,
            on: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        self.on = on;
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            warn!("{}: relay pin write failed", self.label);
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
