//! Front-panel indicator LED driver (active HIGH).

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct IndicatorLed<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> IndicatorLed<P> {
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) {
        self.on = on;
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            warn!("indicator LED pin write failed");
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
