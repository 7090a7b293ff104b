//! Hysteresis band controller for the heater and cooler relays.
//!
//! Classic bang-bang control with a dead band: in Heating mode the heater
//! engages below the lower limit and releases above the upper limit; inside
//! the band the relay state is left alone, which is what prevents chatter.
//! Cooling mode is the mirror image. Off holds both relays off.
//!
//! Mode changes always run in a fixed order: relays off, limits reloaded
//! from settings, indicators set for the new mode. The off-first step is a
//! safety invariant — no combination of mode changes may ever leave a relay
//! energised under the wrong mode's logic.

use log::{info, warn};

use crate::app::ports::{ActuatorPort, SettingsPort};
use crate::config::{
    self, DEFAULT_COOL_LOWER_C, DEFAULT_COOL_UPPER_C, DEFAULT_HEAT_LOWER_C, DEFAULT_HEAT_UPPER_C,
};

use super::Mode;

/// Heater/cooler band controller.
pub struct HysteresisController {
    mode: Mode,
    lower_limit_c: i32,
    upper_limit_c: i32,
    heater_on: bool,
    cooler_on: bool,
}

impl HysteresisController {
    pub fn new() -> Self {
        Self {
            mode: Mode::Off,
            lower_limit_c: DEFAULT_HEAT_LOWER_C,
            upper_limit_c: DEFAULT_HEAT_UPPER_C,
            heater_on: false,
            cooler_on: false,
        }
    }

    /// Switch operating mode. No-op when the mode is unchanged; otherwise
    /// forces both relays off, reloads the new mode's band from settings,
    /// and sets the front-panel indicators.
    pub fn set_mode(&mut self, mode: Mode, settings: &dyn SettingsPort, hw: &mut dyn ActuatorPort) {
        if mode == self.mode {
            return;
        }

        // Fail-safe ordering: relays off before anything else happens.
        hw.all_off();
        self.heater_on = false;
        self.cooler_on = false;

        self.mode = mode;
        self.load_limits(settings);

        hw.set_heat_indicator(mode == Mode::Heating);
        hw.set_cool_indicator(mode == Mode::Cooling);

        info!(
            "Control mode {:?}, band {}..{} \u{00b0}C",
            mode, self.lower_limit_c, self.upper_limit_c
        );
    }

    /// Re-read the current mode's band from settings without a mode change.
    /// Used after the band was edited while the mode is active; the next
    /// `update` applies the new limits.
    pub fn refresh_limits(&mut self, settings: &dyn SettingsPort) {
        self.load_limits(settings);
    }

    /// Apply the band logic to the latest temperature reading.
    pub fn update(&mut self, temperature_c: f32, hw: &mut dyn ActuatorPort) {
        match self.mode {
            Mode::Off => {
                // Unconditional: Off never trusts remembered relay state.
                self.heater_on = false;
                self.cooler_on = false;
                hw.set_heater(false);
                hw.set_cooler(false);
            }
            Mode::Heating => {
                if temperature_c < self.lower_limit_c as f32 {
                    if !self.heater_on {
                        info!("Heater ON at {:.1} \u{00b0}C", temperature_c);
                        self.heater_on = true;
                        hw.set_heater(true);
                    }
                } else if temperature_c > self.upper_limit_c as f32 && self.heater_on {
                    info!("Heater OFF at {:.1} \u{00b0}C", temperature_c);
                    self.heater_on = false;
                    hw.set_heater(false);
                }
            }
            Mode::Cooling => {
                if temperature_c > self.upper_limit_c as f32 {
                    if !self.cooler_on {
                        info!("Cooler ON at {:.1} \u{00b0}C", temperature_c);
                        self.cooler_on = true;
                        hw.set_cooler(true);
                    }
                } else if temperature_c < self.lower_limit_c as f32 && self.cooler_on {
                    info!("Cooler OFF at {:.1} \u{00b0}C", temperature_c);
                    self.cooler_on = false;
                    hw.set_cooler(false);
                }
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_heating(&self) -> bool {
        self.heater_on
    }

    pub fn is_cooling(&self) -> bool {
        self.cooler_on
    }

    /// Active band as `(lower, upper)` in °C.
    pub fn limits(&self) -> (i32, i32) {
        (self.lower_limit_c, self.upper_limit_c)
    }

    // ── Internal ──────────────────────────────────────────────

    fn load_limits(&mut self, settings: &dyn SettingsPort) {
        let (lower, upper) = match self.mode {
            Mode::Off => return,
            Mode::Heating => (
                settings.get_i32(config::keys::HEAT_LOWER, DEFAULT_HEAT_LOWER_C),
                settings.get_i32(config::keys::HEAT_UPPER, DEFAULT_HEAT_UPPER_C),
            ),
            Mode::Cooling => (
                settings.get_i32(config::keys::COOL_LOWER, DEFAULT_COOL_LOWER_C),
                settings.get_i32(config::keys::COOL_UPPER, DEFAULT_COOL_UPPER_C),
            ),
        };
        if lower >= upper {
            // Band validation belongs to the settings UI; here we only keep
            // the controller from operating on an inverted band.
            warn!("Stored band {}..{} is inverted, keeping previous", lower, upper);
            return;
        }
        self.lower_limit_c = lower;
        self.upper_limit_c = upper;
    }
}

impl Default for HysteresisController {
    fn default() -> Self {
        Self::new()
    }
}
