//! Hardware adapter — bridges the relay and LED drivers to the
//! [`ActuatorPort`]. This (plus the bus and display adapters) is the only
//! layer that touches actual pins; the control core sees booleans.

use embedded_hal::digital::OutputPin;

use crate::app::ports::ActuatorPort;
use crate::drivers::indicator::IndicatorLed;
use crate::drivers::relay::RelayDriver;

/// Concrete adapter combining both relays and both indicators.
pub struct HardwareAdapter<H, C, HL, CL>
where
    H: OutputPin,
    C: OutputPin,
    HL: OutputPin,
    CL: OutputPin,
{
    heater: RelayDriver<H>,
    cooler: RelayDriver<C>,
    heat_led: IndicatorLed<HL>,
    cool_led: IndicatorLed<CL>,
}

impl<H, C, HL, CL> HardwareAdapter<H, C, HL, CL>
where
    H: OutputPin,
    C: OutputPin,
    HL: OutputPin,
    CL: OutputPin,
{
    pub fn new(heater_pin: H, cooler_pin: C, heat_led_pin: HL, cool_led_pin: CL) -> Self {
        Self {
            heater: RelayDriver::new(heater_pin, "heater"),
            cooler: RelayDriver::new(cooler_pin, "cooler"),
            heat_led: IndicatorLed::new(heat_led_pin),
            cool_led: IndicatorLed::new(cool_led_pin),
        }
    }
}

impl<H, C, HL, CL> ActuatorPort for HardwareAdapter<H, C, HL, CL>
where
    H: OutputPin,
    C: OutputPin,
    HL: OutputPin,
    CL: OutputPin,
{
    fn set_heater(&mut self, on: bool) {
        self.heater.set(on);
    }

    fn set_cooler(&mut self, on: bool) {
        self.cooler.set(on);
    }

    fn set_heat_indicator(&mut self, on: bool) {
        self.heat_led.set(on);
    }

    fn set_cool_indicator(&mut self, on: bool) {
        self.cool_led.set(on);
    }

    fn is_heater_on(&self) -> bool {
        self.heater.is_on()
    }

    fn is_cooler_on(&self) -> bool {
        self.cooler.is_on()
    }

    fn all_off(&mut self) {
        self.heater.set(false);
        self.cooler.set(false);
        self.heat_led.set(false);
        self.cool_led.set(false);
    }
}
