//! GPIO / peripheral pin assignments for the FermBox main board.
//!
//! Single source of truth — every adapter is constructed from this module
//! rather than hard-coding pin numbers. Change a pin here and it propagates
//! everywhere. The core logic never sees a pin number, only port traits.

// ---------------------------------------------------------------------------
// Actuator relays (opto-isolated relay board, active HIGH)
// ---------------------------------------------------------------------------

/// Heater relay (belt heater around the chamber).
pub const HEATER_GPIO: i32 = 1;
/// Cooler relay (compressor / Peltier stage).
pub const COOLER_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Front-panel indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

/// "Heating" indicator.
pub const HEAT_LED_GPIO: i32 = 11;
/// "Cooling" indicator.
pub const COOL_LED_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Rotary encoder (quadrature, both lines pulled up)
// ---------------------------------------------------------------------------

pub const ENCODER_A_GPIO: i32 = 5;
pub const ENCODER_B_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// User button (active-low with external pull-up; encoder push shaft)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// 1-Wire temperature sensor (DS18B20, external 4.7 kΩ pull-up)
// ---------------------------------------------------------------------------

pub const ONEWIRE_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 OLED display)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;

/// SSD1306 I²C address (SA0 low).
pub const OLED_I2C_ADDR: u8 = 0x3C;
