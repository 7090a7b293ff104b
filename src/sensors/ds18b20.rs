//! DS18B20 1-Wire temperature sensor bus driver.
//!
//! Implements [`SensorBus`] for a single DS18B20 on a dedicated GPIO
//! (SKIP ROM addressing — one sensor per bus by board design).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-banged 1-Wire with interrupt-free microsecond timing via
//! `esp_rom_delay_us`. Bus transactions are tens of microseconds of line
//! wiggling; the 94–750 ms conversion wait itself belongs to the
//! [`SensorPoller`](super::poller::SensorPoller), never to this driver.
//!
//! On host/test: reads from static atomics for injection, mirroring the
//! hardware contract including CRC-style failure injection.

use crate::app::ports::SensorBus;
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

// ── Host simulation hooks ─────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41A8_0000); // 21.0 °C
#[cfg(not(target_os = "espidf"))]
static SIM_CONNECTED: AtomicBool = AtomicBool::new(true);

/// Inject the temperature the simulated sensor reports.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temperature(celsius: f32) {
    SIM_TEMP_BITS.store(celsius.to_bits(), Ordering::Relaxed);
}

/// Simulate plugging/unplugging the sensor.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_connected(connected: bool) {
    SIM_CONNECTED.store(connected, Ordering::Relaxed);
}

// ── ROM commands (DS18B20 datasheet) ──────────────────────────

#[cfg(target_os = "espidf")]
const CMD_SKIP_ROM: u8 = 0xCC;
#[cfg(target_os = "espidf")]
const CMD_CONVERT_T: u8 = 0x44;
#[cfg(target_os = "espidf")]
const CMD_READ_SCRATCHPAD: u8 = 0xBE;
#[cfg(target_os = "espidf")]
const CMD_WRITE_SCRATCHPAD: u8 = 0x4E;

/// Driver for one DS18B20 on a dedicated GPIO.
pub struct Ds18b20Bus {
    gpio: i32,
    /// Tracked for the config-register write on the target; the simulation
    /// backend reports full precision regardless.
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    resolution_bits: u8,
}

impl Ds18b20Bus {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            resolution_bits: 12,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl SensorBus for Ds18b20Bus {
    fn request_conversion(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            if hw::reset_presence(self.gpio) {
                hw::write_byte(self.gpio, CMD_SKIP_ROM);
                hw::write_byte(self.gpio, CMD_CONVERT_T);
            }
        }
        // Host: conversions are instantaneous; nothing to start.
    }

    fn set_resolution(&mut self, bits: u8) {
        self.resolution_bits = bits.clamp(9, 12);
        #[cfg(target_os = "espidf")]
        {
            if hw::reset_presence(self.gpio) {
                // Config register: R1:R0 in bits 6:5, rest reserved as 1.
                let cfg = ((self.resolution_bits - 9) << 5) | 0x1F;
                hw::write_byte(self.gpio, CMD_SKIP_ROM);
                hw::write_byte(self.gpio, CMD_WRITE_SCRATCHPAD);
                hw::write_byte(self.gpio, 0x7F); // TH alarm (unused)
                hw::write_byte(self.gpio, 0x80); // TL alarm (unused)
                hw::write_byte(self.gpio, cfg);
            }
        }
    }

    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        #[cfg(target_os = "espidf")]
        {
            if !hw::reset_presence(self.gpio) {
                return Err(SensorError::Disconnected);
            }
            hw::write_byte(self.gpio, CMD_SKIP_ROM);
            hw::write_byte(self.gpio, CMD_READ_SCRATCHPAD);

            let mut scratchpad = [0u8; 9];
            for byte in &mut scratchpad {
                *byte = hw::read_byte(self.gpio);
            }
            if crc8(&scratchpad[..8]) != scratchpad[8] {
                return Err(SensorError::CrcMismatch);
            }

            let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
            // A floating bus reads all-ones; the power-on reset value 85.0
            // with a valid CRC is a real (if unlucky) reading and passes.
            if raw == -1 {
                return Err(SensorError::BusTimeout);
            }
            Ok(f32::from(raw) / 16.0)
        }

        #[cfg(not(target_os = "espidf"))]
        {
            if !SIM_CONNECTED.load(Ordering::Relaxed) {
                return Err(SensorError::Disconnected);
            }
            Ok(f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)))
        }
    }
}

/// Dallas/Maxim CRC-8 (poly 0x31 reflected), LSB-first as the wire sends it.
#[allow(dead_code)] // referenced from the espidf read path only
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

// ── ESP-IDF bit-bang layer ────────────────────────────────────
//
// Timing per the DS18B20 datasheet. Slots are generated with busy-waits
// (esp_rom_delay_us); each slot is < 100 µs so the control loop is not
// meaningfully disturbed.

#[cfg(target_os = "espidf")]
mod hw {
    use esp_idf_svc::sys::{
        esp_rom_delay_us, gpio_get_level, gpio_mode_t_GPIO_MODE_INPUT,
        gpio_mode_t_GPIO_MODE_OUTPUT_OD, gpio_set_direction, gpio_set_level,
    };

    fn drive_low(gpio: i32) {
        unsafe {
            gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_OUTPUT_OD);
            gpio_set_level(gpio, 0);
        }
    }

    fn release(gpio: i32) {
        unsafe {
            gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_INPUT);
        }
    }

    fn sample(gpio: i32) -> bool {
        unsafe { gpio_get_level(gpio) != 0 }
    }

    fn delay_us(us: u32) {
        unsafe { esp_rom_delay_us(us) }
    }

    /// Reset pulse; returns `true` if a device answered with presence.
    pub fn reset_presence(gpio: i32) -> bool {
        drive_low(gpio);
        delay_us(480);
        release(gpio);
        delay_us(70);
        let present = !sample(gpio);
        delay_us(410);
        present
    }

    fn write_bit(gpio: i32, bit: bool) {
        drive_low(gpio);
        if bit {
            delay_us(6);
            release(gpio);
            delay_us(64);
        } else {
            delay_us(60);
            release(gpio);
            delay_us(10);
        }
    }

    fn read_bit(gpio: i32) -> bool {
        drive_low(gpio);
        delay_us(6);
        release(gpio);
        delay_us(9);
        let bit = sample(gpio);
        delay_us(55);
        bit
    }

    pub fn write_byte(gpio: i32, byte: u8) {
        for i in 0..8 {
            write_bit(gpio, byte & (1 << i) != 0);
        }
    }

    pub fn read_byte(gpio: i32) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if read_bit(gpio) {
                byte |= 1 << i;
            }
        }
        byte
    }
}
