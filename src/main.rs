//! FermBox Firmware — Main Entry Point
//!
//! Hexagonal composition root for the ESP32-S3 target.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter  GraphicsRenderer  NvsSettings  ClockAdapter│
//! │  (ActuatorPort)   (Renderer/OLED)   (SettingsPort) (uptime)  │
//! │  Ds18b20Bus       LogEventSink      Command queue            │
//! │  (SensorBus)      (EventSink)       (web → main loop)        │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │             AppService (pure logic)                │      │
//! │  │  input · poller · hysteresis · process · screens   │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! GPIO interrupts do the absolute minimum: they store raw levels into the
//! shared atomics. Debounce, timing, and every decision live in the main
//! loop, which is the sole writer of all control state.

use anyhow::{Context, Result};
use log::info;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, InterruptType, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;

use ssd1306::mode::DisplayConfig;
use ssd1306::prelude::DisplayRotation;
use ssd1306::size::DisplaySize128x64;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use fermbox::adapters::display::GraphicsRenderer;
use fermbox::adapters::hardware::HardwareAdapter;
use fermbox::adapters::log_sink::LogEventSink;
use fermbox::adapters::settings::NvsSettings;
use fermbox::adapters::time::ClockAdapter;
use fermbox::app::commands::CommandQueue;
use fermbox::app::service::{AppService, TickPorts};
use fermbox::board_pins as pins;
use fermbox::config::SystemConfig;
use fermbox::input::RawInputShared;
use fermbox::sensors::ds18b20::Ds18b20Bus;

/// ISR → main loop handoff. Static so the GPIO interrupt closures can reach
/// it with no captures beyond pin handles.
static RAW_INPUT: RawInputShared = RawInputShared::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init().context("logger init")?;

    info!("FermBox v{} starting", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take().context("peripherals")?;

    // ── 2. Persistent settings → configuration ────────────────
    // NvsSettings reads degrade to defaults on any per-key trouble; only a
    // wholly unusable flash partition aborts the boot.
    let mut settings = NvsSettings::new().context("NVS init")?;
    let config = SystemConfig::load(&settings);

    // ── 3. Input pins + ISRs ──────────────────────────────────
    let mut button = PinDriver::input(unsafe { AnyIOPin::new(pins::BUTTON_GPIO) })?;
    button.set_pull(Pull::Up)?;
    button.set_interrupt_type(InterruptType::AnyEdge)?;

    let mut enc_a = PinDriver::input(unsafe { AnyIOPin::new(pins::ENCODER_A_GPIO) })?;
    enc_a.set_pull(Pull::Up)?;
    enc_a.set_interrupt_type(InterruptType::AnyEdge)?;

    let enc_b = PinDriver::input(unsafe { AnyIOPin::new(pins::ENCODER_B_GPIO) })?;

    // SAFETY: the callbacks run in ISR context and only touch the lock-free
    // atomics in RAW_INPUT — no allocation, no locks, no logging.
    unsafe {
        button.subscribe(|| {
            let high =
                esp_idf_svc::sys::gpio_get_level(pins::BUTTON_GPIO) != 0;
            RAW_INPUT.isr_set_button_level(high);
        })?;
        enc_a.subscribe(|| {
            let a = esp_idf_svc::sys::gpio_get_level(pins::ENCODER_A_GPIO) != 0;
            let b = esp_idf_svc::sys::gpio_get_level(pins::ENCODER_B_GPIO) != 0;
            RAW_INPUT.isr_encoder_edge(a, b);
        })?;
    }
    button.enable_interrupt()?;
    enc_a.enable_interrupt()?;
    // Seed the raw level so the debouncer starts from reality.
    RAW_INPUT.isr_set_button_level(button.is_high());
    let _enc_b = enc_b; // level sampled inside the ISR via the sys call

    // ── 4. Actuator + sensor + display adapters ───────────────
    let mut hw = HardwareAdapter::new(
        PinDriver::output(unsafe { AnyIOPin::new(pins::HEATER_GPIO) })?,
        PinDriver::output(unsafe { AnyIOPin::new(pins::COOLER_GPIO) })?,
        PinDriver::output(unsafe { AnyIOPin::new(pins::HEAT_LED_GPIO) })?,
        PinDriver::output(unsafe { AnyIOPin::new(pins::COOL_LED_GPIO) })?,
    );

    let mut bus = Ds18b20Bus::new(pins::ONEWIRE_GPIO);

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) },
        unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) },
        &I2cConfig::new().baudrate(400.kHz().into()),
    )?;
    let interface = I2CDisplayInterface::new_custom_address(i2c, pins::OLED_I2C_ADDR);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display
        .init()
        .map_err(|e| anyhow::anyhow!("display init: {e:?}"))?;
    let mut renderer = GraphicsRenderer::new(display);

    let mut sink = LogEventSink::new();
    let clock = ClockAdapter::new();

    // ── 5. Command queue (web/RPC context → main loop) ────────
    let mut command_queue = CommandQueue::new();
    let (_command_tx, mut command_rx) = command_queue.split();
    // The producer half belongs to the web front end's task; it is created
    // here so the split outlives the loop. Until that task is wired up the
    // queue simply stays empty.

    // ── 6. App service + main loop ────────────────────────────
    let loop_interval_ms = config.control_loop_interval_ms;
    let mut app = AppService::new(config, &RAW_INPUT);

    let mut ports = TickPorts {
        bus: &mut bus,
        actuators: &mut hw,
        renderer: &mut renderer,
        settings: &mut settings,
        sink: &mut sink,
    };

    app.start(clock.uptime_ms(), &mut ports);
    info!("System ready. Entering control loop.");

    loop {
        app.tick(clock.uptime_ms(), &mut command_rx, &mut ports);
        FreeRtos::delay_ms(loop_interval_ms);
    }
}
