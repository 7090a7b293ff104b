//! Port traits — the hexagonal boundary between domain logic and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ domain (poller / controller / screens)
//! ```
//!
//! Driven adapters (display, settings storage, 1-Wire bus, relays, event
//! sinks) implement these traits. The domain consumes them as `&dyn`
//! references threaded through the per-tick context, so the core never
//! touches hardware directly and every test runs against mocks.
//!
//! Failure policy: reads degrade to explicit caller-supplied defaults,
//! renderer errors are swallowed (a dead display must not stop control),
//! and writes return typed errors that call sites log and survive.

use crate::error::{SensorError, SettingsError};

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Renderer port (driven adapter: domain → display)
// ───────────────────────────────────────────────────────────────

/// Abstract draw surface. Coordinates are pixels, origin top-left; text
/// anchors at the top-left of its bounding box.
///
/// The two composite helpers ([`draw_title`](Self::draw_title) and
/// [`draw_button_bar`](Self::draw_button_bar)) have default implementations
/// in terms of the primitives and are used by every screen.
pub trait Renderer {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Clear the whole frame.
    fn clear(&mut self);
    /// Clear a rectangular region (partial-redraw support).
    fn clear_region(&mut self, x: i32, y: i32, w: i32, h: i32);
    /// Push the frame to the panel.
    fn flush(&mut self);

    fn draw_text(&mut self, x: i32, y: i32, text: &str);
    /// Rendered width of `text` in pixels.
    fn text_width(&self, text: &str) -> i32;
    /// Line advance in pixels.
    fn line_height(&self) -> i32;

    fn draw_box(&mut self, x: i32, y: i32, w: i32, h: i32, filled: bool);
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);
    fn draw_pixel(&mut self, x: i32, y: i32);
    /// 1-bpp row-major bitmap, `w` bits per row, rows padded to whole bytes.
    fn draw_bitmap(&mut self, x: i32, y: i32, w: i32, h: i32, data: &[u8]);

    /// Draw a title block: wraps on embedded newlines, centers each line,
    /// returns the Y offset of the first row below the title.
    fn draw_title(&mut self, title: &str) -> i32 {
        let mut y = 0;
        for line in title.split('\n') {
            let x = (self.width() - self.text_width(line)).max(0) / 2;
            self.draw_text(x, y, line);
            y += self.line_height();
        }
        y + 2
    }

    /// Lay out `labels` evenly along the bottom edge, boxing the selected
    /// index.
    fn draw_button_bar(&mut self, labels: &[&str], selected: usize) {
        if labels.is_empty() {
            return;
        }
        let bar_h = self.line_height() + 3;
        let top = self.height() - bar_h;
        let slot = self.width() / labels.len() as i32;
        for (i, label) in labels.iter().enumerate() {
            let x0 = slot * i as i32;
            let tx = x0 + (slot - self.text_width(label)).max(0) / 2;
            self.draw_text(tx, top + 2, label);
            if i == selected {
                self.draw_box(x0, top, slot, bar_h, false);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Persistent settings port (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Key-value persistent settings with explicit default-on-miss reads.
///
/// Getters never fail: a missing key, a corrupt value, or a dead backend all
/// yield the caller's default (the band controller must keep working with no
/// storage at all). Setters report typed errors so call sites can log them.
pub trait SettingsPort {
    fn get_i32(&self, key: &str, default: i32) -> i32;
    fn set_i32(&mut self, key: &str, value: i32) -> Result<(), SettingsError>;

    fn get_f32(&self, key: &str, default: f32) -> f32;
    fn set_f32(&mut self, key: &str, value: f32) -> Result<(), SettingsError>;

    /// Bounded string read; values longer than the buffer are truncated.
    fn get_string(&self, key: &str, default: &str) -> heapless::String<32>;
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor bus port (driven adapter: domain ↔ 1-Wire)
// ───────────────────────────────────────────────────────────────

/// Temperature sensor transactions, one conversion at a time.
///
/// The poller drives this; implementations must not block for the conversion
/// time (the poller owns that wait).
pub trait SensorBus {
    /// Begin a temperature conversion. Non-blocking.
    fn request_conversion(&mut self);

    /// Set the conversion resolution (9–12 bits).
    fn set_resolution(&mut self, bits: u8);

    /// Read the result of the last conversion.
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → relays / LEDs)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the band controller commands actuators through this.
pub trait ActuatorPort {
    fn set_heater(&mut self, on: bool);
    fn set_cooler(&mut self, on: bool);

    fn set_heat_indicator(&mut self, on: bool);
    fn set_cool_indicator(&mut self, on: bool);

    fn is_heater_on(&self) -> bool;
    fn is_cooler_on(&self) -> bool;

    /// Kill everything — relays and indicators. Safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port. Adapters
/// decide where they go (serial log, web status cache, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
