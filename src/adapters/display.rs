//! Display adapter — [`Renderer`] over an `embedded-graphics` draw target.
//!
//! The production panel is a 128×64 SSD1306 behind I²C (buffered graphics
//! mode); host tests draw into the [`Framebuffer`] backend and assert on
//! pixels. Draw errors are discarded: a dead display must never stop
//! temperature control.

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::app::ports::Renderer;

/// Glyph cell of [`FONT_6X10`].
const CHAR_W: i32 = 6;
const LINE_H: i32 = 12;

/// A draw target that can push its buffer to the panel.
pub trait FlushTarget: DrawTarget<Color = BinaryColor> {
    fn flush_display(&mut self);
}

/// [`Renderer`] implementation over any flushable binary draw target.
pub struct GraphicsRenderer<D: FlushTarget> {
    target: D,
}

impl<D: FlushTarget> GraphicsRenderer<D> {
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    fn style(&self) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(&FONT_6X10, BinaryColor::On)
    }
}

impl<D: FlushTarget> Renderer for GraphicsRenderer<D> {
    fn width(&self) -> i32 {
        self.target.bounding_box().size.width as i32
    }

    fn height(&self) -> i32 {
        self.target.bounding_box().size.height as i32
    }

    fn clear(&mut self) {
        let _ = self.target.clear(BinaryColor::Off);
    }

    fn clear_region(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let _ = Rectangle::new(Point::new(x, y), Size::new(w.max(0) as u32, h.max(0) as u32))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut self.target);
    }

    fn flush(&mut self) {
        self.target.flush_display();
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        let _ = Text::with_baseline(text, Point::new(x, y), self.style(), Baseline::Top)
            .draw(&mut self.target);
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * CHAR_W
    }

    fn line_height(&self) -> i32 {
        LINE_H
    }

    fn draw_box(&mut self, x: i32, y: i32, w: i32, h: i32, filled: bool) {
        let style = if filled {
            PrimitiveStyle::with_fill(BinaryColor::On)
        } else {
            PrimitiveStyle::with_stroke(BinaryColor::On, 1)
        };
        let _ = Rectangle::new(Point::new(x, y), Size::new(w.max(0) as u32, h.max(0) as u32))
            .into_styled(style)
            .draw(&mut self.target);
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let _ = Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.target);
    }

    fn draw_pixel(&mut self, x: i32, y: i32) {
        let _ = Pixel(Point::new(x, y), BinaryColor::On).draw(&mut self.target);
    }

    fn draw_bitmap(&mut self, x: i32, y: i32, w: i32, _h: i32, data: &[u8]) {
        let raw = ImageRaw::<BinaryColor>::new(data, w.max(0) as u32);
        let _ = Image::new(&raw, Point::new(x, y)).draw(&mut self.target);
    }
}

// ── SSD1306 production backend ────────────────────────────────

#[cfg(target_os = "espidf")]
impl<DI, SIZE> FlushTarget
    for ssd1306::Ssd1306<DI, SIZE, ssd1306::mode::BufferedGraphicsMode<SIZE>>
where
    DI: ssd1306::prelude::WriteOnlyDataCommand,
    SIZE: ssd1306::prelude::DisplaySize,
{
    fn flush_display(&mut self) {
        if self.flush().is_err() {
            // Display bus fault — surfaced by the missing UI, not a crash.
            log::warn!("SSD1306 flush failed");
        }
    }
}

// ── Host framebuffer backend ──────────────────────────────────

/// In-memory 128×64 binary framebuffer for host tests and simulation.
pub struct Framebuffer {
    pixels: [[bool; Self::WIDTH]; Self::HEIGHT],
    flush_count: u32,
}

impl Framebuffer {
    pub const WIDTH: usize = 128;
    pub const HEIGHT: usize = 64;

    pub fn new() -> Self {
        Self {
            pixels: [[false; Self::WIDTH]; Self::HEIGHT],
            flush_count: 0,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if (0..Self::WIDTH as i32).contains(&x) && (0..Self::HEIGHT as i32).contains(&y) {
            self.pixels[y as usize][x as usize]
        } else {
            false
        }
    }

    /// Number of lit pixels inside a region.
    pub fn lit_in_region(&self, x: i32, y: i32, w: i32, h: i32) -> usize {
        let mut count = 0;
        for py in y..y + h {
            for px in x..x + w {
                if self.pixel(px, py) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn flush_count(&self) -> u32 {
        self.flush_count
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(Self::WIDTH as u32, Self::HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..Self::WIDTH as i32).contains(&point.x)
                && (0..Self::HEIGHT as i32).contains(&point.y)
            {
                self.pixels[point.y as usize][point.x as usize] = color.is_on();
            }
        }
        Ok(())
    }
}

impl FlushTarget for Framebuffer {
    fn flush_display(&mut self) {
        self.flush_count += 1;
    }
}
