//! Windowed trend graph buffer.
//!
//! A fixed-capacity circular buffer of averaged temperature samples. The
//! sensor produces a reading roughly every second, but the trend spans
//! minutes to days — so readings accumulate in a box-car average and exactly
//! one point enters the buffer per [`commit_average`] call. The averaging
//! accumulator is deliberately decoupled from the buffer: the sampling
//! cadence and the commit cadence are independent.
//!
//! Unwritten slots hold `f32::NAN` and are skipped when drawing, so a
//! freshly cleared graph renders as an empty frame that fills left to right.
//!
//! [`commit_average`]: WindowedGraphBuffer::commit_average

use crate::app::ports::Renderer;

/// Hard cap on the number of stored points (also the widest drawable graph
/// on the 128-px panel).
pub const GRAPH_MAX_POINTS: usize = 128;

/// Sentinel for a slot that has never been written.
const NO_SAMPLE: f32 = f32::NAN;

/// Circular buffer of averaged samples plus its drawing parameters.
pub struct WindowedGraphBuffer {
    values: [f32; GRAPH_MAX_POINTS],
    width: usize,
    height: i32,
    min_value: f32,
    max_value: f32,
    draw_axes: bool,
    /// Next slot to overwrite (== the oldest slot once the buffer wrapped).
    write_index: usize,
    // Averaging accumulator, reset on every commit.
    avg_sum: f32,
    avg_count: u32,
    /// Total commits/points written, for consumer redraw caching.
    commit_count: u32,
}

impl WindowedGraphBuffer {
    pub fn new() -> Self {
        Self {
            values: [NO_SAMPLE; GRAPH_MAX_POINTS],
            width: GRAPH_MAX_POINTS,
            height: 32,
            min_value: 0.0,
            max_value: 40.0,
            draw_axes: false,
            write_index: 0,
            avg_sum: 0.0,
            avg_count: 0,
            commit_count: 0,
        }
    }

    /// Reset and resize. `width` is clamped to [`GRAPH_MAX_POINTS`];
    /// `min_value..max_value` maps onto `height` pixel rows.
    pub fn configure(
        &mut self,
        width: usize,
        height: i32,
        min_value: f32,
        max_value: f32,
        draw_axes: bool,
    ) {
        self.width = width.clamp(1, GRAPH_MAX_POINTS);
        self.height = height.max(2);
        self.min_value = min_value;
        self.max_value = if max_value > min_value {
            max_value
        } else {
            min_value + 1.0
        };
        self.draw_axes = draw_axes;
        self.clear();
    }

    /// Reset every slot to "no data yet" and drop the pending average.
    pub fn clear(&mut self) {
        self.values = [NO_SAMPLE; GRAPH_MAX_POINTS];
        self.write_index = 0;
        self.avg_sum = 0.0;
        self.avg_count = 0;
        self.commit_count = 0;
    }

    /// Feed one raw sample into the averaging accumulator.
    pub fn add_value_to_average(&mut self, value: f32) {
        self.avg_sum += value;
        self.avg_count += 1;
    }

    /// Close the current averaging window: write its mean as one point and
    /// reset the accumulator. An empty window writes `default_if_empty`.
    /// Returns the committed value.
    pub fn commit_average(&mut self, default_if_empty: f32) -> f32 {
        let value = if self.avg_count == 0 {
            default_if_empty
        } else {
            self.avg_sum / self.avg_count as f32
        };
        self.avg_sum = 0.0;
        self.avg_count = 0;
        self.add_point(value);
        value
    }

    /// Write one point directly, bypassing the average. The oldest point is
    /// overwritten once the buffer is full.
    pub fn add_point(&mut self, value: f32) {
        self.values[self.write_index] = value;
        self.write_index = (self.write_index + 1) % self.width;
        self.commit_count = self.commit_count.wrapping_add(1);
    }

    /// Sample at `index` in insertion order (0 = oldest). `None` for slots
    /// never written.
    pub fn value_at(&self, index: usize) -> Option<f32> {
        if index >= self.width {
            return None;
        }
        let v = self.values[(self.write_index + index) % self.width];
        if v.is_nan() { None } else { Some(v) }
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.values[..self.width].iter().filter(|v| !v.is_nan()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Points written since the last `clear`, for redraw caching.
    pub fn commit_count(&self) -> u32 {
        self.commit_count
    }

    /// Draw the trend with its top-left corner at `(x, y)`: one column per
    /// slot, oldest on the left, values scaled linearly into the configured
    /// height. Columns that were never written are skipped.
    pub fn draw(&self, r: &mut dyn Renderer, x: i32, y: i32) {
        if self.draw_axes {
            r.draw_line(x, y, x, y + self.height - 1);
            r.draw_line(x, y + self.height - 1, x + self.width as i32 - 1, y + self.height - 1);
        }
        for col in 0..self.width {
            let Some(value) = self.value_at(col) else {
                continue;
            };
            let span = self.max_value - self.min_value;
            let norm = ((value - self.min_value) / span).clamp(0.0, 1.0);
            let py = y + self.height - 1 - (norm * (self.height - 1) as f32) as i32;
            r.draw_pixel(x + col as i32, py);
        }
    }
}

impl Default for WindowedGraphBuffer {
    fn default() -> Self {
        Self::new()
    }
}
