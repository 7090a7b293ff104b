//! Live process screen: countdown, temperature, band, actuator state, and
//! the trend strip.
//!
//! The entry hook starts the ferment run only if none is active — the
//! deadline and the graph belong to the process, not the visit, so
//! navigating away and back never restarts anything. Every new sensor
//! reading feeds the graph's averaging accumulator; one averaged point is
//! committed per configured interval.

use crate::app::events::AppEvent;
use crate::control::Mode;
use crate::ui::{
    ConfirmAction, ConfirmConfig, RunningConfig, ScreenEntry, ScreenResult, UiContext,
};

use super::{fmt_label, BACK_TO_STATUS};

const TEMP_Y: i32 = 14;
const BAND_Y: i32 = 26;
const GRAPH_X: i32 = 14;
const GRAPH_Y: i32 = 40;
const GRAPH_W: usize = 100;
const GRAPH_H: i32 = 22;

pub struct RunningScreen {
    pub(crate) next: Option<ScreenEntry>,
    last_temp_drawn: Option<i32>,
    last_remaining_drawn: Option<u64>,
    last_relays_drawn: Option<(bool, bool)>,
    last_reading_count: u32,
    last_commit_ms: u64,
    last_commit_drawn: u32,
}

impl RunningScreen {
    pub fn new() -> Self {
        Self {
            next: None,
            last_temp_drawn: None,
            last_remaining_drawn: None,
            last_relays_drawn: None,
            last_reading_count: 0,
            last_commit_ms: 0,
            last_commit_drawn: 0,
        }
    }

    /// Entry hook: reset all per-visit caches; start the process if idle.
    pub fn enter(&mut self, cfg: RunningConfig, cx: &mut UiContext<'_, '_>) {
        self.last_temp_drawn = None;
        self.last_remaining_drawn = None;
        self.last_relays_drawn = None;
        self.last_reading_count = cx.sensor.reading_count();
        self.last_commit_ms = cx.now_ms;
        self.last_commit_drawn = 0;
        cx.input.reset_position();

        if !cx.process.is_active() {
            cx.process.start(cx.now_ms, cfg.duration_hours);

            let from = cx.thermostat.mode();
            cx.thermostat.set_mode(cfg.mode, cx.settings, cx.actuators);
            cx.sink.emit(&AppEvent::ModeChanged {
                from,
                to: cfg.mode,
            });

            // Trend spans the whole run; scale it around the active band.
            let (lo, hi) = cx.thermostat.limits();
            cx.graph.configure(
                GRAPH_W,
                GRAPH_H,
                (lo - 5) as f32,
                (hi + 5) as f32,
                true,
            );
            cx.graph.clear();

            cx.sensor.set_slow_polling(false);
            if !cx.sensor.is_polling() {
                cx.sensor.start_polling(cx.bus, cx.now_ms);
            }
        }
    }

    pub fn update(&mut self, cx: &mut UiContext<'_, '_>, force_redraw: bool) -> ScreenResult {
        // The service ends the run on deadline even when another screen is
        // active; here we just notice and leave.
        if !cx.process.is_active() {
            self.next = Some(BACK_TO_STATUS);
            return ScreenResult::Finished;
        }

        if cx.input.consume_button_press() {
            self.next = Some(ScreenEntry::Confirm(ConfirmConfig {
                title: "Stop the run?",
                action: ConfirmAction::StopProcess,
            }));
            return ScreenResult::Finished;
        }
        // Rotation has no function here; keep the baseline clean so stale
        // detents don't leak into the next screen.
        while cx.input.next_encoder_step().is_some() {}

        self.feed_graph(cx);
        self.draw(cx, force_redraw);
        ScreenResult::Continue
    }

    // ── Internal ──────────────────────────────────────────────

    fn feed_graph(&mut self, cx: &mut UiContext<'_, '_>) {
        let count = cx.sensor.reading_count();
        if count != self.last_reading_count {
            self.last_reading_count = count;
            cx.graph.add_value_to_average(cx.sensor.temperature());
        }

        let interval_ms = u64::from(cx.config.graph_commit_interval_secs) * 1000;
        if cx.now_ms.saturating_sub(self.last_commit_ms) >= interval_ms {
            self.last_commit_ms = cx.now_ms;
            let _ = cx.graph.commit_average(cx.sensor.temperature());
        }
    }

    fn draw(&mut self, cx: &mut UiContext<'_, '_>, force: bool) {
        let temp_decis = (cx.sensor.temperature() * 10.0) as i32;
        let remaining_min = cx
            .process
            .remaining_ms(cx.now_ms)
            .unwrap_or(0)
            / 60_000;
        let relays = (cx.thermostat.is_heating(), cx.thermostat.is_cooling());
        let commits = cx.graph.commit_count();
        let mode = cx.thermostat.mode();

        let r = &mut *cx.renderer;
        let mut dirty = false;

        if force {
            r.clear();
            r.draw_title(match mode {
                Mode::Cooling => "Chilling",
                _ => "Fermenting",
            });
            dirty = true;
        }

        if force || self.last_temp_drawn != Some(temp_decis) || self.last_relays_drawn != Some(relays)
        {
            if !force {
                r.clear_region(0, TEMP_Y, r.width(), r.line_height());
            }
            let marker = match relays {
                (true, _) => " HEAT",
                (_, true) => " COOL",
                _ => "",
            };
            let text = fmt_label!(20, "{:.1} \u{00b0}C{}", cx.sensor.temperature(), marker);
            let x = (r.width() - r.text_width(&text)).max(0) / 2;
            r.draw_text(x, TEMP_Y, &text);
            self.last_temp_drawn = Some(temp_decis);
            self.last_relays_drawn = Some(relays);
            dirty = true;
        }

        if force || self.last_remaining_drawn != Some(remaining_min) {
            if !force {
                r.clear_region(0, BAND_Y, r.width(), r.line_height());
            }
            let (lo, hi) = cx.thermostat.limits();
            let text = fmt_label!(
                24,
                "{}..{} \u{00b0}C  {}h{:02}m",
                lo,
                hi,
                remaining_min / 60,
                remaining_min % 60
            );
            let x = (r.width() - r.text_width(&text)).max(0) / 2;
            r.draw_text(x, BAND_Y, &text);
            self.last_remaining_drawn = Some(remaining_min);
            dirty = true;
        }

        if force || self.last_commit_drawn != commits {
            if !force {
                r.clear_region(GRAPH_X, GRAPH_Y, GRAPH_W as i32, GRAPH_H);
            }
            cx.graph.draw(r, GRAPH_X, GRAPH_Y);
            self.last_commit_drawn = commits;
            dirty = true;
        }

        if dirty {
            r.flush();
        }
    }
}

impl Default for RunningScreen {
    fn default() -> Self {
        Self::new()
    }
}
