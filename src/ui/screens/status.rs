//! Home screen: temperature readout, current mode, and the action bar.

use crate::control::Mode;
use crate::sensors::poller::PollState;
use crate::ui::{
    ConfirmAction, ConfirmConfig, RunningConfig, ScreenEntry, ScreenResult, UiContext,
};
use crate::input::EncoderStep;

use super::{fmt_label, ADJUST_HEAT_LOWER};

const LABELS: [&str; 4] = ["Ferment", "Chill", "Set", "Graph"];

const TEMP_Y: i32 = 18;
const MODE_Y: i32 = 32;

pub struct StatusScreen {
    pub(crate) next: Option<ScreenEntry>,
    selection: usize,
    last_temp_drawn: Option<i32>,
    last_mode_drawn: Option<Mode>,
    last_selection_drawn: Option<usize>,
}

impl StatusScreen {
    pub fn new() -> Self {
        Self {
            next: None,
            selection: 0,
            last_temp_drawn: None,
            last_mode_drawn: None,
            last_selection_drawn: None,
        }
    }

    /// Entry hook: reset selection and redraw caches, re-baseline the
    /// encoder, and make sure the sensor is polling (slowly — the idle
    /// screen only glances at the value). Re-entering here also restarts a
    /// poller that latched Error, which is the sole recovery path.
    pub fn enter(&mut self, cx: &mut UiContext<'_, '_>) {
        self.selection = 0;
        self.last_temp_drawn = None;
        self.last_mode_drawn = None;
        self.last_selection_drawn = None;
        cx.input.reset_position();

        if !cx.sensor.is_polling() {
            // Start before slowing down so the very first conversion stays
            // on the fast 9-bit path.
            cx.sensor.start_polling(cx.bus, cx.now_ms);
        }
        cx.sensor.set_slow_polling(true);
    }

    pub fn update(&mut self, cx: &mut UiContext<'_, '_>, force_redraw: bool) -> ScreenResult {
        while let Some(step) = cx.input.next_encoder_step() {
            self.selection = match step {
                EncoderStep::Clockwise => (self.selection + 1) % LABELS.len(),
                EncoderStep::CounterClockwise => {
                    (self.selection + LABELS.len() - 1) % LABELS.len()
                }
            };
        }

        if cx.input.consume_button_press() {
            self.next = Some(self.dispatch(cx));
            return ScreenResult::Finished;
        }

        self.draw(cx, force_redraw);
        ScreenResult::Continue
    }

    // ── Internal ──────────────────────────────────────────────

    fn dispatch(&self, cx: &UiContext<'_, '_>) -> ScreenEntry {
        match self.selection {
            0 | 1 => {
                let mode = if self.selection == 0 {
                    Mode::Heating
                } else {
                    Mode::Cooling
                };
                if cx.process.is_active() {
                    // A run is live — just go watch it.
                    ScreenEntry::Running(RunningConfig {
                        mode: cx.thermostat.mode(),
                        duration_hours: 0,
                    })
                } else {
                    ScreenEntry::Confirm(ConfirmConfig {
                        title: if mode == Mode::Heating {
                            "Start\nfermentation?"
                        } else {
                            "Start\ncold crash?"
                        },
                        action: ConfirmAction::StartProcess { mode },
                    })
                }
            }
            2 => ScreenEntry::Adjust(ADJUST_HEAT_LOWER),
            _ => ScreenEntry::Graph,
        }
    }

    fn draw(&mut self, cx: &mut UiContext<'_, '_>, force: bool) {
        let r = &mut *cx.renderer;
        let temp_decis = (cx.sensor.temperature() * 10.0) as i32;
        let mode = cx.thermostat.mode();

        let mut dirty = false;

        if force {
            r.clear();
            r.draw_title("FermBox");
            dirty = true;
        }

        if force || self.last_temp_drawn != Some(temp_decis) {
            if !force {
                r.clear_region(0, TEMP_Y, r.width(), r.line_height());
            }
            let suffix = if cx.sensor.state() == PollState::Error {
                " !"
            } else {
                ""
            };
            let text = fmt_label!(16, "{:.1} \u{00b0}C{}", cx.sensor.temperature(), suffix);
            let x = (r.width() - r.text_width(&text)).max(0) / 2;
            r.draw_text(x, TEMP_Y, &text);
            self.last_temp_drawn = Some(temp_decis);
            dirty = true;
        }

        if force || self.last_mode_drawn != Some(mode) {
            if !force {
                r.clear_region(0, MODE_Y, r.width(), r.line_height());
            }
            let text = match mode {
                Mode::Off => fmt_label!(24, "Idle"),
                Mode::Heating => {
                    let (lo, hi) = cx.thermostat.limits();
                    fmt_label!(24, "Heating {}..{}", lo, hi)
                }
                Mode::Cooling => {
                    let (lo, hi) = cx.thermostat.limits();
                    fmt_label!(24, "Cooling {}..{}", lo, hi)
                }
            };
            let x = (r.width() - r.text_width(&text)).max(0) / 2;
            r.draw_text(x, MODE_Y, &text);
            self.last_mode_drawn = Some(mode);
            dirty = true;
        }

        if force || self.last_selection_drawn != Some(self.selection) {
            if !force {
                let bar_h = r.line_height() + 3;
                r.clear_region(0, r.height() - bar_h, r.width(), bar_h);
            }
            r.draw_button_bar(&LABELS, self.selection);
            self.last_selection_drawn = Some(self.selection);
            dirty = true;
        }

        if dirty {
            r.flush();
        }
    }
}

impl Default for StatusScreen {
    fn default() -> Self {
        Self::new()
    }
}
