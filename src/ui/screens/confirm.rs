//! Cancel/confirm screen with an explicit action value.
//!
//! The encoder toggles between the two buttons (Cancel is the entry default
//! so an accidental press is harmless); the button press dispatches on the
//! configured [`ConfirmAction`].

use crate::app::events::AppEvent;
use crate::control::Mode;
use crate::ui::{
    ConfirmAction, ConfirmConfig, RunningConfig, ScreenEntry, ScreenResult, UiContext,
};

use super::BACK_TO_STATUS;

pub struct ConfirmScreen {
    pub(crate) next: Option<ScreenEntry>,
    cfg: ConfirmConfig,
    confirm_selected: bool,
    last_selection_drawn: Option<bool>,
}

impl ConfirmScreen {
    pub fn new() -> Self {
        Self {
            next: None,
            cfg: ConfirmConfig {
                title: "",
                action: ConfirmAction::StopProcess,
            },
            confirm_selected: false,
            last_selection_drawn: None,
        }
    }

    /// Entry hook: store the question, select Cancel, reset caches.
    pub fn enter(&mut self, cfg: ConfirmConfig, cx: &mut UiContext<'_, '_>) {
        self.cfg = cfg;
        self.confirm_selected = false;
        self.last_selection_drawn = None;
        cx.input.reset_position();
    }

    pub fn update(&mut self, cx: &mut UiContext<'_, '_>, force_redraw: bool) -> ScreenResult {
        // Any step toggles between the two buttons.
        while cx.input.next_encoder_step().is_some() {
            self.confirm_selected = !self.confirm_selected;
        }

        if cx.input.consume_button_press() {
            self.next = Some(if self.confirm_selected {
                self.apply(cx)
            } else {
                self.cancel_target(cx)
            });
            return ScreenResult::Finished;
        }

        self.draw(cx, force_redraw);
        ScreenResult::Continue
    }

    // ── Internal ──────────────────────────────────────────────

    /// Perform the confirmed action; returns the follow-on screen.
    fn apply(&self, cx: &mut UiContext<'_, '_>) -> ScreenEntry {
        match self.cfg.action {
            ConfirmAction::StartProcess { mode } => {
                // The running screen's entry hook starts the process, so the
                // web-command path and this one share a single start site.
                let hours = cx
                    .config
                    .ferment_duration_hours;
                ScreenEntry::Running(RunningConfig {
                    mode,
                    duration_hours: hours,
                })
            }
            ConfirmAction::StopProcess => {
                let from = cx.thermostat.mode();
                cx.thermostat.set_mode(Mode::Off, cx.settings, cx.actuators);
                cx.process.stop();
                cx.sensor.set_slow_polling(true);
                cx.sink.emit(&AppEvent::ModeChanged {
                    from,
                    to: Mode::Off,
                });
                cx.sink.emit(&AppEvent::ProcessEnded { completed: false });
                BACK_TO_STATUS
            }
        }
    }

    /// Cancelling a stop returns to the live run; cancelling anything else
    /// goes home.
    fn cancel_target(&self, cx: &UiContext<'_, '_>) -> ScreenEntry {
        match self.cfg.action {
            ConfirmAction::StopProcess if cx.process.is_active() => {
                ScreenEntry::Running(RunningConfig {
                    mode: cx.thermostat.mode(),
                    duration_hours: 0,
                })
            }
            _ => BACK_TO_STATUS,
        }
    }

    fn draw(&mut self, cx: &mut UiContext<'_, '_>, force: bool) {
        let r = &mut *cx.renderer;

        if force {
            r.clear();
            r.draw_title(self.cfg.title);
        }

        if force || self.last_selection_drawn != Some(self.confirm_selected) {
            if !force {
                let bar_h = r.line_height() + 3;
                r.clear_region(0, r.height() - bar_h, r.width(), bar_h);
            }
            r.draw_button_bar(&["Cancel", "OK"], usize::from(self.confirm_selected));
            self.last_selection_drawn = Some(self.confirm_selected);
            r.flush();
        }
    }
}

impl Default for ConfirmScreen {
    fn default() -> Self {
        Self::new()
    }
}
