//! Generic value-adjustment screen.
//!
//! One screen object serves every editable number: the entry config names
//! the title, settings key, range, and unit. Turning the encoder changes
//! the value (clamped), pressing the button persists it and moves on —
//! either to the chained follow-up edit or back to status.

use log::warn;

use crate::app::events::AppEvent;
use crate::input::EncoderStep;
use crate::ui::{AdjustConfig, ScreenEntry, ScreenResult, UiContext};

use super::{fmt_label, BACK_TO_STATUS};

const VALUE_Y: i32 = 34;

pub struct AdjustValueScreen {
    pub(crate) next: Option<ScreenEntry>,
    cfg: AdjustConfig,
    value: i32,
    last_value_drawn: Option<i32>,
}

impl AdjustValueScreen {
    pub fn new() -> Self {
        Self {
            next: None,
            cfg: super::ADJUST_HEAT_LOWER,
            value: 0,
            last_value_drawn: None,
        }
    }

    /// Entry hook: load the stored value (or the config default) and reset
    /// the edit state. Nothing leaks from the previous visit.
    pub fn enter(&mut self, cfg: AdjustConfig, cx: &mut UiContext<'_, '_>) {
        self.cfg = cfg;
        self.value = cx
            .settings
            .get_i32(cfg.setting_key, cfg.default)
            .clamp(cfg.min, cfg.max);
        self.last_value_drawn = None;
        cx.input.reset_position();
    }

    pub fn update(&mut self, cx: &mut UiContext<'_, '_>, force_redraw: bool) -> ScreenResult {
        while let Some(step) = cx.input.next_encoder_step() {
            self.value = match step {
                EncoderStep::Clockwise => (self.value + 1).min(self.cfg.max),
                EncoderStep::CounterClockwise => (self.value - 1).max(self.cfg.min),
            };
        }

        if cx.input.consume_button_press() {
            self.commit(cx);
            return ScreenResult::Finished;
        }

        self.draw(cx, force_redraw);
        ScreenResult::Continue
    }

    // ── Internal ──────────────────────────────────────────────

    fn commit(&mut self, cx: &mut UiContext<'_, '_>) {
        if let Err(e) = cx.settings.set_i32(self.cfg.setting_key, self.value) {
            // Losing one saved value must not take down the UI.
            warn!("Failed to persist '{}': {e}", self.cfg.setting_key);
        } else {
            cx.sink.emit(&AppEvent::TargetSaved {
                key: self.cfg.setting_key,
                value: self.value,
            });
        }
        // A band edit takes effect on a live mode without a mode change.
        cx.thermostat.refresh_limits(cx.settings);

        self.next = Some(match self.cfg.followup {
            Some(follow) => ScreenEntry::Adjust(*follow),
            None => BACK_TO_STATUS,
        });
    }

    fn draw(&mut self, cx: &mut UiContext<'_, '_>, force: bool) {
        let r = &mut *cx.renderer;

        if force {
            r.clear();
            r.draw_title(self.cfg.title);
        }

        if force || self.last_value_drawn != Some(self.value) {
            if !force {
                r.clear_region(0, VALUE_Y, r.width(), r.line_height());
            }
            let text = fmt_label!(16, "{} {}", self.value, self.cfg.unit);
            let x = (r.width() - r.text_width(&text)).max(0) / 2;
            r.draw_text(x, VALUE_Y, &text);
            r.draw_button_bar(&["OK"], 0);
            self.last_value_drawn = Some(self.value);
            r.flush();
        }
    }
}

impl Default for AdjustValueScreen {
    fn default() -> Self {
        Self::new()
    }
}
