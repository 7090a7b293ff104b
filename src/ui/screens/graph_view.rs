//! Full-screen temperature trend view.
//!
//! Read-only: renders whatever the process graph has accumulated. Any
//! input returns to the status screen.

use crate::ui::{ScreenEntry, ScreenResult, UiContext};

use super::{fmt_label, BACK_TO_STATUS};

const GRAPH_X: i32 = 20;
const GRAPH_Y: i32 = 18;

pub struct GraphViewScreen {
    pub(crate) next: Option<ScreenEntry>,
    last_commit_drawn: Option<u32>,
}

impl GraphViewScreen {
    pub fn new() -> Self {
        Self {
            next: None,
            last_commit_drawn: None,
        }
    }

    /// Entry hook: reset the redraw cache and the encoder baseline.
    pub fn enter(&mut self, cx: &mut UiContext<'_, '_>) {
        self.last_commit_drawn = None;
        cx.input.reset_position();
    }

    pub fn update(&mut self, cx: &mut UiContext<'_, '_>, force_redraw: bool) -> ScreenResult {
        let turned = cx.input.next_encoder_step().is_some();
        while cx.input.next_encoder_step().is_some() {}
        if turned || cx.input.consume_button_press() {
            self.next = Some(BACK_TO_STATUS);
            return ScreenResult::Finished;
        }

        let commits = cx.graph.commit_count();
        if force_redraw || self.last_commit_drawn != Some(commits) {
            let r = &mut *cx.renderer;
            r.clear();
            r.draw_title("Trend");

            let (lo, hi) = cx.thermostat.limits();
            let hi_label = fmt_label!(8, "{}", hi);
            let lo_label = fmt_label!(8, "{}", lo);
            r.draw_text(0, GRAPH_Y, &hi_label);
            r.draw_text(0, GRAPH_Y + cx.graph.height() - r.line_height(), &lo_label);

            cx.graph.draw(r, GRAPH_X, GRAPH_Y);
            r.flush();
            self.last_commit_drawn = Some(commits);
        }
        ScreenResult::Continue
    }
}

impl Default for GraphViewScreen {
    fn default() -> Self {
        Self::new()
    }
}
