//! Screen navigation state machine.
//!
//! Each UI mode is one long-lived screen struct owning its input handling,
//! partial-redraw caches, and rendering. The machine holds the active
//! screen and drives the shared lifecycle:
//!
//! ```text
//! activate(entry):  enter(config)  →  update(force_redraw = true)
//! each tick:        update(false)
//! on Finished:      take the screen's `next` entry → activate it,
//!                   or halt navigation if none was assigned
//! ```
//!
//! Entry configuration is a tagged [`ScreenEntry`] variant per screen kind,
//! so every screen gets exactly the parameters it needs through one uniform
//! hook. A screen's successor is a runtime-assigned [`ScreenEntry`] slot —
//! set by the screen itself before finishing, through chained
//! [`AdjustConfig::followup`] links, or externally via
//! [`ScreenStateMachine::set_next`] — which lets the same screen object be
//! reused with different successors across visits.

pub mod screens;

use log::warn;
use serde::Serialize;

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink, Renderer, SensorBus, SettingsPort};
use crate::config::SystemConfig;
use crate::control::hysteresis::HysteresisController;
use crate::control::{FermentProcess, Mode};
use crate::graph::WindowedGraphBuffer;
use crate::input::DebouncedInput;
use crate::sensors::poller::SensorPoller;

use self::screens::adjust::AdjustValueScreen;
use self::screens::confirm::ConfirmScreen;
use self::screens::graph_view::GraphViewScreen;
use self::screens::running::RunningScreen;
use self::screens::status::StatusScreen;

// ---------------------------------------------------------------------------
// Identity & entry configuration
// ---------------------------------------------------------------------------

/// Identity of each screen in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScreenId {
    Status,
    Adjust,
    Confirm,
    Running,
    Graph,
}

/// Per-visit entry configuration, one variant per screen kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenEntry {
    Status,
    Adjust(AdjustConfig),
    Confirm(ConfirmConfig),
    Running(RunningConfig),
    Graph,
}

impl ScreenEntry {
    pub fn id(&self) -> ScreenId {
        match self {
            Self::Status => ScreenId::Status,
            Self::Adjust(_) => ScreenId::Adjust,
            Self::Confirm(_) => ScreenId::Confirm,
            Self::Running(_) => ScreenId::Running,
            Self::Graph => ScreenId::Graph,
        }
    }
}

/// Configuration for the generic value-adjustment screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustConfig {
    /// Title block; embedded newlines wrap.
    pub title: &'static str,
    /// Settings key the committed value is persisted under.
    pub setting_key: &'static str,
    /// Default when the key has no stored value.
    pub default: i32,
    pub min: i32,
    pub max: i32,
    /// Unit suffix drawn after the value.
    pub unit: &'static str,
    /// Next adjustment in a chained edit, if any; otherwise the screen
    /// returns to status. This is how one screen object serves several
    /// values with different successors.
    pub followup: Option<&'static AdjustConfig>,
}

/// Configuration for the confirm screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfirmConfig {
    pub title: &'static str,
    pub action: ConfirmAction,
}

/// What a confirmed selection performs. An explicit action value — the
/// dispatch lives in the confirm screen's update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmAction {
    /// Begin a run in the given mode.
    StartProcess { mode: Mode },
    /// Stop the active run.
    StopProcess,
}

/// Configuration for the running (process) screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningConfig {
    pub mode: Mode,
    pub duration_hours: u16,
}

/// What a screen's `update` tells the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenResult {
    /// Stay active.
    Continue,
    /// Done — switch to the assigned successor.
    Finished,
}

// ---------------------------------------------------------------------------
// Per-tick context
// ---------------------------------------------------------------------------

/// Everything a screen may touch during `enter`/`update`, borrowed for one
/// tick. Ports are `dyn` so screens stay monomorphization-free and the
/// composition root decides the concrete adapters.
pub struct UiContext<'a, 'raw> {
    pub now_ms: u64,
    pub config: &'a SystemConfig,
    pub input: &'a mut DebouncedInput<'raw>,
    pub sensor: &'a mut SensorPoller,
    pub bus: &'a mut dyn SensorBus,
    pub thermostat: &'a mut HysteresisController,
    pub process: &'a mut FermentProcess,
    pub graph: &'a mut WindowedGraphBuffer,
    pub renderer: &'a mut dyn Renderer,
    pub settings: &'a mut dyn SettingsPort,
    pub actuators: &'a mut dyn ActuatorPort,
    pub sink: &'a mut dyn EventSink,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Owns every screen and the active-screen pointer.
pub struct ScreenStateMachine {
    status: StatusScreen,
    adjust: AdjustValueScreen,
    confirm: ConfirmScreen,
    running: RunningScreen,
    graph_view: GraphViewScreen,
    active: Option<ScreenId>,
}

impl ScreenStateMachine {
    pub fn new() -> Self {
        Self {
            status: StatusScreen::new(),
            adjust: AdjustValueScreen::new(),
            confirm: ConfirmScreen::new(),
            running: RunningScreen::new(),
            graph_view: GraphViewScreen::new(),
            active: None,
        }
    }

    /// Make `entry`'s screen active: run its entry hook, then force one full
    /// render. The entry hook resets all per-visit state.
    pub fn activate(&mut self, entry: ScreenEntry, cx: &mut UiContext<'_, '_>) {
        let to = entry.id();
        if let Some(from) = self.active {
            cx.sink.emit(&AppEvent::ScreenChanged { from, to });
        }
        match entry {
            ScreenEntry::Status => self.status.enter(cx),
            ScreenEntry::Adjust(cfg) => self.adjust.enter(cfg, cx),
            ScreenEntry::Confirm(cfg) => self.confirm.enter(cfg, cx),
            ScreenEntry::Running(cfg) => self.running.enter(cfg, cx),
            ScreenEntry::Graph => self.graph_view.enter(cx),
        }
        self.active = Some(to);
        let _ = self.update_screen(to, cx, true);
    }

    /// Drive the active screen by one tick, transitioning when it finishes.
    pub fn tick(&mut self, cx: &mut UiContext<'_, '_>) {
        let Some(id) = self.active else {
            return; // Navigation halted (or never started).
        };
        if self.update_screen(id, cx, false) == ScreenResult::Finished {
            match self.take_next(id) {
                Some(entry) => self.activate(entry, cx),
                None => {
                    // Configuration error, not a crash: the loop keeps
                    // servicing input/sensors, but the UI stops advancing.
                    warn!("Screen {:?} finished with no successor; navigation halted", id);
                    self.active = None;
                }
            }
        }
    }

    /// Assign `id`'s successor from outside (startup wiring, command
    /// handling). Screens set their own slots internally as they finish.
    pub fn set_next(&mut self, id: ScreenId, entry: ScreenEntry) {
        *self.next_slot(id) = Some(entry);
    }

    pub fn active(&self) -> Option<ScreenId> {
        self.active
    }

    // ── Internal ──────────────────────────────────────────────

    fn update_screen(
        &mut self,
        id: ScreenId,
        cx: &mut UiContext<'_, '_>,
        force_redraw: bool,
    ) -> ScreenResult {
        match id {
            ScreenId::Status => self.status.update(cx, force_redraw),
            ScreenId::Adjust => self.adjust.update(cx, force_redraw),
            ScreenId::Confirm => self.confirm.update(cx, force_redraw),
            ScreenId::Running => self.running.update(cx, force_redraw),
            ScreenId::Graph => self.graph_view.update(cx, force_redraw),
        }
    }

    fn take_next(&mut self, id: ScreenId) -> Option<ScreenEntry> {
        self.next_slot(id).take()
    }

    fn next_slot(&mut self, id: ScreenId) -> &mut Option<ScreenEntry> {
        match id {
            ScreenId::Status => &mut self.status.next,
            ScreenId::Adjust => &mut self.adjust.next,
            ScreenId::Confirm => &mut self.confirm.next,
            ScreenId::Running => &mut self.running.next,
            ScreenId::Graph => &mut self.graph_view.next,
        }
    }
}

impl Default for ScreenStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
