//! Outbound application events.
//!
//! The service and the screen machine emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, cache for the web front
//! end's status endpoint, etc.

use serde::Serialize;

use crate::control::Mode;
use crate::ui::ScreenId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries the initial screen).
    Started(ScreenId),

    /// The control mode changed.
    ModeChanged { from: Mode, to: Mode },

    /// The active screen changed.
    ScreenChanged { from: ScreenId, to: ScreenId },

    /// The sensor poller entered its error state; the last good reading
    /// stays in effect for display and control.
    SensorFault,

    /// A ferment run finished (deadline reached) or was stopped early.
    ProcessEnded { completed: bool },

    /// A settings value was persisted from the UI.
    TargetSaved { key: &'static str, value: i32 },

    /// Periodic status snapshot.
    Status(StatusSnapshot),
}

/// Point-in-time system status, suitable for logging or serialisation to
/// the web front end.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub mode: Mode,
    pub temperature_c: f32,
    pub lower_limit_c: i32,
    pub upper_limit_c: i32,
    pub heater_on: bool,
    pub cooler_on: bool,
    pub sensor_ok: bool,
    pub active_screen: Option<ScreenId>,
    /// Milliseconds until the ferment deadline, if a run is active.
    pub remaining_ms: Option<u64>,
}
