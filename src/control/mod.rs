//! Temperature control — operating mode, band controller, and the
//! process-scoped run state.

pub mod hysteresis;

use serde::Serialize;

/// Chamber operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// No control; both actuators held off.
    Off,
    /// Maintain the heating band (heater only).
    Heating,
    /// Maintain the cooling band (cooler only).
    Cooling,
}

/// State of the active ferment run.
///
/// This lives outside the screens so that navigating away from and back to
/// the running screen never restarts the run — screen entry hooks reset
/// per-visit state only, while the deadline belongs to the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct FermentProcess {
    deadline_ms: Option<u64>,
}

impl FermentProcess {
    pub fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Begin a run ending `duration_hours` from `now_ms`.
    pub fn start(&mut self, now_ms: u64, duration_hours: u16) {
        self.deadline_ms = Some(now_ms + u64::from(duration_hours) * 3_600_000);
    }

    /// End the run (completion or early stop).
    pub fn stop(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Whether the deadline has passed. `false` when no run is active.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|d| now_ms >= d)
    }

    /// Milliseconds until the deadline (zero once passed).
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.map(|d| d.saturating_sub(now_ms))
    }
}
