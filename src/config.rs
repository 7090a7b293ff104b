//! System configuration parameters
//!
//! All tunable parameters for the FermBox chamber. Values can be overridden
//! via NVS; the band limits are additionally editable from the on-device UI
//! and re-read whenever the control mode is set.

use serde::{Deserialize, Serialize};

use crate::app::ports::SettingsPort;

/// NVS keys for individually persisted settings (≤15 chars per NVS rules).
pub mod keys {
    /// Heating band lower limit (°C).
    pub const HEAT_LOWER: &str = "heat_lo";
    /// Heating band upper limit (°C).
    pub const HEAT_UPPER: &str = "heat_hi";
    /// Cooling band lower limit (°C).
    pub const COOL_LOWER: &str = "cool_lo";
    /// Cooling band upper limit (°C).
    pub const COOL_UPPER: &str = "cool_hi";
    /// Ferment run duration (hours).
    pub const FERMENT_HOURS: &str = "ferm_hrs";
    /// Graph trend commit interval (seconds).
    pub const GRAPH_INTERVAL: &str = "graph_int";
}

// --- Fallback band limits (used when settings storage has no value) ---

/// Default heating band: bread proofing / mesophilic fermentation.
pub const DEFAULT_HEAT_LOWER_C: i32 = 23;
pub const DEFAULT_HEAT_UPPER_C: i32 = 32;

/// Default cooling band: lagering / cold crash.
pub const DEFAULT_COOL_LOWER_C: i32 = 2;
pub const DEFAULT_COOL_UPPER_C: i32 = 6;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Band limits ---
    /// Heating band lower limit (°C) — heater engages below this.
    pub heat_lower_limit_c: i32,
    /// Heating band upper limit (°C) — heater releases above this.
    pub heat_upper_limit_c: i32,
    /// Cooling band lower limit (°C) — cooler releases below this.
    pub cool_lower_limit_c: i32,
    /// Cooling band upper limit (°C) — cooler engages above this.
    pub cool_upper_limit_c: i32,

    // --- Process ---
    /// Default ferment run duration (hours).
    pub ferment_duration_hours: u16,

    // --- Timing ---
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,
    /// Trend graph averaging-commit interval (seconds).
    pub graph_commit_interval_secs: u16,
    /// Status snapshot report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            heat_lower_limit_c: DEFAULT_HEAT_LOWER_C,
            heat_upper_limit_c: DEFAULT_HEAT_UPPER_C,
            cool_lower_limit_c: DEFAULT_COOL_LOWER_C,
            cool_upper_limit_c: DEFAULT_COOL_UPPER_C,

            ferment_duration_hours: 48,

            control_loop_interval_ms: 10, // 100 Hz — encoder responsiveness
            graph_commit_interval_secs: 10,
            telemetry_interval_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Build a config from persisted settings, falling back to defaults for
    /// any missing key. Never fails — a dead settings backend yields the
    /// compiled-in defaults.
    pub fn load(settings: &dyn SettingsPort) -> Self {
        let d = Self::default();
        Self {
            heat_lower_limit_c: settings.get_i32(keys::HEAT_LOWER, d.heat_lower_limit_c),
            heat_upper_limit_c: settings.get_i32(keys::HEAT_UPPER, d.heat_upper_limit_c),
            cool_lower_limit_c: settings.get_i32(keys::COOL_LOWER, d.cool_lower_limit_c),
            cool_upper_limit_c: settings.get_i32(keys::COOL_UPPER, d.cool_upper_limit_c),
            ferment_duration_hours: settings
                .get_i32(keys::FERMENT_HOURS, i32::from(d.ferment_duration_hours))
                .clamp(1, 500) as u16,
            graph_commit_interval_secs: settings
                .get_i32(keys::GRAPH_INTERVAL, i32::from(d.graph_commit_interval_secs))
                .clamp(1, 3600) as u16,
            ..d
        }
    }
}
