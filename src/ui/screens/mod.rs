//! Concrete screens.
//!
//! Shared conventions: the entry hook resets every per-visit field; updates
//! drain input first, then redraw only the sub-regions whose backing value
//! changed (each screen keeps "last drawn" caches — redraw and number
//! formatting are the most expensive work per tick).

pub mod adjust;
pub mod confirm;
pub mod graph_view;
pub mod running;
pub mod status;

use crate::ui::{AdjustConfig, ScreenEntry};

/// Chained band edit: lower limit first, then the upper limit, then back to
/// status. The same adjust screen object serves both visits with different
/// successors via the `followup` links.
pub const ADJUST_HEAT_UPPER: AdjustConfig = AdjustConfig {
    title: "Heating band\nupper limit",
    setting_key: crate::config::keys::HEAT_UPPER,
    default: crate::config::DEFAULT_HEAT_UPPER_C,
    min: 5,
    max: 45,
    unit: "\u{00b0}C",
    followup: None,
};

pub const ADJUST_HEAT_LOWER: AdjustConfig = AdjustConfig {
    title: "Heating band\nlower limit",
    setting_key: crate::config::keys::HEAT_LOWER,
    default: crate::config::DEFAULT_HEAT_LOWER_C,
    min: 5,
    max: 45,
    unit: "\u{00b0}C",
    followup: Some(&ADJUST_HEAT_UPPER),
};

/// Format helper: `write!` into a bounded string, discarding overflow (a
/// truncated label beats a panic in the render path).
macro_rules! fmt_label {
    ($cap:literal, $($arg:tt)*) => {{
        let mut s: heapless::String<$cap> = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut s, format_args!($($arg)*));
        s
    }};
}
pub(crate) use fmt_label;

/// Successor used when a screen simply returns home.
pub(crate) const BACK_TO_STATUS: ScreenEntry = ScreenEntry::Status;
