//! Screen navigation tests driven through the raw input atomics — the same
//! path the GPIO ISRs use in production.

use fermbox::app::commands::CommandConsumer;
use fermbox::config::keys;
use fermbox::control::Mode;
use fermbox::input::{RawInputShared, DEBOUNCE_WINDOW_MS};
use fermbox::ui::ScreenId;

use crate::rig_with_queue;
use crate::Rig;

/// One debounced press-and-release, advancing the rig through the window.
fn press(raw: &RawInputShared, rig: &mut Rig<'_>, rx: &mut CommandConsumer<'_>) {
    raw.isr_set_button_level(false);
    rig.tick_after(10, rx);
    rig.tick_after(DEBOUNCE_WINDOW_MS, rx); // press accepted + consumed here
    raw.isr_set_button_level(true);
    rig.tick_after(10, rx);
    rig.tick_after(DEBOUNCE_WINDOW_MS, rx);
}

/// Rotate the encoder by |steps| detents (positive = clockwise).
fn rotate(raw: &RawInputShared, rig: &mut Rig<'_>, rx: &mut CommandConsumer<'_>, steps: i32) {
    for _ in 0..steps.abs() {
        raw.isr_encoder_edge(true, steps > 0);
    }
    rig.tick_after(10, rx);
}

#[test]
fn set_flow_chains_lower_then_upper_adjustment() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();

    // "Set" is the third action on the bar.
    rotate(&raw, &mut rig, &mut rx, 2);
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Adjust));

    // Nudge the lower limit 23 → 26 and commit.
    rotate(&raw, &mut rig, &mut rx, 3);
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.settings.ints[keys::HEAT_LOWER], 26);

    // Same screen object, different successor: now editing the upper limit.
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Adjust));
    rotate(&raw, &mut rig, &mut rx, -2);
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.settings.ints[keys::HEAT_UPPER], 30);

    assert_eq!(rig.service.active_screen(), Some(ScreenId::Status));
}

#[test]
fn adjust_entry_hook_loads_stored_value_each_visit() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.settings.ints.insert(keys::HEAT_LOWER.into(), 30);
    rig.start();

    rotate(&raw, &mut rig, &mut rx, 2);
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Adjust));

    // Committing untouched re-persists the stored 30, not a stale default
    // from some earlier visit.
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.settings.ints[keys::HEAT_LOWER], 30);
}

#[test]
fn transition_forces_exactly_one_full_redraw() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();

    rotate(&raw, &mut rig, &mut rx, 2);
    let clears_before = rig.renderer.clears;
    let screen_changes_before = rig.sink.count_screen_changes();

    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Adjust));

    // Entry hook ran once → exactly one forced full render.
    assert_eq!(rig.renderer.clears, clears_before + 1);
    assert_eq!(rig.sink.count_screen_changes(), screen_changes_before + 1);
}

#[test]
fn ferment_flow_needs_explicit_confirmation() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.bus.temperature_c = 18.0;
    rig.start();

    // "Ferment" is the default selection.
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Confirm));
    assert_eq!(rig.service.mode(), Mode::Off, "nothing runs yet");

    // Cancel is the safe default — pressing immediately backs out.
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Status));
    assert_eq!(rig.service.mode(), Mode::Off);
    assert!(!rig.service.process_active());

    // This time select OK and confirm.
    press(&raw, &mut rig, &mut rx);
    rotate(&raw, &mut rig, &mut rx, 1);
    press(&raw, &mut rig, &mut rx);

    assert_eq!(rig.service.active_screen(), Some(ScreenId::Running));
    assert_eq!(rig.service.mode(), Mode::Heating);
    assert!(rig.service.process_active());
    rig.tick_after(10, &mut rx);
    assert!(rig.hw.heater, "18 °C below band — heating begins");
}

#[test]
fn stop_confirm_cancel_resumes_the_run() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.bus.temperature_c = 18.0;
    rig.start();

    // Start a run through the UI.
    press(&raw, &mut rig, &mut rx);
    rotate(&raw, &mut rig, &mut rx, 1);
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Running));

    let status = rig.service.build_status(rig.now_ms, &rig.hw);
    let remaining_at_start = status.remaining_ms.unwrap();

    // Button on the running screen asks before stopping.
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Confirm));
    assert!(rig.service.process_active(), "asking is not stopping");

    // Cancel returns to the run without restarting it.
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Running));
    assert!(rig.service.process_active());
    let status = rig.service.build_status(rig.now_ms, &rig.hw);
    assert!(
        status.remaining_ms.unwrap() < remaining_at_start,
        "re-entry must not reset the deadline"
    );

    // Stop for real: confirm the stop.
    press(&raw, &mut rig, &mut rx);
    rotate(&raw, &mut rig, &mut rx, 1);
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Status));
    assert_eq!(rig.service.mode(), Mode::Off);
    assert!(!rig.hw.heater);
}

#[test]
fn graph_view_round_trip_and_trend_accumulates() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.bus.temperature_c = 24.0;
    rig.start();

    // Start a run so the graph is configured and fed.
    press(&raw, &mut rig, &mut rx);
    rotate(&raw, &mut rig, &mut rx, 1);
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Running));

    // Sit on the running screen past one commit interval (10 s default).
    for _ in 0..1_100 {
        rig.tick_after(10, &mut rx);
    }
    assert!(
        rig.service.trend().commit_count() >= 1,
        "averaged points were committed while running"
    );

    // Stop, then open the trend view from status.
    press(&raw, &mut rig, &mut rx); // → confirm stop
    rotate(&raw, &mut rig, &mut rx, 1);
    press(&raw, &mut rig, &mut rx); // → status
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Status));

    rotate(&raw, &mut rig, &mut rx, 3); // "Graph" is the fourth action
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Graph));

    // Any input leaves the trend view.
    press(&raw, &mut rig, &mut rx);
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Status));
}

#[test]
fn encoder_burst_is_capped_not_crashing() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();

    // A glitching encoder floods edges between two ticks.
    for _ in 0..10_000 {
        raw.isr_encoder_edge(true, true);
    }
    rig.tick_after(10, &mut rx);
    rig.tick_after(10, &mut rx);

    // The bar wrapped some bounded number of times; the loop survived and
    // the screen still responds.
    press(&raw, &mut rig, &mut rx);
    assert_ne!(rig.service.active_screen(), Some(ScreenId::Status));
}
