//! End-to-end service tests: tick orchestration, commands, process
//! lifecycle, and sensor failure behavior.

use fermbox::app::commands::AppCommand;
use fermbox::app::events::AppEvent;
use fermbox::config::keys;
use fermbox::control::Mode;
use fermbox::ui::ScreenId;

use crate::mock_hw::ActuatorCall;
use crate::rig_with_queue;

#[test]
fn start_enters_status_screen_and_polls() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();

    assert_eq!(rig.service.active_screen(), Some(ScreenId::Status));
    assert_eq!(rig.bus.conversions, 1, "status entry kicks off polling");
    assert_eq!(rig.bus.resolutions, vec![9], "first conversion is fast");
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::Started(ScreenId::Status))));
    assert!(rig.renderer.flushes > 0, "initial render was forced");

    // One full 9-bit cycle: wait out 94 ms, then the fetch tick.
    rig.tick_after(100, &mut rx);
    rig.tick_after(10, &mut rx);
    assert_eq!(rig.bus.resolutions, vec![9, 12], "escalates after first read");
    let status = rig.service.build_status(rig.now_ms, &rig.hw);
    assert_eq!(status.temperature_c, 21.0);
    assert!(status.sensor_ok);
}

#[test]
fn set_mode_command_controls_heater() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();
    rig.bus.temperature_c = 18.0; // below the default 23..32 heating band

    // Get a real reading first so control acts on live data.
    rig.tick_after(100, &mut rx);
    rig.tick_after(10, &mut rx);

    tx.enqueue(AppCommand::SetMode(Mode::Heating)).unwrap();
    rig.tick_after(10, &mut rx);

    assert_eq!(rig.service.mode(), Mode::Heating);
    assert!(rig.hw.heater, "18 °C is below the band — heater engages");
    assert!(rig.hw.heat_led);
    assert!(!rig.hw.cooler);
    assert_eq!(rig.sink.count_mode_changes(), 1);

    // The mode change forced everything off before the band logic ran.
    assert!(rig.hw.calls.contains(&ActuatorCall::AllOff));
}

#[test]
fn set_target_band_applies_to_live_mode() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();
    rig.bus.temperature_c = 25.0;
    rig.tick_after(100, &mut rx);
    rig.tick_after(10, &mut rx);

    tx.enqueue(AppCommand::SetMode(Mode::Heating)).unwrap();
    rig.tick_after(10, &mut rx);
    assert!(!rig.hw.heater, "25 °C sits inside the default band");

    // Raise the band above the current temperature.
    tx.enqueue(AppCommand::SetTargetBand {
        mode: Mode::Heating,
        lower_c: 27,
        upper_c: 35,
    })
    .unwrap();
    rig.tick_after(10, &mut rx);

    assert_eq!(rig.settings.ints[keys::HEAT_LOWER], 27);
    assert_eq!(rig.settings.ints[keys::HEAT_UPPER], 35);
    let status = rig.service.build_status(rig.now_ms, &rig.hw);
    assert_eq!((status.lower_limit_c, status.upper_limit_c), (27, 35));
    assert!(rig.hw.heater, "new band puts 25 °C below the lower limit");
}

#[test]
fn ferment_command_starts_and_stop_kills_actuators() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();
    rig.bus.temperature_c = 18.0;
    rig.tick_after(100, &mut rx);
    rig.tick_after(10, &mut rx);

    tx.enqueue(AppCommand::StartFerment { duration_hours: 12 })
        .unwrap();
    rig.tick_after(10, &mut rx);

    assert_eq!(rig.service.active_screen(), Some(ScreenId::Running));
    assert!(rig.service.process_active());
    assert_eq!(rig.service.mode(), Mode::Heating);
    rig.tick_after(10, &mut rx);
    assert!(rig.hw.heater);

    tx.enqueue(AppCommand::StopFerment).unwrap();
    rig.tick_after(10, &mut rx);

    assert_eq!(rig.service.mode(), Mode::Off);
    assert!(!rig.service.process_active());
    assert_eq!(rig.service.active_screen(), Some(ScreenId::Status));
    assert!(!rig.hw.heater, "stop fails toward both-off");
    assert!(!rig.hw.cooler);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::ProcessEnded { completed: false })));
}

#[test]
fn deadline_expiry_ends_the_run_from_any_screen() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();
    rig.bus.temperature_c = 18.0;
    rig.tick_after(100, &mut rx);
    rig.tick_after(10, &mut rx);

    tx.enqueue(AppCommand::StartFerment { duration_hours: 1 })
        .unwrap();
    rig.tick_after(10, &mut rx);
    rig.tick_after(10, &mut rx);
    assert!(rig.hw.heater);

    // Park the UI back on the status screen; the run continues.
    tx.enqueue(AppCommand::StopFerment).unwrap();
    // (Stop navigates home — instead jump time first to prove the service,
    // not the screen, enforces the deadline.)
    // Re-start a fresh run for the actual expiry check.
    rig.tick_after(10, &mut rx);
    tx.enqueue(AppCommand::StartFerment { duration_hours: 1 })
        .unwrap();
    rig.tick_after(10, &mut rx);
    assert!(rig.service.process_active());

    rig.tick_after(3_600_000 + 10, &mut rx);
    assert!(!rig.service.process_active(), "deadline reached");
    assert_eq!(rig.service.mode(), Mode::Off);
    assert!(!rig.hw.heater);
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::ProcessEnded { completed: true })));
}

#[test]
fn sensor_fault_is_sticky_and_reported_once() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();
    rig.bus.temperature_c = 20.5;
    rig.tick_after(100, &mut rx);
    rig.tick_after(10, &mut rx);
    let status = rig.service.build_status(rig.now_ms, &rig.hw);
    assert_eq!(status.temperature_c, 20.5);

    // Unplug the sensor mid-run; the next fetch fails.
    rig.bus.connected = false;
    rig.run_ticks(600, &mut rx); // plenty of time for the 12-bit cycle

    let status = rig.service.build_status(rig.now_ms, &rig.hw);
    assert!(!status.sensor_ok);
    assert_eq!(status.temperature_c, 20.5, "last good value is sticky");

    let faults = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::SensorFault))
        .count();
    assert_eq!(faults, 1, "fault reported exactly once");

    // No auto-retry: conversions stop after the failure.
    let conversions = rig.bus.conversions;
    rig.run_ticks(100, &mut rx);
    assert_eq!(rig.bus.conversions, conversions);
}

#[test]
fn periodic_status_snapshot_is_emitted() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();

    rig.tick_after(59_000, &mut rx);
    let before = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Status(_)))
        .count();
    rig.tick_after(2_000, &mut rx);
    let after = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Status(_)))
        .count();
    assert_eq!(after, before + 1, "one snapshot per telemetry interval");
}

#[test]
fn commands_drain_before_control_runs() {
    rig_with_queue!(raw, rig, tx, rx);
    rig.start();
    rig.bus.temperature_c = 18.0;
    rig.tick_after(100, &mut rx);
    rig.tick_after(10, &mut rx);

    // Two commands in one tick: the second wins before control acts.
    tx.enqueue(AppCommand::SetMode(Mode::Heating)).unwrap();
    tx.enqueue(AppCommand::SetMode(Mode::Off)).unwrap();
    rig.tick_after(10, &mut rx);

    assert_eq!(rig.service.mode(), Mode::Off);
    assert!(!rig.hw.heater, "heater never engaged across the tick");
}
