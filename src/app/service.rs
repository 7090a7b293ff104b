//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the domain objects (debounced input, sensor poller,
//! band controller, process state, graph, screen machine) and exposes a
//! clean, hardware-agnostic API. All I/O flows through port traits injected
//! at call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!   SensorBus ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService          │
//! CommandQueue ─▶ │ input · poller · hysteresis  │
//! ActuatorPort ◀──│ process · graph · screens    │──▶ Renderer
//!                 └──────────────────────────────┘
//! ```
//!
//! Per-tick order is fixed and load-bearing: commands first (external
//! mutations apply before anything reads control state), then input and
//! sensor (always, regardless of the active screen), then the process
//! deadline, then the band controller, then the UI, then telemetry.

use log::info;

use crate::config::{self, SystemConfig};
use crate::control::hysteresis::HysteresisController;
use crate::control::{FermentProcess, Mode};
use crate::graph::WindowedGraphBuffer;
use crate::input::{DebouncedInput, RawInputShared};
use crate::sensors::poller::{PollState, SensorPoller};
use crate::ui::{RunningConfig, ScreenEntry, ScreenStateMachine, UiContext};

use super::commands::{AppCommand, CommandConsumer};
use super::events::{AppEvent, StatusSnapshot};
use super::ports::{ActuatorPort, EventSink, Renderer, SensorBus, SettingsPort};

/// Ports borrowed for the duration of one call. Bundling them keeps the
/// `tick` signature readable and the borrow set explicit.
pub struct TickPorts<'p> {
    pub bus: &'p mut dyn SensorBus,
    pub actuators: &'p mut dyn ActuatorPort,
    pub renderer: &'p mut dyn Renderer,
    pub settings: &'p mut dyn SettingsPort,
    pub sink: &'p mut dyn EventSink,
}

/// The application service orchestrates all domain logic.
pub struct AppService<'raw> {
    config: SystemConfig,
    input: DebouncedInput<'raw>,
    poller: SensorPoller,
    thermostat: HysteresisController,
    process: FermentProcess,
    graph: WindowedGraphBuffer,
    ui: ScreenStateMachine,
    tick_count: u64,
    last_status_ms: u64,
    sensor_fault_reported: bool,
}

impl<'raw> AppService<'raw> {
    /// Construct the service. Does **not** enter a screen — call
    /// [`start`](Self::start) next.
    pub fn new(config: SystemConfig, raw_input: &'raw RawInputShared) -> Self {
        Self {
            config,
            input: DebouncedInput::new(raw_input),
            poller: SensorPoller::new(),
            thermostat: HysteresisController::new(),
            process: FermentProcess::new(),
            graph: WindowedGraphBuffer::new(),
            ui: ScreenStateMachine::new(),
            tick_count: 0,
            last_status_ms: 0,
            sensor_fault_reported: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the status screen and begin polling.
    pub fn start(&mut self, now_ms: u64, ports: &mut TickPorts<'_>) {
        let Self {
            config,
            input,
            poller,
            thermostat,
            process,
            graph,
            ui,
            ..
        } = self;
        let mut cx = UiContext {
            now_ms,
            config,
            input,
            sensor: poller,
            bus: &mut *ports.bus,
            thermostat,
            process,
            graph,
            renderer: &mut *ports.renderer,
            settings: &mut *ports.settings,
            actuators: &mut *ports.actuators,
            sink: &mut *ports.sink,
        };
        ui.activate(ScreenEntry::Status, &mut cx);
        ports.sink.emit(&AppEvent::Started(crate::ui::ScreenId::Status));
        info!("AppService started on the status screen");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    pub fn tick(
        &mut self,
        now_ms: u64,
        commands: &mut CommandConsumer<'_>,
        ports: &mut TickPorts<'_>,
    ) {
        self.tick_count += 1;

        // 1. External commands, drained exactly once per tick.
        while let Some(cmd) = commands.dequeue() {
            self.handle_command(cmd, now_ms, ports);
        }

        // 2. Input and sensor always advance, whatever the screen does.
        self.input.tick(now_ms);
        self.poller.update(ports.bus, now_ms);
        self.report_sensor_fault(ports.sink);

        // 3. Deadline enforcement is the service's job so a run ends even
        //    while the user is parked on another screen.
        if self.process.is_expired(now_ms) {
            self.end_process(true, ports);
        }

        // 4. Temperature control, every tick, with the sticky last reading.
        self.thermostat
            .update(self.poller.temperature(), ports.actuators);

        // 5. Active screen.
        let Self {
            config,
            input,
            poller,
            thermostat,
            process,
            graph,
            ui,
            ..
        } = self;
        let mut cx = UiContext {
            now_ms,
            config,
            input,
            sensor: poller,
            bus: &mut *ports.bus,
            thermostat,
            process,
            graph,
            renderer: &mut *ports.renderer,
            settings: &mut *ports.settings,
            actuators: &mut *ports.actuators,
            sink: &mut *ports.sink,
        };
        ui.tick(&mut cx);

        // 6. Periodic status snapshot.
        let interval_ms = u64::from(self.config.telemetry_interval_secs) * 1000;
        if now_ms.saturating_sub(self.last_status_ms) >= interval_ms {
            self.last_status_ms = now_ms;
            let snapshot = self.build_status(now_ms, ports.actuators);
            ports.sink.emit(&AppEvent::Status(snapshot));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply one external command (from the web front end's queue).
    fn handle_command(&mut self, cmd: AppCommand, now_ms: u64, ports: &mut TickPorts<'_>) {
        info!("Command: {:?}", cmd);
        match cmd {
            AppCommand::SetMode(mode) => {
                let from = self.thermostat.mode();
                self.thermostat.set_mode(mode, ports.settings, ports.actuators);
                if from != mode {
                    ports.sink.emit(&AppEvent::ModeChanged { from, to: mode });
                }
            }

            AppCommand::SetTargetBand {
                mode,
                lower_c,
                upper_c,
            } => {
                let (lo_key, hi_key) = match mode {
                    Mode::Heating => (config::keys::HEAT_LOWER, config::keys::HEAT_UPPER),
                    Mode::Cooling => (config::keys::COOL_LOWER, config::keys::COOL_UPPER),
                    Mode::Off => return,
                };
                if let Err(e) = ports.settings.set_i32(lo_key, lower_c) {
                    log::warn!("Failed to persist '{lo_key}': {e}");
                }
                if let Err(e) = ports.settings.set_i32(hi_key, upper_c) {
                    log::warn!("Failed to persist '{hi_key}': {e}");
                }
                if self.thermostat.mode() == mode {
                    self.thermostat.refresh_limits(ports.settings);
                }
            }

            AppCommand::StartFerment { duration_hours } => {
                // Navigate to the running screen; its entry hook is the
                // single place a run starts, for UI and remote alike.
                let entry = ScreenEntry::Running(RunningConfig {
                    mode: Mode::Heating,
                    duration_hours,
                });
                self.activate_screen(entry, now_ms, ports);
            }

            AppCommand::StopFerment => {
                if self.process.is_active() {
                    self.end_process(false, ports);
                }
                self.activate_screen(ScreenEntry::Status, now_ms, ports);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot from the current state.
    pub fn build_status(&self, now_ms: u64, actuators: &dyn ActuatorPort) -> StatusSnapshot {
        let (lower, upper) = self.thermostat.limits();
        StatusSnapshot {
            mode: self.thermostat.mode(),
            temperature_c: self.poller.temperature(),
            lower_limit_c: lower,
            upper_limit_c: upper,
            heater_on: actuators.is_heater_on(),
            cooler_on: actuators.is_cooler_on(),
            sensor_ok: self.poller.state() != PollState::Error,
            active_screen: self.ui.active(),
            remaining_ms: self.process.remaining_ms(now_ms),
        }
    }

    pub fn mode(&self) -> Mode {
        self.thermostat.mode()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn active_screen(&self) -> Option<crate::ui::ScreenId> {
        self.ui.active()
    }

    pub fn process_active(&self) -> bool {
        self.process.is_active()
    }

    /// Read access to the trend buffer (web front end / tests).
    pub fn trend(&self) -> &WindowedGraphBuffer {
        &self.graph
    }

    // ── Internal ──────────────────────────────────────────────

    /// End the active run: mode off (which forces the relays off), slow
    /// polling restored.
    fn end_process(&mut self, completed: bool, ports: &mut TickPorts<'_>) {
        let from = self.thermostat.mode();
        self.thermostat
            .set_mode(Mode::Off, ports.settings, ports.actuators);
        self.process.stop();
        self.poller.set_slow_polling(true);
        if from != Mode::Off {
            ports.sink.emit(&AppEvent::ModeChanged {
                from,
                to: Mode::Off,
            });
        }
        ports.sink.emit(&AppEvent::ProcessEnded { completed });
        info!(
            "Run ended ({})",
            if completed { "deadline reached" } else { "stopped" }
        );
    }

    fn report_sensor_fault(&mut self, sink: &mut dyn EventSink) {
        let in_error = self.poller.state() == PollState::Error;
        if in_error && !self.sensor_fault_reported {
            sink.emit(&AppEvent::SensorFault);
            self.sensor_fault_reported = true;
        } else if !in_error {
            self.sensor_fault_reported = false;
        }
    }

    fn activate_screen(&mut self, entry: ScreenEntry, now_ms: u64, ports: &mut TickPorts<'_>) {
        let Self {
            config,
            input,
            poller,
            thermostat,
            process,
            graph,
            ui,
            ..
        } = self;
        let mut cx = UiContext {
            now_ms,
            config,
            input,
            sensor: poller,
            bus: &mut *ports.bus,
            thermostat,
            process,
            graph,
            renderer: &mut *ports.renderer,
            settings: &mut *ports.settings,
            actuators: &mut *ports.actuators,
            sink: &mut *ports.sink,
        };
        ui.activate(entry, &mut cx);
    }
}
