//! Integration test entry point.
//!
//! One binary so the mock adapters are shared across suites.

mod mock_hw;
mod screen_flow_tests;
mod service_tests;

use fermbox::app::commands::CommandQueue;
use fermbox::app::service::{AppService, TickPorts};
use fermbox::config::SystemConfig;
use fermbox::input::RawInputShared;

use self::mock_hw::{CaptureRenderer, MockActuators, MockBus, MockSettings, VecSink};

/// Everything a test drives: the service plus all mock collaborators.
///
/// `raw` is owned by the caller because [`AppService`] borrows it for its
/// whole lifetime (the production ISR handoff is a `static`).
pub struct Rig<'raw> {
    pub service: AppService<'raw>,
    pub bus: MockBus,
    pub hw: MockActuators,
    pub renderer: CaptureRenderer,
    pub settings: MockSettings,
    pub sink: VecSink,
    pub now_ms: u64,
}

impl<'raw> Rig<'raw> {
    pub fn new(raw: &'raw RawInputShared) -> Self {
        Self {
            service: AppService::new(SystemConfig::default(), raw),
            bus: MockBus::new(21.0),
            hw: MockActuators::default(),
            renderer: CaptureRenderer::new(),
            settings: MockSettings::new(),
            sink: VecSink::new(),
            now_ms: 0,
        }
    }

    pub fn start(&mut self) {
        let mut ports = TickPorts {
            bus: &mut self.bus,
            actuators: &mut self.hw,
            renderer: &mut self.renderer,
            settings: &mut self.settings,
            sink: &mut self.sink,
        };
        self.service.start(self.now_ms, &mut ports);
    }

    /// Advance time by `delta_ms` and run one control tick.
    pub fn tick_after(
        &mut self,
        delta_ms: u64,
        commands: &mut fermbox::app::commands::CommandConsumer<'_>,
    ) {
        self.now_ms += delta_ms;
        let mut ports = TickPorts {
            bus: &mut self.bus,
            actuators: &mut self.hw,
            renderer: &mut self.renderer,
            settings: &mut self.settings,
            sink: &mut self.sink,
        };
        self.service.tick(self.now_ms, commands, &mut ports);
    }

    /// Run `n` ticks at the standard 10 ms loop interval.
    pub fn run_ticks(
        &mut self,
        n: u32,
        commands: &mut fermbox::app::commands::CommandConsumer<'_>,
    ) {
        for _ in 0..n {
            self.tick_after(10, commands);
        }
    }
}

/// Convenience: a fresh command queue split for tests that don't care about
/// the producer side.
#[macro_export]
macro_rules! rig_with_queue {
    ($raw:ident, $rig:ident, $tx:ident, $rx:ident) => {
        let $raw = fermbox::input::RawInputShared::new();
        let mut queue = fermbox::app::commands::CommandQueue::new();
        let (mut $tx, mut $rx) = queue.split();
        let _ = &mut $tx;
        let mut $rig = $crate::Rig::new(&$raw);
    };
}

#[test]
fn queue_type_is_shared_between_contexts() {
    // Compile-level check that the producer half is Send (the web task owns
    // it on another thread).
    fn assert_send<T: Send>(_t: &T) {}
    let mut queue = CommandQueue::new();
    let (tx, _rx) = queue.split();
    assert_send(&tx);
}
