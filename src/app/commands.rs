//! Inbound commands and the cross-context command queue.
//!
//! The web front end runs in a different execution context than the main
//! loop, so it must never call mode-setting or navigation APIs directly —
//! that would race the loop's single-writer state. Instead it owns the
//! producer half of a single-producer/single-consumer queue; the main loop
//! drains the consumer half exactly once at the top of every tick, which
//! makes every command appear atomic to its sender.
//!
//! ```text
//! ┌────────────┐  enqueue   ┌───────────────┐  dequeue   ┌────────────┐
//! │  web task  │ ─────────▶ │  spsc::Queue  │ ─────────▶ │  main loop │
//! │ (producer) │            │   (depth 8)   │            │ (consumer) │
//! └────────────┘            └───────────────┘            └────────────┘
//! ```

use crate::control::Mode;

/// Maximum number of commands buffered between ticks. A full queue rejects
/// the enqueue; senders see the refusal and may retry.
pub const COMMAND_QUEUE_DEPTH: usize = 8;

/// Commands that external contexts can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Switch the control mode (loads that mode's band from settings).
    SetMode(Mode),

    /// Persist a new band for `mode` and refresh the controller if that
    /// mode is currently active.
    SetTargetBand {
        mode: Mode,
        lower_c: i32,
        upper_c: i32,
    },

    /// Start a ferment run (navigates to the running screen, which starts
    /// the process if none is active).
    StartFerment { duration_hours: u16 },

    /// Stop the active run: mode off, actuators off, back to the status
    /// screen.
    StopFerment,
}

/// Queue type shared between the producer context and the main loop.
pub type CommandQueue = heapless::spsc::Queue<AppCommand, COMMAND_QUEUE_DEPTH>;

/// Producer half — owned by the web/RPC context.
pub type CommandProducer<'a> = heapless::spsc::Producer<'a, AppCommand, COMMAND_QUEUE_DEPTH>;

/// Consumer half — drained by [`AppService::tick`](super::service::AppService::tick).
pub type CommandConsumer<'a> = heapless::spsc::Consumer<'a, AppCommand, COMMAND_QUEUE_DEPTH>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_drain_in_fifo_order() {
        let mut queue = CommandQueue::new();
        let (mut tx, mut rx) = queue.split();

        tx.enqueue(AppCommand::SetMode(Mode::Heating)).unwrap();
        tx.enqueue(AppCommand::StopFerment).unwrap();

        assert_eq!(rx.dequeue(), Some(AppCommand::SetMode(Mode::Heating)));
        assert_eq!(rx.dequeue(), Some(AppCommand::StopFerment));
        assert_eq!(rx.dequeue(), None);
    }

    #[test]
    fn full_queue_rejects_enqueue() {
        let mut queue = CommandQueue::new();
        let (mut tx, _rx) = queue.split();

        let mut accepted = 0;
        for _ in 0..COMMAND_QUEUE_DEPTH + 2 {
            if tx.enqueue(AppCommand::StopFerment).is_ok() {
                accepted += 1;
            }
        }
        // spsc::Queue<_, N> stores N-1 elements.
        assert_eq!(accepted, COMMAND_QUEUE_DEPTH - 1);
        assert!(tx.enqueue(AppCommand::StopFerment).is_err());
    }
}
