//! Rotary encoder + push button input with ISR/main-loop split.
//!
//! The interrupt side is a handful of relaxed atomic stores into
//! [`RawInputShared`] — no debounce, no timing, no branches beyond the
//! quadrature direction pick. Everything that needs a clock (the 50 ms
//! stabilization window, the one-shot press latch, step accounting) runs in
//! the main loop inside [`DebouncedInput`], which is the sole writer of the
//! debounced state.
//!
//! ```text
//! GPIO ISR ──▶ RawInputShared (atomics) ──▶ DebouncedInput::tick() ──▶ screens
//! ```

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, Ordering};

/// Minimum time a raw button level must hold before it is accepted.
pub const DEBOUNCE_WINDOW_MS: u64 = 50;

/// Upper bound on buffered encoder steps. Protects the per-tick drain loop
/// from a misbehaving encoder flooding the counter.
pub const ENCODER_PENDING_CAP: i32 = 8;

// ---------------------------------------------------------------------------
// ISR-facing raw state
// ---------------------------------------------------------------------------

/// Raw input state shared between the GPIO ISRs (producer) and the main loop
/// (consumer). All fields are plain data behind relaxed atomics; the ISR
/// performs no logic beyond the quadrature direction pick.
pub struct RawInputShared {
    /// Button line level. `true` = high = released (active-low button).
    button_level: AtomicBool,
    /// Count of raw button edges, for diagnostics.
    button_edges: AtomicU32,
    /// Accumulated quadrature position (signed, monotonic per direction).
    position: AtomicI32,
}

impl RawInputShared {
    /// `const` so instances can live in a `static` for ISR access.
    pub const fn new() -> Self {
        Self {
            button_level: AtomicBool::new(true),
            button_edges: AtomicU32::new(0),
            position: AtomicI32::new(0),
        }
    }

    /// Record the current button line level. ISR-safe, lock-free.
    pub fn isr_set_button_level(&self, high: bool) {
        self.button_level.store(high, Ordering::Relaxed);
        self.button_edges.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one quadrature edge on channel A. The B level at the moment of
    /// the A edge determines direction. ISR-safe, lock-free.
    pub fn isr_encoder_edge(&self, a_high: bool, b_high: bool) {
        if a_high == b_high {
            self.position.fetch_add(1, Ordering::Relaxed);
        } else {
            self.position.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Latest raw button level (`true` = released).
    pub fn button_level(&self) -> bool {
        self.button_level.load(Ordering::Relaxed)
    }

    /// Latest raw encoder position.
    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }

    /// Total raw button edges seen since boot.
    pub fn button_edge_count(&self) -> u32 {
        self.button_edges.load(Ordering::Relaxed)
    }
}

impl Default for RawInputShared {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Debounced main-loop view
// ---------------------------------------------------------------------------

/// Direction of one consumed encoder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderStep {
    Clockwise,
    CounterClockwise,
}

/// Main-loop input state machine. Call [`tick`](Self::tick) every loop
/// iteration, then drain events with [`consume_button_press`] and
/// [`next_encoder_step`].
///
/// [`consume_button_press`]: Self::consume_button_press
/// [`next_encoder_step`]: Self::next_encoder_step
pub struct DebouncedInput<'a> {
    raw: &'a RawInputShared,

    // -- Button debounce --
    last_raw_level: bool,
    debounced_level: bool,
    last_change_ms: u64,
    /// One-shot latch, set on the debounced press edge, cleared on read.
    pressed_latch: bool,

    // -- Encoder accounting --
    last_position: i32,
    /// Unconsumed steps: sign = direction, magnitude = count.
    pending_steps: i32,
}

impl<'a> DebouncedInput<'a> {
    pub fn new(raw: &'a RawInputShared) -> Self {
        let level = raw.button_level();
        Self {
            raw,
            last_raw_level: level,
            debounced_level: level,
            last_change_ms: 0,
            pressed_latch: false,
            last_position: raw.position(),
            pending_steps: 0,
        }
    }

    /// Integrate the latest raw snapshot. Cheap and non-blocking; must run
    /// every loop iteration regardless of the active screen.
    pub fn tick(&mut self, now_ms: u64) {
        // Button: accept a level only after it has held for the full window.
        let raw_level = self.raw.button_level();
        if raw_level != self.last_raw_level {
            self.last_raw_level = raw_level;
            self.last_change_ms = now_ms;
        }
        if raw_level != self.debounced_level
            && now_ms.saturating_sub(self.last_change_ms) >= DEBOUNCE_WINDOW_MS
        {
            self.debounced_level = raw_level;
            if !raw_level {
                // Low-going debounced edge = press.
                self.pressed_latch = true;
            }
        }

        // Encoder: fold the position delta into the pending-step counter.
        let position = self.raw.position();
        let delta = position.wrapping_sub(self.last_position);
        self.last_position = position;
        self.pending_steps = (self.pending_steps + delta)
            .clamp(-ENCODER_PENDING_CAP, ENCODER_PENDING_CAP);
    }

    /// Returns `true` at most once per physical press, then resets.
    pub fn consume_button_press(&mut self) -> bool {
        core::mem::take(&mut self.pressed_latch)
    }

    /// Pop one pending encoder step, or `None` once drained. Callers poll
    /// repeatedly (bounded by [`ENCODER_PENDING_CAP`]) to consume a
    /// multi-step rotation.
    pub fn next_encoder_step(&mut self) -> Option<EncoderStep> {
        match self.pending_steps.cmp(&0) {
            core::cmp::Ordering::Greater => {
                self.pending_steps -= 1;
                Some(EncoderStep::Clockwise)
            }
            core::cmp::Ordering::Less => {
                self.pending_steps += 1;
                Some(EncoderStep::CounterClockwise)
            }
            core::cmp::Ordering::Equal => None,
        }
    }

    /// Zero the accumulated position and pending steps. Screens call this on
    /// entry for a clean relative-motion baseline.
    pub fn reset_position(&mut self) {
        self.last_position = self.raw.position();
        self.pending_steps = 0;
    }

    /// Debounced button level (`true` = released).
    pub fn button_level(&self) -> bool {
        self.debounced_level
    }

    /// Unconsumed steps (sign = direction).
    pub fn pending_steps(&self) -> i32 {
        self.pending_steps
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A raw level change is only ever accepted after holding for the
        /// full window, no matter how the signal bounces beforehand.
        #[test]
        fn no_transition_without_stability(
            toggles in proptest::collection::vec((0u64..49, any::<bool>()), 1..50)
        ) {
            let raw = RawInputShared::new();
            let mut din = DebouncedInput::new(&raw);

            let mut t = 0;
            for (gap, level) in toggles {
                // Every gap is < DEBOUNCE_WINDOW_MS, so nothing settles…
                t += gap.min(DEBOUNCE_WINDOW_MS - 1);
                raw.isr_set_button_level(level);
                din.tick(t);
                // …except when the raw level happens to agree with the
                // debounced one (a non-change is never a transition).
                prop_assert!(
                    din.button_level() || !level,
                    "debounced level may only go low if the raw level is low"
                );
            }
        }

        /// Draining always yields exactly |pending| steps of the right sign.
        #[test]
        fn drain_matches_pending(steps in -8i32..=8) {
            let raw = RawInputShared::new();
            let mut din = DebouncedInput::new(&raw);

            for _ in 0..steps.abs() {
                raw.isr_encoder_edge(true, steps > 0);
            }
            din.tick(0);

            let mut seen = 0;
            while let Some(step) = din.next_encoder_step() {
                match step {
                    EncoderStep::Clockwise => prop_assert!(steps > 0),
                    EncoderStep::CounterClockwise => prop_assert!(steps < 0),
                }
                seen += 1;
            }
            prop_assert_eq!(seen, steps.abs());
        }
    }
}
