//! Timed hysteresis state machine for the pump relay.
//!
//! ```text
//!            [moisture < min]                [run elapsed]
//!  IDLE ─────────────────────▶ RUNNING ─────────────────────▶ COOLDOWN
//!   ▲                            ▲                               │
//!   │                            └──[cooldown elapsed, < min]────┤
//!   └──────────────────────────────[cooldown elapsed, ≥ min]─────┘
//!
//!  Any state ──[moisture > max]──▶ IDLE
//!  Any state ──[manual mode]─────▶ IDLE (relay follows the manual command)
//! ```
//!
//! Between `min` and `max` (the hysteresis band) no new cycle is started,
//! but a burst that is already running is allowed to finish its run and
//! cooldown timers.  Only crossing above `max` aborts an active cycle.
//!
//! The controller does no I/O.  Elapsed time is computed by saturating
//! subtraction of monotonic instants, so a clock that stalls or is
//! re-seeded never produces a negative interval.

use embassy_time::{Duration, Instant};

use crate::sensors::soil::MoistureReading;
use crate::store::mode::{Mode, ModeSnapshot};
use crate::store::rules::Rule;

/// Internal pump cycle state.  The timestamp lives inside the variant that
/// needs it, so a timer can never outlive its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Running { since: Instant },
    Cooldown { since: Instant },
}

impl PumpState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Cooldown { .. } => "Cooldown",
        }
    }

    /// True if both states are the same variant, ignoring timestamps.
    pub fn same_phase(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// The pump decision engine.
pub struct ActuatorController {
    state: PumpState,
    run: Duration,
    cooldown: Duration,
}

impl ActuatorController {
    /// `run` is the burst length, `cooldown` the soak time before moisture is
    /// re-evaluated.
    pub fn new(run: Duration, cooldown: Duration) -> Self {
        Self {
            state: PumpState::Idle,
            run,
            cooldown,
        }
    }

    /// Advance one cycle and return whether the relay should be energised.
    pub fn step(
        &mut self,
        moisture: MoistureReading,
        rule: &Rule,
        mode: ModeSnapshot,
        now: Instant,
    ) -> bool {
        let next = match mode.mode {
            // Manual interruption discards any timer.
            Mode::Manual => PumpState::Idle,
            Mode::Automatic => self.next_automatic(moisture, rule, now),
        };

        self.state = next;

        match mode.mode {
            Mode::Manual => mode.command.is_on(),
            Mode::Automatic => self.state.is_running(),
        }
    }

    fn next_automatic(&self, moisture: MoistureReading, rule: &Rule, now: Instant) -> PumpState {
        // Soil wet enough: abort whatever is in progress.
        if moisture.is_above(rule.max_moisture) {
            return PumpState::Idle;
        }

        let dry = moisture.is_below(rule.min_moisture);
        match self.state {
            PumpState::Idle if dry => PumpState::Running { since: now },
            PumpState::Idle => PumpState::Idle,
            PumpState::Running { since } if elapsed(now, since) >= self.run => {
                PumpState::Cooldown { since: now }
            }
            PumpState::Cooldown { since } if elapsed(now, since) >= self.cooldown => {
                if dry {
                    PumpState::Running { since: now }
                } else {
                    PumpState::Idle
                }
            }
            unchanged => unchanged,
        }
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    /// Output of the most recent automatic decision.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }
}

fn elapsed(now: Instant, since: Instant) -> Duration {
    now.saturating_duration_since(since)
}
