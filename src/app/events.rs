//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log today).

use crate::control::actuator::PumpState;
use crate::error::{Error, MessageError};
use crate::sensors::SensorSnapshot;
use crate::store::mode::{ManualCommand, Mode, ModeSnapshot};
use crate::store::rules::Rule;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial mode).
    Started(ModeSnapshot),

    /// One control cycle completed.
    Cycle(CycleReport),

    /// The pump state machine moved between phases.
    PumpStateChanged { from: PumpState, to: PumpState },

    /// The operating mode was changed remotely.
    ModeChanged { from: Mode, to: Mode },

    /// The manual pump command was changed remotely.
    ManualCommandChanged { from: ManualCommand, to: ManualCommand },

    /// A rule update was applied (carries the merged rule).
    RuleUpdated(Rule),

    /// An inbound message was rejected as a whole.
    MessageRejected(MessageError),

    /// A telemetry window fired; `count` messages reached the transport.
    TelemetryPublished { count: usize },

    /// A non-fatal fault in an adapter.
    Fault(Error),
}

/// Everything observed and decided in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub sensors: SensorSnapshot,
    pub rule: Rule,
    pub mode: ModeSnapshot,
    pub pump: PumpState,
    pub actuator_on: bool,
    pub alert: bool,
}
