//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the pump state machine and the telemetry gate, and
//! borrows the shared rule and mode stores.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!     Inbox ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!  SensorPort ─▶│       AppService        │ ──▶ DisplayPort
//! ActuatorPort ◀│ Controller · Alert · Gate│ ──▶ TelemetryPort
//!               └─────────────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) is one cycle: snapshot → decide → relay →
//! alert → display → telemetry.  Inbound messages are applied by
//! [`drain_inbox`](AppService::drain_inbox) *before* the tick, never while
//! a cycle is in progress.

use embassy_time::Instant;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::actuator::{ActuatorController, PumpState};
use crate::control::alert;
use crate::error::{ConfigError, MessageError};
use crate::store::mode::ModeRegister;
use crate::store::rules::RuleStore;
use crate::telemetry::{TelemetryData, TelemetryGate};

use super::commands::AppCommand;
use super::events::{AppEvent, CycleReport};
use super::inbox::{self, Inbox};
use super::ports::{ActuatorPort, DisplayFrame, DisplayPort, EventSink, SensorPort, TelemetryPort};
use super::topics::Topics;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<'a> {
    rules: &'a RuleStore,
    modes: &'a ModeRegister,
    controller: ActuatorController,
    gate: TelemetryGate,
    topics: Topics,
    cycle_count: u64,
}

impl<'a> AppService<'a> {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch any hardware. Call [`start`](Self::start) next.
    pub fn new(
        config: &SystemConfig,
        rules: &'a RuleStore,
        modes: &'a ModeRegister,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rules,
            modes,
            controller: ActuatorController::new(
                config.run_duration(),
                config.cooldown_duration(),
            ),
            gate: TelemetryGate::new(config.publish_interval()),
            topics: Topics::new(&config.device_code, config.actuator_id)?,
            cycle_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the actuators in a known state and announce the initial mode.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        let mode = self.modes.snapshot();
        info!("AppService started in {} mode", mode.mode);
        sink.emit(&AppEvent::Started(mode));
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Apply every queued inbound message.  Returns how many were applied.
    pub fn drain_inbox(&mut self, inbox: &Inbox, sink: &mut impl EventSink) -> usize {
        let mut applied = 0;
        while let Ok(msg) = inbox.try_receive() {
            match inbox::decode(&self.topics, &msg) {
                Ok(cmd) => {
                    self.handle_command(cmd, sink);
                    applied += 1;
                }
                Err(MessageError::UnknownTopic) => {
                    debug!("Ignoring message on {}", msg.topic);
                }
                Err(e) => {
                    warn!("Rejected message on {}: {}", msg.topic, e);
                    sink.emit(&AppEvent::MessageRejected(e));
                }
            }
        }
        applied
    }

    /// Apply one decoded command to the shared stores.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::SetMode(to) => {
                let from = self.modes.set_mode(to);
                if from != to {
                    info!("Mode changed: {} -> {}", from, to);
                    sink.emit(&AppEvent::ModeChanged { from, to });
                }
            }
            AppCommand::SetManualCommand(to) => {
                let from = self.modes.set_manual_command(to);
                if from != to {
                    info!("Manual command: {} -> {}", from.as_wire(), to.as_wire());
                    sink.emit(&AppEvent::ManualCommandChanged { from, to });
                }
            }
            AppCommand::UpdateRule(update) => {
                if update.is_empty() {
                    debug!("Rule update carried no usable field");
                    return;
                }
                let rule = self.rules.apply_update(&update);
                if !rule.is_consistent() {
                    warn!(
                        "Rule thresholds inverted (min {} > max {}), max takes priority",
                        rule.min_moisture, rule.max_moisture
                    );
                }
                sink.emit(&AppEvent::RuleUpdated(rule));
            }
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.  Nothing in here is fatal:
    /// adapter failures are logged and reported as [`AppEvent::Fault`].
    pub fn tick(
        &mut self,
        now: Instant,
        hw: &mut (impl SensorPort + ActuatorPort),
        display: &mut impl DisplayPort,
        link: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.cycle_count += 1;

        // 1. Snapshot inputs
        let sensors = hw.read_all();
        let rule = self.rules.snapshot();
        let mode = self.modes.snapshot();

        // 2. Decide
        let prev = self.controller.state();
        let actuator_on = self.controller.step(sensors.moisture, &rule, mode, now);
        let pump = self.controller.state();
        if !pump.same_phase(&prev) {
            sink.emit(&AppEvent::PumpStateChanged {
                from: prev,
                to: pump,
            });
        }

        // 3. Act
        if let Err(e) = hw.set_relay(actuator_on) {
            warn!("Relay write failed: {}", e);
            sink.emit(&AppEvent::Fault(e.into()));
        }

        // 4. Alert + display
        let alert = alert::evaluate(sensors.moisture, rule.min_moisture);
        display.render(&DisplayFrame {
            plant_name: rule.plant_name.clone(),
            mode: mode.mode,
            temperature_c: sensors.climate.temperature_or_zero(),
            moisture_pct: sensors.moisture.percent(),
            threshold: rule.min_moisture,
            actuator_on,
        });
        display.render_alert(alert);

        // 5. Report
        let data = self.gate.maybe_publish(now, || TelemetryData {
            moisture_pct: sensors.moisture.percent(),
            climate: sensors.climate,
            actuator_on,
        });
        if let Some(data) = data {
            self.publish(&data, link, sink);
        }

        let report = CycleReport {
            sensors,
            rule,
            mode,
            pump,
            actuator_on,
            alert,
        };
        sink.emit(&AppEvent::Cycle(report.clone()));
        report
    }

    fn publish(&self, data: &TelemetryData, link: &mut impl TelemetryPort, sink: &mut impl EventSink) {
        if !link.is_connected() {
            debug!("Broker disconnected, telemetry window dropped");
            return;
        }

        let mut count = 0;
        for msg in data.to_messages(&self.topics) {
            match link.publish(&msg) {
                Ok(()) => count += 1,
                Err(e) => {
                    warn!("Publish to {} failed: {}", msg.topic, e);
                    sink.emit(&AppEvent::Fault(e.into()));
                }
            }
        }
        sink.emit(&AppEvent::TelemetryPublished { count });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Current pump state machine state.
    pub fn pump_state(&self) -> PumpState {
        self.controller.state()
    }

    /// Total control cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}
