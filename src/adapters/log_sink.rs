//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).  Every
//! cycle produces the operator status line:
//!
//! ```text
//! Plant:Chili, Mode:Auto, Moisture:35.0%, Temp:27.5C, Hum:61.0%, Pump:ON, Thr:40%
//! ```

use core::fmt::Write;

use heapless::String;
use log::{debug, info, warn};

use crate::app::events::{AppEvent, CycleReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Render the per-cycle status line.
pub fn status_line(report: &CycleReport) -> String<160> {
    let mut line = String::new();
    // A line that overflows the buffer is truncated.
    let _ = write!(
        line,
        "Plant:{}, Mode:{}, Moisture:{:.1}%, Temp:{:.1}C, Hum:{:.1}%, Pump:{}, Thr:{}%",
        report.rule.plant_name,
        report.mode.mode,
        report.sensors.moisture.percent(),
        report.sensors.climate.temperature_or_zero(),
        report.sensors.climate.humidity_or_zero(),
        if report.actuator_on { "ON" } else { "OFF" },
        report.rule.min_moisture,
    );
    line
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(report) => {
                info!("{}", status_line(report));
                debug!(
                    "CYCLE | pump={} alert={}",
                    report.pump.name(),
                    report.alert
                );
            }
            AppEvent::PumpStateChanged { from, to } => {
                info!("PUMP | {} -> {}", from.name(), to.name());
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from, to);
            }
            AppEvent::ManualCommandChanged { from, to } => {
                info!("MODE | manual command {} -> {}", from.as_wire(), to.as_wire());
            }
            AppEvent::RuleUpdated(rule) => {
                info!(
                    "RULE | plant={} min={}% max={}% hum={}% temp={}C",
                    rule.plant_name,
                    rule.min_moisture,
                    rule.max_moisture,
                    rule.preferred_humidity,
                    rule.preferred_temp
                );
            }
            AppEvent::MessageRejected(e) => {
                warn!("REJECT | {}", e);
            }
            AppEvent::TelemetryPublished { count } => {
                debug!("TELEM | {} messages", count);
            }
            AppEvent::Fault(e) => {
                warn!("FAULT | {}", e);
            }
            AppEvent::Started(mode) => {
                info!(
                    "START | mode={} manual_command={}",
                    mode.mode,
                    mode.command.as_wire()
                );
            }
        }
    }
}
