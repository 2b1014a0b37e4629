//! Full control cycles through `AppService` against mock adapters.

use embassy_time::Instant;
use siramin::app::commands::AppCommand;
use siramin::app::events::AppEvent;
use siramin::app::service::AppService;
use siramin::config::SystemConfig;
use siramin::control::actuator::PumpState;
use siramin::error::{ActuatorError, CommsError, Error};
use siramin::sensors::ClimateReading;
use siramin::store::mode::{ManualCommand, Mode, ModeRegister};
use siramin::store::rules::RuleStore;

use crate::mock_hw::{MockDisplay, MockHw, MockLink, RecordingSink};

struct Rig {
    hw: MockHw,
    display: MockDisplay,
    link: MockLink,
    sink: RecordingSink,
}

impl Rig {
    fn new(moisture: f32) -> Self {
        Self {
            hw: MockHw::new(moisture),
            display: MockDisplay::default(),
            link: MockLink::connected(),
            sink: RecordingSink::default(),
        }
    }

    fn tick(&mut self, app: &mut AppService<'_>, secs: u64) -> (bool, bool) {
        let report = app.tick(
            Instant::from_secs(secs),
            &mut self.hw,
            &mut self.display,
            &mut self.link,
            &mut self.sink,
        );
        (report.actuator_on, report.alert)
    }
}

#[test]
fn watering_cycle_runs_cools_down_and_stops_when_wet() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(35.0);
    app.start(&mut rig.hw, &mut rig.sink);

    let steps = [(0, 35.0), (2, 35.0), (4, 35.0), (10, 35.0), (30, 35.0), (70, 85.0)];
    let mut outputs = Vec::new();
    let mut alerts = Vec::new();
    for (t, moisture) in steps {
        rig.hw.moisture = moisture;
        let (on, alert) = rig.tick(&mut app, t);
        outputs.push(on);
        alerts.push(alert);
    }

    assert_eq!(outputs, [true, true, true, false, false, false]);
    assert_eq!(alerts, [true, true, true, true, true, false]);
    assert_eq!(rig.display.alerts, alerts);
    assert_eq!(app.pump_state(), PumpState::Idle);
    assert_eq!(app.cycle_count(), 6);

    // all_off at start, then one write per cycle.
    assert_eq!(rig.hw.all_off_calls, 1);
    assert_eq!(rig.hw.relay, [false, true, true, true, false, false, false]);

    let phases: Vec<(&str, &str)> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PumpStateChanged { from, to } => Some((from.name(), to.name())),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        [("Idle", "Running"), ("Running", "Cooldown"), ("Cooldown", "Idle")]
    );
}

#[test]
fn cooldown_rearms_while_still_dry() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(20.0);

    assert!(rig.tick(&mut app, 0).0);
    assert!(!rig.tick(&mut app, 10).0);
    assert!(!rig.tick(&mut app, 69).0);
    assert!(rig.tick(&mut app, 70).0);
    assert!(matches!(app.pump_state(), PumpState::Running { .. }));
}

#[test]
fn hysteresis_band_keeps_active_cycle() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(30.0);

    assert!(rig.tick(&mut app, 0).0);
    // Between min and max: the burst continues.
    rig.hw.moisture = 60.0;
    assert!(rig.tick(&mut app, 4).0);
    // Above max: aborted at once.
    rig.hw.moisture = 81.0;
    assert!(!rig.tick(&mut app, 6).0);
    assert_eq!(app.pump_state(), PumpState::Idle);

    // Back in the band from idle: nothing starts.
    rig.hw.moisture = 60.0;
    assert!(!rig.tick(&mut app, 8).0);
}

#[test]
fn manual_mode_overrides_moisture() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(95.0);

    app.handle_command(AppCommand::SetMode(Mode::Manual), &mut rig.sink);
    app.handle_command(AppCommand::SetManualCommand(ManualCommand::On), &mut rig.sink);
    assert_eq!(rig.tick(&mut app, 0), (true, false));
    assert_eq!(rig.display.frames[0].mode, Mode::Manual);

    // Manual runs never time out.
    assert!(rig.tick(&mut app, 600).0);

    app.handle_command(AppCommand::SetManualCommand(ManualCommand::Off), &mut rig.sink);
    rig.hw.moisture = 10.0;
    assert_eq!(rig.tick(&mut app, 602), (false, true));

    // Back to automatic: dry soil starts a fresh cycle.
    app.handle_command(AppCommand::SetMode(Mode::Automatic), &mut rig.sink);
    assert!(rig.tick(&mut app, 604).0);
    assert!(matches!(app.pump_state(), PumpState::Running { .. }));
}

#[test]
fn switching_to_manual_cancels_running_cycle() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(10.0);

    assert!(rig.tick(&mut app, 0).0);
    app.handle_command(AppCommand::SetMode(Mode::Manual), &mut rig.sink);
    assert!(!rig.tick(&mut app, 2).0);
    assert_eq!(app.pump_state(), PumpState::Idle);
}

#[test]
fn telemetry_is_spaced_by_publish_interval() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(50.0);

    for t in 0..=10 {
        rig.tick(&mut app, t);
    }

    let windows = rig
        .sink
        .count(|e| matches!(e, AppEvent::TelemetryPublished { count: 4 }));
    assert_eq!(windows, 3);
    assert_eq!(rig.link.published.len(), 12);
    assert_eq!(
        rig.link.topics()[..4],
        [
            "device/GH-001/sensor/2",
            "device/GH-001/sensor/3",
            "device/GH-001/sensor/1",
            "device/GH-001/actuator/1/actual-status",
        ]
    );
    assert_eq!(rig.link.published[2].payload.as_str(), r#"{"value":"50.0"}"#);
    assert_eq!(rig.link.published[3].payload.as_str(), r#"{"value":"off"}"#);
}

#[test]
fn telemetry_window_is_dropped_while_offline() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(50.0);
    rig.link = MockLink::offline();

    rig.tick(&mut app, 0);
    assert!(rig.link.published.is_empty());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::TelemetryPublished { .. })), 0);

    // The consumed window is not replayed on reconnect.
    rig.link.connected = true;
    rig.tick(&mut app, 1);
    assert!(rig.link.published.is_empty());

    rig.tick(&mut app, 5);
    assert_eq!(rig.link.published.len(), 4);
}

#[test]
fn unavailable_climate_skips_temperature_and_humidity() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(50.0);
    rig.hw.climate = ClimateReading::unavailable();

    rig.tick(&mut app, 0);
    assert_eq!(
        rig.link.topics(),
        ["device/GH-001/sensor/1", "device/GH-001/actuator/1/actual-status"]
    );
    assert_eq!(rig.display.frames[0].temperature_c, 0.0);
}

#[test]
fn adapter_faults_are_reported_not_fatal() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(20.0);
    rig.hw.fail_relay = true;
    rig.link.fail_publish = true;

    let (on, _) = rig.tick(&mut app, 0);
    assert!(on);
    assert!(rig.sink.events.contains(&AppEvent::Fault(Error::Actuator(
        ActuatorError::GpioWriteFailed
    ))));
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::Fault(Error::Comms(CommsError::MqttPublishFailed))),
        4
    );
    assert!(rig.sink.events.contains(&AppEvent::TelemetryPublished { count: 0 }));
    assert!(matches!(rig.sink.events.last(), Some(AppEvent::Cycle(_))));
}

#[test]
fn display_frame_tracks_rule_and_readings() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut rig = Rig::new(35.0);

    rig.tick(&mut app, 0);
    let frame = &rig.display.frames[0];
    assert_eq!(frame.plant_name.as_str(), "Chili");
    assert_eq!(frame.mode, Mode::Automatic);
    assert_eq!(frame.temperature_c, 27.5);
    assert_eq!(frame.moisture_pct, 35.0);
    assert_eq!(frame.threshold, 40);
    assert!(frame.actuator_on);
}
