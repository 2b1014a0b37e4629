//! Inbound messages: broker callback → inbox → stores → next cycle.

use embassy_time::Instant;
use siramin::adapters::mqtt::MqttAdapter;
use siramin::app::events::AppEvent;
use siramin::app::inbox::{InboundMessage, Inbox, post};
use siramin::app::service::AppService;
use siramin::config::SystemConfig;
use siramin::error::{CommsError, MessageError};
use siramin::store::mode::{ManualCommand, Mode, ModeRegister};
use siramin::store::rules::{Rule, RuleStore};

use crate::mock_hw::{MockDisplay, MockHw, MockLink, RecordingSink};

const MODE: &str = "device/GH-001/actuator/1/mode";
const STATUS: &str = "device/GH-001/actuator/1/status";
const RULE: &str = "device/GH-001/rule";

#[test]
fn broker_messages_update_stores() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mqtt = MqttAdapter::simulated(app.topics());
    let inbox = Inbox::new();
    let mut sink = RecordingSink::default();

    mqtt.inject(&inbox, MODE, br#"{"value":"manual"}"#);
    mqtt.inject(&inbox, STATUS, br#"{"value":"on"}"#);
    mqtt.inject(
        &inbox,
        RULE,
        br#"{"plant_name":"tomato","min_moisture":30,"max_moisture":70}"#,
    );

    assert_eq!(app.drain_inbox(&inbox, &mut sink), 3);
    let snap = modes.snapshot();
    assert_eq!(snap.mode, Mode::Manual);
    assert_eq!(snap.command, ManualCommand::On);

    let rule = rules.snapshot();
    assert_eq!(rule.plant_name.as_str(), "tomato");
    assert_eq!((rule.min_moisture, rule.max_moisture), (30, 70));

    assert!(sink.events.contains(&AppEvent::ModeChanged {
        from: Mode::Automatic,
        to: Mode::Manual,
    }));
    assert!(sink.events.contains(&AppEvent::RuleUpdated(rule)));
}

#[test]
fn partial_rule_keeps_other_fields() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let inbox = Inbox::new();
    let mut sink = RecordingSink::default();

    post(&inbox, InboundMessage::new(RULE, br#"{"min_moisture":30}"#).unwrap()).unwrap();
    app.drain_inbox(&inbox, &mut sink);

    let expected = Rule {
        min_moisture: 30,
        ..Rule::default()
    };
    assert_eq!(rules.snapshot(), expected);
}

#[test]
fn bad_rule_fields_are_dropped_individually() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let inbox = Inbox::new();
    let mut sink = RecordingSink::default();

    let payload = br#"{"min_moisture":150,"max_moisture":"high","preferred_temp":28}"#;
    post(&inbox, InboundMessage::new(RULE, payload).unwrap()).unwrap();
    app.drain_inbox(&inbox, &mut sink);

    let rule = rules.snapshot();
    assert_eq!(rule.min_moisture, 40);
    assert_eq!(rule.max_moisture, 80);
    assert_eq!(rule.preferred_temp, 28);
}

#[test]
fn malformed_messages_leave_state_untouched() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let inbox = Inbox::new();
    let mut sink = RecordingSink::default();

    let bad: [(&str, &[u8]); 5] = [
        (STATUS, b"on"),
        (STATUS, br#"{"value":"maybe"}"#),
        (MODE, b"Auto "),
        (RULE, b"[30, 70]"),
        ("device/OTHER/rule", br#"{"min_moisture":10}"#),
    ];
    for (topic, payload) in bad {
        post(&inbox, InboundMessage::new(topic, payload).unwrap()).unwrap();
    }

    assert_eq!(app.drain_inbox(&inbox, &mut sink), 0);
    assert_eq!(modes.snapshot().mode, Mode::Automatic);
    assert_eq!(modes.snapshot().command, ManualCommand::Off);
    assert_eq!(rules.snapshot(), Rule::default());

    let rejected: Vec<MessageError> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::MessageRejected(err) => Some(*err),
            _ => None,
        })
        .collect();
    // The foreign topic is ignored silently.
    assert_eq!(
        rejected,
        [
            MessageError::MalformedJson,
            MessageError::UnknownCommand,
            MessageError::UnknownMode,
            MessageError::NotAnObject,
        ]
    );
}

#[test]
fn bare_mode_literal_is_accepted() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let inbox = Inbox::new();
    let mut sink = RecordingSink::default();

    post(&inbox, InboundMessage::new(MODE, b"manual").unwrap()).unwrap();
    app.drain_inbox(&inbox, &mut sink);
    assert_eq!(modes.snapshot().mode, Mode::Manual);

    // Re-sending the current mode is applied but not announced.
    post(&inbox, InboundMessage::new(MODE, b"manual").unwrap()).unwrap();
    assert_eq!(app.drain_inbox(&inbox, &mut sink), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ModeChanged { .. })), 1);
}

#[test]
fn full_inbox_drops_newest() {
    let inbox = Inbox::new();
    for _ in 0..8 {
        post(&inbox, InboundMessage::new(MODE, b"auto").unwrap()).unwrap();
    }
    let overflow = InboundMessage::new(MODE, b"manual").unwrap();
    assert_eq!(post(&inbox, overflow), Err(CommsError::InboxFull));

    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let mut sink = RecordingSink::default();
    assert_eq!(app.drain_inbox(&inbox, &mut sink), 8);
    assert_eq!(modes.snapshot().mode, Mode::Automatic);
}

#[test]
fn updates_apply_before_the_next_cycle() {
    let config = SystemConfig::default();
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes).unwrap();
    let inbox = Inbox::new();
    let mut hw = MockHw::new(30.0);
    let mut display = MockDisplay::default();
    let mut link = MockLink::connected();
    let mut sink = RecordingSink::default();

    // 30% is dry under the default rule, but not under the new one.
    post(&inbox, InboundMessage::new(RULE, br#"{"min_moisture":20}"#).unwrap()).unwrap();
    app.drain_inbox(&inbox, &mut sink);
    let report = app.tick(Instant::from_secs(0), &mut hw, &mut display, &mut link, &mut sink);

    assert!(!report.actuator_on);
    assert!(!report.alert);
    assert_eq!(report.rule.min_moisture, 20);
    assert_eq!(display.frames[0].threshold, 20);
}
