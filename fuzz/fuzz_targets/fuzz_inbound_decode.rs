//! Fuzz target: `inbox::decode`
//!
//! Feeds arbitrary payloads on each of the three inbound topics and asserts
//! the decoder never panics and every accepted rule update stays in range.
//!
//! cargo fuzz run fuzz_inbound_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use siramin::app::commands::AppCommand;
use siramin::app::inbox::{InboundMessage, decode};
use siramin::app::topics::Topics;

fuzz_target!(|data: &[u8]| {
    let Ok(topics) = Topics::new("GH-001", 1) else {
        return;
    };
    let (selector, payload) = match data.split_first() {
        Some((s, rest)) => (*s, rest),
        None => return,
    };
    let topic = topics.subscriptions()[usize::from(selector % 3)];

    let Ok(msg) = InboundMessage::new(topic, payload) else {
        assert!(payload.len() > 512, "small payloads must fit the inbox");
        return;
    };

    if let Ok(AppCommand::UpdateRule(update)) = decode(&topics, &msg) {
        assert!(update.min_moisture.is_none_or(|m| m <= 100));
        assert!(update.max_moisture.is_none_or(|m| m <= 100));
    }
});
