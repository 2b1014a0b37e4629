//! Inbound message queue and decoding.
//!
//! The MQTT client callback runs on the client's own task.  It never
//! touches the stores: it copies the message into an [`InboundMessage`] and
//! [`post`]s it to a bounded channel.  The control loop drains the channel
//! at the start of each cycle and turns every message into an
//! [`AppCommand`] with [`decode`].
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │ MQTT callback│─────────────────▶│ Control loop │
//! │  (try_send)  │     INBOX (8)    │ (try_receive)│
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};
use log::warn;
use serde_json::{Map, Value};

use super::commands::AppCommand;
use super::topics::{InboundTopic, TOPIC_CAP, Topics};
use crate::config::fixed;
use crate::error::{CommsError, MessageError};
use crate::store::mode::{ManualCommand, Mode};
use crate::store::rules::{PLANT_NAME_CAP, PartialRule};

/// Largest payload accepted from the broker.
pub const PAYLOAD_CAP: usize = 512;

/// Inbox depth.
const INBOX_DEPTH: usize = 8;

/// One message as received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<TOPIC_CAP>,
    pub payload: Vec<u8, PAYLOAD_CAP>,
}

impl InboundMessage {
    pub fn new(topic: &str, payload: &[u8]) -> Result<Self, MessageError> {
        Ok(Self {
            topic: String::try_from(topic).map_err(|_| MessageError::TooLarge)?,
            payload: Vec::from_slice(payload).map_err(|_| MessageError::TooLarge)?,
        })
    }
}

pub type Inbox = Channel<CriticalSectionRawMutex, InboundMessage, INBOX_DEPTH>;

/// Transport callback → control loop.
pub static INBOX: Inbox = Channel::new();

/// Enqueue without blocking.  When the queue is full the new message is
/// dropped.
pub fn post(inbox: &Inbox, msg: InboundMessage) -> Result<(), CommsError> {
    inbox.try_send(msg).map_err(|_| {
        warn!("Inbox full, dropping inbound message");
        CommsError::InboxFull
    })
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Turn an inbound message into a command for the service.
pub fn decode(topics: &Topics, msg: &InboundMessage) -> Result<AppCommand, MessageError> {
    let kind = topics
        .classify(&msg.topic)
        .ok_or(MessageError::UnknownTopic)?;

    match kind {
        InboundTopic::Mode => decode_mode(&msg.payload).map(AppCommand::SetMode),
        InboundTopic::Status => decode_status(&msg.payload).map(AppCommand::SetManualCommand),
        InboundTopic::Rule => decode_rule(&msg.payload).map(AppCommand::UpdateRule),
    }
}

/// Bare `auto` / `manual`, or `{"value":"auto"|"manual"}`.
fn decode_mode(payload: &[u8]) -> Result<Mode, MessageError> {
    match serde_json::from_slice::<Value>(payload) {
        Ok(doc) => Mode::from_wire(value_field(&doc)?),
        Err(_) => {
            let text = core::str::from_utf8(payload).map_err(|_| MessageError::UnknownMode)?;
            Mode::from_wire(text)
        }
    }
}

/// `{"value":"on"|"off"}`.
fn decode_status(payload: &[u8]) -> Result<ManualCommand, MessageError> {
    let doc: Value = serde_json::from_slice(payload).map_err(|_| MessageError::MalformedJson)?;
    ManualCommand::from_wire(value_field(&doc)?)
}

fn value_field(doc: &Value) -> Result<&str, MessageError> {
    doc.as_object()
        .ok_or(MessageError::NotAnObject)?
        .get("value")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingValue)
}

/// A JSON object whose fields are each applied independently.
///
/// Ill-typed or out-of-range fields are dropped with a warning; the
/// remaining fields still apply.
fn decode_rule(payload: &[u8]) -> Result<PartialRule, MessageError> {
    let doc: Value = serde_json::from_slice(payload).map_err(|_| MessageError::MalformedJson)?;
    let obj = doc.as_object().ok_or(MessageError::NotAnObject)?;

    Ok(PartialRule {
        min_moisture: take_field(obj, "min_moisture", percent),
        max_moisture: take_field(obj, "max_moisture", percent),
        plant_name: take_field(obj, "plant_name", plant_name),
        preferred_humidity: take_field(obj, "preferred_humidity", integer),
        preferred_temp: take_field(obj, "preferred_temp", integer),
    })
}

fn take_field<T>(
    obj: &Map<std::string::String, Value>,
    key: &str,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let raw = obj.get(key)?;
    let value = convert(raw);
    if value.is_none() {
        warn!("Rule field '{}' ignored: unusable value {}", key, raw);
    }
    value
}

fn percent(v: &Value) -> Option<u8> {
    v.as_u64()
        .filter(|p| *p <= 100)
        .and_then(|p| u8::try_from(p).ok())
}

fn integer(v: &Value) -> Option<i32> {
    v.as_i64().and_then(|n| i32::try_from(n).ok())
}

/// Any string is accepted; names over the buffer are cut at a char boundary.
fn plant_name(v: &Value) -> Option<String<PLANT_NAME_CAP>> {
    let s = v.as_str()?;
    let name = fixed(s);
    if name.len() < s.len() {
        warn!("Rule field 'plant_name' truncated to {} bytes: '{}'", PLANT_NAME_CAP, name);
    }
    Some(name)
}
