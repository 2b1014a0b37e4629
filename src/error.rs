//! Unified error types for the Siramin firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform.  All variants are `Copy`
//! so they can be passed through events and logs without allocation.
//!
//! None of these are fatal to the control loop: every error is either
//! corrected on the next valid input or logged and ignored.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// The relay could not be driven.
    Actuator(ActuatorError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// An inbound configuration message was rejected.
    Message(MessageError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Message(e) => write!(f, "message: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The ADC unit or channel could not be configured (ESP-IDF return code).
    AdcInitFailed(i32),
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read or write on the sensor bus failed.
    GpioFailed,
    /// The sensor did not answer within the protocol deadline.
    Timeout,
    /// The received frame failed its checksum.
    ChecksumMismatch,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC init failed (rc={rc})"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::Timeout => write!(f, "sensor timed out"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
        }
    }
}

impl core::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl core::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    MqttConnectFailed,
    MqttDisconnected,
    MqttPublishFailed,
    MqttSubscribeFailed,
    /// The inbound queue was full and a message was dropped.
    InboxFull,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::MqttConnectFailed => write!(f, "MQTT connect failed"),
            Self::MqttDisconnected => write!(f, "MQTT disconnected"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
            Self::MqttSubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::InboxFull => write!(f, "inbound queue full"),
        }
    }
}

impl core::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Inbound message errors
// ---------------------------------------------------------------------------

/// Why an inbound configuration message was rejected as a whole.
///
/// Per-field problems inside an otherwise valid rule update are not errors:
/// the offending field is dropped and the rest is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// Topic does not belong to this device.
    UnknownTopic,
    /// Topic or payload exceeded the inbox buffer.
    TooLarge,
    /// Payload is not valid UTF-8 / JSON.
    MalformedJson,
    /// JSON document is not an object.
    NotAnObject,
    /// Structured payload lacks a string `value` field.
    MissingValue,
    /// Mode value is neither `auto` nor `manual`.
    UnknownMode,
    /// Command value is neither `on` nor `off`.
    UnknownCommand,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTopic => write!(f, "unknown topic"),
            Self::TooLarge => write!(f, "message too large"),
            Self::MalformedJson => write!(f, "malformed JSON"),
            Self::NotAnObject => write!(f, "JSON payload is not an object"),
            Self::MissingValue => write!(f, "missing 'value' field"),
            Self::UnknownMode => write!(f, "unknown mode value"),
            Self::UnknownCommand => write!(f, "unknown status value"),
        }
    }
}

impl core::error::Error for MessageError {}

impl From<MessageError> for Error {
    fn from(e: MessageError) -> Self {
        Self::Message(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` names the field.
    ValidationFailed(&'static str),
    /// A derived string (topic, URL) does not fit its fixed buffer.
    CapacityExceeded(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(field) => write!(f, "validation failed: {}", field),
            Self::CapacityExceeded(what) => write!(f, "{} exceeds buffer capacity", what),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
