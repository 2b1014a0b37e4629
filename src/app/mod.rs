//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the Siramin controller:
//! inbound message decoding, command application, and per-cycle
//! orchestration of the pump state machine, alert and telemetry gate.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod inbox;
pub mod ports;
pub mod service;
pub mod topics;
