//! Shared runtime state written by inbound messages and read by the control
//! loop.
//!
//! These are the only components touched from more than one execution
//! context (the MQTT callback path writes, the cycle driver reads).  Each
//! store wraps its value in an `embassy-sync` blocking mutex so a reader
//! can never observe a torn update.  Callers only get `apply`/`snapshot`
//! style access; no reference into the guarded value escapes.

pub mod mode;
pub mod rules;
