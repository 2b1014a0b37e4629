//! Pure per-cycle decision logic: the pump state machine and the
//! low-moisture alert.

pub mod actuator;
pub mod alert;
