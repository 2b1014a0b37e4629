//! Low-moisture alert.
//!
//! Recomputed fresh every cycle with no hysteresis of its own; any blink
//! cadence is the display's business (see
//! [`AlertBlinker`](crate::drivers::alert_blink::AlertBlinker)).

use crate::sensors::soil::MoistureReading;

/// `true` iff `moisture` is strictly below `threshold` (the rule's
/// `min_moisture`).
pub fn evaluate(moisture: MoistureReading, threshold: u8) -> bool {
    moisture.is_below(threshold)
}
