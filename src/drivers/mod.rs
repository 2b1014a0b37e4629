//! Output-side and bus drivers.

pub mod alert_blink;
pub mod relay;
#[cfg(target_os = "espidf")]
pub mod soil_adc;
