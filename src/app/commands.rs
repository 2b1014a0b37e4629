//! Inbound commands to the application service.
//!
//! Decoded from MQTT messages by [`inbox::decode`](super::inbox::decode) and
//! applied by the [`AppService`](super::service::AppService) before the
//! cycle snapshot is taken.

use crate::store::mode::{ManualCommand, Mode};
use crate::store::rules::PartialRule;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Switch between automatic and manual control.
    SetMode(Mode),

    /// Record the manual pump command (honoured only in manual mode, but
    /// stored regardless).
    SetManualCommand(ManualCommand),

    /// Merge a partial rule into the rule store.
    UpdateRule(PartialRule),
}
