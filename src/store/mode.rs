//! Operating mode register.
//!
//! Holds the `(mode, manual command)` pair.  The manual command is recorded
//! even while the register is in [`Mode::Automatic`] so an operator can
//! pre-arm the state the pump should take once manual mode is selected.

use core::cell::Cell;
use core::fmt;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

use crate::error::MessageError;

/// Who decides whether the pump runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The moisture state machine decides.
    Automatic,
    /// The operator's [`ManualCommand`] decides.
    Manual,
}

impl Mode {
    /// Parse the wire spelling (`auto` / `manual`).
    pub fn from_wire(s: &str) -> Result<Self, MessageError> {
        match s {
            "auto" => Ok(Self::Automatic),
            "manual" => Ok(Self::Manual),
            _ => Err(MessageError::UnknownMode),
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Automatic => "auto",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "Auto"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

/// Desired relay state while in [`Mode::Manual`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualCommand {
    On,
    Off,
}

impl ManualCommand {
    /// Parse the wire spelling (`on` / `off`).
    pub fn from_wire(s: &str) -> Result<Self, MessageError> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(MessageError::UnknownCommand),
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

/// A `(mode, command)` pair observed at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSnapshot {
    pub mode: Mode,
    pub command: ManualCommand,
}

impl Default for ModeSnapshot {
    fn default() -> Self {
        Self {
            mode: Mode::Automatic,
            command: ManualCommand::Off,
        }
    }
}

/// Process-lifetime holder of the operating mode.
pub struct ModeRegister {
    inner: Mutex<CriticalSectionRawMutex, Cell<ModeSnapshot>>,
}

impl Default for ModeRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeRegister {
    /// Starts in [`Mode::Automatic`] with the manual command [`ManualCommand::Off`].
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(ModeSnapshot {
                mode: Mode::Automatic,
                command: ManualCommand::Off,
            })),
        }
    }

    /// Returns the previous mode.
    pub fn set_mode(&self, mode: Mode) -> Mode {
        self.inner.lock(|cell| {
            let mut snap = cell.get();
            let prev = snap.mode;
            snap.mode = mode;
            cell.set(snap);
            prev
        })
    }

    /// Returns the previous command.
    pub fn set_manual_command(&self, command: ManualCommand) -> ManualCommand {
        self.inner.lock(|cell| {
            let mut snap = cell.get();
            let prev = snap.command;
            snap.command = command;
            cell.set(snap);
            prev
        })
    }

    pub fn snapshot(&self) -> ModeSnapshot {
        self.inner.lock(Cell::get)
    }
}
