//! Irrigation rule and its store.
//!
//! The rule arrives from the operator as a partial JSON object on
//! `device/{code}/rule`.  Field-level validation happens in the decoder
//! ([`crate::app::inbox`]); by the time a [`PartialRule`] reaches
//! [`RuleStore::apply_update`] every present field is well typed, so the
//! merge itself cannot fail.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::String;
use serde::{Deserialize, Serialize};

use crate::config::fixed;

/// Maximum stored plant-name length in bytes.
pub const PLANT_NAME_CAP: usize = 32;

/// The active irrigation rule.
///
/// `min_moisture <= max_moisture` is expected but not enforced: the
/// controller behaves sanely on an inverted pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Start watering below this moisture percentage.
    pub min_moisture: u8,
    /// Abort any watering cycle above this moisture percentage.
    pub max_moisture: u8,
    pub plant_name: String<PLANT_NAME_CAP>,
    /// Informational; not used by the controller.
    pub preferred_humidity: i32,
    /// Informational; not used by the controller.
    pub preferred_temp: i32,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            min_moisture: 40,
            max_moisture: 80,
            plant_name: fixed("Chili"),
            preferred_humidity: 70,
            preferred_temp: 25,
        }
    }
}

/// A rule update where every field is optional.
///
/// `None` means "absent or ill-typed on the wire", in both cases the stored
/// value is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRule {
    pub min_moisture: Option<u8>,
    pub max_moisture: Option<u8>,
    pub plant_name: Option<String<PLANT_NAME_CAP>>,
    pub preferred_humidity: Option<i32>,
    pub preferred_temp: Option<i32>,
}

impl PartialRule {
    /// True if the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.min_moisture.is_none()
            && self.max_moisture.is_none()
            && self.plant_name.is_none()
            && self.preferred_humidity.is_none()
            && self.preferred_temp.is_none()
    }
}

impl Rule {
    /// Overwrite every field present in `update`.
    pub fn merge(&mut self, update: &PartialRule) {
        if let Some(v) = update.min_moisture {
            self.min_moisture = v;
        }
        if let Some(v) = update.max_moisture {
            self.max_moisture = v;
        }
        if let Some(v) = &update.plant_name {
            self.plant_name = v.clone();
        }
        if let Some(v) = update.preferred_humidity {
            self.preferred_humidity = v;
        }
        if let Some(v) = update.preferred_temp {
            self.preferred_temp = v;
        }
    }

    /// True if the thresholds form a usable band.
    pub fn is_consistent(&self) -> bool {
        self.min_moisture <= self.max_moisture
    }
}

/// Process-lifetime holder of the current [`Rule`].
pub struct RuleStore {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Rule>>,
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(Rule::default())
    }
}

impl RuleStore {
    pub fn new(initial: Rule) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(initial)),
        }
    }

    /// Merge `update` into the stored rule and return the result.
    ///
    /// The whole merge happens inside one critical section.
    pub fn apply_update(&self, update: &PartialRule) -> Rule {
        self.inner.lock(|cell| {
            let mut rule = cell.borrow_mut();
            rule.merge(update);
            rule.clone()
        })
    }

    /// Immutable copy of the current rule.
    pub fn snapshot(&self) -> Rule {
        self.inner.lock(|cell| cell.borrow().clone())
    }
}
