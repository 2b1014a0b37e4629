//! Blink cadence for the low-moisture alert icon.
//!
//! While the alert is active the icon toggles every `half_period_ms`; when
//! it clears the icon is hidden at once and the phase resets, so the next
//! alert always starts visible.

pub struct AlertBlinker {
    half_period_ms: u64,
    visible: bool,
    last_toggle_ms: Option<u64>,
}

impl AlertBlinker {
    pub fn new(half_period_ms: u32) -> Self {
        Self {
            half_period_ms: u64::from(half_period_ms),
            visible: false,
            last_toggle_ms: None,
        }
    }

    /// Advance to `now_ms` and return whether the icon is shown.
    pub fn tick(&mut self, now_ms: u64, active: bool) -> bool {
        if !active {
            self.visible = false;
            self.last_toggle_ms = None;
            return false;
        }

        match self.last_toggle_ms {
            None => {
                self.visible = true;
                self.last_toggle_ms = Some(now_ms);
            }
            Some(last) if now_ms.saturating_sub(last) >= self.half_period_ms => {
                self.visible = !self.visible;
                self.last_toggle_ms = Some(now_ms);
            }
            Some(_) => {}
        }
        self.visible
    }
}
