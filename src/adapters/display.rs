//! Serial-console display adapter.
//!
//! Renders the 128×64 status screen layout as text lines on the log output:
//!
//! ```text
//! Chili           Auto  *
//! 27.5 C          Pump:ON
//! Soil:35% Thr:40%
//! [#######.|...........]
//! ```
//!
//! The `*` is the low-moisture alert icon; it blinks at the configured
//! half-period while the alert is active.  The bar fills with the moisture
//! percentage and `|` marks the threshold.

use core::fmt::Write;

use heapless::String;
use log::{debug, info};

use crate::adapters::time::MonotonicClock;
use crate::app::ports::{DisplayFrame, DisplayPort};
use crate::drivers::alert_blink::AlertBlinker;
use crate::store::mode::Mode;
use crate::store::rules::PLANT_NAME_CAP;

/// Character cells inside the moisture bar.
const BAR_CELLS: usize = 20;

pub type Line = String<40>;

pub struct SerialDisplay {
    clock: MonotonicClock,
    blinker: AlertBlinker,
    frame: Option<DisplayFrame>,
}

impl SerialDisplay {
    pub fn new(blink_half_period_ms: u32) -> Self {
        Self {
            clock: MonotonicClock::new(),
            blinker: AlertBlinker::new(blink_half_period_ms),
            frame: None,
        }
    }

    /// Boot banner, shown once before the first frame.
    pub fn splash(&self) {
        info!("LCD | SIRAMIN");
    }
}

impl DisplayPort for SerialDisplay {
    fn render(&mut self, frame: &DisplayFrame) {
        self.frame = Some(frame.clone());
    }

    fn render_alert(&mut self, active: bool) {
        let icon = self.blinker.tick(self.clock.now_ms(), active);
        if let Some(frame) = &self.frame {
            for line in compose(frame, icon) {
                debug!("LCD | {}", line);
            }
        }
    }
}

/// Lay out one screen.
pub fn compose(frame: &DisplayFrame, alert_icon: bool) -> [Line; 4] {
    let mut lines: [Line; 4] = Default::default();
    let mode = match frame.mode {
        Mode::Automatic => "Auto",
        Mode::Manual => "Manual",
    };
    let icon = if alert_icon { "*" } else { " " };
    let pump = if frame.actuator_on { "ON" } else { "OFF" };

    // Overflow only truncates a line.
    let _ = write!(lines[0], "{:<16}{:<6}{}", capitalize(&frame.plant_name), mode, icon);
    let _ = write!(lines[1], "{:<16}Pump:{}", Temp(frame.temperature_c), pump);
    let _ = write!(lines[2], "Soil:{:.0}% Thr:{}%", frame.moisture_pct, frame.threshold);
    lines[3] = moisture_bar(frame.moisture_pct, frame.threshold);
    lines
}

struct Temp(f32);

impl core::fmt::Display for Temp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s: String<16> = String::new();
        write!(s, "{:.1} C", self.0)?;
        f.pad(&s)
    }
}

/// Lower-case everything, then upper-case the first character.
pub fn capitalize(name: &str) -> String<PLANT_NAME_CAP> {
    let mut out = String::new();
    for (i, c) in name.chars().enumerate() {
        let mapped = if i == 0 {
            c.to_ascii_uppercase()
        } else {
            c.to_ascii_lowercase()
        };
        if out.push(mapped).is_err() {
            break;
        }
    }
    out
}

/// `[####|.....]` with the fill proportional to `moisture_pct` and the
/// threshold marker overlaid.
pub fn moisture_bar(moisture_pct: f32, threshold: u8) -> Line {
    let cells = |pct: f32| ((pct.clamp(0.0, 100.0) / 100.0) * BAR_CELLS as f32) as usize;
    let filled = cells(moisture_pct);
    let marker = cells(f32::from(threshold)).min(BAR_CELLS - 1);

    let mut bar = Line::new();
    let _ = bar.push('[');
    for i in 0..BAR_CELLS {
        let c = if i == marker {
            '|'
        } else if i < filled {
            '#'
        } else {
            '.'
        };
        let _ = bar.push(c);
    }
    let _ = bar.push(']');
    bar
}
