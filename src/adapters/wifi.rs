//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter waits an exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s) before retrying.  [`WifiAdapter::poll`] is called
//! from the control loop and never blocks while waiting out a backoff.

use embassy_time::{Duration, Instant};
use heapless::String;
use log::{error, info, warn};

use crate::error::{CommsError, ConfigError};

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32, retry_at: Instant },
}

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConfigError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConfigError::ValidationFailed("wifi_ssid"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConfigError> {
    // Empty means an open network; otherwise WPA2 length rules.
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(ConfigError::ValidationFailed("wifi_password"));
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: String<32>,
    password: String<64>,
    backoff_secs: u64,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    /// Simulation: remaining connect attempts that should fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
    /// Simulation: whether the access point is reachable.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    ) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: String::new(),
            password: String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: String::new(),
            password: String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            sim_failures: 0,
            sim_link_up: true,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConfigError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConfigError::ValidationFailed("wifi_ssid"))?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConfigError::ValidationFailed("wifi_password"))?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    /// First connection attempt.  On failure the adapter enters
    /// reconnecting and [`poll`](Self::poll) takes over.
    pub fn connect(&mut self, now: Instant) -> Result<(), CommsError> {
        if self.ssid.is_empty() {
            return Err(CommsError::WifiConnectFailed);
        }
        info!("WiFi: connecting to '{}'", self.ssid);
        self.attempt(now, 0)
    }

    /// Drive the reconnect state machine.  Cheap when connected.
    pub fn poll(&mut self, now: Instant) {
        match self.state {
            WifiState::Connected if !self.platform_is_connected() => {
                warn!("WiFi: connection lost, entering reconnect");
                self.backoff_secs = INITIAL_BACKOFF_SECS;
                self.schedule_retry(now, 0);
            }
            WifiState::Reconnecting { attempt, retry_at } if now >= retry_at => {
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt + 1, self.backoff_secs);
                if self.attempt(now, attempt + 1).is_err() {
                    self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    self.schedule_retry(now, attempt + 1);
                }
            }
            _ => {}
        }
    }

    fn attempt(&mut self, now: Instant, attempt: u32) -> Result<(), CommsError> {
        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                self.backoff_secs = INITIAL_BACKOFF_SECS;
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.schedule_retry(now, attempt);
                Err(e)
            }
        }
    }

    fn schedule_retry(&mut self, now: Instant, attempt: u32) {
        self.state = WifiState::Reconnecting {
            attempt,
            retry_at: now + Duration::from_secs(self.backoff_secs),
        };
    }

    /// Current reconnect delay.
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| CommsError::WifiConnectFailed)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| CommsError::WifiConnectFailed)?,
            auth_method,
            ..Default::default()
        });

        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi(espidf): {}", e);
            CommsError::WifiConnectFailed
        };
        self.wifi.set_configuration(&conf).map_err(fail)?;
        if !self.wifi.is_started().map_err(fail)? {
            self.wifi.start().map_err(fail)?;
        }
        self.wifi.connect().map_err(fail)?;
        self.wifi.wait_netif_up().map_err(fail)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if !self.sim_link_up || self.sim_failures > 0 {
            self.sim_failures = self.sim_failures.saturating_sub(1);
            return Err(CommsError::WifiConnectFailed);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    /// Make the next `n` connect attempts fail.
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures = n;
    }

    pub fn sim_set_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
