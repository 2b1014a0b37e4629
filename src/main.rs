//! Siramin firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter    SerialDisplay   MqttAdapter   WifiAdapter│
//! │  (Sensor+Actuator)  (Display)       (Telemetry)              │
//! │  LogEventSink       MonotonicClock                           │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              AppService (pure logic)                   │  │
//! │  │  Pump controller · Alert · Telemetry gate              │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  MQTT callback ──▶ INBOX ──▶ drain_inbox (before each tick)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use heapless::String;
use log::{info, warn};

use siramin::adapters::display::SerialDisplay;
use siramin::adapters::hardware::HardwareAdapter;
use siramin::adapters::log_sink::LogEventSink;
use siramin::adapters::mqtt::MqttAdapter;
use siramin::adapters::time::MonotonicClock;
use siramin::adapters::wifi::WifiAdapter;
use siramin::app::inbox::INBOX;
use siramin::app::service::AppService;
use siramin::config::SystemConfig;
use siramin::drivers::relay::RelayDriver;
use siramin::drivers::soil_adc::{SOIL_CHANNEL, SoilAdc};
use siramin::sensors::SensorHub;
use siramin::sensors::dht22::Dht22;
use siramin::store::mode::ModeRegister;
use siramin::store::rules::RuleStore;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Siramin v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;
    config.validate()?;
    let clock = MonotonicClock::new();

    // ── 3. Peripherals + WiFi ─────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?,
        sys_loop,
    )?);
    match (option_env!("SIRAMIN_WIFI_SSID"), option_env!("SIRAMIN_WIFI_PASSWORD")) {
        (Some(ssid), Some(password)) => {
            wifi.set_credentials(ssid, password)?;
            if let Err(e) = wifi.connect(clock.now()) {
                warn!("WiFi: initial connect failed ({}), retrying in background", e);
            }
        }
        _ => warn!("WiFi: no credentials built in, running offline"),
    }

    // ── 4. Hardware ───────────────────────────────────────────
    let relay = RelayDriver::new(PinDriver::output(peripherals.pins.gpio33)?)?;
    let soil = SoilAdc::new(SOIL_CHANNEL)?;
    let climate = Dht22::new(PinDriver::input_output_od(peripherals.pins.gpio23)?, Ets);
    let mut hw = HardwareAdapter::new(SensorHub::new(soil, climate), relay);

    let mut display = SerialDisplay::new(config.alert_blink_ms);
    display.splash();
    let mut log_sink = LogEventSink::new();

    // ── 5. App service + broker link ──────────────────────────
    let rules = RuleStore::default();
    let modes = ModeRegister::new();
    let mut app = AppService::new(&config, &rules, &modes)?;

    let mut mqtt = MqttAdapter::connect(
        &config.mqtt_url()?,
        &config.mqtt_client_id,
        app.topics(),
        &INBOX,
    )?;

    app.start(&mut hw, &mut log_sink);
    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now = clock.now();
        wifi.poll(now);
        mqtt.poll();

        app.drain_inbox(&INBOX, &mut log_sink);
        app.tick(now, &mut hw, &mut display, &mut mqtt, &mut log_sink);

        FreeRtos::delay_ms(config.control_loop_interval_ms);
    }
}

/// Defaults plus build-time overrides.
fn load_config() -> Result<SystemConfig> {
    let mut config = SystemConfig::default();
    if let Some(host) = option_env!("SIRAMIN_MQTT_HOST") {
        config.mqtt_host = String::new();
        config
            .mqtt_host
            .push_str(host)
            .map_err(|()| anyhow!("SIRAMIN_MQTT_HOST longer than 64 bytes"))?;
        info!("Config: broker host overridden to {}", config.mqtt_host);
    }
    Ok(config)
}
