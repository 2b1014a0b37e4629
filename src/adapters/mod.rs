//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements      | Connects to                   |
//! |-------------|-----------------|-------------------------------|
//! | `hardware`  | SensorPort      | Soil ADC, DHT22 data pin      |
//! |             | ActuatorPort    | Pump relay GPIO               |
//! | `display`   | DisplayPort     | Status screen (serial render) |
//! | `log_sink`  | EventSink       | Serial log output             |
//! | `mqtt`      | TelemetryPort   | ESP-IDF MQTT client           |
//! | `wifi`      |                 | ESP-IDF WiFi STA              |
//! | `time`      |                 | ESP32 system timer            |

pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
