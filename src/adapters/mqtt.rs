//! MQTT broker adapter.
//!
//! Implements [`TelemetryPort`] for outbound reporting and feeds inbound
//! messages into the [`Inbox`].
//!
//! ```text
//!  broker ──▶ client task ──▶ on_received() ──▶ INBOX ──▶ control loop
//!  control loop ──▶ publish() ──▶ enqueue (retained, QoS 0) ──▶ broker
//! ```
//!
//! The client callback runs on the ESP-IDF MQTT task and only touches
//! atomics and the inbox.  Subscriptions are (re)issued from
//! [`MqttAdapter::poll`] on the control loop after every (re)connect,
//! because the broker forgets them across a clean session.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: in-memory simulation that records publishes
//!   and lets tests inject inbound traffic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use heapless::String;
use log::{debug, info, warn};

use crate::app::inbox::{self, InboundMessage, Inbox};
use crate::app::ports::TelemetryPort;
use crate::app::topics::{TOPIC_CAP, Topics};
use crate::config::fixed;
use crate::error::CommsError;
use crate::telemetry::OutboundMessage;

// ───────────────────────────────────────────────────────────────
// Connection flags shared with the client task
// ───────────────────────────────────────────────────────────────

/// Connection state written by the client callback, read by the loop.
#[derive(Debug, Default)]
pub struct LinkFlags {
    connected: AtomicBool,
    needs_subscribe: AtomicBool,
}

impl LinkFlags {
    pub fn on_connected(&self) {
        self.connected.store(true, Ordering::Release);
        self.needs_subscribe.store(true, Ordering::Release);
    }

    pub fn on_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Claim the pending resubscribe, if any.
    pub fn take_resubscribe(&self) -> bool {
        self.needs_subscribe.swap(false, Ordering::AcqRel)
    }

    /// Put a failed resubscribe back for the next poll.
    pub fn retry_resubscribe(&self) {
        self.needs_subscribe.store(true, Ordering::Release);
    }
}

/// Client-callback side of an inbound message: copy and enqueue.
pub fn on_received(inbox: &Inbox, topic: &str, data: &[u8]) {
    match InboundMessage::new(topic, data) {
        Ok(msg) => {
            // A full inbox is already logged by `post`.
            let _ = inbox::post(inbox, msg);
        }
        Err(e) => warn!("Dropping inbound message on {}: {}", topic, e),
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct MqttAdapter {
    flags: Arc<LinkFlags>,
    subscriptions: [String<TOPIC_CAP>; 3],
    #[cfg(target_os = "espidf")]
    client: esp_idf_svc::mqtt::client::EspMqttClient<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

/// Host-side stand-in for the broker.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimBroker {
    pub published: std::vec::Vec<OutboundMessage>,
    pub subscribed: std::vec::Vec<String<TOPIC_CAP>>,
    pub fail_publish: bool,
}

fn subscription_list(topics: &Topics) -> [String<TOPIC_CAP>; 3] {
    // Topics were built into buffers of this same capacity.
    topics.subscriptions().map(fixed)
}

impl MqttAdapter {
    /// Connect to `url` and start delivering inbound messages to `inbox`.
    #[cfg(target_os = "espidf")]
    pub fn connect(
        url: &str,
        client_id: &str,
        topics: &Topics,
        inbox: &'static Inbox,
    ) -> Result<Self, CommsError> {
        use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};

        let flags = Arc::new(LinkFlags::default());
        let cb_flags = flags.clone();

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            ..Default::default()
        };

        let client = EspMqttClient::new_cb(url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                info!("MQTT: connected");
                cb_flags.on_connected();
            }
            EventPayload::Disconnected => {
                warn!("MQTT: disconnected");
                cb_flags.on_disconnected();
            }
            EventPayload::Received {
                topic: Some(topic),
                data,
                ..
            } => on_received(inbox, topic, data),
            EventPayload::Error(e) => warn!("MQTT: client error {:?}", e),
            _ => {}
        })
        .map_err(|e| {
            warn!("MQTT: client init failed: {}", e);
            CommsError::MqttConnectFailed
        })?;

        info!("MQTT: client started for {}", url);
        Ok(Self {
            flags,
            subscriptions: subscription_list(topics),
            client,
        })
    }

    /// Simulated broker link, initially disconnected.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulated(topics: &Topics) -> Self {
        Self {
            flags: Arc::new(LinkFlags::default()),
            subscriptions: subscription_list(topics),
            sim: SimBroker::default(),
        }
    }

    /// Call once per cycle: (re)subscribes after a (re)connect.
    pub fn poll(&mut self) {
        if !self.flags.is_connected() || !self.flags.take_resubscribe() {
            return;
        }
        if let Err(e) = self.subscribe_all() {
            warn!("MQTT: resubscribe failed ({}), retrying next cycle", e);
            self.flags.retry_resubscribe();
        }
    }

    fn subscribe_all(&mut self) -> Result<(), CommsError> {
        for i in 0..self.subscriptions.len() {
            let topic = self.subscriptions[i].clone();
            self.platform_subscribe(&topic)?;
            debug!("MQTT: subscribed {}", topic);
        }
        info!("MQTT: subscriptions active");
        Ok(())
    }

    pub fn flags(&self) -> &Arc<LinkFlags> {
        &self.flags
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::QoS;
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| CommsError::MqttSubscribeFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        let t = String::try_from(topic).map_err(|_| CommsError::MqttSubscribeFailed)?;
        self.sim.subscribed.push(t);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, msg: &OutboundMessage) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::QoS;
        self.client
            .enqueue(&msg.topic, QoS::AtMostOnce, msg.retain, msg.payload.as_bytes())
            .map(|_| ())
            .map_err(|_| CommsError::MqttPublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, msg: &OutboundMessage) -> Result<(), CommsError> {
        if self.sim.fail_publish {
            return Err(CommsError::MqttPublishFailed);
        }
        self.sim.published.push(msg.clone());
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    pub fn sim(&self) -> &SimBroker {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut SimBroker {
        &mut self.sim
    }

    /// Deliver a message as the client task would.
    pub fn inject(&self, inbox: &Inbox, topic: &str, payload: &[u8]) {
        on_received(inbox, topic, payload);
    }
}

// ───────────────────────────────────────────────────────────────
// TelemetryPort
// ───────────────────────────────────────────────────────────────

impl TelemetryPort for MqttAdapter {
    fn is_connected(&self) -> bool {
        self.flags.is_connected()
    }

    fn publish(&mut self, msg: &OutboundMessage) -> Result<(), CommsError> {
        if !self.flags.is_connected() {
            return Err(CommsError::MqttDisconnected);
        }
        self.platform_publish(msg)
    }
}
