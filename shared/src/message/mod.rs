//! Message bus types shared between table-server and clients
//!
//! Two directions flow over the bus:
//!
//! - **intents** (client -> server): quantity adjustments, submissions and
//!   status requests for one table;
//! - **events** (server -> client): topic-addressed broadcasts with the
//!   `{ event_type, payload }` envelope, where `payload` is itself
//!   serialized JSON.
//!
//! Topics are `table/{table_id}` (one per table) plus the global `kitchen`
//! topic. Delivery is at-least-once and ordered per topic; nothing is
//! buffered across disconnects, so a reconnecting client must request a
//! fresh status instead of replaying events.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Wire protocol version, carried in the hello frame
pub const PROTOCOL_VERSION: u16 = 1;

/// A broadcast topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Per-table topic: everyone seated at the table
    Table(i64),
    /// Global kitchen topic: staff dashboards
    Kitchen,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Table(id) => write!(f, "table/{}", id),
            Topic::Kitchen => write!(f, "kitchen"),
        }
    }
}

impl Topic {
    /// Parse a topic name as it appears in hello frames
    pub fn parse(s: &str) -> Option<Topic> {
        if s == "kitchen" {
            return Some(Topic::Kitchen);
        }
        s.strip_prefix("table/")
            .and_then(|id| id.parse().ok())
            .map(Topic::Table)
    }
}

/// Broadcast event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Pending order changed (table topic, on every accepted adjust)
    UpdateTemp,
    /// Order submitted (table topic and kitchen topic)
    OrderSent,
    /// Operation rejected; payload carries code + message (table topic)
    Error,
    /// A kitchen ticket line's delivered flag flipped (kitchen topic)
    ConsegnaChanged,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::UpdateTemp => write!(f, "UPDATE_TEMP"),
            EventKind::OrderSent => write!(f, "ORDER_SENT"),
            EventKind::Error => write!(f, "ERROR"),
            EventKind::ConsegnaChanged => write!(f, "CONSEGNA_CHANGED"),
        }
    }
}

/// Topic-addressed event envelope: `payload` is serialized JSON so that
/// transports and the bus never need to know the concrete payload types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub topic: String,
    pub event_type: EventKind,
    pub payload: String,
}

impl TopicMessage {
    pub fn new<T: Serialize>(topic: &Topic, event_type: EventKind, payload: &T) -> Self {
        Self {
            topic: topic.to_string(),
            event_type,
            payload: serde_json::to_string(payload).expect("event payload serialization"),
        }
    }

    pub fn update_temp(topic: &Topic, payload: &UpdateTempPayload) -> Self {
        Self::new(topic, EventKind::UpdateTemp, payload)
    }

    pub fn order_sent(topic: &Topic, payload: &OrderSentPayload) -> Self {
        Self::new(topic, EventKind::OrderSent, payload)
    }

    pub fn error(topic: &Topic, payload: &ErrorPayload) -> Self {
        Self::new(topic, EventKind::Error, payload)
    }

    pub fn consegna_changed(topic: &Topic, payload: &ConsegnaChangedPayload) -> Self {
        Self::new(topic, EventKind::ConsegnaChanged, payload)
    }

    /// Parse the inner payload as the given type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// Client request verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    /// Increase a product quantity in the pending order
    AddItemTemp,
    /// Decrease a product quantity in the pending order
    RemoveItemTemp,
    /// Submit the pending order
    OrderSent,
    /// Ask for a fresh status broadcast (resync after (re)connect)
    GetStatus,
}

/// Client -> server request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMessage {
    /// For tracing; the server logs it on every dispatch
    pub request_id: Uuid,
    pub table_id: i64,
    pub kind: IntentKind,
    pub payload: String,
}

impl IntentMessage {
    pub fn new<T: Serialize>(table_id: i64, kind: IntentKind, payload: &T) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            table_id,
            kind,
            payload: serde_json::to_string(payload).expect("intent payload serialization"),
        }
    }

    pub fn add_item(table_id: i64, payload: &AdjustItemPayload) -> Self {
        Self::new(table_id, IntentKind::AddItemTemp, payload)
    }

    pub fn remove_item(table_id: i64, payload: &AdjustItemPayload) -> Self {
        Self::new(table_id, IntentKind::RemoveItemTemp, payload)
    }

    pub fn submit(table_id: i64) -> Self {
        Self::new(table_id, IntentKind::OrderSent, &())
    }

    pub fn get_status(table_id: i64) -> Self {
        Self::new(table_id, IntentKind::GetStatus, &())
    }

    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// First frame a network client sends: protocol version plus the topics it
/// wants forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelloFrame {
    pub version: u16,
    pub client_name: Option<String>,
    pub topics: Vec<String>,
}

/// One frame on a network transport: 1-byte kind + 4-byte LE length + JSON
/// body. Encode/decode live here; the transports own the I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Hello(HelloFrame),
    Intent(IntentMessage),
    Event(TopicMessage),
}

impl Frame {
    pub fn kind(&self) -> u8 {
        match self {
            Frame::Hello(_) => 0,
            Frame::Intent(_) => 1,
            Frame::Event(_) => 2,
        }
    }

    /// Serialize the frame body (kind byte and length prefix are written by
    /// the transport)
    pub fn body(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Frame::Hello(h) => serde_json::to_vec(h),
            Frame::Intent(i) => serde_json::to_vec(i),
            Frame::Event(e) => serde_json::to_vec(e),
        }
    }

    /// Decode a frame from its kind byte and body
    pub fn decode(kind: u8, body: &[u8]) -> Result<Frame, FrameError> {
        match kind {
            0 => Ok(Frame::Hello(serde_json::from_slice(body)?)),
            1 => Ok(Frame::Intent(serde_json::from_slice(body)?)),
            2 => Ok(Frame::Event(serde_json::from_slice(body)?)),
            other => Err(FrameError::UnknownKind(other)),
        }
    }
}

/// Frame decoding failure
#[derive(Debug)]
pub enum FrameError {
    UnknownKind(u8),
    Body(serde_json::Error),
}

impl From<serde_json::Error> for FrameError {
    fn from(e: serde_json::Error) -> Self {
        FrameError::Body(e)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::UnknownKind(k) => write!(f, "unknown frame kind: {}", k),
            FrameError::Body(e) => write!(f, "frame body: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn topic_display_and_parse_round_trip() {
        assert_eq!(Topic::Table(7).to_string(), "table/7");
        assert_eq!(Topic::parse("table/7"), Some(Topic::Table(7)));
        assert_eq!(Topic::parse("kitchen"), Some(Topic::Kitchen));
        assert_eq!(Topic::parse("tables/7"), None);
    }

    #[test]
    fn event_kind_serializes_as_wire_names() {
        assert_eq!(
            serde_json::to_string(&EventKind::UpdateTemp).unwrap(),
            "\"UPDATE_TEMP\""
        );
        assert_eq!(
            serde_json::to_string(&EventKind::ConsegnaChanged).unwrap(),
            "\"CONSEGNA_CHANGED\""
        );
    }

    #[test]
    fn update_temp_payload_round_trips_through_envelope() {
        let mut pending = BTreeMap::new();
        pending.insert(3_i64, 2_u32);
        let payload = UpdateTempPayload {
            pending_order: pending.clone(),
            last_submitted_at: Some(1000),
            remaining_secs: 890,
        };
        let msg = TopicMessage::update_temp(&Topic::Table(4), &payload);
        assert_eq!(msg.topic, "table/4");
        let parsed: UpdateTempPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.pending_order, pending);
        assert_eq!(parsed.remaining_secs, 890);
    }

    #[test]
    fn frame_round_trip() {
        let intent = IntentMessage::submit(9);
        let frame = Frame::Intent(intent.clone());
        let body = frame.body().unwrap();
        match Frame::decode(frame.kind(), &body).unwrap() {
            Frame::Intent(decoded) => assert_eq!(decoded, intent),
            other => panic!("wrong frame: {:?}", other),
        }
    }
}
