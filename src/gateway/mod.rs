//! FreeDATA gateway contract.
//!
//! The responder only consumes the gateway; it never stores messages or
//! drives the radio itself. This module defines the wire shapes of the four
//! endpoints we touch and the [`Gateway`] trait the poll loop is written
//! against, so tests can swap the HTTP client for an in-process fake.
//!
//! | Endpoint         | Purpose                               |
//! |------------------|---------------------------------------|
//! | `GET /`          | service identity + modem version      |
//! | `GET /radio`     | radio link availability               |
//! | `GET /messages`  | today's (and older) message records   |
//! | `POST /messages` | queue an outbound text                |

pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::errors::GatewayError;

pub use http::HttpGateway;

/// Opaque message identifier. Unique only within the gateway's lifetime.
///
/// The gateway has shipped both string and integer ids, so both decode here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId")]
pub struct MessageId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for MessageId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => MessageId(s),
            RawId::Number(n) => MessageId(n.to_string()),
        }
    }
}

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        MessageId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "receive")]
    Received,
    #[serde(alias = "transmit", alias = "transmitted")]
    Sent,
    /// Anything else the gateway may report; never a reply candidate.
    #[serde(other)]
    Unknown,
}

/// A message record as listed by `GET /messages`. Never mutated by the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Gateway-local ISO-8601 timestamp, e.g. `2024-01-01T10:00:00.123456`.
    pub timestamp: String,
    pub direction: Direction,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub origin: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
}

impl Message {
    /// Calendar date of the timestamp, if it starts with `YYYY-MM-DD`.
    pub fn date(&self) -> Option<NaiveDate> {
        let prefix = self.timestamp.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }

    pub fn is_received(&self) -> bool {
        self.direction == Direction::Received
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfo {
    pub name: String,
    #[serde(default)]
    pub modem_version: String,
}

/// `GET /radio` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioStatus {
    pub radio_status: bool,
    #[serde(default)]
    pub radio_frequency: Option<f64>,
}

/// `GET /messages` payload. `total_messages` is informational only.
///
/// Records are decoded one at a time; a malformed record is logged and
/// dropped so the rest of the list still reaches the selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub messages: Vec<Message>,
}

fn skip_malformed<'de, D>(deserializer: D) -> Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match Message::deserialize(record) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Skipping malformed message record #{}: {}", index, e);
                None
            }
        })
        .collect())
}

/// `POST /messages` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub body: String,
    pub destination: String,
}

/// Read/write surface of the message gateway.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Service identity (`GET /`).
    async fn info(&self) -> Result<ApiInfo, GatewayError>;

    /// Radio link state (`GET /radio`).
    async fn radio_status(&self) -> Result<RadioStatus, GatewayError>;

    /// Every message the gateway currently lists, in retrieval order.
    async fn messages(&self) -> Result<Vec<Message>, GatewayError>;

    /// Queue an outbound text. `Ok` means the gateway accepted it.
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), GatewayError>;
}

/// Startup check: the gateway answers and calls itself `expected_name`.
pub async fn verify_identity<G: Gateway + ?Sized>(
    gateway: &G,
    expected_name: &str,
) -> Result<ApiInfo, GatewayError> {
    let info = gateway.info().await?;
    if info.name != expected_name {
        return Err(GatewayError::IdentityMismatch {
            expected: expected_name.to_string(),
            found: info.name,
        });
    }
    Ok(info)
}
