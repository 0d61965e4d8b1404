//! The Bot API reply envelope.
//!
//! Every reply has the shape
//! `{"ok": bool, "result": any, "description": str, "error_code": int, "parameters": {...}}`.
//! `result` is kept as raw JSON and only decoded when the caller asks for it.

use std::time::Duration;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

// ─── ResponseParameters ───────────────────────────────────────────────────────

/// Why a request was unsuccessful, when the server says so.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ResponseParameters {
    /// The group has been migrated to a supergroup with this identifier.
    #[serde(default)]
    pub migrate_to_chat_id: Option<i64>,

    /// Flood control: time left before the request can be repeated.
    #[serde(default, deserialize_with = "seconds")]
    pub retry_after: Option<Duration>,
}

fn seconds<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
}

// ─── Response ─────────────────────────────────────────────────────────────────

/// A decoded Bot API envelope.
#[derive(Debug, Deserialize)]
pub struct Response {
    /// `true` when the call succeeded and `result` holds its value.
    pub ok: bool,

    /// Bot API method this is the reply to. Filled in by the transport.
    #[serde(skip)]
    pub method: String,

    /// Raw result payload, meaningful only when `ok` is `true`.
    #[serde(default)]
    pub result: Option<Box<RawValue>>,

    /// Description of the error, meaningful only when `ok` is `false`.
    #[serde(default)]
    pub description: String,

    /// HTTP status of the reply. Filled in by the transport.
    #[serde(skip)]
    pub status_code: u16,

    /// Bot API error code.
    #[serde(default)]
    pub error_code: i32,

    /// Extra information about a failure.
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

impl Response {
    /// Parse an envelope from a reply body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Decode `result` into `T`.
    ///
    /// An absent or `null` result is a decode error, not a success with a
    /// default value.
    pub fn decode_result<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.result {
            Some(raw) => serde_json::from_str(raw.get()),
            None      => Err(serde_json::Error::custom("response has no result")),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
