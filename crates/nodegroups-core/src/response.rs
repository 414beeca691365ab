//! Decoding of nodegroups API responses.
//!
//! Every endpoint answers with the same envelope:
//!
//! ```json
//! {"status": 200, "message": "OK", "records": [{"node": "web01"}]}
//! ```
//!
//! `status` may be a number or a string; anything other than `200` is an
//! application failure whose `message` becomes the error detail.

use crate::{Error, Result};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status value marking a successful call.
pub const SUCCESS_STATUS: &str = "200";

/// A flat key/value record as returned in `records`.
pub type Record = Map<String, Value>;

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = Record> {
    /// Application status, normalised to a string
    #[serde(deserialize_with = "deserialize_status")]
    pub status: String,

    /// Human readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Result records, absent for calls that return nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<T>>,
}

impl<T> ApiResponse<T> {
    /// Returns true if the status is `200`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Turn a non-200 status into [`Error::ApiError`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiError`] carrying the response `message` when the
    /// status is not `200`.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let message = match self.message {
            Some(message) if !message.is_empty() => message,
            _ => format!("API returned status {}", self.status),
        };
        Err(Error::ApiError {
            status: self.status,
            message,
        })
    }

    /// Consume the response and return its records (empty when absent).
    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        self.records.unwrap_or_default()
    }
}

impl<T> ApiResponse<T>
where
    T: DeserializeOwned,
{
    /// Decode a response body and check its status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] for malformed JSON and
    /// [`Error::ApiError`] for a non-200 status.
    pub fn decode(body: &[u8]) -> Result<Self> {
        let response: Self = serde_json::from_slice(body)?;
        response.into_result()
    }
}

/// Collect one field from every record, skipping records that lack it.
///
/// Numbers and booleans are rendered to strings; nulls, arrays and objects
/// are skipped.
#[must_use]
pub fn field_values(records: &[Record], field: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| match record.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

fn deserialize_status<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawStatus {
        Number(i64),
        Text(String),
    }

    Ok(match RawStatus::deserialize(deserializer)? {
        RawStatus::Number(n) => n.to_string(),
        RawStatus::Text(s) => s.trim().to_string(),
    })
}
