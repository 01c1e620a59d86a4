//! DeviceManager REST payloads
//!
//! Every DeviceManager response is an envelope of the form
//! `{"error": {"code", "description", "suggestion"}, "data": ...}`.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Field holding the comma-separated counter values
pub const STATISTIC_DATA_LIST: &str = "CMO_STATISTIC_DATA_LIST";

/// Vendor error block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggestion: String,
}

/// Successful login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    #[serde(rename = "deviceid")]
    pub device_id: String,
    #[serde(rename = "iBaseToken")]
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Option<VendorError>,
    #[serde(default)]
    data: Option<Value>,
}

fn envelope(context: &str, payload: Value) -> Result<Envelope> {
    serde_json::from_value(payload)
        .map_err(|e| Error::malformed(context, format!("not a DeviceManager envelope: {}", e)))
}

/// Decode a login response
///
/// A non-zero vendor code is an [`Error::Authentication`]; a zero code
/// without device ID or token is a [`Error::MalformedResponse`].
pub fn parse_login(payload: Value) -> Result<LoginData> {
    let env = envelope("login", payload)?;

    let error = env
        .error
        .ok_or_else(|| Error::malformed("login", "missing `error` block"))?;
    if error.code != 0 {
        return Err(Error::Authentication {
            code: error.code,
            description: error.description,
            suggestion: error.suggestion,
        });
    }

    let data = env
        .data
        .ok_or_else(|| Error::malformed("login", "missing `data` block"))?;
    serde_json::from_value(data).map_err(|e| Error::malformed("login", e.to_string()))
}

/// Decode the `data` array of a resource collection
pub fn parse_collection(endpoint: &str, payload: Value) -> Result<Vec<Value>> {
    let env = envelope(endpoint, payload)?;

    if let Some(error) = env.error.filter(|e| e.code != 0) {
        return Err(Error::malformed(
            endpoint,
            format!(
                "array reported error {}: {} {}",
                error.code, error.description, error.suggestion
            ),
        ));
    }

    match env.data {
        Some(Value::Array(entries)) => Ok(entries),
        Some(other) => Err(Error::malformed(
            endpoint,
            format!("`data` is not an array: {}", other),
        )),
        None => Err(Error::malformed(endpoint, "missing `data` key")),
    }
}

/// Extract the counter value string of the single reporting element
pub fn parse_counters(stats_uid: &str, payload: Value) -> Result<String> {
    let context = format!("performance counters for {}", stats_uid);
    let mut entries = parse_collection(&context, payload)?;

    if entries.is_empty() {
        return Err(Error::malformed(&context, "empty `data` array"));
    }

    let first = entries.swap_remove(0);
    match first.get(STATISTIC_DATA_LIST) {
        Some(Value::String(list)) => Ok(list.clone()),
        Some(other) => Err(Error::malformed(
            &context,
            format!("`{}` is not a string: {}", STATISTIC_DATA_LIST, other),
        )),
        None => Err(Error::malformed(
            &context,
            format!("missing `{}`", STATISTIC_DATA_LIST),
        )),
    }
}
