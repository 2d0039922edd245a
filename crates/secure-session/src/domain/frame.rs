//! Secure frame wire type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frame type tag.
pub const SECURE_FRAME_TYPE: &str = "secure";

/// One encrypted application message.
///
/// `data` is lowercase hex of ciphertext with the GCM tag appended; `iv` is
/// lowercase hex of the 12-byte nonce. Some peers add an empty `tag` field;
/// it is accepted and ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureFrame {
    /// Always `"secure"`.
    #[serde(rename = "type")]
    pub frame_type: String,
    /// Sender's message counter.
    pub counter: u64,
    /// Hex ciphertext || tag.
    pub data: String,
    /// Hex nonce.
    pub iv: String,
    /// Detached tag (unused, tag travels inside `data`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl SecureFrame {
    /// Build a frame from already-encoded parts.
    pub fn new(counter: u64, data: String, iv: String) -> Self {
        Self {
            frame_type: SECURE_FRAME_TYPE.to_string(),
            counter,
            data,
            iv,
            tag: None,
        }
    }

    /// Serialize to the JSON body form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Recognize a secure-frame body.
    ///
    /// `Ok(None)` for anything that is not JSON tagged `"type":"secure"`;
    /// `Err` when the tag is present but the fields are not.
    pub fn detect(body: &str) -> Result<Option<Self>, serde_json::Error> {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        if value.get("type").and_then(Value::as_str) != Some(SECURE_FRAME_TYPE) {
            return Ok(None);
        }
        serde_json::from_value(value).map(Some)
    }
}
