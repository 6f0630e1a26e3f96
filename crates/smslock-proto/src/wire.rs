//! Base64 serde helpers for binary fields in the JSON text wire.

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// `#[serde(with = "wire::b64")]` for required binary fields.
pub mod b64 {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{STANDARD, decode};
    use base64::Engine as _;

    /// Encode bytes as a base64 string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Decode a base64 string into bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "wire::b64_opt")]` for optional binary fields.
///
/// Combine with `default` and `skip_serializing_if = "Option::is_none"` so
/// an absent field reads back as `None`.
pub mod b64_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{STANDARD, decode};
    use base64::Engine as _;

    /// Encode present bytes as a base64 string.
    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    /// Decode a present base64 string into bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        decode(&encoded).map(Some).map_err(serde::de::Error::custom)
    }
}

fn decode(encoded: &str) -> Result<Vec<u8>, String> {
    STANDARD.decode(encoded).map_err(|err| format!("invalid base64: {err}"))
}
