//! Content-sniffing codec between host wire values and payload bytes.
//!
//! The host sends every binding value without a type tag: a value may be
//! JSON escaped once or twice, plain text, or base64 encoded binary. The
//! codec resolves that ambiguity with a fixed, ordered decision table in
//! both directions and never fails.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// The payload of a binding exactly as handler code sees and writes it.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RawValue(Bytes);

impl RawValue {
    /// Create a payload from bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the payload, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// The payload as text, replacing invalid UTF-8 sequences.
    pub fn to_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Decode a single JSON token copied verbatim from the envelope.
    ///
    /// String tokens go through [`RawValue::decode_str`]; `null` is empty;
    /// objects, arrays, numbers and booleans keep their bytes as sent.
    pub fn decode(token: &str) -> Self {
        if token.trim() == "null" {
            return Self::default();
        }
        match serde_json::from_str::<String>(token) {
            Ok(content) => Self::decode_str(&content),
            Err(_) => Self::new(token.to_owned()),
        }
    }

    /// Decode the content of a JSON string value.
    ///
    /// 1. Content that is itself a quoted JSON string is unescaped once more.
    /// 2. Content that is valid standard base64 becomes the decoded bytes.
    /// 3. Anything else is used verbatim.
    pub fn decode_str(content: &str) -> Self {
        if let Ok(inner) = serde_json::from_str::<String>(content) {
            return Self::new(inner);
        }
        if let Ok(decoded) = STANDARD.decode(trim_quotes(content)) {
            return Self::new(decoded);
        }
        Self::new(content.to_owned())
    }

    /// Encode the payload as the content of a JSON string value.
    ///
    /// 1. Valid JSON is nested as text, one level inside the envelope.
    /// 2. Non-empty UTF-8 text that is not quote-wrapped is used as is.
    /// 3. Anything else is base64 encoded.
    ///
    /// Decoding does not invert this for every payload. Text that is also
    /// valid base64, such as `test`, `true` or `1234`, decodes to the base64
    /// bytes, and a JSON string payload such as `"hi"` loses its quotes.
    pub fn encode(&self) -> String {
        let data = self.as_bytes();
        if let Ok(text) = std::str::from_utf8(data) {
            if serde_json::from_slice::<IgnoredAny>(data).is_ok() {
                return text.to_owned();
            }
            if !text.is_empty() && !text.starts_with('"') && !text.ends_with('"') {
                return text.to_owned();
            }
        }
        STANDARD.encode(data)
    }
}

fn trim_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = Box::<serde_json::value::RawValue>::deserialize(deserializer)?;
        Ok(RawValue::decode(token.get()))
    }
}

impl Deref for RawValue {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for RawValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => f.debug_tuple("RawValue").field(&text).finish(),
            None => f.debug_tuple("RawValue").field(&self.0).finish(),
        }
    }
}

impl From<Bytes> for RawValue {
    fn from(data: Bytes) -> Self {
        Self(data)
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(data: Vec<u8>) -> Self {
        Self(Bytes::from(data))
    }
}

impl From<&[u8]> for RawValue {
    fn from(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }
}

impl From<String> for RawValue {
    fn from(data: String) -> Self {
        Self(Bytes::from(data))
    }
}

impl From<&str> for RawValue {
    fn from(data: &str) -> Self {
        Self(Bytes::copy_from_slice(data.as_bytes()))
    }
}

impl From<RawValue> for Bytes {
    fn from(raw: RawValue) -> Self {
        raw.0
    }
}
