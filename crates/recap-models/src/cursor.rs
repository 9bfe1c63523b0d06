use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Opaque pagination cursor over month-partitioned `ContentItem` listings.
/// Encodes as base64url of a small JSON object so callers never need to
/// parse it; the decoder falls back to "start from the beginning" on any
/// malformed input rather than erroring, since a stale or tampered cursor
/// should degrade to a full re-scan, not a failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cursor {
    pub y: i32,
    pub m: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
}

impl Cursor {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            y: year,
            m: month,
            c: None,
        }
    }

    pub fn with_continuation(mut self, continuation: impl Into<String>) -> Self {
        self.c = Some(continuation.into());
        self
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("Cursor serializes infallibly");
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a cursor, rejecting an invalid month (outside 1..=12) or
    /// malformed JSON by returning `None` rather than an error.
    pub fn decode(encoded: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let cursor: Cursor = serde_json::from_slice(&bytes).ok()?;
        if !(1..=12).contains(&cursor.m) {
            return None;
        }
        Some(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let cursor = Cursor::new(2025, 8).with_continuation("tok");
        let encoded = cursor.encode();
        assert_eq!(Cursor::decode(&encoded), Some(cursor));
    }

    #[test]
    fn rejects_invalid_month() {
        let cursor = Cursor::new(2025, 13);
        let encoded = cursor.encode();
        assert_eq!(Cursor::decode(&encoded), None);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Cursor::decode("not-valid-base64!!"), None);
        assert_eq!(Cursor::decode(&base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"{not json")), None);
    }
}
