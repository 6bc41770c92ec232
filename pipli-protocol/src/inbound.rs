//! Inbound payload handling
//!
//! Every payload the app sends is either the update token or a schedule.
//! There is no envelope, so the two are told apart by content alone.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::Deserialize;

/// Default update-request token
pub const UPDATE_TOKEN: &str = "update";

/// What an inbound payload asks the device to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Send the current schedule back without touching it
    UpdateRequest,
    /// Replace the schedule with this JSON document
    Schedule(&'a [u8]),
}

/// Classify a payload against the configured update token
///
/// Leading and trailing whitespace and NUL bytes are ignored, the bridge and
/// some app builds pad writes with either.
pub fn classify<'a>(payload: &'a [u8], token: &str) -> Inbound<'a> {
    let trimmed = trim(payload);
    if !token.is_empty() && trimmed == token.as_bytes() {
        Inbound::UpdateRequest
    } else {
        Inbound::Schedule(trimmed)
    }
}

fn trim(bytes: &[u8]) -> &[u8] {
    let is_pad = |b: &u8| b.is_ascii_whitespace() || *b == 0;
    let start = bytes.iter().position(|b| !is_pad(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_pad(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// A dose offset as the app sends it
///
/// The app sends seconds as decimal text; older builds sent bare integers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireOffset {
    Seconds(u64),
    Text(String),
}

impl WireOffset {
    /// Offset in whole seconds, `None` if it is not a non-negative integer
    /// that fits in `u32`
    pub fn seconds(&self) -> Option<u32> {
        match self {
            WireOffset::Seconds(s) => u32::try_from(*s).ok(),
            WireOffset::Text(text) => {
                let text = text.trim();
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                text.parse().ok()
            }
        }
    }
}

/// One medication entry of an inbound schedule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireMedication {
    #[serde(alias = "med_id")]
    pub id: String,
    pub times: Vec<WireOffset>,
}

/// Error decoding an inbound schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload is empty after trimming
    Empty,
    /// Not a JSON array of `{id, times}` objects
    Malformed,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty schedule payload"),
            DecodeError::Malformed => write!(f, "malformed schedule payload"),
        }
    }
}

/// Decode a schedule payload into its wire entries
///
/// Only the JSON shape is checked here; offset and capacity validation
/// belong to the schedule store.
pub fn decode_schedule(bytes: &[u8]) -> Result<Vec<WireMedication>, DecodeError> {
    let bytes = trim(bytes);
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    serde_json::from_slice(bytes).map_err(|_| DecodeError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_update_token() {
        assert_eq!(classify(b"update", UPDATE_TOKEN), Inbound::UpdateRequest);
        assert_eq!(classify(b" update\r\n\0", UPDATE_TOKEN), Inbound::UpdateRequest);
        assert_eq!(classify(b"sync", "sync"), Inbound::UpdateRequest);
    }

    #[test]
    fn test_classify_everything_else_is_schedule() {
        assert_eq!(classify(b"updates", UPDATE_TOKEN), Inbound::Schedule(b"updates"));
        assert_eq!(classify(b"UPDATE", UPDATE_TOKEN), Inbound::Schedule(b"UPDATE"));
        assert_eq!(classify(b" [] \n", UPDATE_TOKEN), Inbound::Schedule(b"[]"));
        assert_eq!(classify(b"", ""), Inbound::Schedule(b""));
    }

    #[test]
    fn test_decode_text_offsets() {
        let meds = decode_schedule(br#"[{"id":"A","times":["0","10"]}]"#).unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].id, "A");
        let secs: Vec<_> = meds[0].times.iter().map(WireOffset::seconds).collect();
        assert_eq!(secs, [Some(0), Some(10)]);
    }

    #[test]
    fn test_decode_app_payload_shape() {
        // The app sends `med_id` and a `ref_time` that the device ignores
        let payload = br#"[
            {"med_id":"aspirin","times":["3600", 7200],"ref_time":"2024-05-01T08:00:00Z"},
            {"med_id":"zinc","times":[]}
        ]"#;
        let meds = decode_schedule(payload).unwrap();
        assert_eq!(meds[0].id, "aspirin");
        assert_eq!(meds[0].times[1], WireOffset::Seconds(7200));
        assert_eq!(meds[0].times[1].seconds(), Some(7200));
        assert!(meds[1].times.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert_eq!(decode_schedule(b"  \0"), Err(DecodeError::Empty));
        assert_eq!(decode_schedule(br#"[{"id":"A"}]"#), Err(DecodeError::Malformed));
        assert_eq!(decode_schedule(br#"{"id":"A","times":[]}"#), Err(DecodeError::Malformed));
        assert_eq!(decode_schedule(br#"[{"id":"A","times":[true]}]"#), Err(DecodeError::Malformed));
        assert_eq!(decode_schedule(b"[{\"id\":\"A\",\"times\":[\"0\""), Err(DecodeError::Malformed));
    }

    #[test]
    fn test_offset_validation() {
        assert_eq!(WireOffset::Text(" 42 ".into()).seconds(), Some(42));
        assert_eq!(WireOffset::Text("-1".into()).seconds(), None);
        assert_eq!(WireOffset::Text("1.5".into()).seconds(), None);
        assert_eq!(WireOffset::Text("".into()).seconds(), None);
        assert_eq!(WireOffset::Text("99999999999".into()).seconds(), None);
        assert_eq!(WireOffset::Seconds(u64::from(u32::MAX) + 1).seconds(), None);
    }
}
