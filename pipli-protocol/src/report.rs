//! Outbound schedule report
//!
//! The report mirrors the inbound schedule with each slot's response filled
//! in. The app matches slots by their offset text, so offsets go out as
//! strings exactly as they came in.

use alloc::vec::Vec;
use core::fmt;

use serde::{Serialize, Serializer};

/// Full report sent to the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    /// Stored origin of the schedule (milliseconds, device clock frame)
    pub origin_receive_time: i64,
    pub medications: Vec<ReportMedication<'a>>,
}

/// One medication and its slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMedication<'a> {
    pub id: &'a str,
    pub times: Vec<ReportSlot>,
}

/// One slot: offset and response (`null` while outstanding)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSlot {
    #[serde(serialize_with = "offset_as_text")]
    pub time: u32,
    pub responded: Option<bool>,
}

fn offset_as_text<S: Serializer>(offset: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(offset)
}

/// Error encoding a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// JSON serialization failed (allocation)
    Serialize,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "report serialization failed")
    }
}

/// Encode a report as compact JSON
pub fn encode_report(report: &Report<'_>) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(report).map_err(|_| EncodeError::Serialize)
}
