//! Schedule document model

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use pipli_protocol::{Report, ReportMedication, ReportSlot};

/// Milliseconds on the device clock
///
/// Signed so that a reconciled session origin may lie before boot.
pub type Millis = i64;

/// Maximum medications per schedule
pub const MAX_MEDICATIONS: usize = 16;

/// Maximum dose slots per medication
pub const MAX_SLOTS: usize = 12;

/// Maximum medication id length in bytes
pub const MAX_ID_LEN: usize = 16;

/// One scheduled dose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeSlot {
    /// Seconds after the schedule origin
    pub offset_s: u32,
    responded: Option<bool>,
}

impl TimeSlot {
    /// An outstanding slot
    pub const fn new(offset_s: u32) -> Self {
        Self {
            offset_s,
            responded: None,
        }
    }

    /// A slot with a known response, as read back from storage
    pub const fn with_response(offset_s: u32, responded: Option<bool>) -> Self {
        Self {
            offset_s,
            responded,
        }
    }

    /// `None` while outstanding, `Some(true)` acknowledged, `Some(false)`
    /// timed out
    pub const fn responded(&self) -> Option<bool> {
        self.responded
    }

    pub const fn is_outstanding(&self) -> bool {
        self.responded.is_none()
    }

    /// Absolute due time for the given origin
    pub const fn due_at(&self, origin: Millis) -> Millis {
        origin + self.offset_s as Millis * 1000
    }

    /// Record a response; the first one wins
    ///
    /// Returns `false` if the slot was already answered.
    pub(crate) fn respond(&mut self, value: bool) -> bool {
        if self.responded.is_some() {
            return false;
        }
        self.responded = Some(value);
        true
    }
}

/// A medication and its dose slots, in the order received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Medication {
    pub id: String<MAX_ID_LEN>,
    pub times: Vec<TimeSlot, MAX_SLOTS>,
}

/// The live schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScheduleDocument {
    /// Clock reading when the schedule was accepted
    pub origin_receive_time: Millis,
    pub medications: Vec<Medication, MAX_MEDICATIONS>,
}

impl ScheduleDocument {
    pub const fn new(origin_receive_time: Millis) -> Self {
        Self {
            origin_receive_time,
            medications: Vec::new(),
        }
    }

    /// Slot at the given position
    pub fn slot(&self, medication: usize, slot: usize) -> Option<&TimeSlot> {
        self.medications.get(medication)?.times.get(slot)
    }

    pub(crate) fn slot_mut(&mut self, medication: usize, slot: usize) -> Option<&mut TimeSlot> {
        self.medications.get_mut(medication)?.times.get_mut(slot)
    }

    /// Iterate over every slot with its position
    pub fn slots(&self) -> impl Iterator<Item = (usize, usize, &TimeSlot)> {
        self.medications
            .iter()
            .enumerate()
            .flat_map(|(m, med)| med.times.iter().enumerate().map(move |(s, t)| (m, s, t)))
    }

    pub fn outstanding(&self) -> usize {
        self.slots().filter(|(_, _, t)| t.is_outstanding()).count()
    }

    pub fn all_responded(&self) -> bool {
        self.outstanding() == 0
    }

    /// Wire view for the app, using the stored origin
    pub fn to_report(&self) -> Report<'_> {
        Report {
            origin_receive_time: self.origin_receive_time,
            medications: self
                .medications
                .iter()
                .map(|med| ReportMedication {
                    id: med.id.as_str(),
                    times: med
                        .times
                        .iter()
                        .map(|t| ReportSlot {
                            time: t.offset_s,
                            responded: t.responded,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Reference to one slot of a specific document generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotRef {
    pub medication: usize,
    pub slot: usize,
    /// Store generation the indices were taken from
    pub generation: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn med(id: &str, offsets: &[u32]) -> Medication {
        Medication {
            id: String::try_from(id).unwrap(),
            times: offsets.iter().map(|&o| TimeSlot::new(o)).collect(),
        }
    }

    #[test]
    fn test_due_at() {
        let slot = TimeSlot::new(10);
        assert_eq!(slot.due_at(0), 10_000);
        assert_eq!(slot.due_at(-3_800), 6_200);
    }

    #[test]
    fn test_respond_is_write_once() {
        let mut slot = TimeSlot::new(0);
        assert!(slot.respond(false));
        assert!(!slot.respond(true));
        assert_eq!(slot.responded(), Some(false));
    }

    #[test]
    fn test_slot_iteration_order() {
        let mut doc = ScheduleDocument::new(0);
        doc.medications.push(med("A", &[5, 1])).unwrap();
        doc.medications.push(med("B", &[3])).unwrap();

        let order: std::vec::Vec<_> = doc.slots().map(|(m, s, t)| (m, s, t.offset_s)).collect();
        assert_eq!(order, [(0, 0, 5), (0, 1, 1), (1, 0, 3)]);
        assert_eq!(doc.outstanding(), 3);
        assert!(doc.slot(1, 1).is_none());
    }

    #[test]
    fn test_report_view() {
        let mut doc = ScheduleDocument::new(1234);
        doc.medications.push(med("A", &[0, 10])).unwrap();
        doc.slot_mut(0, 0).unwrap().respond(true);

        let report = doc.to_report();
        assert_eq!(report.origin_receive_time, 1234);
        assert_eq!(report.medications[0].id, "A");
        assert_eq!(report.medications[0].times[0].responded, Some(true));
        assert_eq!(report.medications[0].times[1].responded, None);
        assert_eq!(report.medications[0].times[1].time, 10);
    }
}
