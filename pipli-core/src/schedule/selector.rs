//! Due-reminder selection
//!
//! Stateless: every call rescans the whole document, so a reboot, a
//! reconnect or an out-of-order response can never leave a stale "next
//! dose" behind.

use super::document::{Millis, ScheduleDocument};

/// The earliest outstanding slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DueSlot {
    pub medication: usize,
    pub slot: usize,
    pub offset_s: u32,
    /// Absolute due time in the session frame
    pub due_at: Millis,
}

impl DueSlot {
    pub fn is_due(&self, now: Millis) -> bool {
        now >= self.due_at
    }
}

/// Find the outstanding slot with the smallest due time
///
/// Ties go to the earlier medication, then the earlier slot. Returns `None`
/// once every slot has a response.
pub fn select(doc: &ScheduleDocument, origin: Millis) -> Option<DueSlot> {
    let mut best: Option<DueSlot> = None;

    for (medication, slot, time) in doc.slots() {
        if !time.is_outstanding() {
            continue;
        }
        let due_at = time.due_at(origin);
        // Strict comparison keeps the first of equal candidates
        if best.map_or(true, |b| due_at < b.due_at) {
            best = Some(DueSlot {
                medication,
                slot,
                offset_s: time.offset_s,
                due_at,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::document::{Medication, TimeSlot, MAX_MEDICATIONS, MAX_SLOTS};
    use proptest::prelude::*;

    fn doc(meds: &[(&str, &[(u32, Option<bool>)])]) -> ScheduleDocument {
        let mut doc = ScheduleDocument::new(0);
        for (id, slots) in meds {
            let times = slots
                .iter()
                .map(|&(o, r)| TimeSlot::with_response(o, r))
                .collect();
            doc.medications
                .push(Medication {
                    id: heapless::String::try_from(*id).unwrap(),
                    times,
                })
                .unwrap();
        }
        doc
    }

    #[test]
    fn test_earliest_across_medications() {
        let d = doc(&[("A", &[(30, None), (90, None)]), ("B", &[(20, None)])]);
        let due = select(&d, 0).unwrap();
        assert_eq!((due.medication, due.slot, due.offset_s), (1, 0, 20));
        assert_eq!(due.due_at, 20_000);
    }

    #[test]
    fn test_ties_follow_document_order() {
        let d = doc(&[("A", &[(60, None)]), ("B", &[(60, None)]), ("C", &[(60, None)])]);
        let due = select(&d, 0).unwrap();
        assert_eq!((due.medication, due.slot), (0, 0));

        // Within one medication the first equal slot wins too
        let d = doc(&[("A", &[(5, Some(true)), (10, None), (10, None)])]);
        let due = select(&d, 0).unwrap();
        assert_eq!((due.medication, due.slot), (0, 1));
    }

    #[test]
    fn test_answered_slots_are_skipped() {
        let d = doc(&[("A", &[(0, Some(true)), (10, Some(false))]), ("B", &[(50, None)])]);
        assert_eq!(select(&d, 0).unwrap().medication, 1);

        let d = doc(&[("A", &[(0, Some(true))]), ("B", &[])]);
        assert_eq!(select(&d, 0), None);
        assert_eq!(select(&ScheduleDocument::new(0), 0), None);
    }

    #[test]
    fn test_idempotent() {
        let d = doc(&[("A", &[(10, None), (0, None)])]);
        let first = select(&d, 500);
        for _ in 0..5 {
            assert_eq!(select(&d, 500), first);
        }
    }

    #[test]
    fn test_is_due_boundary() {
        let d = doc(&[("A", &[(10, None)])]);
        let due = select(&d, 0).unwrap();
        assert!(!due.is_due(5_000));
        assert!(!due.is_due(9_999));
        assert!(due.is_due(10_000));

        // Negative origin after reconciliation: already overdue
        let due = select(&d, -20_000).unwrap();
        assert!(due.is_due(0));
    }

    fn arb_doc() -> impl Strategy<Value = ScheduleDocument> {
        let slot = (0u32..600, prop::option::of(any::<bool>()))
            .prop_map(|(o, r)| TimeSlot::with_response(o, r));
        let med = prop::collection::vec(slot, 0..MAX_SLOTS).prop_map(|times| Medication {
            id: heapless::String::try_from("m").unwrap(),
            times: times.into_iter().collect(),
        });
        (any::<i32>(), prop::collection::vec(med, 0..MAX_MEDICATIONS)).prop_map(|(origin, meds)| {
            let mut doc = ScheduleDocument::new(i64::from(origin));
            doc.medications = meds.into_iter().collect();
            doc
        })
    }

    proptest! {
        #[test]
        fn prop_select_is_first_minimum(doc in arb_doc(), origin in -1_000_000i64..1_000_000) {
            let expected = doc
                .slots()
                .filter(|(_, _, t)| t.is_outstanding())
                .map(|(m, s, t)| (t.due_at(origin), m, s))
                .min();

            match (select(&doc, origin), expected) {
                (Some(due), Some((due_at, m, s))) => {
                    prop_assert_eq!(due.due_at, due_at);
                    prop_assert_eq!((due.medication, due.slot), (m, s));
                    prop_assert!(doc.slot(m, s).unwrap().is_outstanding());
                }
                (None, None) => prop_assert!(doc.all_responded()),
                (got, want) => prop_assert!(false, "select {:?} vs {:?}", got, want),
            }
        }
    }
}
