//! Reboot reconciliation
//!
//! The device clock restarts at zero on every boot while the schedule
//! origin is a reading from an earlier boot. The last checkpoint tells how
//! far the old boot got past the origin; that much time is assumed to have
//! elapsed, and the session origin is moved back by it.

use crate::schedule::Millis;

/// Result of reconciling a restored schedule with the current boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reconciliation {
    /// Estimated time between the origin and the reboot
    pub elapsed: Millis,
    /// Origin to use for due times during this boot
    pub session_origin: Millis,
    /// Checkpoint was older than the origin and ignored
    pub stale_checkpoint: bool,
}

/// Compute the session origin for a restored schedule
///
/// - no checkpoint (0) or a zero origin: nothing elapsed
/// - checkpoint at or past the origin: elapsed = checkpoint - origin
/// - checkpoint before the origin: treated as stale, nothing elapsed
///
/// The stale case can under-count after some reboot orderings; it is kept
/// conservative rather than guessing across a wraparound.
pub fn reconcile(origin: Millis, last_known_ticks: u64, now: Millis) -> Reconciliation {
    let last_known = Millis::try_from(last_known_ticks).unwrap_or(Millis::MAX);

    let (elapsed, stale_checkpoint) = if last_known == 0 || origin == 0 {
        (0, false)
    } else if last_known >= origin {
        (last_known - origin, false)
    } else {
        (0, true)
    };

    Reconciliation {
        elapsed,
        session_origin: now.saturating_sub(elapsed),
        stale_checkpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{select, ScheduleStore};
    use proptest::prelude::*;

    #[test]
    fn test_reboot_shifts_origin_back() {
        let r = reconcile(1_000, 5_000, 200);
        assert_eq!(r.elapsed, 4_000);
        assert_eq!(r.session_origin, -3_800);
        assert!(!r.stale_checkpoint);
    }

    #[test]
    fn test_reconciled_schedule_is_overdue() {
        let mut store = ScheduleStore::new();
        store
            .ingest(br#"[{"id":"A","times":["0","3"]}]"#, 1_000)
            .unwrap();
        let doc = store.document().unwrap();

        let r = reconcile(doc.origin_receive_time, 5_000, 200);
        let due = select(doc, r.session_origin).unwrap();
        assert_eq!(due.offset_s, 0);
        assert!(due.is_due(200));

        // The 3 s slot was due 3_000 ms after the origin, 4_000 ms have passed
        assert_eq!(doc.slot(0, 1).unwrap().due_at(r.session_origin), -800);
        assert_eq!(doc.origin_receive_time, 1_000);
    }

    #[test]
    fn test_missing_information_means_fresh() {
        assert_eq!(reconcile(1_000, 0, 200).session_origin, 200);
        assert_eq!(reconcile(0, 5_000, 200).session_origin, 200);
        assert_eq!(reconcile(0, 0, 0).elapsed, 0);
    }

    #[test]
    fn test_stale_checkpoint_assumes_nothing_elapsed() {
        // Checkpoint written before the schedule arrived: real elapsed time
        // is unknown and under-counted as zero.
        let r = reconcile(9_000, 5_000, 200);
        assert!(r.stale_checkpoint);
        assert_eq!(r.elapsed, 0);
        assert_eq!(r.session_origin, 200);
    }

    proptest! {
        #[test]
        fn prop_session_origin(origin in 1i64..1_000_000_000, ahead in 0u64..1_000_000_000, now in 0i64..1_000_000_000) {
            let last = origin as u64 + ahead;
            let r = reconcile(origin, last, now);
            prop_assert!(!r.stale_checkpoint);
            prop_assert_eq!(r.elapsed, ahead as i64);
            prop_assert_eq!(r.session_origin, now - ahead as i64);
            prop_assert!(r.session_origin <= now);
        }

        #[test]
        fn prop_stale_never_moves_origin(origin in 2i64..1_000_000_000, now in 0i64..1_000_000) {
            let last = (origin as u64) / 2;
            let r = reconcile(origin, last.max(1), now);
            prop_assert!(r.stale_checkpoint);
            prop_assert_eq!(r.session_origin, now);
        }
    }
}
