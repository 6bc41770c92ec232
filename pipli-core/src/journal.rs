//! Persistent counter journal
//!
//! Periodically records the clock reading so that the time elapsed before
//! a power loss can be estimated on the next boot. The record is a fixed
//! 16-byte block:
//!
//! ```text
//! magic u32 LE | ticks u64 LE | crc32(magic..ticks) u32 LE
//! ```
//!
//! A missing or damaged record reads as zero, which reconciliation treats
//! as "no information".

use pipli_hal::{FlashStorage, StorageKey};

use crate::checksum::crc32;
use crate::schedule::StorageError;

/// Magic number to identify a checkpoint record
pub const CHECKPOINT_MAGIC: u32 = 0x5050_434B; // "PPCK"

/// Encoded checkpoint length
pub const CHECKPOINT_LEN: usize = 16;

/// Encode a checkpoint record
pub fn encode(ticks: u64) -> [u8; CHECKPOINT_LEN] {
    let mut record = [0u8; CHECKPOINT_LEN];
    record[..4].copy_from_slice(&CHECKPOINT_MAGIC.to_le_bytes());
    record[4..12].copy_from_slice(&ticks.to_le_bytes());
    let crc = crc32(&record[..12]);
    record[12..].copy_from_slice(&crc.to_le_bytes());
    record
}

/// Decode a checkpoint record, `None` if it is not intact
pub fn decode(bytes: &[u8]) -> Option<u64> {
    let record: &[u8; CHECKPOINT_LEN] = bytes.try_into().ok()?;
    let magic = u32::from_le_bytes(record[..4].try_into().ok()?);
    let crc = u32::from_le_bytes(record[12..].try_into().ok()?);
    if magic != CHECKPOINT_MAGIC || crc != crc32(&record[..12]) {
        return None;
    }
    Some(u64::from_le_bytes(record[4..12].try_into().ok()?))
}

/// Last checkpointed reading, 0 when absent or corrupt
pub fn load<S: FlashStorage>(storage: &mut S) -> u64 {
    let mut buf = [0u8; CHECKPOINT_LEN + 1];
    match storage.read(StorageKey::CounterCheckpoint, &mut buf) {
        Ok(len) => match decode(&buf[..len]) {
            Some(ticks) => ticks,
            None => {
                warn!("counter checkpoint corrupt, assuming 0");
                0
            }
        },
        Err(e) => {
            debug!("no counter checkpoint: {}", e);
            0
        }
    }
}

/// Record a clock reading
pub fn checkpoint<S: FlashStorage>(storage: &mut S, ticks: u64) -> Result<(), StorageError> {
    storage.write(StorageKey::CounterCheckpoint, &encode(ticks))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFlash;

    #[test]
    fn test_checkpoint_roundtrip() {
        let mut flash = MemFlash::default();
        checkpoint(&mut flash, 5_000).unwrap();
        assert_eq!(load(&mut flash), 5_000);

        checkpoint(&mut flash, 86_400_000).unwrap();
        assert_eq!(load(&mut flash), 86_400_000);
    }

    #[test]
    fn test_record_layout() {
        let record = encode(0x0102_0304_0506_0708);
        assert_eq!(&record[..4], b"KCPP");
        assert_eq!(&record[4..12], &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_absent_reads_zero() {
        let mut flash = MemFlash::default();
        assert_eq!(load(&mut flash), 0);
    }

    #[test]
    fn test_corrupt_reads_zero() {
        let mut flash = MemFlash::default();
        let mut record = encode(5_000);
        record[5] ^= 0xFF;
        flash.put(StorageKey::CounterCheckpoint, &record);
        assert_eq!(load(&mut flash), 0);

        flash.put(StorageKey::CounterCheckpoint, &encode(5_000)[..12]);
        assert_eq!(load(&mut flash), 0);

        let mut long = encode(5_000).to_vec();
        long.push(0);
        flash.put(StorageKey::CounterCheckpoint, &long);
        assert_eq!(load(&mut flash), 0);
    }
}
