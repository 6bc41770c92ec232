//! Schedule store: ingestion, responses and persistence
//!
//! Ingestion is a pure transform from payload bytes to a fresh document.
//! The store swaps it in only when the whole payload is valid, so a bad
//! payload never disturbs the schedule already loaded.
//!
//! The persisted record is postcard-encoded:
//!
//! ```text
//! magic (u32) | version (u8) | document | crc32(document bytes) (u32)
//! ```

use alloc::vec;
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use pipli_hal::{FlashError, FlashStorage, StorageKey};
use pipli_protocol::{decode_schedule, DecodeError};

use super::document::{Medication, Millis, ScheduleDocument, SlotRef, TimeSlot};
use crate::checksum::crc32;

/// Magic number to identify a schedule record
pub const SCHEDULE_MAGIC: u32 = 0x5050_5343; // "PPSC"

/// Current schedule record version
pub const SCHEDULE_VERSION: u8 = 1;

/// Largest record accepted from flash
pub const MAX_RECORD_SIZE: usize = 2048;

/// Schedule payload rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Empty payload
    Empty,
    /// Not an array of `{id, times}` objects
    Malformed,
    /// More medications than the device holds
    TooManyMedications,
    /// More slots in one medication than the device holds
    TooManySlots,
    /// Medication id too long
    IdTooLong,
    /// Offset is not a non-negative whole number of seconds
    InvalidOffset,
}

impl From<DecodeError> for ParseError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Empty => ParseError::Empty,
            DecodeError::Malformed => ParseError::Malformed,
        }
    }
}

/// Persisting the schedule failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Serialization failed
    Encode,
    /// Serialization produced no bytes
    Empty,
    /// Record larger than the storage slot
    TooLarge,
    /// Flash backend error
    Flash(FlashError),
    /// Read-back differs from what was written
    Verify,
}

impl From<FlashError> for StorageError {
    fn from(e: FlashError) -> Self {
        StorageError::Flash(e)
    }
}

/// No usable schedule in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RestoreError {
    /// Nothing was ever persisted
    Missing,
    /// Flash backend error
    Flash(FlashError),
    /// Record is not a schedule
    BadMagic,
    /// Record written by an incompatible firmware
    BadVersion,
    /// Checksum mismatch
    Checksum,
    /// Truncated or structurally invalid record
    Decode,
}

impl From<FlashError> for RestoreError {
    fn from(e: FlashError) -> Self {
        match e {
            FlashError::NotFound => RestoreError::Missing,
            e => RestoreError::Flash(e),
        }
    }
}

/// A slot reference no longer resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndexError {
    /// No schedule loaded
    NoDocument,
    /// Reference taken from a replaced schedule
    StaleGeneration,
    MedicationOutOfRange,
    SlotOutOfRange,
    /// Slot already has a response
    AlreadyResponded,
}

/// Build a document from an inbound payload
///
/// All-or-nothing: any invalid entry rejects the whole payload. Every slot
/// starts outstanding and the origin is `now`.
pub fn parse_schedule(raw: &[u8], now: Millis) -> Result<ScheduleDocument, ParseError> {
    let wire = decode_schedule(raw)?;
    let mut doc = ScheduleDocument::new(now);

    for med in &wire {
        let id = String::try_from(med.id.as_str()).map_err(|_| ParseError::IdTooLong)?;
        let mut times = Vec::new();
        for offset in &med.times {
            let offset_s = offset.seconds().ok_or(ParseError::InvalidOffset)?;
            times
                .push(TimeSlot::new(offset_s))
                .map_err(|_| ParseError::TooManySlots)?;
        }
        doc.medications
            .push(Medication { id, times })
            .map_err(|_| ParseError::TooManyMedications)?;
    }

    Ok(doc)
}

#[derive(Serialize)]
struct RecordOut<'a> {
    magic: u32,
    version: u8,
    document: &'a ScheduleDocument,
    crc: u32,
}

#[derive(Deserialize)]
struct RecordHeader {
    magic: u32,
    version: u8,
}

/// Write the document to flash and verify it reads back intact
///
/// The backend replaces the value power-fail safely; the read-back catches
/// a short or torn write.
pub fn persist<S: FlashStorage>(storage: &mut S, doc: &ScheduleDocument) -> Result<(), StorageError> {
    let document = postcard::to_allocvec(doc).map_err(|_| StorageError::Encode)?;
    if document.is_empty() {
        return Err(StorageError::Empty);
    }

    let record = postcard::to_allocvec(&RecordOut {
        magic: SCHEDULE_MAGIC,
        version: SCHEDULE_VERSION,
        document: doc,
        crc: crc32(&document),
    })
    .map_err(|_| StorageError::Encode)?;
    if record.len() > MAX_RECORD_SIZE {
        return Err(StorageError::TooLarge);
    }

    storage.write(StorageKey::Schedule, &record)?;

    let mut readback = vec![0u8; MAX_RECORD_SIZE];
    let len = storage.read(StorageKey::Schedule, &mut readback)?;
    if readback[..len] != record[..] {
        return Err(StorageError::Verify);
    }

    debug!("schedule persisted ({} bytes)", record.len());
    Ok(())
}

/// Read and validate the persisted document
pub fn restore<S: FlashStorage>(storage: &mut S) -> Result<ScheduleDocument, RestoreError> {
    let mut buf = vec![0u8; MAX_RECORD_SIZE];
    let len = storage.read(StorageKey::Schedule, &mut buf)?;
    let bytes = &buf[..len];

    let (header, body): (RecordHeader, &[u8]) =
        postcard::take_from_bytes(bytes).map_err(|_| RestoreError::Decode)?;
    if header.magic != SCHEDULE_MAGIC {
        return Err(RestoreError::BadMagic);
    }
    if header.version != SCHEDULE_VERSION {
        return Err(RestoreError::BadVersion);
    }

    let (document, tail): (ScheduleDocument, &[u8]) =
        postcard::take_from_bytes(body).map_err(|_| RestoreError::Decode)?;
    let document_bytes = &body[..body.len() - tail.len()];

    let (crc, rest): (u32, &[u8]) =
        postcard::take_from_bytes(tail).map_err(|_| RestoreError::Decode)?;
    if !rest.is_empty() {
        return Err(RestoreError::Decode);
    }
    if crc != crc32(document_bytes) {
        return Err(RestoreError::Checksum);
    }

    Ok(document)
}

/// Owner of the live schedule
///
/// `generation` bumps whenever the document is replaced, so a [`SlotRef`]
/// taken before a replacement is recognised as stale.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    document: Option<ScheduleDocument>,
    generation: u32,
}

impl ScheduleStore {
    pub const fn new() -> Self {
        Self {
            document: None,
            generation: 0,
        }
    }

    pub fn document(&self) -> Option<&ScheduleDocument> {
        self.document.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Replace the schedule with a freshly received payload
    ///
    /// On error the current document is left untouched.
    pub fn ingest(&mut self, raw: &[u8], now: Millis) -> Result<&ScheduleDocument, ParseError> {
        let doc = parse_schedule(raw, now)?;
        Ok(self.load(doc))
    }

    /// Install a document (restored from flash or already parsed)
    pub fn load(&mut self, doc: ScheduleDocument) -> &ScheduleDocument {
        self.generation = self.generation.wrapping_add(1);
        self.document.insert(doc)
    }

    /// Reference a slot of the current document
    pub fn slot_ref(&self, medication: usize, slot: usize) -> SlotRef {
        SlotRef {
            medication,
            slot,
            generation: self.generation,
        }
    }

    pub fn resolve(&self, slot_ref: SlotRef) -> Result<&TimeSlot, IndexError> {
        let doc = self.checked(slot_ref)?;
        let med = doc
            .medications
            .get(slot_ref.medication)
            .ok_or(IndexError::MedicationOutOfRange)?;
        med.times.get(slot_ref.slot).ok_or(IndexError::SlotOutOfRange)
    }

    /// Record the response for a slot
    ///
    /// The only mutation of an ingested document. A slot is answered at
    /// most once.
    pub fn record_response(&mut self, slot_ref: SlotRef, value: bool) -> Result<(), IndexError> {
        self.resolve(slot_ref)?;
        let slot = self
            .document
            .as_mut()
            .and_then(|doc| doc.slot_mut(slot_ref.medication, slot_ref.slot))
            .ok_or(IndexError::SlotOutOfRange)?;
        if slot.respond(value) {
            Ok(())
        } else {
            Err(IndexError::AlreadyResponded)
        }
    }

    fn checked(&self, slot_ref: SlotRef) -> Result<&ScheduleDocument, IndexError> {
        let doc = self.document.as_ref().ok_or(IndexError::NoDocument)?;
        if slot_ref.generation != self.generation {
            return Err(IndexError::StaleGeneration);
        }
        Ok(doc)
    }
}
