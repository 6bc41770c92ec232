//! Pipli wireless sync protocol
//!
//! This crate defines what travels over the BLE link between the companion
//! app and the device. The link itself (a BLE-UART bridge) is a plain byte
//! pipe, so the protocol is deliberately small:
//!
//! ```text
//!  app ──► device   "update"                         → echo the current report
//!  app ──► device   [{"id":"A","times":["0","10"]}]  → replace the schedule
//!  device ──► app   {"originReceiveTime":..,"medications":[..]}
//!                   split into ≤ chunk-size pieces, sent in order
//! ```
//!
//! Inbound payloads are delimited by a newline/NUL terminator or by the
//! line going quiet (see [`assembler`]).

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod assembler;
pub mod chunk;
pub mod inbound;
pub mod report;

pub use assembler::{AssembleError, PayloadAssembler, MAX_PAYLOAD_SIZE};
pub use chunk::{ReportChunks, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use inbound::{classify, decode_schedule, DecodeError, Inbound, WireMedication, WireOffset, UPDATE_TOKEN};
pub use report::{encode_report, EncodeError, Report, ReportMedication, ReportSlot};
