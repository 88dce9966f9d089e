//! Append-only, hash-chained ledger of vehicle telemetry.
//!
//! This crate is the heart of carchain. It provides:
//! - [`Block`] and [`BlockPayload`], immutable hash-linked entries
//! - [`Ledger`], which owns the sequence, its validation and persistence
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - Link and whole-chain validation
//!
//! A ledger is opened once per process with [`Ledger::open`]. It restores the
//! persisted sequence if that sequence verifies, and otherwise starts over
//! from a fresh genesis block.

pub mod block;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod traits;
pub mod validation;

pub use block::{Block, BlockPayload, GENESIS_MESSAGE};
pub use clock::{Clock, SystemClock};
pub use error::{IntegrityError, LedgerError};
pub use ledger::{AppendReceipt, Durability, Ledger, LedgerOptions, LedgerStatus, LoadOutcome};
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{is_valid_link, validate_link, verify_blocks};
