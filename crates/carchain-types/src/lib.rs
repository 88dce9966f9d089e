//! Foundation types for carchain, the tamper-evident vehicle telemetry ledger.
//!
//! Every other carchain crate depends on `carchain-types`.
//!
//! # Key Types
//!
//! - [`SubjectId`]: Identifier of the vehicle a telemetry record belongs to
//! - [`Timestamp`]: UTC instant with microsecond precision and a canonical text form
//! - [`TelemetryRecord`]: The fixed set of telemetry readings stored per block
//! - [`BlockHash`]: 32-byte BLAKE3 block fingerprint
//! - [`PrevHash`]: Link to the predecessor block, or the genesis sentinel

pub mod error;
pub mod hash;
pub mod subject;
pub mod telemetry;
pub mod temporal;

pub use error::TypeError;
pub use hash::{BlockHash, PrevHash, GENESIS_SENTINEL};
pub use subject::SubjectId;
pub use telemetry::TelemetryRecord;
pub use temporal::Timestamp;
