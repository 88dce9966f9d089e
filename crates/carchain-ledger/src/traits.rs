use chrono::NaiveDate;

use carchain_types::{SubjectId, TelemetryRecord};

use crate::block::Block;
use crate::error::LedgerError;
use crate::ledger::{AppendReceipt, LedgerStatus};

/// Write boundary for ledger append operations.
///
/// Appends are all-or-nothing: a rejected candidate leaves the sequence
/// untouched.
pub trait LedgerWriter: Send + Sync {
    /// Record `record` for `subject` as a new block linked to the tail.
    fn append(
        &self,
        subject: SubjectId,
        record: TelemetryRecord,
    ) -> Result<AppendReceipt, LedgerError>;

    /// Append a block built by the caller, after checking it links to the tail.
    fn append_block(&self, candidate: Block) -> Result<AppendReceipt, LedgerError>;
}

/// Read boundary for ledger queries. Every result is a copy.
pub trait LedgerReader: Send + Sync {
    fn tail(&self) -> Result<Block, LedgerError>;

    fn genesis(&self) -> Result<Block, LedgerError>;

    fn block_count(&self) -> Result<usize, LedgerError>;

    fn blocks(&self) -> Result<Vec<Block>, LedgerError>;

    /// Telemetry blocks for `subject` in chain order, optionally restricted
    /// to blocks created on the given UTC calendar day.
    fn history(
        &self,
        subject: &SubjectId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Block>, LedgerError>;

    /// Verify the whole sequence, reporting the first violation.
    fn verify_chain(&self) -> Result<(), LedgerError>;

    fn status(&self) -> Result<LedgerStatus, LedgerError>;

    fn validate_chain(&self) -> bool {
        self.verify_chain().is_ok()
    }
}
