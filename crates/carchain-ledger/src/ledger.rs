use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use carchain_store::ChainStore;
use carchain_types::{PrevHash, SubjectId, TelemetryRecord};

use crate::block::{Block, BlockPayload};
use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::traits::{LedgerReader, LedgerWriter};
use crate::validation::{validate_link, verify_blocks};

/// Startup behaviour of [`Ledger::open`].
#[derive(Clone, Debug)]
pub struct LedgerOptions {
    /// Move a snapshot that fails validation aside before the fresh genesis
    /// block overwrites it.
    pub quarantine_corrupt: bool,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            quarantine_corrupt: true,
        }
    }
}

/// Result of reading the persisted sequence at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was persisted yet.
    Absent,
    /// A valid sequence was adopted.
    Restored { blocks: usize },
    /// The snapshot could not be read, decoded, or verified and was discarded.
    Corrupted { reason: String },
}

/// Whether an appended block reached durable storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Durability {
    Persisted,
    /// The block is in the live sequence but the snapshot write failed. The
    /// next successful persist writes it out.
    Volatile { reason: String },
}

/// A successfully appended block.
#[derive(Clone, Debug, PartialEq)]
pub struct AppendReceipt {
    pub block: Block,
    pub durability: Durability,
}

impl AppendReceipt {
    pub fn is_persisted(&self) -> bool {
        self.durability == Durability::Persisted
    }
}

/// Consistent snapshot of ledger health.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerStatus {
    pub size: usize,
    pub genesis: Block,
    pub latest: Block,
    pub valid: bool,
}

/// The append-only, hash-chained telemetry ledger.
///
/// One instance owns the block sequence for the life of the process. All
/// appends are serialized behind the write lock from reading the tail to
/// persisting the new snapshot; readers take the read lock and get copies.
pub struct Ledger {
    store: Box<dyn ChainStore>,
    clock: Box<dyn Clock>,
    blocks: RwLock<Vec<Block>>,
}

impl Ledger {
    /// Restore the ledger from `store`, or start a fresh chain.
    ///
    /// An absent or corrupted snapshot is replaced by a single genesis block,
    /// which is persisted before returning.
    pub fn open(
        store: impl ChainStore + 'static,
        options: LedgerOptions,
    ) -> Result<(Self, LoadOutcome), LedgerError> {
        Self::open_with_clock(store, options, SystemClock)
    }

    pub fn open_with_clock(
        store: impl ChainStore + 'static,
        options: LedgerOptions,
        clock: impl Clock + 'static,
    ) -> Result<(Self, LoadOutcome), LedgerError> {
        let ledger = Self::unloaded(store, clock);
        let location = ledger.store.describe();

        let outcome = ledger.load()?;
        match &outcome {
            LoadOutcome::Restored { blocks } => {
                info!(store = %location, blocks, "restored ledger");
            }
            LoadOutcome::Absent => {
                info!(store = %location, "no persisted ledger; creating genesis block");
                ledger.init_genesis()?;
            }
            LoadOutcome::Corrupted { reason } => {
                warn!(
                    store = %location,
                    %reason,
                    "persisted ledger rejected; starting a fresh chain"
                );
                if options.quarantine_corrupt {
                    if let Err(e) = ledger.store.quarantine() {
                        warn!(
                            store = %location,
                            error = %e,
                            "could not quarantine rejected ledger"
                        );
                    }
                }
                ledger.init_genesis()?;
            }
        }
        Ok((ledger, outcome))
    }

    /// Restore a persisted ledger without repairing it.
    ///
    /// Nothing is written to `store`: an absent snapshot is
    /// [`LedgerError::NotPersisted`] and one that fails to decode or verify is
    /// [`LedgerError::Corrupted`], with the artifact left as found.
    pub fn open_existing(store: impl ChainStore + 'static) -> Result<Self, LedgerError> {
        let ledger = Self::unloaded(store, SystemClock);
        match ledger.load()? {
            LoadOutcome::Restored { blocks } => {
                debug!(store = %ledger.store.describe(), blocks, "opened ledger without repair");
                Ok(ledger)
            }
            LoadOutcome::Absent => Err(LedgerError::NotPersisted(ledger.store.describe())),
            LoadOutcome::Corrupted { reason } => Err(LedgerError::Corrupted { reason }),
        }
    }

    fn unloaded(store: impl ChainStore + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            store: Box::new(store),
            clock: Box::new(clock),
            blocks: RwLock::new(Vec::new()),
        }
    }

    /// Replace the live sequence with the persisted one, if it verifies.
    ///
    /// On any failure the live sequence is left empty; the caller is expected
    /// to start a fresh chain.
    pub fn load(&self) -> Result<LoadOutcome, LedgerError> {
        let mut blocks = self.write_blocks()?;
        blocks.clear();

        let bytes = match self.store.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(LoadOutcome::Absent),
            Err(e) => {
                return Ok(LoadOutcome::Corrupted {
                    reason: format!("unreadable snapshot: {e}"),
                })
            }
        };

        let candidate: Vec<Block> = match serde_json::from_slice(&bytes) {
            Ok(candidate) => candidate,
            Err(e) => {
                return Ok(LoadOutcome::Corrupted {
                    reason: format!("undecodable snapshot: {e}"),
                })
            }
        };

        if let Err(e) = verify_blocks(&candidate) {
            return Ok(LoadOutcome::Corrupted {
                reason: e.to_string(),
            });
        }

        let count = candidate.len();
        *blocks = candidate;
        Ok(LoadOutcome::Restored { blocks: count })
    }

    /// Write the whole sequence to the store.
    pub fn persist(&self) -> Result<(), LedgerError> {
        let blocks = self.read_blocks()?;
        self.write_snapshot(&blocks)
    }

    fn init_genesis(&self) -> Result<(), LedgerError> {
        let genesis = Block::genesis(self.clock.now());
        let hash = genesis.hash();
        let mut blocks = self.write_blocks()?;
        *blocks = vec![genesis];
        self.write_snapshot(&blocks)?;
        info!(hash = %hash.short_hex(), "created genesis block");
        Ok(())
    }

    fn write_snapshot(&self, blocks: &[Block]) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec_pretty(blocks)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        self.store.write(&bytes)?;
        debug!(blocks = blocks.len(), len = bytes.len(), "persisted ledger");
        Ok(())
    }

    /// Validate `candidate` against the tail, then push and persist it.
    fn commit(
        &self,
        blocks: &mut Vec<Block>,
        candidate: Block,
    ) -> Result<AppendReceipt, LedgerError> {
        let tail = blocks.last().ok_or(LedgerError::EmptyChain)?;
        validate_link(&candidate, tail)?;
        if candidate.payload().is_genesis() {
            return Err(LedgerError::UnexpectedGenesis);
        }

        blocks.push(candidate.clone());
        let durability = match self.write_snapshot(blocks) {
            Ok(()) => Durability::Persisted,
            Err(e) => {
                warn!(index = candidate.index(), error = %e, "block appended but not persisted");
                Durability::Volatile {
                    reason: e.to_string(),
                }
            }
        };

        debug!(
            index = candidate.index(),
            hash = %candidate.hash().short_hex(),
            "appended block"
        );
        Ok(AppendReceipt {
            block: candidate,
            durability,
        })
    }

    fn read_blocks(&self) -> Result<RwLockReadGuard<'_, Vec<Block>>, LedgerError> {
        self.blocks.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_blocks(&self) -> Result<RwLockWriteGuard<'_, Vec<Block>>, LedgerError> {
        self.blocks.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl LedgerWriter for Ledger {
    fn append(
        &self,
        subject: SubjectId,
        record: TelemetryRecord,
    ) -> Result<AppendReceipt, LedgerError> {
        record.validate()?;

        let mut blocks = self.write_blocks()?;
        let tail = blocks.last().ok_or(LedgerError::EmptyChain)?;
        let timestamp = self.clock.now();
        let candidate = Block::new(
            tail.index() + 1,
            timestamp,
            BlockPayload::telemetry(subject, record, timestamp),
            PrevHash::Block(tail.hash()),
        );
        self.commit(&mut blocks, candidate)
    }

    fn append_block(&self, candidate: Block) -> Result<AppendReceipt, LedgerError> {
        if let Some(record) = candidate.payload().record() {
            record.validate()?;
        }
        let mut blocks = self.write_blocks()?;
        self.commit(&mut blocks, candidate)
    }
}

impl LedgerReader for Ledger {
    fn tail(&self) -> Result<Block, LedgerError> {
        let blocks = self.read_blocks()?;
        blocks.last().cloned().ok_or(LedgerError::EmptyChain)
    }

    fn genesis(&self) -> Result<Block, LedgerError> {
        let blocks = self.read_blocks()?;
        blocks.first().cloned().ok_or(LedgerError::EmptyChain)
    }

    fn block_count(&self) -> Result<usize, LedgerError> {
        Ok(self.read_blocks()?.len())
    }

    fn blocks(&self) -> Result<Vec<Block>, LedgerError> {
        Ok(self.read_blocks()?.clone())
    }

    fn history(
        &self,
        subject: &SubjectId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Block>, LedgerError> {
        let blocks = self.read_blocks()?;
        Ok(blocks
            .iter()
            .skip(1)
            .filter(|b| b.payload().subject() == Some(subject))
            .filter(|b| date.map_or(true, |day| b.timestamp().date() == day))
            .cloned()
            .collect())
    }

    fn verify_chain(&self) -> Result<(), LedgerError> {
        let blocks = self.read_blocks()?;
        verify_blocks(&blocks)?;
        Ok(())
    }

    fn status(&self) -> Result<LedgerStatus, LedgerError> {
        let blocks = self.read_blocks()?;
        let genesis = blocks.first().cloned().ok_or(LedgerError::EmptyChain)?;
        let latest = blocks.last().cloned().ok_or(LedgerError::EmptyChain)?;
        Ok(LedgerStatus {
            size: blocks.len(),
            genesis,
            latest,
            valid: verify_blocks(&blocks).is_ok(),
        })
    }
}
