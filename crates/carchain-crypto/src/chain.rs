use carchain_types::{BlockHash, PrevHash};

/// Trait for blocks that participate in a hash chain.
pub trait ChainLinked {
    /// Position the block claims in the chain.
    fn index(&self) -> u64;
    /// The hash stored on the block.
    fn stored_hash(&self) -> BlockHash;
    /// The stored reference to the predecessor.
    fn prev_hash(&self) -> PrevHash;
    /// The digest recomputed from the block's own fields.
    fn computed_hash(&self) -> BlockHash;
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of blocks forms a valid hash chain: each block
/// sits at the index it claims, each block's `prev_hash` matches its
/// predecessor's hash, and each block's stored hash matches the digest of
/// its own fields.
pub struct ChainVerifier;

impl ChainVerifier {
    /// Verify a whole chain, stopping at the first violation.
    ///
    /// Checks:
    /// 1. Every block's index equals its position
    /// 2. The first block carries the genesis sentinel
    /// 3. Each subsequent block links to the previous block's hash
    /// 4. Each block's stored hash equals its recomputed digest
    pub fn verify_chain(blocks: &[impl ChainLinked]) -> Result<(), ChainError> {
        for (position, block) in blocks.iter().enumerate() {
            let position = position as u64;
            if block.index() != position {
                return Err(ChainError::IndexMismatch {
                    position,
                    found: block.index(),
                });
            }

            match (position, block.prev_hash()) {
                (0, PrevHash::Genesis) => {}
                (0, PrevHash::Block(_)) => return Err(ChainError::GenesisHasPrevHash),
                (_, PrevHash::Genesis) => {
                    return Err(ChainError::MissingPrevHash { index: position })
                }
                (_, PrevHash::Block(prev)) => {
                    let expected = blocks[position as usize - 1].stored_hash();
                    if prev != expected {
                        return Err(ChainError::BrokenLink { index: position });
                    }
                }
            }

            if block.computed_hash() != block.stored_hash() {
                return Err(ChainError::HashMismatch { index: position });
            }
        }
        Ok(())
    }

    /// Check that `candidate` may be appended directly after `tail`.
    ///
    /// Checks run in order and stop at the first failure.
    pub fn verify_link(
        candidate: &impl ChainLinked,
        tail: &impl ChainLinked,
    ) -> Result<(), LinkError> {
        let expected = tail.index() + 1;
        if candidate.index() != expected {
            return Err(LinkError::IndexMismatch {
                expected,
                found: candidate.index(),
            });
        }
        if candidate.prev_hash() != PrevHash::Block(tail.stored_hash()) {
            return Err(LinkError::PrevHashMismatch { index: candidate.index() });
        }
        if candidate.computed_hash() != candidate.stored_hash() {
            return Err(LinkError::HashMismatch { index: candidate.index() });
        }
        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("block at position {position} claims index {found}")]
    IndexMismatch { position: u64, found: u64 },

    #[error("genesis block links to a predecessor (should carry the \"0\" sentinel)")]
    GenesisHasPrevHash,

    #[error("block {index} carries the genesis sentinel instead of a predecessor hash")]
    MissingPrevHash { index: u64 },

    #[error("broken link at index {index}: prev_hash does not match")]
    BrokenLink { index: u64 },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: u64 },
}

/// Why a candidate block cannot follow the current tail.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("expected index {expected}, candidate has {found}")]
    IndexMismatch { expected: u64, found: u64 },

    #[error("candidate {index} does not link to the current tail")]
    PrevHashMismatch { index: u64 },

    #[error("candidate {index} hash does not match its contents")]
    HashMismatch { index: u64 },
}
