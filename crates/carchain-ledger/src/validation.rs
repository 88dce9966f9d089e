use carchain_crypto::{ChainVerifier, LinkError};

use crate::block::Block;
use crate::error::IntegrityError;

/// Check that `candidate` may follow `tail`.
///
/// In order: the index is `tail.index + 1`, the predecessor hash is
/// `tail.hash`, and the candidate's hash matches its own fields.
pub fn validate_link(candidate: &Block, tail: &Block) -> Result<(), LinkError> {
    ChainVerifier::verify_link(candidate, tail)
}

/// Boolean form of [`validate_link`].
pub fn is_valid_link(candidate: &Block, tail: &Block) -> bool {
    validate_link(candidate, tail).is_ok()
}

/// Verify an entire block sequence.
///
/// Beyond hash linkage and self-consistency, the root must carry the genesis
/// marker and no later block may.
pub fn verify_blocks(blocks: &[Block]) -> Result<(), IntegrityError> {
    let genesis = blocks.first().ok_or(IntegrityError::Empty)?;
    ChainVerifier::verify_chain(blocks)?;
    if !genesis.payload().is_genesis() {
        return Err(IntegrityError::MissingGenesisPayload);
    }
    if let Some(block) = blocks[1..].iter().find(|b| b.payload().is_genesis()) {
        return Err(IntegrityError::MisplacedGenesisPayload {
            index: block.index(),
        });
    }
    Ok(())
}
