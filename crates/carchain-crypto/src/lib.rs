//! Cryptographic primitives for carchain.
//!
//! Provides domain-separated BLAKE3 hashing over a canonical field encoding
//! and hash chain verification for block sequences.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, ChainLinked, ChainVerifier, LinkError};
pub use hasher::{CanonicalFields, FieldHasher, BLOCK_DOMAIN};
