//! Durable snapshot storage for the carchain ledger.
//!
//! The ledger persists its whole block sequence as one artifact after every
//! append. This crate owns where those bytes live; it never interprets them.
//!
//! # Storage Backends
//!
//! All backends implement the [`ChainStore`] trait:
//!
//! - [`FileChainStore`] -- single file, replaced atomically on every write
//! - [`InMemoryChainStore`] -- in-process buffer for tests and embedding
//!
//! # Design Rules
//!
//! 1. A write replaces the previous snapshot entirely or not at all.
//! 2. A missing artifact is `Ok(None)`, never an error.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileChainStore;
pub use memory::InMemoryChainStore;
pub use traits::ChainStore;
