//! HTTP server for carchain.
//!
//! A thin axum layer over [`carchain_ledger::Ledger`]: telemetry submission,
//! per-vehicle history, chain validation, and status. Every route maps to one
//! ledger operation; transport concerns (JSON shape, status codes, CORS) stay
//! here.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::CarchainServer;
pub use state::AppState;
