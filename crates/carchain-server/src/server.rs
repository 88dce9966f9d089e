use std::sync::Arc;

use tokio::net::TcpListener;

use carchain_ledger::{Ledger, LedgerOptions, LoadOutcome};
use carchain_store::FileChainStore;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// carchain HTTP server.
pub struct CarchainServer {
    config: ServerConfig,
}

impl CarchainServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the ledger at the configured chain path.
    pub fn open_ledger(&self) -> ServerResult<(Ledger, LoadOutcome)> {
        let store = FileChainStore::new(&self.config.chain_path)?;
        let options = LedgerOptions {
            quarantine_corrupt: self.config.quarantine_corrupt,
        };
        Ok(Ledger::open(store, options)?)
    }

    /// Build the router around an already opened ledger (useful for testing).
    pub fn router(&self, ledger: Arc<Ledger>) -> axum::Router {
        build_router(AppState { ledger }, &self.config)
    }

    /// Open the ledger and serve requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let (ledger, outcome) = self.open_ledger()?;
        tracing::info!(?outcome, chain = %self.config.chain_path.display(), "ledger ready");

        let app = self.router(Arc::new(ledger));
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("carchain server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
