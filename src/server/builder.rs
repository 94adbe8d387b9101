//! ServerBuilder for fluent API to build the card manager HTTP server

use super::router::{build_card_routes, build_health_routes};
use crate::cards::{AppState, CardIssuanceService};
use crate::core::{CardStore, NumberGenerator, RandomNumberGenerator, RetryPolicy};
use crate::ledger::LedgerClient;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Builder for the card manager router
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryCardStore::new(cipher))
///     .with_ledger(HttpLedgerClient::new(&config.ledger)?)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn CardStore>>,
    ledger: Option<Arc<dyn LedgerClient>>,
    generator: Option<Arc<dyn NumberGenerator>>,
    retry: RetryPolicy,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            ledger: None,
            generator: None,
            retry: RetryPolicy::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the card store (required)
    pub fn with_store(mut self, store: impl CardStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared card store (required unless `with_store` is used)
    pub fn with_shared_store(mut self, store: Arc<dyn CardStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the ledger client (required)
    pub fn with_ledger(mut self, ledger: impl LedgerClient + 'static) -> Self {
        self.ledger = Some(Arc::new(ledger));
        self
    }

    /// Override the number generator (defaults to an entropy-seeded one)
    pub fn with_generator(mut self, generator: impl NumberGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Override the duplicate-retry policy (defaults to unbounded)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Add custom routes to the server
    ///
    /// Typical use is an upstream authentication layer's own endpoints.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the issuance service from the registered components
    pub fn build_service(&mut self) -> Result<CardIssuanceService> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("CardStore is required. Call .with_store()"))?;
        let ledger = self
            .ledger
            .take()
            .ok_or_else(|| anyhow::anyhow!("LedgerClient is required. Call .with_ledger()"))?;
        let generator = self
            .generator
            .take()
            .unwrap_or_else(|| Arc::new(RandomNumberGenerator::new()));

        Ok(CardIssuanceService::new(store, generator, ledger).with_retry_policy(self.retry))
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let state = AppState::new(self.build_service()?);

        let mut app = build_health_routes().merge(build_card_routes(state));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Card manager listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
