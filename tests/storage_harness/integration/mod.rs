//! Integration test infrastructure for the card HTTP layer.
//!
//! Wires a card store, a real `HttpLedgerClient` and an in-process ledger
//! stub into the production router, so tests exercise the full path
//! (HTTP → handler → service → store / ledger → response).
//!
//! # Architecture
//!
//! ```text
//! axum_test::TestServer
//!     └─ Router (built by ServerBuilder)
//!         ├─ POST /cards/create       → create_card ──┐
//!         ├─ POST /cards/create/link  → create_linked_card ──┤─→ LedgerStub (127.0.0.1:0)
//!         ├─ GET  /cards/all          → list_cards
//!         └─ GET  /health
//! ```


use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_test::TestServer;
use card_manager::config::LedgerConfig;
use card_manager::core::CardStore;
use card_manager::ledger::HttpLedgerClient;
use card_manager::server::ServerBuilder;
use serde_json::Value;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

/// A call received by the ledger stub
#[derive(Debug, Clone)]
pub struct LedgerCall {
    pub path: String,
    pub body: Value,
}

/// In-process stand-in for the ledger service
///
/// Answers both ledger endpoints with a status that tests can change at any
/// time, and records every request body.
#[derive(Clone)]
pub struct LedgerStub {
    pub base_url: String,
    status: Arc<AtomicU16>,
    calls: Arc<Mutex<Vec<LedgerCall>>>,
}

type StubState = (Arc<AtomicU16>, Arc<Mutex<Vec<LedgerCall>>>);

async fn record_call(
    State((status, calls)): State<StubState>,
    Path(path): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    calls.lock().unwrap().push(LedgerCall {
        path: format!("/service/account/{}", path),
        body,
    });
    StatusCode::from_u16(status.load(Ordering::SeqCst)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl LedgerStub {
    /// Start a stub answering `201 Created`.
    pub async fn spawn() -> Self {
        let status = Arc::new(AtomicU16::new(StatusCode::CREATED.as_u16()));
        let calls = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route("/service/account/{*path}", post(record_call))
            .with_state((status.clone(), calls.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            status,
            calls,
        }
    }

    /// Change the status returned from now on.
    pub fn respond_with(&self, status: StatusCode) {
        self.status.store(status.as_u16(), Ordering::SeqCst);
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// A client pointed at this stub.
    pub fn client(&self) -> HttpLedgerClient {
        HttpLedgerClient::new(&LedgerConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        })
        .unwrap()
    }
}

/// Build a test server around `store` and a fresh ledger stub.
pub async fn build_test_server(store: impl CardStore + 'static) -> (TestServer, LedgerStub) {
    let ledger = LedgerStub::spawn().await;
    let app = ServerBuilder::new()
        .with_store(store)
        .with_ledger(ledger.client())
        .build()
        .unwrap();
    (TestServer::new(app), ledger)
}
