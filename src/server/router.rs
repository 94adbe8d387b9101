//! Router builder utilities for card routes

use crate::cards::handlers::{AppState, create_card, create_linked_card, list_cards};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

/// Build card routes
///
/// - POST /cards/create - Issue a card with a new ledger account
/// - POST /cards/create/link - Issue a card linked to an existing account
/// - GET /cards/all - List the caller's cards
pub fn build_card_routes(state: AppState) -> Router {
    Router::new()
        .route("/cards/create", post(create_card))
        .route("/cards/create/link", post(create_linked_card))
        .route("/cards/all", get(list_cards))
        .with_state(state)
}

/// Build health check routes
pub fn build_health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
