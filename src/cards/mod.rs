//! Card issuance service and its HTTP handlers

pub mod handlers;
pub mod service;

pub use handlers::{AppState, CardPayload};
pub use service::CardIssuanceService;
