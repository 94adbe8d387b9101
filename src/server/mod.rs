//! Server module for building the card manager HTTP server
//!
//! This module provides a `ServerBuilder` that wires a card store, a ledger
//! client and a number generator into the card routes, plus health routes.

pub mod builder;
pub mod router;

pub use builder::ServerBuilder;
pub use router::{build_card_routes, build_health_routes};
