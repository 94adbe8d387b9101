//! # Card Manager
//!
//! Issues and stores payment cards for bank customers.
//!
//! ## Features
//!
//! - **Collision-safe issuance**: Luhn-valid card numbers and random account
//!   numbers, regenerated and re-inserted until no unique constraint fires
//! - **Encrypted at rest**: card and phone numbers are sealed with AES-256-GCM
//!   inside the store and only ever returned decrypted
//! - **Ledger coordination**: new cards are announced to the external ledger
//!   service (create account or link card) after they are stored
//! - **Pluggable storage**: in-memory store for tests and development,
//!   PostgreSQL behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use card_manager::prelude::*;
//!
//! let config = CardManagerConfig::from_env()?;
//! let cipher = FieldCipher::new(&config.encryption_key)?;
//!
//! ServerBuilder::new()
//!     .with_store(InMemoryCardStore::new(cipher))
//!     .with_ledger(HttpLedgerClient::new(&config.ledger)?)
//!     .serve(&config.listen_addr)
//!     .await?;
//! ```

pub mod cards;
pub mod config;
pub mod core;
pub mod ledger;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::cards::{AppState, CardIssuanceService, CardPayload};
    pub use crate::config::{CardManagerConfig, ConfigError, LedgerConfig};
    pub use crate::core::{
        AccountRequest, AuthenticatedUser, Card, CardDraft, CardError, CardStore, CardTemplate,
        CipherError, FieldCipher, IssuedNumbers, NumberGenerator, RandomNumberGenerator,
        RetryPolicy, StoreError, USER_ID_HEADER, ValidationError, is_luhn_valid,
    };
    pub use crate::ledger::{HttpLedgerClient, LedgerClient, LedgerError};
    pub use crate::server::ServerBuilder;
    pub use crate::storage::InMemoryCardStore;

    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresCardStore;

    pub use uuid::Uuid;
}
