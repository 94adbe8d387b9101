//! Client side of the external ledger (transaction) service
//!
//! The ledger is the system of record for accounts and balances. This
//! service only tells it about new cards: either a card that opens a new
//! account, or a card linked to an account the ledger already knows.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{AccountRequest, Card};

pub use http::HttpLedgerClient;

/// Path of the account-creation endpoint, relative to the ledger base URL
pub const CREATE_ACCOUNT_PATH: &str = "/service/account/create";

/// Path of the card-linking endpoint, relative to the ledger base URL
pub const LINK_CARD_PATH: &str = "/service/account/link/card";

/// Errors returned by a [`LedgerClient`]
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The request never got a response (connect error, timeout, ...)
    #[error("ledger request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The ledger answered with something other than 201 Created
    #[error("ledger returned unexpected status {status} for {endpoint}")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },
}

/// Notifications sent to the ledger after a card is stored
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Open a new ledger account for a freshly issued card.
    async fn create_account(&self, request: &AccountRequest) -> Result<(), LedgerError>;

    /// Attach a freshly issued card to an existing ledger account.
    async fn link_card(&self, card: &Card) -> Result<(), LedgerError>;
}
