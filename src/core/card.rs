//! Card records and the payloads built around them

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::ValidationError;

/// An issued or linked payment card
///
/// This is the plaintext view of a card. Sensitive fields (`card_number`,
/// `phone_number`) only ever leave a [`CardStore`](crate::core::CardStore)
/// in this decrypted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub card_number: String,
    pub phone_number: String,
    pub currency: String,
    pub balance: u64,
}

/// Payload forwarded to the ledger when a card opens a new account
///
/// Never persisted by this service: the account number only exists in the
/// ledger once the call succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequest {
    #[serde(flatten)]
    pub card: Card,
    pub account_number: String,
}

/// Largest balance a card can carry; it must fit a signed 64-bit column
pub const MAX_BALANCE: u64 = i64::MAX as u64;

/// Caller-supplied part of a create request
///
/// Only these three keys are read from the request body. Identifiers and
/// numbers are always generated server-side, so anything else the caller
/// sends is dropped during decoding. A balance of zero is accepted, unlike
/// the Go service this replaces, which treated 0 as a missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct CardDraft {
    #[validate(required, length(min = 1))]
    pub phone_number: Option<String>,

    #[validate(required, length(min = 1))]
    pub currency: Option<String>,

    #[validate(required, range(max = MAX_BALANCE))]
    pub balance: Option<u64>,
}

/// Server-generated values for one insertion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedNumbers {
    pub card_id: Uuid,
    pub account_id: Uuid,
    pub card_number: String,
    pub account_number: String,
}

/// A draft that passed validation; every field is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    pub phone_number: String,
    pub currency: String,
    pub balance: u64,
}

impl CardDraft {
    /// Validate the draft and unwrap its fields.
    pub fn validated(self) -> Result<CardTemplate, ValidationError> {
        self.validate()?;
        let (Some(phone_number), Some(currency), Some(balance)) =
            (self.phone_number, self.currency, self.balance)
        else {
            return Err(ValidationError::MissingFields);
        };
        Ok(CardTemplate {
            phone_number,
            currency,
            balance,
        })
    }
}

impl CardTemplate {
    /// Build a card for `user_id` from freshly issued numbers.
    pub fn issue(&self, user_id: Uuid, numbers: &IssuedNumbers) -> Card {
        Card {
            card_id: numbers.card_id,
            user_id,
            account_id: numbers.account_id,
            card_number: numbers.card_number.clone(),
            phone_number: self.phone_number.clone(),
            currency: self.currency.clone(),
            balance: self.balance,
        }
    }
}
