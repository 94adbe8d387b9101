//! Card store contract and the sealed row format shared by backends

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::card::Card;
use crate::core::cipher::FieldCipher;
use crate::core::error::StoreError;

/// Persistence for issued cards
///
/// Implementations encrypt `card_number` and `phone_number` before they are
/// written and decrypt them before they are returned. Ciphertext never
/// crosses this boundary.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Insert a new card.
    ///
    /// Fails with [`StoreError::DuplicateKey`] when the card id or the card
    /// number is already taken, and with another variant on any other failure.
    async fn add_card(&self, card: &Card) -> Result<(), StoreError>;

    /// All cards of `user_id`, most recently created first.
    ///
    /// A user without cards gets an empty vector.
    async fn get_all_cards(&self, user_id: &Uuid) -> Result<Vec<Card>, StoreError>;
}

/// A card as it sits at rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedCard {
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub card_number: Vec<u8>,
    pub card_number_fingerprint: Vec<u8>,
    pub phone_number: Vec<u8>,
    pub currency: String,
    pub balance: u64,
    pub created_at: DateTime<Utc>,
}

impl SealedCard {
    /// Encrypt the sensitive fields of `card`.
    pub fn seal(card: &Card, cipher: &FieldCipher) -> Result<Self, StoreError> {
        Ok(Self {
            card_id: card.card_id,
            user_id: card.user_id,
            account_id: card.account_id,
            card_number: cipher.encrypt(&card.card_number)?,
            card_number_fingerprint: cipher.fingerprint(&card.card_number),
            phone_number: cipher.encrypt(&card.phone_number)?,
            currency: card.currency.clone(),
            balance: card.balance,
            created_at: Utc::now(),
        })
    }

    /// Decrypt back into a plaintext card.
    pub fn open(&self, cipher: &FieldCipher) -> Result<Card, StoreError> {
        Ok(Card {
            card_id: self.card_id,
            user_id: self.user_id,
            account_id: self.account_id,
            card_number: cipher.decrypt(&self.card_number)?,
            phone_number: cipher.decrypt(&self.phone_number)?,
            currency: self.currency.clone(),
            balance: self.balance,
        })
    }
}
