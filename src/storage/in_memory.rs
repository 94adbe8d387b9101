//! In-memory implementation of CardStore for testing and development

use crate::core::{Card, CardStore, FieldCipher, SealedCard, StoreError};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

const BACKEND: &str = "memory";

/// In-memory card store implementation
///
/// Rows are kept sealed, exactly as a database would hold them. Uses
/// RwLock for thread-safe access; uniqueness is checked under the write
/// lock so concurrent inserts cannot both win.
#[derive(Clone)]
pub struct InMemoryCardStore {
    cipher: FieldCipher,
    rows: Arc<RwLock<Vec<SealedCard>>>,
}

impl InMemoryCardStore {
    /// Create a new in-memory card store
    pub fn new(cipher: FieldCipher) -> Self {
        Self {
            cipher,
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Raw rows as stored, oldest first
    pub fn sealed_rows(&self) -> Result<Vec<SealedCard>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::backend(BACKEND, format!("Failed to acquire read lock: {}", e)))?;
        Ok(rows.clone())
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn add_card(&self, card: &Card) -> Result<(), StoreError> {
        let sealed = SealedCard::seal(card, &self.cipher)?;

        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::backend(BACKEND, format!("Failed to acquire write lock: {}", e)))?;

        if rows.iter().any(|row| row.card_id == sealed.card_id) {
            return Err(StoreError::DuplicateKey {
                constraint: Some("cards_pkey".to_string()),
            });
        }
        if rows
            .iter()
            .any(|row| row.card_number_fingerprint == sealed.card_number_fingerprint)
        {
            return Err(StoreError::DuplicateKey {
                constraint: Some("cards_card_number_fingerprint_key".to_string()),
            });
        }

        rows.push(sealed);
        Ok(())
    }

    async fn get_all_cards(&self, user_id: &Uuid) -> Result<Vec<Card>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::backend(BACKEND, format!("Failed to acquire read lock: {}", e)))?;

        let mut owned: Vec<&SealedCard> = rows.iter().filter(|row| &row.user_id == user_id).collect();
        // Newest first; rows are appended in creation order, so a stable
        // sort on reversed insertion order breaks timestamp ties.
        owned.reverse();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        owned.into_iter().map(|row| row.open(&self.cipher)).collect()
    }
}
