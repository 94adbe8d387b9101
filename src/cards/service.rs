//! Card issuance: validation, collision-safe insertion, ledger notification
//!
//! Each create request goes through
//! `Received -> Validated -> Inserted -> NotifiedExternal -> Completed`.
//! Insertion regenerates every server-side value after a duplicate key and
//! tries again. Once the row is stored the ledger is called; a ledger
//! failure fails the request but the stored card is kept.

use std::sync::Arc;
use uuid::Uuid;

use crate::core::{
    AccountRequest, Card, CardDraft, CardError, CardStore, CardTemplate, IssuedNumbers,
    NumberGenerator, RetryError, RetryPolicy, retry_on_duplicate,
};
use crate::ledger::LedgerClient;

const ADD_CARD_FAILED: &str = "Failed to add card";
const LIST_CARDS_FAILED: &str = "Failed to get cards info";
const CREATE_ACCOUNT_FAILED: &str = "Failed to create account";
const LINK_CARD_FAILED: &str = "Failed to link card";

/// Orchestrates card creation and listing
pub struct CardIssuanceService {
    store: Arc<dyn CardStore>,
    generator: Arc<dyn NumberGenerator>,
    ledger: Arc<dyn LedgerClient>,
    retry: RetryPolicy,
}

impl CardIssuanceService {
    pub fn new(
        store: Arc<dyn CardStore>,
        generator: Arc<dyn NumberGenerator>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            store,
            generator,
            ledger,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the default (unbounded) duplicate-retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Issue a card that opens a new ledger account.
    ///
    /// Returns the payload that was sent to the ledger.
    pub async fn create_card_with_account(
        &self,
        user_id: Uuid,
        draft: CardDraft,
    ) -> Result<AccountRequest, CardError> {
        let template = draft.validated()?;
        let (card, numbers) = self.insert_unique(user_id, &template).await?;

        let request = AccountRequest {
            card,
            account_number: numbers.account_number,
        };

        if let Err(source) = self.ledger.create_account(&request).await {
            tracing::warn!(
                user_id = %user_id,
                card_id = %request.card.card_id,
                error = %source,
                "Card stored but ledger account creation failed; keeping card"
            );
            return Err(CardError::Downstream {
                context: CREATE_ACCOUNT_FAILED,
                source,
            });
        }

        tracing::info!(
            user_id = %user_id,
            card_id = %request.card.card_id,
            account_id = %request.card.account_id,
            "Issued card with new account"
        );
        Ok(request)
    }

    /// Issue a card and link it to an existing ledger account.
    pub async fn create_linked_card(&self, user_id: Uuid, draft: CardDraft) -> Result<Card, CardError> {
        let template = draft.validated()?;
        let (card, _) = self.insert_unique(user_id, &template).await?;

        if let Err(source) = self.ledger.link_card(&card).await {
            tracing::warn!(
                user_id = %user_id,
                card_id = %card.card_id,
                error = %source,
                "Card stored but ledger card link failed; keeping card"
            );
            return Err(CardError::Downstream {
                context: LINK_CARD_FAILED,
                source,
            });
        }

        tracing::info!(user_id = %user_id, card_id = %card.card_id, "Issued linked card");
        Ok(card)
    }

    /// All cards of `user_id`, newest first, sensitive fields decrypted.
    pub async fn list_cards(&self, user_id: Uuid) -> Result<Vec<Card>, CardError> {
        self.store.get_all_cards(&user_id).await.map_err(|source| {
            tracing::error!(user_id = %user_id, error = %source, "Failed to get cards info");
            CardError::Storage {
                context: LIST_CARDS_FAILED,
                source,
            }
        })
    }

    /// Store a new card, regenerating all server-side values on collision.
    async fn insert_unique(
        &self,
        user_id: Uuid,
        template: &CardTemplate,
    ) -> Result<(Card, IssuedNumbers), CardError> {
        let outcome = retry_on_duplicate(self.retry, |_| {
            let store = Arc::clone(&self.store);
            let numbers = self.generator.issue();
            let card = template.issue(user_id, &numbers);
            async move {
                store.add_card(&card).await?;
                Ok((card, numbers))
            }
        })
        .await;

        match outcome {
            Ok((inserted, _attempts)) => Ok(inserted),
            Err(RetryError::Exhausted { attempts }) => {
                tracing::error!(user_id = %user_id, attempts, "Failed to add card: duplicate keys on every attempt");
                Err(CardError::RetriesExhausted {
                    context: ADD_CARD_FAILED,
                    attempts,
                })
            }
            Err(RetryError::Store(source)) => {
                tracing::error!(user_id = %user_id, error = %source, "Failed to add card");
                Err(CardError::Storage {
                    context: ADD_CARD_FAILED,
                    source,
                })
            }
        }
    }
}
