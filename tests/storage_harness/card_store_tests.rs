//! Macro-generated test suite for `CardStore` contract validation.
//!
//! The `card_store_tests!` macro generates a test module that validates any
//! `CardStore` implementation against the full contract: insertion, per-user
//! listing in newest-first order, duplicate detection on both unique keys
//! and concurrent inserts.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use card_manager::storage::InMemoryCardStore;
//!
//! card_store_tests!(InMemoryCardStore::new(test_cipher()));
//! ```
//!
//! # Generated Tests
//!
//! - `test_add_and_list`: insert then list, every field comes back decrypted
//! - `test_list_unknown_user`: a user without cards gets an empty vector
//! - `test_list_is_scoped_to_user`: other users' cards never show up
//! - `test_list_newest_first`: three inserts come back in reverse order
//! - `test_duplicate_card_id`: same id twice is a duplicate key
//! - `test_duplicate_card_number`: same number under a new id is a duplicate key
//! - `test_duplicate_leaves_store_unchanged`: the losing insert writes nothing
//! - `test_concurrent_inserts`: parallel inserts from spawned tasks all land

/// Generate a full `CardStore` conformance test suite.
///
/// `$factory` must evaluate to a `CardStore + Clone + 'static`. It is
/// re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! card_store_tests {
    ($factory:expr) => {
        mod card_store_contract_tests {
            use super::*;
            use card_manager::core::{CardStore, StoreError};
            use std::time::Duration;
            use uuid::Uuid;

            // ==================================================================
            // Insert & list
            // ==================================================================

            #[tokio::test]
            async fn test_add_and_list() {
                let store = $factory;
                let user_id = Uuid::new_v4();
                let card = create_test_card(user_id);

                store.add_card(&card).await.unwrap();

                let cards = store.get_all_cards(&user_id).await.unwrap();
                assert_eq!(cards, vec![card]);
            }

            #[tokio::test]
            async fn test_list_unknown_user() {
                let store = $factory;
                let cards = store.get_all_cards(&Uuid::new_v4()).await.unwrap();
                assert!(cards.is_empty());
            }

            #[tokio::test]
            async fn test_list_is_scoped_to_user() {
                let store = $factory;
                let alice = Uuid::new_v4();
                let bob = Uuid::new_v4();

                for card in create_test_cards(alice, 2) {
                    store.add_card(&card).await.unwrap();
                }
                store.add_card(&create_test_card(bob)).await.unwrap();

                let cards = store.get_all_cards(&alice).await.unwrap();
                assert_eq!(cards.len(), 2);
                assert!(cards.iter().all(|c| c.user_id == alice));

                assert_eq!(store.get_all_cards(&bob).await.unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_list_newest_first() {
                let store = $factory;
                let user_id = Uuid::new_v4();
                let cards = create_test_cards(user_id, 3);

                for card in &cards {
                    store.add_card(card).await.unwrap();
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }

                let listed: Vec<Uuid> = store
                    .get_all_cards(&user_id)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|c| c.card_id)
                    .collect();
                let expected: Vec<Uuid> = cards.iter().rev().map(|c| c.card_id).collect();
                assert_eq!(listed, expected);
            }

            // ==================================================================
            // Uniqueness
            // ==================================================================

            #[tokio::test]
            async fn test_duplicate_card_id() {
                let store = $factory;
                let card = create_test_card(Uuid::new_v4());
                store.add_card(&card).await.unwrap();

                let mut same_id = create_test_card(card.user_id);
                same_id.card_id = card.card_id;

                let err = store.add_card(&same_id).await.unwrap_err();
                assert!(err.is_duplicate(), "expected duplicate key, got {err:?}");
            }

            #[tokio::test]
            async fn test_duplicate_card_number() {
                let store = $factory;
                let card = create_test_card(Uuid::new_v4());
                store.add_card(&card).await.unwrap();

                let mut same_number = create_test_card(Uuid::new_v4());
                same_number.card_number = card.card_number.clone();

                let err = store.add_card(&same_number).await.unwrap_err();
                assert!(matches!(err, StoreError::DuplicateKey { .. }));
            }

            #[tokio::test]
            async fn test_duplicate_leaves_store_unchanged() {
                let store = $factory;
                let user_id = Uuid::new_v4();
                let card = create_test_card(user_id);
                store.add_card(&card).await.unwrap();

                let mut clash = create_test_card(user_id);
                clash.card_number = card.card_number.clone();
                let _ = store.add_card(&clash).await;

                let cards = store.get_all_cards(&user_id).await.unwrap();
                assert_eq!(cards, vec![card]);
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let store = $factory;
                let user_id = Uuid::new_v4();

                let handles: Vec<_> = create_test_cards(user_id, 8)
                    .into_iter()
                    .map(|card| {
                        let store = store.clone();
                        tokio::spawn(async move { store.add_card(&card).await })
                    })
                    .collect();

                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                assert_eq!(store.get_all_cards(&user_id).await.unwrap().len(), 8);
            }
        }
    };
}
