//! Shared test harness for card store testing
//!
//! Provides card fixtures, a fixed test cipher and an in-process ledger stub,
//! plus the `card_store_tests!` and `rest_integration_tests!` macros.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod card_store_tests;
pub mod integration;

use card_manager::core::{Card, FieldCipher, NumberGenerator, RandomNumberGenerator};
use uuid::Uuid;

/// Secret used by every store under test
pub const TEST_SECRET: &str = "integration-test-secret";

/// Cipher derived from [`TEST_SECRET`]
pub fn test_cipher() -> FieldCipher {
    FieldCipher::new(TEST_SECRET).expect("test secret is non-empty")
}

/// Build a card for `user_id` with freshly generated, Luhn-valid numbers.
pub fn create_test_card(user_id: Uuid) -> Card {
    let generator = RandomNumberGenerator::new();
    Card {
        card_id: generator.identifier(),
        user_id,
        account_id: generator.identifier(),
        card_number: generator.card_number(),
        phone_number: "+79990001122".to_string(),
        currency: "RUB".to_string(),
        balance: 1_500,
    }
}

/// Build `count` cards for `user_id`.
pub fn create_test_cards(user_id: Uuid, count: usize) -> Vec<Card> {
    (0..count).map(|_| create_test_card(user_id)).collect()
}
