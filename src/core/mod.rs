//! Core module containing the card model, contracts and shared primitives

pub mod auth;
pub mod card;
pub mod cipher;
pub mod error;
pub mod generator;
pub mod retry;
pub mod store;

pub use auth::{AuthenticatedUser, USER_ID_HEADER};
pub use card::{AccountRequest, Card, CardDraft, CardTemplate, IssuedNumbers, MAX_BALANCE};
pub use cipher::FieldCipher;
pub use error::{CardError, CipherError, ErrorResponse, StoreError, ValidationError};
pub use generator::{NumberGenerator, RandomNumberGenerator, is_luhn_valid, luhn_check_digit};
pub use retry::{RetryError, RetryPolicy, retry_on_duplicate};
pub use store::{CardStore, SealedCard};
