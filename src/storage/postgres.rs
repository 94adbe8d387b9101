//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresCardStore`, a [`CardStore`] backed by a PostgreSQL
//! database via `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! card-manager = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Cards live in a single `cards` table. `card_number` and `phone_number`
//! are `BYTEA` ciphertext; card-number uniqueness is enforced on a keyed
//! fingerprint column since the ciphertext itself is randomized. `seq` records
//! insertion order and breaks ties between equal `created_at` values, which
//! are stored at microsecond precision.

use crate::core::{Card, CardStore, FieldCipher, SealedCard, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const BACKEND: &str = "PostgreSQL";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required table and index (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cards (
            card_id UUID PRIMARY KEY,
            account_id UUID NOT NULL,
            user_id UUID NOT NULL,
            card_number BYTEA NOT NULL,
            card_number_fingerprint BYTEA NOT NULL UNIQUE,
            phone_number BYTEA NOT NULL,
            currency TEXT NOT NULL,
            balance BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            seq BIGSERIAL NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| StoreError::backend(BACKEND, format!("Failed to create cards table: {}", e)))?;

    // Tables created before the insertion sequence existed
    sqlx::query("ALTER TABLE cards ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL")
        .execute(pool)
        .await
        .map_err(|e| StoreError::backend(BACKEND, format!("Failed to add cards sequence: {}", e)))?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_cards_user_created_seq ON cards (user_id, created_at DESC, seq DESC)",
    )
    .execute(pool)
    .await
    .map_err(|e| StoreError::backend(BACKEND, format!("Failed to create cards index: {}", e)))?;

    Ok(())
}

/// Open a connection pool sized by `max_connections`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| StoreError::backend(BACKEND, format!("Unable to create connection pool: {}", e)))
}

/// Map an insert failure, keeping unique violations distinguishable.
fn insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateKey {
                constraint: db_err.constraint().map(str::to_string),
            };
        }
    }
    StoreError::backend(BACKEND, format!("Failed to insert card: {}", err))
}

// ---------------------------------------------------------------------------
// PostgresCardStore
// ---------------------------------------------------------------------------

type CardRow = (
    Uuid,
    Uuid,
    Uuid,
    Vec<u8>,
    Vec<u8>,
    Vec<u8>,
    String,
    i64,
    DateTime<Utc>,
);

/// Card store backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use card_manager::storage::{PostgresCardStore, postgres};
///
/// let pool = postgres::connect("postgres://localhost/cards", 10).await?;
/// postgres::ensure_schema(&pool).await?;
/// let store = PostgresCardStore::new(pool, cipher);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresCardStore {
    pool: PgPool,
    cipher: FieldCipher,
}

impl PostgresCardStore {
    /// Create a new `PostgresCardStore` with the given connection pool.
    pub fn new(pool: PgPool, cipher: FieldCipher) -> Self {
        Self { pool, cipher }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn sealed_from_row(row: CardRow) -> Result<SealedCard, StoreError> {
        let (card_id, account_id, user_id, card_number, fingerprint, phone_number, currency, balance, created_at) =
            row;
        let balance = u64::try_from(balance)
            .map_err(|_| StoreError::backend(BACKEND, format!("Negative balance stored for card {}", card_id)))?;

        Ok(SealedCard {
            card_id,
            user_id,
            account_id,
            card_number,
            card_number_fingerprint: fingerprint,
            phone_number,
            currency,
            balance,
            created_at,
        })
    }
}

#[async_trait]
impl CardStore for PostgresCardStore {
    async fn add_card(&self, card: &Card) -> Result<(), StoreError> {
        let sealed = SealedCard::seal(card, &self.cipher)?;
        let balance = i64::try_from(sealed.balance)
            .map_err(|_| StoreError::backend(BACKEND, "Balance does not fit in BIGINT"))?;

        sqlx::query(
            "INSERT INTO cards \
             (card_id, account_id, user_id, card_number, card_number_fingerprint, phone_number, currency, balance, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(sealed.card_id)
        .bind(sealed.account_id)
        .bind(sealed.user_id)
        .bind(&sealed.card_number)
        .bind(&sealed.card_number_fingerprint)
        .bind(&sealed.phone_number)
        .bind(&sealed.currency)
        .bind(balance)
        .bind(sealed.created_at)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        Ok(())
    }

    async fn get_all_cards(&self, user_id: &Uuid) -> Result<Vec<Card>, StoreError> {
        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT card_id, account_id, user_id, card_number, card_number_fingerprint, phone_number, currency, balance, created_at \
             FROM cards WHERE user_id = $1 ORDER BY created_at DESC, seq DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend(BACKEND, format!("Unable to fetch cards: {}", e)))?;

        rows.into_iter()
            .map(|row| Self::sealed_from_row(row)?.open(&self.cipher))
            .collect()
    }
}
