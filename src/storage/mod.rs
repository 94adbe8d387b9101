//! Storage backends for issued cards

pub mod in_memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryCardStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresCardStore;
