//! Retry-on-duplicate combinator for collision-prone inserts
//!
//! Card numbers and identifiers are random, so an insert can occasionally
//! hit a unique constraint. The caller regenerates its values on every
//! attempt; this module only decides whether to go around again.

use std::future::Future;
use std::num::NonZeroU32;
use thiserror::Error;

use crate::core::error::StoreError;

/// How many duplicate-key rejections to tolerate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Keep retrying until the insert stops colliding
    #[default]
    Unbounded,

    /// Give up after this many attempts in total
    UpTo(NonZeroU32),
}

impl RetryPolicy {
    fn allows(&self, attempts_made: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => true,
            RetryPolicy::UpTo(max) => attempts_made < max.get(),
        }
    }
}

/// Outcome of a retry loop that did not succeed
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every permitted attempt collided
    #[error("insert still colliding after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// A non-duplicate failure, returned as-is
    #[error(transparent)]
    Store(StoreError),
}

/// Run `attempt` until it returns something other than a duplicate key.
///
/// `attempt` receives the 1-based attempt number and must produce fresh
/// values each time. Duplicate errors are swallowed; any other error ends
/// the loop immediately. On success the value is returned with the number
/// of attempts it took.
pub async fn retry_on_duplicate<T, F, Fut>(
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<(T, u32), RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match attempt(attempts).await {
            Ok(value) => return Ok((value, attempts)),
            Err(e) if e.is_duplicate() => {
                if !policy.allows(attempts) {
                    return Err(RetryError::Exhausted { attempts });
                }
            }
            Err(e) => return Err(RetryError::Store(e)),
        }
    }
}
