//! Authenticated user identity
//!
//! Authentication happens upstream. By the time a request reaches the card
//! routes, the gateway has either attached an [`AuthenticatedUser`] to the
//! request extensions or forwarded the user id in the `X-User-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::core::error::CardError;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    fn from_headers(parts: &Parts) -> Option<Self> {
        let raw = parts.headers.get(USER_ID_HEADER)?.to_str().ok()?;
        Uuid::parse_str(raw.trim()).ok().map(Self::new)
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = CardError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(*user);
        }
        Self::from_headers(parts).ok_or(CardError::Unauthorized)
    }
}
