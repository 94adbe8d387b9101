//! HTTP handlers for card operations

use axum::{
    Json,
    extract::{FromRequest, Request, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::cards::service::CardIssuanceService;
use crate::core::{AuthenticatedUser, Card, CardDraft, CardError, ValidationError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CardIssuanceService>,
}

impl AppState {
    pub fn new(service: CardIssuanceService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Axum extractor that decodes a create-card body
///
/// Any decoding failure (bad JSON, wrong content type, wrong field type)
/// becomes [`ValidationError::InvalidJson`]. Field presence is checked by
/// the service, not here.
pub struct CardPayload(pub CardDraft);

impl<S> FromRequest<S> for CardPayload
where
    S: Send + Sync,
{
    type Rejection = CardError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<CardDraft>::from_request(req, state).await {
            Ok(Json(draft)) => Ok(Self(draft)),
            Err(rejection) => Err(ValidationError::InvalidJson {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}

/// Create a card backed by a new ledger account
///
/// POST /cards/create
pub async fn create_card(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    CardPayload(draft): CardPayload,
) -> Result<StatusCode, CardError> {
    state
        .service
        .create_card_with_account(user.user_id, draft)
        .await?;
    Ok(StatusCode::CREATED)
}

/// Create a card linked to an existing ledger account
///
/// POST /cards/create/link
pub async fn create_linked_card(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    CardPayload(draft): CardPayload,
) -> Result<StatusCode, CardError> {
    state.service.create_linked_card(user.user_id, draft).await?;
    Ok(StatusCode::CREATED)
}

/// List the caller's cards, newest first
///
/// GET /cards/all
pub async fn list_cards(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Card>>, CardError> {
    let cards = state.service.list_cards(user.user_id).await?;
    Ok(Json(cards))
}
