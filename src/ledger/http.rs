//! reqwest-backed ledger client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

use super::{CREATE_ACCOUNT_PATH, LINK_CARD_PATH, LedgerClient, LedgerError};
use crate::config::LedgerConfig;
use crate::core::{AccountRequest, Card};

/// Ledger client speaking JSON over HTTP
///
/// Every call is bounded by the configured timeout. Only `201 Created`
/// counts as success.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedgerClient {
    pub fn new(config: &LedgerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T>(&self, endpoint: &'static str, body: &T) -> Result<(), LedgerError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| {
                tracing::error!(endpoint, error = %source, "Ledger request failed");
                LedgerError::Transport { endpoint, source }
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::error!(endpoint, status = status.as_u16(), "Ledger returned unexpected status");
            return Err(LedgerError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn create_account(&self, request: &AccountRequest) -> Result<(), LedgerError> {
        self.post(CREATE_ACCOUNT_PATH, request).await
    }

    async fn link_card(&self, card: &Card) -> Result<(), LedgerError> {
        self.post(LINK_CARD_PATH, card).await
    }
}
