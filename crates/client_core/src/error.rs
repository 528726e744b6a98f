use std::collections::BTreeMap;

use reqwest::StatusCode;
use shared::{domain::ProductId, error::ApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog API unreachable: {0}")]
    NetworkFailure(#[source] reqwest::Error),
    #[error("catalog API rejected the request ({status}): {message}")]
    ServerRejected {
        status: StatusCode,
        message: String,
        field_errors: BTreeMap<String, Vec<String>>,
    },
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error("catalog API returned an unreadable response: {0}")]
    InvalidResponse(String),
    #[error("change was saved but reloading the list failed: {0}")]
    Refetch(#[source] Box<StoreError>),
}

impl StoreError {
    pub(crate) fn rejected(status: StatusCode, body: &str) -> Self {
        let ApiError { message, errors } = ApiError::from_body(body);
        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            message
        };
        Self::ServerRejected {
            status,
            message,
            field_errors: errors,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), StoreError::NotFound(_))
    }

    /// The underlying remote failure, looking through `Refetch`.
    pub fn root(&self) -> &StoreError {
        match self {
            StoreError::Refetch(inner) => inner.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
