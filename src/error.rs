//! Error types and their HTTP rendering.
//!
//! Client-facing failures never carry a body: their details travel in the
//! `errors` response header as a JSON array.

use axum::{
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, TransactionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ERRORS_HEADER: HeaderName = HeaderName::from_static("errors");

pub const MISSING_OWNER_ID: &str = "Missing owner id";
pub const UNKNOWN_PET_TYPE: &str = "Pet type does not exist in the system.";
pub const UNKNOWN_OWNER: &str = "Owner does not exist in the system.";

/// A single human readable error, rendered as `[{"message": "..."}]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&[self])
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingError {
    pub object_name: String,
    pub field_name: String,
    pub field_value: String,
    pub error_message: String,
}

/// Field-level validation failures collected for one request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingErrors(Vec<BindingError>);

impl BindingErrors {
    pub fn push(&mut self, error: BindingError) {
        self.0.push(error);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingError> {
        self.0.iter()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

impl From<BindingError> for BindingErrors {
    fn from(error: BindingError) -> Self {
        Self(vec![error])
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("pet has not been saved yet")]
    Unsaved,
}

impl From<TransactionError<DbErr>> for ServiceError {
    fn from(err: TransactionError<DbErr>) -> Self {
        match err {
            TransactionError::Connection(e) | TransactionError::Transaction(e) => {
                ServiceError::Database(e)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid payload ({} field errors)", .0.len())]
    InvalidPayload(BindingErrors),

    #[error("Missing owner id")]
    MissingOwnerId,

    #[error("Pet type does not exist in the system.")]
    UnknownPetType,

    #[error("Owner does not exist in the system.")]
    UnknownOwner,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) | ApiError::MissingOwnerId => StatusCode::BAD_REQUEST,
            ApiError::UnknownPetType | ApiError::UnknownOwner => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON carried in the `errors` header, if any.
    fn header_payload(&self) -> Result<Option<String>, serde_json::Error> {
        match self {
            ApiError::InvalidPayload(errors) => errors.to_json().map(Some),
            ApiError::MissingOwnerId => ErrorMessage::new(MISSING_OWNER_ID).to_json().map(Some),
            ApiError::UnknownPetType => ErrorMessage::new(UNKNOWN_PET_TYPE).to_json().map(Some),
            ApiError::UnknownOwner => ErrorMessage::new(UNKNOWN_OWNER).to_json().map(Some),
            ApiError::NotFound => Ok(None),
            ApiError::Service(_) => ErrorMessage::new("Internal server error").to_json().map(Some),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::Service(err) = &self {
            tracing::error!(error = %err, "clinic service failure");
            tracing::Span::current().record("error", tracing::field::display(err));
        }

        let payload = match self.header_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize error payload");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        match payload {
            None => status.into_response(),
            Some(json) => match HeaderValue::from_bytes(json.as_bytes()) {
                Ok(value) => (status, [(ERRORS_HEADER, value)]).into_response(),
                Err(e) => {
                    tracing::error!(error = %e, payload = %json, "error payload is not a valid header value");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
        }
    }
}
