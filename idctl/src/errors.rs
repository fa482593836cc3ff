use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request shape is invalid; carries one message per offending field
    #[error("Validation failed")]
    Validation { errors: BTreeMap<String, String> },

    /// An argument that must be a non-empty string was not
    #[error("{message}")]
    InvalidInput { message: String },

    /// Duplicate signup for an email that already has identity history
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Unknown user or wrong password. Deliberately a unit variant: the
    /// response body must not distinguish the two cases.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired, or mis-signed bearer credential
    #[error("Not authenticated")]
    Unauthenticated,

    /// Requested route does not exist
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Image ingestion collaborator failure
    #[error("Failed to {operation}")]
    ImageProcessing { operation: String },

    /// Generic internal service error (hashing, signing, configuration)
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Record store operation error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } | Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::ImageProcessing { .. } | Error::Internal { .. } | Error::Store(_) | Error::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { .. } => "Validation failed".to_string(),
            Error::InvalidInput { message } => message.clone(),
            Error::Conflict { message } => message.clone(),
            Error::InvalidCredentials => "Invalid credentials".to_string(),
            Error::Unauthenticated => "Unauthorized".to_string(),
            Error::NotFound { resource } => format!("{resource} not found"),
            Error::ImageProcessing { .. } | Error::Internal { .. } | Error::Store(_) | Error::Other(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details server-side - different levels based on severity
        match &self {
            Error::ImageProcessing { .. } | Error::Internal { .. } | Error::Store(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::InvalidCredentials | Error::Unauthenticated => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::InvalidInput { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
        }

        let status = self.status_code();

        let body = match &self {
            Error::Validation { errors } => json!({
                "message": "Validation failed",
                "errors": errors,
            }),
            _ => json!({ "message": self.user_message() }),
        };

        (status, axum::response::Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
