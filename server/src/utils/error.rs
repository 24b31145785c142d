use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::services::TicketError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Event expired: {0}")]
    Expired(String),

    #[error("Sold out: {0}")]
    SoldOut(String),

    #[error("Ticket already used: {0}")]
    AlreadyUsed(String),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable")]
    Unavailable(#[source] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::SoldOut(_) | AppError::AlreadyUsed(_) | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Expired(_) => "EVENT_EXPIRED",
            AppError::SoldOut(_) => "SOLD_OUT",
            AppError::AlreadyUsed(_) => "ALREADY_USED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    fn log(&self) {
        match self {
            AppError::Unavailable(e) => {
                error!(error = ?e, "Store error");
            }
            // Business-rule rejections are expected traffic, not faults.
            other => {
                warn!(code = other.code(), message = %other, "Request rejected");
            }
        }
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        let message = err.to_string();
        match err {
            TicketError::NotFound(_) => AppError::NotFound(message),
            TicketError::Expired => AppError::Expired(message),
            TicketError::SoldOut => AppError::SoldOut(message),
            TicketError::AlreadyUsed => AppError::AlreadyUsed(message),
            TicketError::Forbidden(_) => AppError::Forbidden(message),
            TicketError::Conflict => AppError::Conflict(message),
            TicketError::Transient(source) => AppError::Unavailable(source),
            TicketError::Invalid(_) => AppError::ValidationError(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Expired(msg)
            | AppError::SoldOut(msg)
            | AppError::AlreadyUsed(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Unavailable(_) => {
                "Ticketing is temporarily unavailable, please try again".to_string()
            }
        };

        error_response(code, public_message, None, status)
    }
}
