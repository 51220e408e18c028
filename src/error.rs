// src/error.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::ledger::LedgerError;
use crate::panel::PanelError;
use crate::paystack::PaystackError;
use crate::wallet::WalletError;

/// Every failed request answers `{ "success": false, "message": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    PaymentRequired(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}

impl From<PaystackError> for ApiError {
    fn from(e: PaystackError) -> Self {
        log::error!("paystack error: {e}");
        match e {
            PaystackError::Rejected(message) | PaystackError::Api { message, .. }
                if !message.is_empty() =>
            {
                ApiError::Upstream(format!("Payment gateway error: {message}"))
            }
            _ => ApiError::Upstream("Payment gateway request failed".to_string()),
        }
    }
}

impl From<PanelError> for ApiError {
    fn from(e: PanelError) -> Self {
        log::error!("panel error: {e}");
        ApiError::Upstream("Hosting panel request failed".to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        log::error!("ledger error: {e}");
        ApiError::Internal("Failed to access spending records".to_string())
    }
}

impl From<WalletError> for ApiError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Gateway(e) => e.into(),
            WalletError::Ledger(e) => e.into(),
        }
    }
}
