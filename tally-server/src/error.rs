use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tally_ledger::LedgerError;

/// API error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "validation",
            message: message.into(),
        }
    }

    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "duplicate_key",
            message: message.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::NotFound { .. } => Self::not_found(err.to_string()),
            LedgerError::EmptyJournal { .. } | LedgerError::Unbalanced { .. } => {
                Self::validation(err.to_string())
            }
            LedgerError::DuplicateKey { .. } => Self::duplicate_key(err.to_string()),
            LedgerError::Storage(_) | LedgerError::Serialization(_) => {
                tracing::error!(error = %err, "store failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "storage",
                    message: "internal storage error".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}
