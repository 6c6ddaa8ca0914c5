use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr, TransactionError};
use thiserror::Error;
use uuid::Uuid;

use crate::engine::FieldError;
use crate::engine::conflict::ScheduleConflict;
use crate::engine::status::IllegalTransition;
use crate::models::contracts::Status;

/// Every way a contract operation can fail.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error(transparent)]
    ScheduleConflict(#[from] ScheduleConflict),

    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    #[error("Contract {contract_number} is {status} and can no longer be modified")]
    ContractClosed {
        contract_number: String,
        status: Status,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// A uniqueness constraint fired at commit time although validation passed.
    #[error("Concurrent write detected: {0}")]
    UniquenessRace(String),

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation(FieldError::new(field, message))
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::UniquenessRace(_))
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::UniquenessRace(detail),
            _ => AppError::Database(err),
        }
    }
}

impl From<TransactionError<AppError>> for AppError {
    fn from(err: TransactionError<AppError>) -> Self {
        match err {
            TransactionError::Connection(db) => db.into(),
            TransactionError::Transaction(app) => app,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::ScheduleConflict(_)
            | AppError::IllegalTransition(_)
            | AppError::ContractClosed { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UniquenessRace(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        match self {
            AppError::Validation(e) => builder.json(serde_json::json!({
                "errors": { e.field: [e.message] },
            })),
            AppError::ScheduleConflict(conflict) => builder.json(serde_json::json!({
                "errors": { "start_time": [conflict.to_string()] },
                "conflict": conflict,
            })),
            AppError::IllegalTransition(e) => builder.json(serde_json::json!({
                "error": e.to_string(),
                "status": e.from,
                "transition": e.transition,
            })),
            AppError::UniquenessRace(_) => builder.json(serde_json::json!({
                "error": self.to_string(),
                "retryable": true,
            })),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                builder.json(serde_json::json!({
                    "error": "Internal database error",
                }))
            }
            _ => builder.json(serde_json::json!({
                "error": self.to_string(),
            })),
        }
    }
}
