//! Pure scheduling and money rules behind every contract write.
//!
//! Nothing in here touches the database: the aggregate in
//! [`crate::service::contracts`] feeds these functions with rows it loaded and
//! persists what they return.

pub mod conflict;
pub mod duration;
pub mod finance;
pub mod numbering;
pub mod status;

use serde::Serialize;
use thiserror::Error;

/// A rejected input, tied to the request field that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
