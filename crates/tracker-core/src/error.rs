use std::io;

use thiserror::Error;
use uuid::Uuid;

use crate::{auth::AuthError, validation::ValidationError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Installment {number} not found on bill {bill}")]
    InstallmentNotFound { bill: Uuid, number: u32 },
    #[error("Bill not found: {0}")]
    BillNotFound(Uuid),
    #[error("Bill already exists: {0}")]
    DuplicateBill(Uuid),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
