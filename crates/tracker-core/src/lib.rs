//! tracker-core
//!
//! Bill ledger rules and the service layer around them.
//! Depends on tracker-domain. No CLI, no terminal I/O, no direct file access.

pub mod auth;
pub mod bill_service;
pub mod currency;
pub mod error;
pub mod schedule;
pub mod session_service;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod validation;

pub use auth::*;
pub use bill_service::*;
pub use currency::{CurrencyFormatter, LocaleCurrency};
pub use error::CoreError;
pub use schedule::RemainderPolicy;
pub use session_service::*;
pub use storage::{BillStore, InMemoryBillStore};
pub use summary_service::*;
pub use time::*;
pub use validation::{BillDraft, ValidationError};

#[cfg(test)]
mod tests;
