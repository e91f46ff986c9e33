//! tracker-domain
//!
//! Pure domain models (Bill, Payment, Installment, User).
//! No I/O, no CLI, no storage. Only data types and derived accessors.

pub mod bill;
pub mod common;
pub mod installment;
pub mod user;

pub use bill::*;
pub use common::*;
pub use installment::*;
pub use user::*;
