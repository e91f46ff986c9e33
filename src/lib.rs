#![doc(test(attr(deny(warnings))))]

//! Bill Tracker keeps a ledger of bills paid either at once or in numbered
//! installments, persisted as JSON under the configured data root.

pub mod cli;
pub mod book;
pub mod errors;
pub mod utils;

pub use book::BillBook;
pub use errors::TrackerError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Installs the global tracing subscriber once per process.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("bill tracker tracing initialized");
    });
}
