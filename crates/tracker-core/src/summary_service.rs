//! Aggregate totals across a collection of bills.

use serde::Serialize;
use tracker_domain::Bill;

use crate::bill_service::BillService;

/// Totals shown on the bill list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub bill_count: usize,
    pub settled_count: usize,
    pub total_value: f64,
    pub paid_value: f64,
    pub remaining_value: f64,
}

impl LedgerSummary {
    pub fn open_count(&self) -> usize {
        self.bill_count - self.settled_count
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn summarize<'a>(bills: impl IntoIterator<Item = &'a Bill>) -> LedgerSummary {
        bills
            .into_iter()
            .fold(LedgerSummary::default(), |mut summary, bill| {
                summary.bill_count += 1;
                if BillService::is_settled(bill) {
                    summary.settled_count += 1;
                }
                summary.total_value += bill.total_value;
                summary.paid_value += BillService::paid_total(bill);
                summary.remaining_value += BillService::remaining(bill);
                summary
            })
    }

    /// Bills that still have something left to pay, in input order.
    pub fn open_bills<'a>(bills: &'a [Bill]) -> Vec<&'a Bill> {
        bills
            .iter()
            .filter(|bill| !BillService::is_settled(bill))
            .collect()
    }
}
