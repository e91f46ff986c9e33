//! Domain model for a single installment of a bill.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One scheduled portion of a bill paid in installments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Installment {
    /// 1-based position within the bill's schedule.
    pub number: u32,
    pub amount: f64,
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<NaiveDate>,
}

impl Installment {
    pub fn new(number: u32, amount: f64) -> Self {
        Self {
            number,
            amount,
            paid: false,
            paid_at: None,
            due_at: None,
        }
    }

    /// Marks the installment paid at `at`, or unpaid when `at` is `None`.
    pub fn set_paid(&mut self, at: Option<DateTime<Utc>>) {
        self.paid = at.is_some();
        self.paid_at = at;
    }

    /// Flips the paid flag, stamping `now` when the installment becomes paid.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.paid {
            self.set_paid(None);
        } else {
            self.set_paid(Some(now));
        }
    }

    /// Copies payment state (not amount or number) from a previous version.
    pub fn inherit_state(&mut self, previous: &Installment) {
        self.paid = previous.paid;
        self.paid_at = previous.paid_at;
        self.due_at = previous.due_at;
    }
}

/// Sums the amounts of paid installments, always from scratch.
pub fn paid_sum(schedule: &[Installment]) -> f64 {
    schedule
        .iter()
        .filter(|installment| installment.paid)
        .map(|installment| installment.amount)
        .sum()
}
