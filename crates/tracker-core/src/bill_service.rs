//! Ledger operations over a single bill.
//!
//! Every operation is a pure transformation returning a new [`Bill`];
//! persistence is the caller's responsibility.

use tracing::{debug, info};
use uuid::Uuid;

use tracker_domain::{amounts_match, paid_sum, Bill, Payment};

use crate::{
    currency::LocaleCurrency,
    schedule::{build_schedule, merge_schedule, RemainderPolicy},
    time::Clock,
    validation::{validate_draft_in, BillDraft},
    CoreError,
};

pub struct BillService;

impl BillService {
    /// Validates `draft` and builds a bill, merging payment state from `existing` when editing.
    pub fn create_or_update(
        draft: &BillDraft,
        existing: Option<&Bill>,
        clock: &dyn Clock,
        policy: RemainderPolicy,
    ) -> Result<Bill, CoreError> {
        Self::create_or_update_in(draft, existing, clock, policy, &LocaleCurrency::default())
    }

    /// Same as [`BillService::create_or_update`], reading amounts with `locale`.
    pub fn create_or_update_in(
        draft: &BillDraft,
        existing: Option<&Bill>,
        clock: &dyn Clock,
        policy: RemainderPolicy,
        locale: &LocaleCurrency,
    ) -> Result<Bill, CoreError> {
        let input = validate_draft_in(draft, locale)?;

        let payment = if input.has_installments {
            let fresh = build_schedule(input.total_value, input.installment_count, policy);
            let schedule = match existing {
                Some(previous) if previous.has_installments() => {
                    merge_schedule(fresh, previous.installments())
                }
                _ => fresh,
            };
            let paid_value = paid_sum(&schedule);
            Payment::Installments {
                paid_value,
                schedule,
            }
        } else {
            let paid = match input.paid_value {
                Some(paid_value) => paid_value >= input.total_value,
                None => existing.map(Self::is_settled).unwrap_or(false),
            };
            Payment::Single {
                paid_value: if paid { input.total_value } else { 0.0 },
            }
        };

        let (id, created_at) = match existing {
            Some(previous) => (previous.id, previous.created_at),
            None => (Uuid::new_v4(), clock.now()),
        };

        let bill = Bill {
            id,
            title: input.title,
            description: input.description,
            total_value: input.total_value,
            payment,
            created_at,
        };
        if existing.is_some() {
            info!(bill = %bill.id, installments = bill.installment_count(), "bill edited");
        } else {
            info!(bill = %bill.id, installments = bill.installment_count(), "bill created");
        }
        Ok(bill)
    }

    /// Flips the paid flag of installment `number` and recomputes the paid value.
    pub fn toggle_installment(
        bill: &Bill,
        number: u32,
        clock: &dyn Clock,
    ) -> Result<Bill, CoreError> {
        let mut updated = bill.clone();
        let schedule = match &mut updated.payment {
            Payment::Installments { schedule, .. } => schedule,
            Payment::Single { .. } => {
                return Err(CoreError::InvalidOperation(format!(
                    "bill {} is not paid in installments",
                    bill.id
                )))
            }
        };
        let installment = schedule
            .iter_mut()
            .find(|installment| installment.number == number)
            .ok_or(CoreError::InstallmentNotFound {
                bill: bill.id,
                number,
            })?;
        installment.toggle(clock.now());
        let paid = installment.paid;

        updated.recalculate_paid_value();
        debug!(
            bill = %updated.id,
            number,
            paid,
            paid_value = updated.paid_value(),
            "installment toggled"
        );
        Ok(updated)
    }

    /// All-or-nothing flip for single-payment bills.
    pub fn toggle_single_paid(bill: &Bill) -> Result<Bill, CoreError> {
        let mut updated = bill.clone();
        match &mut updated.payment {
            Payment::Single { paid_value } => {
                *paid_value = if *paid_value >= bill.total_value {
                    0.0
                } else {
                    bill.total_value
                };
            }
            Payment::Installments { .. } => {
                return Err(CoreError::InvalidOperation(format!(
                    "bill {} is paid in installments",
                    bill.id
                )))
            }
        }
        debug!(bill = %updated.id, paid_value = updated.paid_value(), "bill payment toggled");
        Ok(updated)
    }

    /// Paid total derived from the schedule, or the stored value for single payments.
    pub fn paid_total(bill: &Bill) -> f64 {
        match &bill.payment {
            Payment::Single { paid_value } => *paid_value,
            Payment::Installments { schedule, .. } => paid_sum(schedule),
        }
    }

    /// Percentage of installments paid, in `[0, 100]`.
    pub fn progress(bill: &Bill) -> Result<f64, CoreError> {
        let schedule = match &bill.payment {
            Payment::Installments { schedule, .. } => schedule,
            Payment::Single { .. } => {
                return Err(CoreError::InvalidOperation(format!(
                    "progress is only tracked for installment bills ({})",
                    bill.id
                )))
            }
        };
        if schedule.is_empty() {
            return Err(CoreError::InvariantViolation(format!(
                "bill {} has an empty installment schedule",
                bill.id
            )));
        }
        let paid = schedule.iter().filter(|installment| installment.paid).count();
        Ok(paid as f64 / schedule.len() as f64 * 100.0)
    }

    /// Amount still owed, never negative.
    pub fn remaining(bill: &Bill) -> f64 {
        (bill.total_value - Self::paid_total(bill)).max(0.0)
    }

    pub fn is_settled(bill: &Bill) -> bool {
        match &bill.payment {
            Payment::Single { paid_value } => {
                *paid_value >= bill.total_value || amounts_match(*paid_value, bill.total_value)
            }
            Payment::Installments { schedule, .. } => {
                !schedule.is_empty() && schedule.iter().all(|installment| installment.paid)
            }
        }
    }
}
