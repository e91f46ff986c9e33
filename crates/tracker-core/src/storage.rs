use std::sync::RwLock;

use uuid::Uuid;

use tracker_domain::{amounts_match, paid_sum, Bill, Payment};

use crate::CoreError;

/// Abstraction over persistence backends holding the bill collection.
///
/// Writes are last-write-wins and assume a single writer.
pub trait BillStore: Send + Sync {
    fn list(&self) -> Result<Vec<Bill>, CoreError>;
    /// Stores a new bill; an id already present is rejected.
    fn add(&self, bill: &Bill) -> Result<(), CoreError>;
    /// Replaces the stored bill with the same id.
    fn update(&self, bill: &Bill) -> Result<(), CoreError>;
    /// Removes a bill; deleting an unknown id is not an error.
    fn delete(&self, id: Uuid) -> Result<(), CoreError>;

    fn get(&self, id: Uuid) -> Result<Bill, CoreError> {
        self.list()?
            .into_iter()
            .find(|bill| bill.id == id)
            .ok_or(CoreError::BillNotFound(id))
    }
}

/// Volatile store used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct InMemoryBillStore {
    bills: RwLock<Vec<Bill>>,
}

impl InMemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: RwLock::new(bills),
        }
    }
}

fn poisoned() -> CoreError {
    CoreError::Storage("bill store lock poisoned".into())
}

impl BillStore for InMemoryBillStore {
    fn list(&self) -> Result<Vec<Bill>, CoreError> {
        Ok(self.bills.read().map_err(|_| poisoned())?.clone())
    }

    fn add(&self, bill: &Bill) -> Result<(), CoreError> {
        let mut bills = self.bills.write().map_err(|_| poisoned())?;
        if bills.iter().any(|stored| stored.id == bill.id) {
            return Err(CoreError::DuplicateBill(bill.id));
        }
        bills.push(bill.clone());
        Ok(())
    }

    fn update(&self, bill: &Bill) -> Result<(), CoreError> {
        let mut bills = self.bills.write().map_err(|_| poisoned())?;
        let slot = bills
            .iter_mut()
            .find(|stored| stored.id == bill.id)
            .ok_or(CoreError::BillNotFound(bill.id))?;
        *slot = bill.clone();
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        self.bills
            .write()
            .map_err(|_| poisoned())?
            .retain(|bill| bill.id != id);
        Ok(())
    }
}

/// Detects ledger invariant violations within a stored bill.
pub fn bill_warnings(bill: &Bill) -> Vec<String> {
    let mut warnings = Vec::new();
    if bill.total_value.is_nan() || bill.total_value <= 0.0 {
        warnings.push(format!(
            "bill {} has non-positive total {}",
            bill.id, bill.total_value
        ));
    }
    match &bill.payment {
        Payment::Single { paid_value } => {
            if !amounts_match(*paid_value, 0.0) && !amounts_match(*paid_value, bill.total_value) {
                warnings.push(format!(
                    "bill {} has partial single payment {}",
                    bill.id, paid_value
                ));
            }
        }
        Payment::Installments {
            paid_value,
            schedule,
        } => {
            if schedule.is_empty() {
                warnings.push(format!("bill {} has an empty schedule", bill.id));
            }
            for (idx, installment) in schedule.iter().enumerate() {
                let expected = idx as u32 + 1;
                if installment.number != expected {
                    warnings.push(format!(
                        "bill {} installment at position {} is numbered {}",
                        bill.id, expected, installment.number
                    ));
                }
                if installment.amount < 0.0 {
                    warnings.push(format!(
                        "bill {} installment {} has negative amount {}",
                        bill.id, installment.number, installment.amount
                    ));
                }
            }
            let recomputed = paid_sum(schedule);
            if !amounts_match(*paid_value, recomputed) {
                warnings.push(format!(
                    "bill {} cached paid value {} differs from schedule sum {}",
                    bill.id, paid_value, recomputed
                ));
            }
            let scheduled: f64 = schedule.iter().map(|installment| installment.amount).sum();
            if !schedule.is_empty() && !amounts_match(scheduled, bill.total_value) {
                warnings.push(format!(
                    "bill {} schedule sums to {} instead of {}",
                    bill.id, scheduled, bill.total_value
                ));
            }
        }
    }
    warnings
}
