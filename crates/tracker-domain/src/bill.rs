//! Domain model for bills and their payment shape.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, installment::*};

/// A tracked bill, paid either in one go or across an installment schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub total_value: f64,
    pub payment: Payment,
    pub created_at: DateTime<Utc>,
}

/// How a bill is settled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Payment {
    /// All-or-nothing payment; `paid_value` is either zero or the bill total.
    Single { paid_value: f64 },
    /// Installment schedule; `paid_value` caches the sum of paid installments.
    Installments {
        paid_value: f64,
        schedule: Vec<Installment>,
    },
}

impl Bill {
    /// Builds a new unpaid single-payment bill stamped with `created_at`.
    pub fn new(title: impl Into<String>, total_value: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            total_value,
            payment: Payment::Single { paid_value: 0.0 },
            created_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payment = payment;
        self
    }

    pub fn has_installments(&self) -> bool {
        matches!(self.payment, Payment::Installments { .. })
    }

    /// Number of installments; a single-payment bill counts as one.
    pub fn installment_count(&self) -> u32 {
        match &self.payment {
            Payment::Single { .. } => 1,
            Payment::Installments { schedule, .. } => schedule.len() as u32,
        }
    }

    /// Nominal per-installment value, `total_value / installment_count`.
    pub fn installment_amount(&self) -> f64 {
        match self.installment_count() {
            0 => 0.0,
            count => self.total_value / f64::from(count),
        }
    }

    /// Stored paid value; for installment bills this is the cached sum.
    pub fn paid_value(&self) -> f64 {
        match &self.payment {
            Payment::Single { paid_value } | Payment::Installments { paid_value, .. } => {
                *paid_value
            }
        }
    }

    /// The installment schedule; empty for single-payment bills.
    pub fn installments(&self) -> &[Installment] {
        match &self.payment {
            Payment::Single { .. } => &[],
            Payment::Installments { schedule, .. } => schedule,
        }
    }

    pub fn installment(&self, number: u32) -> Option<&Installment> {
        self.installments()
            .iter()
            .find(|installment| installment.number == number)
    }

    pub fn paid_installments(&self) -> usize {
        self.installments()
            .iter()
            .filter(|installment| installment.paid)
            .count()
    }

    /// Recomputes the cached paid value of an installment bill from its schedule.
    pub fn recalculate_paid_value(&mut self) {
        if let Payment::Installments {
            paid_value,
            schedule,
        } = &mut self.payment
        {
            *paid_value = paid_sum(schedule);
        }
    }
}

impl Displayable for Bill {
    fn display_label(&self) -> String {
        match &self.payment {
            Payment::Single { .. } => format!("{} [{}]", self.title, self.payment),
            Payment::Installments { schedule, .. } => format!(
                "{} [{}/{} paid]",
                self.title,
                self.paid_installments(),
                schedule.len()
            ),
        }
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payment::Single { paid_value } if *paid_value > 0.0 => f.write_str("Paid"),
            Payment::Single { .. } => f.write_str("Open"),
            Payment::Installments { schedule, .. } => {
                write!(f, "{} installments", schedule.len())
            }
        }
    }
}
