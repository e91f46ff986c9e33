//! Installment schedule generation and edit-time merging.

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use tracker_domain::Installment;

/// Decides what happens to the division remainder when a total does not split evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Round every installment to cents and let the last one absorb the difference.
    #[default]
    AbsorbInLast,
    /// Use the raw quotient for every installment, accepting drift against the total.
    Lossy,
}

impl RemainderPolicy {
    /// Unknown names fall back to the default policy.
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "lossy" => RemainderPolicy::Lossy,
            _ => RemainderPolicy::AbsorbInLast,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RemainderPolicy::AbsorbInLast => "absorb_in_last",
            RemainderPolicy::Lossy => "lossy",
        }
    }
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds `count` unpaid installments numbered `1..=count` splitting `total`.
pub fn build_schedule(total: f64, count: u32, policy: RemainderPolicy) -> Vec<Installment> {
    if count == 0 {
        return Vec::new();
    }
    let quotient = total / f64::from(count);
    match policy {
        RemainderPolicy::Lossy => (1..=count)
            .map(|number| Installment::new(number, quotient))
            .collect(),
        RemainderPolicy::AbsorbInLast => {
            let cents = (total * 100.0).round().max(0.0) as u64;
            let base = cents / u64::from(count);
            let last = cents - base * u64::from(count - 1);
            (1..=count)
                .map(|number| {
                    let amount = if number == count { last } else { base };
                    Installment::new(number, amount as f64 / 100.0)
                })
                .collect()
        }
    }
}

/// Carries payment state from `previous` onto `fresh`, matched by installment number.
///
/// Amounts and numbering always come from `fresh`; numbers absent from
/// `previous` stay unpaid.
pub fn merge_schedule(mut fresh: Vec<Installment>, previous: &[Installment]) -> Vec<Installment> {
    let by_number: HashMap<u32, &Installment> = previous
        .iter()
        .map(|installment| (installment.number, installment))
        .collect();
    for installment in &mut fresh {
        if let Some(old) = by_number.get(&installment.number) {
            installment.inherit_state(old);
        }
    }
    fresh
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
