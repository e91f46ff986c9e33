//! In-memory facade over a [`BillStore`].
//!
//! Every mutation computes the next bill value first, persists it, and only
//! then swaps it into the cached list. A store failure leaves the cache as it
//! was before the call.

use tracing::info;
use uuid::Uuid;

use tracker_config::Config;
use tracker_core::{
    BillDraft, BillService, BillStore, Clock, CoreError, LedgerSummary, LocaleCurrency,
    RemainderPolicy, SummaryService, SystemClock,
};
use tracker_domain::Bill;
use tracker_storage_json::JsonBillStore;

use crate::errors::{Result, TrackerError};

/// Opens the JSON store under the configured data root.
pub fn json_store(config: &Config) -> Result<JsonBillStore> {
    Ok(JsonBillStore::with_retention(
        config.resolve_data_root(),
        config.backup_retention,
    )?)
}

pub struct BillBook {
    bills: Vec<Bill>,
    store: Box<dyn BillStore>,
    clock: Box<dyn Clock>,
    policy: RemainderPolicy,
    currency: LocaleCurrency,
}

impl BillBook {
    /// Creates an empty book. Call [`BillBook::reload`] to read stored bills.
    pub fn new(store: Box<dyn BillStore>, clock: Box<dyn Clock>, policy: RemainderPolicy) -> Self {
        Self {
            bills: Vec::new(),
            store,
            clock,
            policy,
            currency: LocaleCurrency::default(),
        }
    }

    /// Reads drafted amounts with `currency`'s separators.
    pub fn with_currency(mut self, currency: LocaleCurrency) -> Self {
        self.currency = currency;
        self
    }

    /// Opens the JSON-backed book described by `config` and loads its bills.
    pub fn open(config: &Config) -> Result<Self> {
        let policy = RemainderPolicy::from_name(&config.remainder_policy);
        let store = json_store(config)?;
        let currency = LocaleCurrency::for_locale(&config.locale, &config.currency);
        let mut book =
            Self::new(Box::new(store), Box::new(SystemClock), policy).with_currency(currency);
        book.reload()?;
        Ok(book)
    }

    pub fn reload(&mut self) -> Result<()> {
        self.bills = self.store.list()?;
        Ok(())
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn policy(&self) -> RemainderPolicy {
        self.policy
    }

    pub fn currency(&self) -> &LocaleCurrency {
        &self.currency
    }

    pub fn bill(&self, id: Uuid) -> Result<&Bill> {
        self.bills
            .iter()
            .find(|bill| bill.id == id)
            .ok_or_else(|| CoreError::BillNotFound(id).into())
    }

    /// Resolves a full id or an unambiguous id prefix.
    pub fn resolve(&self, token: &str) -> Result<Uuid> {
        let token = token.trim().to_ascii_lowercase();
        if let Ok(id) = Uuid::parse_str(&token) {
            return Ok(id);
        }
        if token.is_empty() {
            return Err(TrackerError::InvalidInput("bill id is required".into()));
        }
        let mut matches = self
            .bills
            .iter()
            .filter(|bill| bill.id.to_string().starts_with(&token));
        match (matches.next(), matches.next()) {
            (Some(bill), None) => Ok(bill.id),
            (Some(_), Some(_)) => Err(TrackerError::InvalidInput(format!(
                "bill id `{}` is ambiguous",
                token
            ))),
            (None, _) => Err(TrackerError::InvalidInput(format!(
                "no bill matches `{}`",
                token
            ))),
        }
    }

    pub fn create(&mut self, draft: &BillDraft) -> Result<&Bill> {
        let bill = BillService::create_or_update_in(
            draft,
            None,
            self.clock.as_ref(),
            self.policy,
            &self.currency,
        )?;
        self.store.add(&bill)?;
        self.bills.push(bill);
        let index = self.bills.len() - 1;
        Ok(&self.bills[index])
    }

    pub fn edit(&mut self, id: Uuid, draft: &BillDraft) -> Result<&Bill> {
        let existing = self.bill(id)?;
        let updated = BillService::create_or_update_in(
            draft,
            Some(existing),
            self.clock.as_ref(),
            self.policy,
            &self.currency,
        )?;
        self.commit(updated)
    }

    pub fn toggle_installment(&mut self, id: Uuid, number: u32) -> Result<&Bill> {
        let updated = BillService::toggle_installment(self.bill(id)?, number, self.clock.as_ref())?;
        self.commit(updated)
    }

    pub fn toggle_paid(&mut self, id: Uuid) -> Result<&Bill> {
        let updated = BillService::toggle_single_paid(self.bill(id)?)?;
        self.commit(updated)
    }

    /// Removes the bill. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        self.store.delete(id)?;
        let before = self.bills.len();
        self.bills.retain(|bill| bill.id != id);
        if self.bills.len() != before {
            info!(bill = %id, "bill deleted");
        }
        Ok(())
    }

    pub fn summary(&self) -> LedgerSummary {
        SummaryService::summarize(&self.bills)
    }

    fn commit(&mut self, updated: Bill) -> Result<&Bill> {
        self.store.update(&updated)?;
        let index = self
            .bills
            .iter()
            .position(|bill| bill.id == updated.id)
            .ok_or(CoreError::BillNotFound(updated.id))?;
        self.bills[index] = updated;
        Ok(&self.bills[index])
    }
}
