use std::sync::Arc;

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::BrainResult,
    finance::{self, FinanceSummary, LedgerEntry, MonthRange, NewTransaction},
    store::BrainStore,
};

/// Transactions of the displayed month.
pub struct FinanceLedger {
    store: Arc<dyn BrainStore>,
    owner: Uuid,
    month: MonthRange,
    entries: Vec<LedgerEntry>,
}

impl FinanceLedger {
    pub fn new(store: Arc<dyn BrainStore>, owner: Uuid, month: MonthRange) -> Self {
        Self {
            store,
            owner,
            month,
            entries: Vec::new(),
        }
    }

    pub fn month(&self) -> MonthRange {
        self.month
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Fetches `month` in full. The displayed month only changes on success.
    #[instrument(skip(self), fields(month = %month.key()))]
    pub fn load(&mut self, month: MonthRange) -> BrainResult<()> {
        let entries = self
            .store
            .list_ledger(self.owner, &month)
            .inspect_err(|err| tracing::warn!(%err, "unable to load transactions"))?;
        tracing::info!(entries = entries.len(), "loaded transactions");
        self.month = month;
        self.entries = entries;
        Ok(())
    }

    pub fn reload(&mut self) -> BrainResult<()> {
        self.load(self.month)
    }

    /// Moves `delta` months and refetches; nothing is cached across months.
    pub fn change_month(&mut self, delta: i32) -> BrainResult<()> {
        self.load(self.month.shift(delta))
    }

    /// Records a transaction, reusing the category with the same name and kind
    /// or creating it. The entry joins the snapshot only when its own date lies
    /// in the displayed month, at the position a reload would give it.
    #[instrument(skip(self, transaction), fields(amount = transaction.amount, kind = %transaction.kind))]
    pub fn add_transaction(&mut self, transaction: NewTransaction) -> BrainResult<LedgerEntry> {
        let existing = self
            .store
            .find_category(self.owner, &transaction.category_name, transaction.kind)
            .inspect_err(|err| tracing::warn!(%err, "unable to look up category"))?;
        let category = match existing {
            Some(category) => category,
            None => {
                tracing::debug!(name = %transaction.category_name, "creating category");
                self.store
                    .insert_category(self.owner, &transaction.category_name, transaction.kind)
                    .inspect_err(|err| tracing::warn!(%err, "unable to create category"))?
            }
        };
        let entry = self
            .store
            .insert_transaction(self.owner, Some(category.id), &transaction)
            .inspect_err(|err| tracing::warn!(%err, "unable to add transaction"))?;
        if self.month.contains(entry.transaction.date) {
            let date = entry.transaction.date;
            let slot = self
                .entries
                .iter()
                .position(|existing| existing.transaction.date <= date)
                .unwrap_or(self.entries.len());
            self.entries.insert(slot, entry.clone());
        }
        Ok(entry)
    }

    pub fn summary(&self) -> FinanceSummary {
        finance::summarize(&self.entries)
    }
}
