use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::error::{optional_text, positive, ValidationError};

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CategoryKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    /// Always positive; the category kind decides the sign.
    pub amount: f64,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A transaction joined with its category, when the category still resolves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(rename = "categories")]
    pub category: Option<Category>,
}

impl LedgerEntry {
    pub fn kind(&self) -> Option<CategoryKind> {
        self.category.as_ref().map(|category| category.kind)
    }

    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map(|category| category.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Amount with its display sign. Anything not income renders as outgoing.
    pub fn signed_amount(&self) -> f64 {
        match self.kind() {
            Some(CategoryKind::Income) => self.transaction.amount,
            _ => -self.transaction.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub kind: CategoryKind,
    pub category_name: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn new(amount: f64, kind: CategoryKind, date: NaiveDate) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: positive(amount, "amount")?,
            kind,
            category_name: UNCATEGORIZED.to_string(),
            date,
            note: None,
        })
    }

    /// Blank names fall back to [`UNCATEGORIZED`].
    pub fn in_category(mut self, name: impl Into<String>) -> Self {
        self.category_name =
            optional_text(Some(name.into())).unwrap_or_else(|| UNCATEGORIZED.to_string());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = optional_text(Some(note.into()));
        self
    }
}

/// Inclusive calendar month, first day to last day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MonthRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl MonthRange {
    pub fn containing(day: NaiveDate) -> Self {
        let first = day.with_day(1).unwrap_or(day);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);
        Self { first, last }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()?;
        Some(Self::containing(first))
    }

    /// Month `delta` months away; saturates at the calendar limits.
    pub fn shift(&self, delta: i32) -> Self {
        let months = Months::new(delta.unsigned_abs());
        let moved = if delta >= 0 {
            self.first.checked_add_months(months)
        } else {
            self.first.checked_sub_months(months)
        };
        moved.map(Self::containing).unwrap_or(*self)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }

    pub fn label(&self) -> String {
        self.first.format("%b %Y").to_string()
    }

    pub fn key(&self) -> String {
        self.first.format("%Y-%m").to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct FinanceSummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Income and expense totals. Entries without a category count toward neither.
pub fn summarize(entries: &[LedgerEntry]) -> FinanceSummary {
    let (income, expense) = entries
        .iter()
        .fold((0.0, 0.0), |(income, expense), entry| match entry.kind() {
            Some(CategoryKind::Income) => (income + entry.transaction.amount, expense),
            Some(CategoryKind::Expense) => (income, expense + entry.transaction.amount),
            None => (income, expense),
        });
    FinanceSummary {
        income,
        expense,
        balance: income - expense,
    }
}
