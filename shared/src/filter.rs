//! Transaction list filtering and sorting
//!
//! Filters compose conjunctively; sorting is a tri-state cycle per column
//! (unsorted → descending → ascending → unsorted). Both operate on a
//! borrowed snapshot of the list and return a new vector.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::value_text;
use crate::models::{Transaction, TransactionType};
use crate::types::DateRange;

/// Active transaction-list filters; unset facets pass everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionFilters {
    /// Case-insensitive substring over batch code/number, reason, notes,
    /// customer, and invoice
    pub search: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub product_type: Option<String>,
    pub brand: Option<String>,
    /// Exact-match product parameter facets (OD, PN, PE, Type)
    pub parameters: BTreeMap<String, String>,
    pub status: Option<String>,
    /// Evaluated against the record's logical activity date
    pub date_range: Option<DateRange>,
}

impl TransactionFilters {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() && !search_haystack(transaction).contains(&needle) {
                return false;
            }
        }
        if let Some(transaction_type) = self.transaction_type {
            if transaction.transaction_type != transaction_type {
                return false;
            }
        }
        if let Some(product_type) = &self.product_type {
            if &transaction.product_type != product_type {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if transaction.brand.as_deref() != Some(brand.as_str()) {
                return false;
            }
        }
        for (key, expected) in &self.parameters {
            let actual = transaction.parameters.get(key).map(value_text);
            if actual.as_deref() != Some(expected.as_str()) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if &transaction.status != status {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !range.contains(transaction.activity_date()) {
                return false;
            }
        }
        true
    }
}

fn search_haystack(transaction: &Transaction) -> String {
    [
        transaction.batch_code.as_deref(),
        transaction.batch_number.as_deref(),
        transaction.reason.as_deref(),
        transaction.notes.as_deref(),
        transaction.customer.as_deref(),
        transaction.invoice_number.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n")
    .to_lowercase()
}

/// Sortable transaction-list columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Date,
    TransactionType,
    Product,
    Weight,
    Customer,
}

impl SortColumn {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "date" => Some(SortColumn::Date),
            "transaction_type" => Some(SortColumn::TransactionType),
            "product" => Some(SortColumn::Product),
            "weight" => Some(SortColumn::Weight),
            "customer" => Some(SortColumn::Customer),
            _ => None,
        }
    }
}

/// Current column sort, if any
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub ascending: bool,
}

impl SortState {
    /// Advance the tri-state cycle for a header click
    ///
    /// Same column: unsorted → descending → ascending → unsorted. A
    /// different column resets to descending on it.
    pub fn toggle(self, column: SortColumn) -> SortState {
        match self.column {
            Some(current) if current == column => {
                if self.ascending {
                    SortState::default()
                } else {
                    SortState {
                        column: Some(column),
                        ascending: true,
                    }
                }
            }
            _ => SortState {
                column: Some(column),
                ascending: false,
            },
        }
    }
}

fn compare_by(a: &Transaction, b: &Transaction, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Date => a.created_at.cmp(&b.created_at),
        SortColumn::TransactionType => a
            .transaction_type
            .as_str()
            .cmp(b.transaction_type.as_str()),
        SortColumn::Product => a.display_name().cmp(&b.display_name()),
        SortColumn::Weight => a
            .total_weight()
            .unwrap_or(Decimal::ZERO)
            .cmp(&b.total_weight().unwrap_or(Decimal::ZERO)),
        SortColumn::Customer => a
            .customer
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .cmp(&b.customer.as_deref().unwrap_or("").to_lowercase()),
    }
}

/// Filter, then sort, a borrowed transaction list
///
/// Unsorted state returns rows in snapshot order; the sort itself is stable
/// so ties keep their prior relative order.
pub fn filter_and_sort(
    transactions: &[Transaction],
    filters: &TransactionFilters,
    sort: SortState,
) -> Vec<Transaction> {
    let mut rows: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| filters.matches(transaction))
        .cloned()
        .collect();
    if let Some(column) = sort.column {
        rows.sort_by(|a, b| {
            let ordering = compare_by(a, b, column);
            if sort.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
    rows
}

/// Time-range shortcuts
///
/// Pure functions of the caller's local calendar date; pass
/// `Local::now().date_naive()` so day boundaries follow the operator's
/// timezone, not UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    Today,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
}

impl DatePreset {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "today" => Some(DatePreset::Today),
            "last_7_days" => Some(DatePreset::Last7Days),
            "last_30_days" => Some(DatePreset::Last30Days),
            "this_month" => Some(DatePreset::ThisMonth),
            "last_month" => Some(DatePreset::LastMonth),
            _ => None,
        }
    }

    /// Inclusive range ending on (or containing) `today`
    pub fn range(self, today: NaiveDate) -> DateRange {
        match self {
            DatePreset::Today => DateRange::new(today, today),
            DatePreset::Last7Days => DateRange::new(today - Duration::days(6), today),
            DatePreset::Last30Days => DateRange::new(today - Duration::days(29), today),
            DatePreset::ThisMonth => DateRange::new(month_start(today), month_end(today)),
            DatePreset::LastMonth => {
                let (year, month) = if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today);
                DateRange::new(start, month_end(start))
            }
        }
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next_month_start| next_month_start - Duration::days(1))
        .unwrap_or(date)
}
