//! Transaction records and the boundary parse for backend payloads

use chrono::{DateTime, Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::breakdown::{summarize, summarize_records, QuantityBreakdown};
use crate::format::parameters_label;
use crate::metrics::{item_metrics, snapshot_length};
use crate::models::{deserialize_parameters, CountingMode, Parameters, StockEntry, StockType};

/// Inventory transaction types
///
/// The last three are the in-place stock transformations (cutting a roll,
/// splitting a bundle, combining spare pieces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Production,
    Dispatch,
    Return,
    Scrap,
    CutRoll,
    SplitBundle,
    CombineSpares,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Production => "PRODUCTION",
            TransactionType::Dispatch => "DISPATCH",
            TransactionType::Return => "RETURN",
            TransactionType::Scrap => "SCRAP",
            TransactionType::CutRoll => "CUT_ROLL",
            TransactionType::SplitBundle => "SPLIT_BUNDLE",
            TransactionType::CombineSpares => "COMBINE_SPARES",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Production => write!(f, "Production"),
            TransactionType::Dispatch => write!(f, "Dispatch"),
            TransactionType::Return => write!(f, "Return"),
            TransactionType::Scrap => write!(f, "Scrap"),
            TransactionType::CutRoll => write!(f, "Cut Roll"),
            TransactionType::SplitBundle => write!(f, "Split Bundle"),
            TransactionType::CombineSpares => write!(f, "Combine Spares"),
        }
    }
}

/// Dispatch/return/scrap item record
///
/// Semantically overlaps `StockEntry` but the backend keys it differently;
/// the two shapes must not be conflated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBreakdownRecord {
    pub item_type: StockType,
    #[serde(default)]
    pub quantity: u32,
    pub length_meters: Option<Decimal>,
    pub piece_count: Option<u32>,
    pub piece_length: Option<Decimal>,
    pub piece_length_meters: Option<Decimal>,
    pub bundle_size: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_parameters")]
    pub parameters: Parameters,
    pub batch_code: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub notes: Option<String>,
}

/// Element of the legacy flat `rolls` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRoll {
    pub length_meters: Option<Decimal>,
}

/// Point-in-time stock payload embedded in a transaction
///
/// Newer records carry typed `stock_entries`; older ones carry a flat
/// `rolls` array or only a scalar `total_rolls`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    #[serde(default)]
    pub stock_entries: Vec<StockEntry>,
    #[serde(default)]
    pub rolls: Vec<LegacyRoll>,
    pub total_rolls: Option<u32>,
}

/// One row of the transaction list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub batch_code: Option<String>,
    pub batch_number: Option<String>,
    #[serde(default)]
    pub product_type: String,
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "deserialize_parameters")]
    pub parameters: Parameters,
    #[serde(default)]
    pub status: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub customer: Option<String>,
    pub invoice_number: Option<String>,
    /// Batch property; absent when the batch never recorded it
    pub weight_per_meter: Option<Decimal>,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub stock_snapshot: StockSnapshot,
    /// Dispatch/return/scrap item breakdown
    #[serde(default)]
    pub items: Vec<ItemBreakdownRecord>,
    /// Derived field persisted in memory so downstream views don't recompute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_breakdown: Option<QuantityBreakdown>,
}

impl Transaction {
    /// The record's logical activity date
    ///
    /// Dispatches are dated by when they were entered; everything else by
    /// the business date on the record. Day boundaries follow the local
    /// timezone, matching the date-range presets.
    pub fn activity_date(&self) -> NaiveDate {
        match self.transaction_type {
            TransactionType::Dispatch => self.created_at.with_timezone(&Local).date_naive(),
            _ => self.transaction_date,
        }
    }

    pub fn counting_mode(&self) -> CountingMode {
        CountingMode::for_product_type(&self.product_type)
    }

    /// Display name combining the product type with its parameters
    pub fn display_name(&self) -> String {
        let label = parameters_label(&self.parameters);
        if label.is_empty() {
            self.product_type.clone()
        } else {
            format!("{} ({})", self.product_type, label)
        }
    }

    /// Quantity breakdown, preferring the persisted derived field
    pub fn breakdown(&self) -> QuantityBreakdown {
        self.quantity_breakdown
            .unwrap_or_else(|| self.compute_breakdown())
    }

    fn compute_breakdown(&self) -> QuantityBreakdown {
        if self.items.is_empty() {
            summarize(&self.stock_snapshot, self.counting_mode())
        } else {
            summarize_records(&self.items, self.counting_mode())
        }
    }

    /// Persist the derived breakdown onto the record
    pub fn with_breakdown(mut self) -> Self {
        self.quantity_breakdown = Some(self.compute_breakdown());
        self
    }

    /// Total weight in kg, `None` when the batch has no weight-per-meter
    pub fn total_weight(&self) -> Option<Decimal> {
        let weight_per_meter = self.weight_per_meter?;
        let length: Decimal = if self.items.is_empty() {
            snapshot_length(&self.stock_snapshot)
        } else {
            self.items
                .iter()
                .map(|item| item_metrics(item, None).length_meters)
                .sum()
        };
        Some(length * weight_per_meter)
    }
}

/// Boundary parse failures for backend payloads
///
/// The only fallible surface of the engine; everything past the parse is
/// total and degrades instead of failing.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("malformed stock snapshot payload: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error("malformed transaction list payload: {0}")]
    Transactions(#[source] serde_json::Error),
}

/// Result type alias for boundary parses
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Parse a stock snapshot payload from the backend
pub fn parse_snapshot(json: &str) -> PayloadResult<StockSnapshot> {
    serde_json::from_str(json).map_err(PayloadError::Snapshot)
}

/// Parse a transaction list payload from the backend
pub fn parse_transactions(json: &str) -> PayloadResult<Vec<Transaction>> {
    serde_json::from_str(json).map_err(PayloadError::Transactions)
}
