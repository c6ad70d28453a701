//! Grouping of stock records into merged display rows
//!
//! Entries that represent the same physical kind of item (same type, same
//! size fields, same product parameters) collapse into one row with an
//! accumulated quantity. Output order is first-seen input order, never
//! re-sorted, so display order reflects the original snapshot order.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::metrics::{item_metrics, item_piece_count, stock_metrics, DerivedMetrics};
use crate::models::{ItemBreakdownRecord, Parameters, StockEntry, StockType};

/// Record shapes the aggregator can merge
///
/// `StockEntry` and `ItemBreakdownRecord` carry the same information under
/// different field names; this trait is the seam that lets one grouping
/// implementation serve both.
pub trait Groupable {
    fn kind(&self) -> &StockType;
    fn quantity(&self) -> u32;
    /// Per-unit length for roll shapes
    fn unit_length(&self) -> Option<Decimal>;
    fn bundle_pieces(&self) -> Option<u32>;
    fn piece_length(&self) -> Option<Decimal>;
    fn parameters(&self) -> &Parameters;
    fn batch_code(&self) -> Option<&str>;
    fn cut_pieces(&self) -> &[Decimal];
    fn estimated_value(&self) -> Option<Decimal>;
    fn notes(&self) -> Option<&str>;
    fn metrics(&self, weight_per_meter: Option<Decimal>) -> DerivedMetrics;

    /// Individual pieces this record stands for
    fn piece_total(&self) -> u32 {
        self.metrics(None).piece_count
    }
}

impl Groupable for StockEntry {
    fn kind(&self) -> &StockType {
        &self.stock_type
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }

    fn unit_length(&self) -> Option<Decimal> {
        self.length_per_unit
    }

    fn bundle_pieces(&self) -> Option<u32> {
        self.pieces_per_bundle
    }

    fn piece_length(&self) -> Option<Decimal> {
        self.piece_length_meters
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn batch_code(&self) -> Option<&str> {
        self.batch_code.as_deref()
    }

    fn cut_pieces(&self) -> &[Decimal] {
        self.cut_piece_lengths.as_deref().unwrap_or(&[])
    }

    fn estimated_value(&self) -> Option<Decimal> {
        self.estimated_value
    }

    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    fn metrics(&self, weight_per_meter: Option<Decimal>) -> DerivedMetrics {
        stock_metrics(self, weight_per_meter)
    }
}

impl Groupable for ItemBreakdownRecord {
    fn kind(&self) -> &StockType {
        &self.item_type
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }

    fn unit_length(&self) -> Option<Decimal> {
        self.length_meters
    }

    fn bundle_pieces(&self) -> Option<u32> {
        self.bundle_size
    }

    fn piece_length(&self) -> Option<Decimal> {
        self.piece_length
            .filter(|length| *length > Decimal::ZERO)
            .or(self.piece_length_meters)
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn batch_code(&self) -> Option<&str> {
        self.batch_code.as_deref()
    }

    fn cut_pieces(&self) -> &[Decimal] {
        &[]
    }

    fn estimated_value(&self) -> Option<Decimal> {
        self.estimated_value
    }

    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    fn metrics(&self, weight_per_meter: Option<Decimal>) -> DerivedMetrics {
        item_metrics(self, weight_per_meter)
    }

    fn piece_total(&self) -> u32 {
        item_piece_count(self)
    }
}

/// One merged display row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedEntry {
    pub stock_type: StockType,
    pub quantity: u32,
    /// Summed pieces for spare shapes (`spare_piece_count ?? quantity` per
    /// entry); `None` for other shapes
    pub spare_piece_count: Option<u32>,
    pub length_per_unit: Option<Decimal>,
    pub pieces_per_bundle: Option<u32>,
    pub piece_length_meters: Option<Decimal>,
    pub parameters: Parameters,
    /// Unique batch codes in first-seen order
    pub batch_codes: Vec<String>,
    /// One element per physical cut piece, concatenated across entries
    pub cut_piece_lengths: Vec<Decimal>,
    /// One element per entry that carried a value, concatenated
    pub estimated_values: Vec<Decimal>,
    pub notes: Vec<String>,
}

impl GroupedEntry {
    fn seed<T: Groupable>(entry: &T) -> Self {
        Self {
            stock_type: entry.kind().clone(),
            quantity: 0,
            spare_piece_count: entry.kind().is_spare().then_some(0),
            length_per_unit: entry.unit_length(),
            pieces_per_bundle: entry.bundle_pieces(),
            piece_length_meters: entry.piece_length(),
            parameters: entry.parameters().clone(),
            batch_codes: Vec::new(),
            cut_piece_lengths: Vec::new(),
            estimated_values: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn absorb<T: Groupable>(&mut self, entry: &T) {
        self.quantity += entry.quantity();
        if let Some(pieces) = self.spare_piece_count.as_mut() {
            *pieces += entry.piece_total();
        }
        if let Some(code) = entry.batch_code() {
            if !self.batch_codes.iter().any(|existing| existing == code) {
                self.batch_codes.push(code.to_string());
            }
        }
        self.cut_piece_lengths.extend_from_slice(entry.cut_pieces());
        if let Some(value) = entry.estimated_value() {
            self.estimated_values.push(value);
        }
        if let Some(note) = entry.notes() {
            if !self.notes.iter().any(|existing| existing == note) {
                self.notes.push(note.to_string());
            }
        }
    }

    /// Derived metrics for the merged row, using the same per-type table as
    /// a raw entry
    pub fn metrics(&self, weight_per_meter: Option<Decimal>) -> DerivedMetrics {
        let entry = StockEntry {
            stock_type: self.stock_type.clone(),
            quantity: self.quantity,
            length_per_unit: self.length_per_unit,
            pieces_per_bundle: self.pieces_per_bundle,
            piece_length_meters: self.piece_length_meters,
            cut_piece_lengths: (!self.cut_piece_lengths.is_empty())
                .then(|| self.cut_piece_lengths.clone()),
            spare_piece_count: self.spare_piece_count,
            status: String::new(),
            parameters: Parameters::new(),
            batch_code: None,
            estimated_value: None,
            notes: None,
        };
        stock_metrics(&entry, weight_per_meter)
    }
}

/// Collapse records of the same physical kind into merged rows
///
/// Quantity-additive and lossless: the summed quantity across the output
/// equals the summed quantity across the input. Groups that net to zero are
/// dropped.
pub fn group_entries<T: Groupable>(entries: &[T]) -> Vec<GroupedEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupedEntry> = Vec::new();

    for entry in entries {
        let key = group_key(entry);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(GroupedEntry::seed(entry));
            groups.len() - 1
        });
        groups[slot].absorb(entry);
    }

    groups.retain(|group| group.quantity > 0 || group.spare_piece_count.unwrap_or(0) > 0);
    groups
}

/// Canonical grouping key
///
/// Type token, then the size fields relevant to that type (other types'
/// size fields contribute the empty string, so equal numbers on different
/// shapes never collide), then the canonically serialized parameters.
/// Decimals are normalized so `2.50` and `2.5` key identically.
fn group_key<T: Groupable>(entry: &T) -> String {
    let (unit_length, bundle_pieces, piece_length) = match entry.kind() {
        StockType::FullRoll => (
            decimal_key(entry.unit_length()),
            String::new(),
            String::new(),
        ),
        StockType::Bundle => (
            String::new(),
            count_key(entry.bundle_pieces()),
            decimal_key(entry.piece_length()),
        ),
        StockType::Spare | StockType::SparePieces => (
            String::new(),
            String::new(),
            decimal_key(entry.piece_length()),
        ),
        StockType::CutRoll | StockType::Other(_) => (String::new(), String::new(), String::new()),
    };
    format!(
        "{}|{}|{}|{}|{}",
        entry.kind().as_str(),
        unit_length,
        bundle_pieces,
        piece_length,
        canonical_parameters(entry.parameters()),
    )
}

fn decimal_key(value: Option<Decimal>) -> String {
    value
        .map(|decimal| decimal.normalize().to_string())
        .unwrap_or_default()
}

fn count_key(value: Option<u32>) -> String {
    value.map(|count| count.to_string()).unwrap_or_default()
}

fn canonical_parameters(parameters: &Parameters) -> String {
    // BTreeMap iteration order makes this stable across entries
    serde_json::to_string(parameters).unwrap_or_default()
}
