//! Derived length, weight, and piece-count computation
//!
//! The four stock shapes encode length and weight differently; this module
//! is the single place that decodes them. Every function is total: missing
//! numeric fields contribute zero, and weight is `None` (not zero) when the
//! batch never recorded a weight-per-meter.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::breakdown::{summarize, QuantityBreakdown};
use crate::models::{CountingMode, ItemBreakdownRecord, StockEntry, StockSnapshot, StockType};

/// Derived metrics for one stock entry or one merged group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub length_meters: Decimal,
    /// `None` when no weight-per-meter is known for the batch
    pub weight_kg: Option<Decimal>,
    pub piece_count: u32,
}

impl DerivedMetrics {
    fn from_length(
        length_meters: Decimal,
        piece_count: u32,
        weight_per_meter: Option<Decimal>,
    ) -> Self {
        Self {
            length_meters,
            weight_kg: weight_per_meter.map(|w| length_meters * w),
            piece_count,
        }
    }
}

/// Derived metrics for a single stock entry
pub fn stock_metrics(entry: &StockEntry, weight_per_meter: Option<Decimal>) -> DerivedMetrics {
    let quantity = Decimal::from(entry.quantity);
    let (length, pieces) = match &entry.stock_type {
        StockType::FullRoll => (
            quantity * entry.length_per_unit.unwrap_or(Decimal::ZERO),
            entry.quantity,
        ),
        StockType::Bundle => {
            let per_bundle = entry.pieces_per_bundle.unwrap_or(0);
            (
                quantity
                    * Decimal::from(per_bundle)
                    * entry.piece_length_meters.unwrap_or(Decimal::ZERO),
                entry.quantity * per_bundle,
            )
        }
        StockType::Spare | StockType::SparePieces => {
            let pieces = entry.spare_piece_count.unwrap_or(entry.quantity);
            (
                Decimal::from(pieces) * entry.piece_length_meters.unwrap_or(Decimal::ZERO),
                pieces,
            )
        }
        StockType::CutRoll => match &entry.cut_piece_lengths {
            Some(lengths) => (lengths.iter().copied().sum(), lengths.len() as u32),
            // Legacy cut rolls predate per-piece tracking
            None => (
                quantity * entry.length_per_unit.unwrap_or(Decimal::ZERO),
                entry.quantity,
            ),
        },
        StockType::Other(_) => (Decimal::ZERO, entry.quantity),
    };
    DerivedMetrics::from_length(length, pieces, weight_per_meter)
}

/// Derived metrics for a dispatch-style item record
///
/// Upstream payloads are inconsistent about which length fields they carry,
/// so the length resolves through an ordered fallback; a zero or negative
/// value at any step counts as absent and the next step is tried.
pub fn item_metrics(
    record: &ItemBreakdownRecord,
    weight_per_meter: Option<Decimal>,
) -> DerivedMetrics {
    DerivedMetrics::from_length(item_length(record), item_piece_count(record), weight_per_meter)
}

fn item_length(record: &ItemBreakdownRecord) -> Decimal {
    if let Some(length) = record.length_meters {
        if length > Decimal::ZERO {
            return length;
        }
    }
    let per_piece = record
        .piece_length
        .filter(|length| *length > Decimal::ZERO)
        .or(record.piece_length_meters);
    if let (Some(count), Some(length)) = (record.piece_count, per_piece) {
        if count > 0 && length > Decimal::ZERO {
            return Decimal::from(count) * length;
        }
    }
    if let (Some(size), Some(length)) = (record.bundle_size, record.piece_length) {
        if size > 0 && length > Decimal::ZERO {
            return Decimal::from(size) * length;
        }
    }
    Decimal::ZERO
}

/// Pieces represented by a dispatch item
///
/// An explicit `piece_count` wins over `quantity` when both are present;
/// see DESIGN.md for the flagged business rule.
pub(crate) fn item_piece_count(record: &ItemBreakdownRecord) -> u32 {
    record.piece_count.unwrap_or_else(|| match &record.item_type {
        StockType::Bundle => match record.bundle_size {
            Some(size) if size > 0 => record.quantity * size,
            _ => record.quantity,
        },
        _ => record.quantity,
    })
}

/// Scalar totals for a whole snapshot, shown identically by list rows,
/// mobile cards, and detail dialogs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotTotals {
    pub quantity: u32,
    pub length_meters: Decimal,
    pub weight_kg: Option<Decimal>,
    pub breakdown: QuantityBreakdown,
}

/// Total length of a snapshot in meters
///
/// Legacy `rolls` elements carry their own `length_meters`; a legacy scalar
/// `total_rolls` snapshot has no length information at all.
pub fn snapshot_length(snapshot: &StockSnapshot) -> Decimal {
    if !snapshot.stock_entries.is_empty() {
        snapshot
            .stock_entries
            .iter()
            .map(|entry| stock_metrics(entry, None).length_meters)
            .sum()
    } else {
        snapshot
            .rolls
            .iter()
            .map(|roll| roll.length_meters.unwrap_or(Decimal::ZERO))
            .sum()
    }
}

/// The four scalar totals every view renders from one snapshot
pub fn snapshot_totals(
    snapshot: &StockSnapshot,
    weight_per_meter: Option<Decimal>,
    mode: CountingMode,
) -> SnapshotTotals {
    let breakdown = summarize(snapshot, mode);
    let length = snapshot_length(snapshot);
    SnapshotTotals {
        quantity: breakdown.total_items,
        length_meters: length,
        weight_kg: weight_per_meter.map(|w| length * w),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Parameters;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(stock_type: StockType, quantity: u32) -> StockEntry {
        StockEntry {
            stock_type,
            quantity,
            length_per_unit: None,
            pieces_per_bundle: None,
            piece_length_meters: None,
            cut_piece_lengths: None,
            spare_piece_count: None,
            status: String::new(),
            parameters: Parameters::new(),
            batch_code: None,
            estimated_value: None,
            notes: None,
        }
    }

    #[test]
    fn test_full_roll_length() {
        let mut full_roll = entry(StockType::FullRoll, 3);
        full_roll.length_per_unit = Some(dec("100"));
        let metrics = stock_metrics(&full_roll, None);
        assert_eq!(metrics.length_meters, dec("300"));
        assert_eq!(metrics.piece_count, 3);
        assert_eq!(metrics.weight_kg, None);
    }

    #[test]
    fn test_bundle_length_and_pieces() {
        let mut bundle = entry(StockType::Bundle, 2);
        bundle.pieces_per_bundle = Some(10);
        bundle.piece_length_meters = Some(dec("2.5"));
        let metrics = stock_metrics(&bundle, Some(dec("0.2")));
        assert_eq!(metrics.length_meters, dec("50"));
        assert_eq!(metrics.piece_count, 20);
        assert_eq!(metrics.weight_kg, Some(dec("10")));
    }

    #[test]
    fn test_spare_prefers_piece_count_over_quantity() {
        let mut spare = entry(StockType::SparePieces, 2);
        spare.spare_piece_count = Some(12);
        spare.piece_length_meters = Some(dec("3"));
        let metrics = stock_metrics(&spare, None);
        assert_eq!(metrics.length_meters, dec("36"));
        assert_eq!(metrics.piece_count, 12);
    }

    #[test]
    fn test_spare_falls_back_to_quantity() {
        let mut spare = entry(StockType::Spare, 5);
        spare.piece_length_meters = Some(dec("2"));
        let metrics = stock_metrics(&spare, None);
        assert_eq!(metrics.length_meters, dec("10"));
        assert_eq!(metrics.piece_count, 5);
    }

    #[test]
    fn test_cut_roll_sums_pieces() {
        let mut cut_roll = entry(StockType::CutRoll, 1);
        cut_roll.cut_piece_lengths = Some(vec![dec("12"), dec("8"), dec("5.5")]);
        let metrics = stock_metrics(&cut_roll, None);
        assert_eq!(metrics.length_meters, dec("25.5"));
        assert_eq!(metrics.piece_count, 3);
    }

    #[test]
    fn test_legacy_cut_roll_uses_quantity_times_unit_length() {
        let mut cut_roll = entry(StockType::CutRoll, 2);
        cut_roll.length_per_unit = Some(dec("40"));
        let metrics = stock_metrics(&cut_roll, None);
        assert_eq!(metrics.length_meters, dec("80"));
        assert_eq!(metrics.piece_count, 2);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let metrics = stock_metrics(&entry(StockType::FullRoll, 4), None);
        assert_eq!(metrics.length_meters, Decimal::ZERO);
        assert_eq!(metrics.piece_count, 4);
    }

    #[test]
    fn test_unknown_type_has_zero_length() {
        let metrics = stock_metrics(&entry(StockType::Other("PALLET".into()), 7), Some(dec("1")));
        assert_eq!(metrics.length_meters, Decimal::ZERO);
        assert_eq!(metrics.weight_kg, Some(Decimal::ZERO));
        assert_eq!(metrics.piece_count, 7);
    }

    fn item(item_type: StockType, quantity: u32) -> ItemBreakdownRecord {
        ItemBreakdownRecord {
            item_type,
            quantity,
            length_meters: None,
            piece_count: None,
            piece_length: None,
            piece_length_meters: None,
            bundle_size: None,
            parameters: Parameters::new(),
            batch_code: None,
            estimated_value: None,
            notes: None,
        }
    }

    #[test]
    fn test_item_direct_length_wins() {
        let mut record = item(StockType::FullRoll, 1);
        record.length_meters = Some(dec("120"));
        record.piece_count = Some(10);
        record.piece_length = Some(dec("2"));
        assert_eq!(item_metrics(&record, None).length_meters, dec("120"));
    }

    #[test]
    fn test_item_zero_length_falls_through() {
        let mut record = item(StockType::Bundle, 1);
        record.length_meters = Some(Decimal::ZERO);
        record.piece_count = Some(10);
        record.piece_length = Some(dec("2.5"));
        assert_eq!(item_metrics(&record, None).length_meters, dec("25"));
    }

    #[test]
    fn test_item_piece_length_meters_substitute() {
        let mut record = item(StockType::SparePieces, 1);
        record.piece_count = Some(4);
        record.piece_length_meters = Some(dec("3"));
        assert_eq!(item_metrics(&record, None).length_meters, dec("12"));
    }

    #[test]
    fn test_item_bundle_size_fallback() {
        let mut record = item(StockType::Bundle, 1);
        record.bundle_size = Some(10);
        record.piece_length = Some(dec("2.5"));
        assert_eq!(item_metrics(&record, None).length_meters, dec("25"));
    }

    #[test]
    fn test_item_all_absent_is_zero() {
        let record = item(StockType::Bundle, 3);
        let metrics = item_metrics(&record, Some(dec("0.5")));
        assert_eq!(metrics.length_meters, Decimal::ZERO);
        assert_eq!(metrics.weight_kg, Some(Decimal::ZERO));
    }
}
