//! Quantity breakdown tallies
//!
//! Reduces a stock snapshot into the fixed-shape tally shown on summary
//! tiles and compact list cells. The summarizer never fails: unknown stock
//! types still count toward the display total, and the two legacy snapshot
//! shapes are handled in place.

use serde::{Deserialize, Serialize};

use crate::grouping::Groupable;
use crate::models::{CountingMode, StockSnapshot, StockType};

/// Fixed-shape tally of a snapshot's stock entries
///
/// Serialized camelCase because callers persist it back onto the
/// transaction record as `quantity_breakdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityBreakdown {
    pub full_rolls: u32,
    pub cut_rolls: u32,
    pub bundles: u32,
    /// Individual pieces, not spare groups
    pub spare_pieces: u32,
    /// Display total; not necessarily the sum of the four, since
    /// piece-counted families count pieces
    pub total_items: u32,
}

/// Tally a snapshot, including the legacy shapes
///
/// Typed entries win when present; otherwise a flat `rolls` array counts
/// one full roll per element, and a bare `total_rolls` scalar becomes the
/// roll count with no further breakdown.
pub fn summarize(snapshot: &StockSnapshot, mode: CountingMode) -> QuantityBreakdown {
    if !snapshot.stock_entries.is_empty() {
        return summarize_records(&snapshot.stock_entries, mode);
    }
    if !snapshot.rolls.is_empty() {
        let count = snapshot.rolls.len() as u32;
        return QuantityBreakdown {
            full_rolls: count,
            total_items: count,
            ..Default::default()
        };
    }
    if let Some(total) = snapshot.total_rolls {
        return QuantityBreakdown {
            full_rolls: total,
            total_items: total,
            ..Default::default()
        };
    }
    QuantityBreakdown::default()
}

/// Tally typed records (stock entries or dispatch items)
pub fn summarize_records<T: Groupable>(records: &[T], mode: CountingMode) -> QuantityBreakdown {
    let mut tally = QuantityBreakdown::default();
    for record in records {
        match record.kind() {
            StockType::FullRoll => tally.full_rolls += record.quantity(),
            StockType::CutRoll => tally.cut_rolls += record.quantity(),
            StockType::Bundle => tally.bundles += record.quantity(),
            StockType::Spare | StockType::SparePieces => {
                tally.spare_pieces += record.piece_total()
            }
            StockType::Other(_) => {}
        }
        tally.total_items += match (mode, record.kind()) {
            // Unrecognized types still count toward the display total so the
            // headline number stays truthful
            (_, StockType::Other(_)) => record.quantity(),
            (CountingMode::Pieces, _) => record.piece_total(),
            (CountingMode::Units, kind) if kind.is_spare() => record.piece_total(),
            (CountingMode::Units, _) => record.quantity(),
        };
    }
    tally
}
