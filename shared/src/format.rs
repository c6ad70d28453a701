//! Display formatting for stock quantities
//!
//! The compact breakdown string ("10R + 2B + 5S") and the label helpers
//! shared by list rows, mobile cards, and detail dialogs.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::breakdown::{summarize, summarize_records, QuantityBreakdown};
use crate::grouping::{Groupable, GroupedEntry};
use crate::models::{CountingMode, Parameters, StockSnapshot, StockType};

impl QuantityBreakdown {
    /// Compact token string, e.g. "10R + 2B + 5S"
    ///
    /// Emission order is always full rolls, cut pieces, bundles, spares,
    /// regardless of how the tally was populated. Zero buckets are omitted;
    /// an all-zero tally renders as "0".
    pub fn short_format(&self) -> String {
        let mut parts = Vec::new();
        if self.full_rolls > 0 {
            parts.push(format!("{}R", self.full_rolls));
        }
        if self.cut_rolls > 0 {
            parts.push(format!("{}C", self.cut_rolls));
        }
        if self.bundles > 0 {
            parts.push(format!("{}B", self.bundles));
        }
        if self.spare_pieces > 0 {
            parts.push(format!("{}S", self.spare_pieces));
        }
        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join(" + ")
        }
    }
}

/// Short-format a snapshot directly
pub fn snapshot_short_format(snapshot: &StockSnapshot, mode: CountingMode) -> String {
    summarize(snapshot, mode).short_format()
}

/// Short-format typed records directly
pub fn records_short_format<T: Groupable>(records: &[T], mode: CountingMode) -> String {
    summarize_records(records, mode).short_format()
}

/// Human label for a merged display row
///
/// Unrecognized stock types fall back to "quantity × token" so a legacy
/// record with an odd shape still renders instead of blocking the view.
pub fn group_label(group: &GroupedEntry) -> String {
    match &group.stock_type {
        StockType::FullRoll => match group.length_per_unit {
            Some(length) => format!(
                "{} × Full Roll ({})",
                group.quantity,
                format_meters(length)
            ),
            None => format!("{} × Full Roll", group.quantity),
        },
        StockType::CutRoll => {
            let pieces = group.cut_piece_lengths.len();
            if pieces > 0 {
                format!("{} × Cut Roll ({} pieces)", group.quantity, pieces)
            } else {
                format!("{} × Cut Roll", group.quantity)
            }
        }
        StockType::Bundle => match (group.pieces_per_bundle, group.piece_length_meters) {
            (Some(pieces), Some(length)) => format!(
                "{} × Bundle ({} × {})",
                group.quantity,
                pieces,
                format_meters(length)
            ),
            _ => format!("{} × Bundle", group.quantity),
        },
        StockType::Spare | StockType::SparePieces => {
            let pieces = group.spare_piece_count.unwrap_or(group.quantity);
            match group.piece_length_meters {
                Some(length) => format!("{} Spare Pieces ({})", pieces, format_meters(length)),
                None => format!("{} Spare Pieces", pieces),
            }
        }
        StockType::Other(token) => format!("{} × {}", group.quantity, token),
    }
}

/// Render a parameter map as "OD 63, PN 10, PE PE100"
///
/// Keys come out in stable (sorted) order so the same item always reads the
/// same way.
pub fn parameters_label(parameters: &Parameters) -> String {
    parameters
        .iter()
        .map(|(key, value)| format!("{} {}", key, value_text(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Plain text for a parameter value, without JSON quoting
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn format_meters(length: Decimal) -> String {
    format!("{} m", length.normalize())
}

pub fn format_weight(weight: Decimal) -> String {
    format!("{} kg", weight.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_short_format_full() {
        let tally = QuantityBreakdown {
            full_rolls: 10,
            cut_rolls: 1,
            bundles: 2,
            spare_pieces: 5,
            total_items: 18,
        };
        assert_eq!(tally.short_format(), "10R + 1C + 2B + 5S");
    }

    #[test]
    fn test_short_format_skips_zero_buckets() {
        let tally = QuantityBreakdown {
            full_rolls: 10,
            cut_rolls: 0,
            bundles: 2,
            spare_pieces: 0,
            total_items: 12,
        };
        assert_eq!(tally.short_format(), "10R + 2B");
    }

    #[test]
    fn test_short_format_all_zero() {
        assert_eq!(QuantityBreakdown::default().short_format(), "0");
    }

    #[test]
    fn test_parameters_label_stable_order() {
        let mut parameters = Parameters::new();
        parameters.insert("PN".to_string(), json!(10));
        parameters.insert("OD".to_string(), json!("63"));
        parameters.insert("PE".to_string(), json!("PE100"));
        assert_eq!(parameters_label(&parameters), "OD 63, PE PE100, PN 10");
    }

    #[test]
    fn test_value_text_unquotes_strings() {
        assert_eq!(value_text(&json!("63")), "63");
        assert_eq!(value_text(&json!(10)), "10");
        assert_eq!(value_text(&Value::Null), "");
    }

    #[test]
    fn test_format_meters_normalizes() {
        assert_eq!(format_meters(dec("100.50")), "100.5 m");
        assert_eq!(format_meters(dec("12")), "12 m");
    }
}
