//! Grouping aggregator tests
//!
//! Covers the invariants the display layer relies on:
//! - Quantity-additive, lossless merging
//! - Permutation-independent totals
//! - Inputs left untouched

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;

use shared::grouping::{group_entries, GroupedEntry};
use shared::models::{Parameters, StockEntry, StockType};

// Helper to create Decimal from string
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
        status: "IN_STOCK".to_string(),
        parameters: Parameters::new(),
        batch_code: None,
        estimated_value: None,
        notes: None,
    }
}

/// Size fields that actually participate in the group identity, per type
fn group_identity(group: &GroupedEntry) -> String {
    let size = match &group.stock_type {
        StockType::FullRoll => format!("{:?}", group.length_per_unit),
        StockType::Bundle => format!(
            "{:?}|{:?}",
            group.pieces_per_bundle, group.piece_length_meters
        ),
        StockType::Spare | StockType::SparePieces => format!("{:?}", group.piece_length_meters),
        StockType::CutRoll | StockType::Other(_) => String::new(),
    };
    format!(
        "{}|{}|{}",
        group.stock_type.as_str(),
        size,
        serde_json::to_string(&group.parameters).unwrap()
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_two_identical_bundles_from_different_batches() {
    let mut first = entry(StockType::Bundle, 1);
    first.pieces_per_bundle = Some(10);
    first.piece_length_meters = Some(dec("2.5"));
    first.batch_code = Some("B1".to_string());
    let mut second = first.clone();
    second.batch_code = Some("B2".to_string());

    let groups = group_entries(&[first, second]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].quantity, 2);
    assert_eq!(groups[0].batch_codes, vec!["B1", "B2"]);
    // 2 bundles x 10 pieces x 2.5 m
    assert_eq!(groups[0].metrics(None).length_meters, dec("50"));
}

#[test]
fn test_batch_codes_deduplicate_but_values_concatenate() {
    let mut first = entry(StockType::FullRoll, 1);
    first.batch_code = Some("B7".to_string());
    first.estimated_value = Some(dec("200"));
    let second = first.clone();

    let groups = group_entries(&[first, second]);
    assert_eq!(groups[0].batch_codes, vec!["B7"]);
    assert_eq!(groups[0].estimated_values, vec![dec("200"), dec("200")]);
}

#[test]
fn test_inputs_are_not_mutated() {
    let mut bundle = entry(StockType::Bundle, 1);
    bundle.pieces_per_bundle = Some(10);
    bundle.piece_length_meters = Some(dec("2.5"));
    bundle.parameters.insert("OD".to_string(), json!("20"));
    let entries = vec![bundle.clone(), bundle];

    let before = entries.clone();
    let _ = group_entries(&entries);
    assert_eq!(entries, before);
}

#[test]
fn test_mixed_types_never_collide() {
    let mut full_roll = entry(StockType::FullRoll, 2);
    full_roll.length_per_unit = Some(dec("2.5"));
    let mut bundle = entry(StockType::Bundle, 3);
    bundle.piece_length_meters = Some(dec("2.5"));
    let mut spare = entry(StockType::Spare, 4);
    spare.piece_length_meters = Some(dec("2.5"));

    let groups = group_entries(&[full_roll, bundle, spare]);
    assert_eq!(groups.len(), 3);
}

#[test]
fn test_spare_group_accumulates_pieces() {
    let mut first = entry(StockType::SparePieces, 1);
    first.spare_piece_count = Some(6);
    first.piece_length_meters = Some(dec("3"));
    let mut second = entry(StockType::SparePieces, 2);
    second.piece_length_meters = Some(dec("3"));

    let groups = group_entries(&[first, second]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].quantity, 3);
    // 6 explicit pieces + 2 entries counted as pieces
    assert_eq!(groups[0].spare_piece_count, Some(8));
    assert_eq!(groups[0].metrics(None).length_meters, dec("24"));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn stock_type_strategy() -> impl Strategy<Value = StockType> {
    prop_oneof![
        Just(StockType::FullRoll),
        Just(StockType::CutRoll),
        Just(StockType::Bundle),
        Just(StockType::Spare),
        Just(StockType::SparePieces),
    ]
}

/// Small value pools so key collisions actually happen
fn entry_strategy() -> impl Strategy<Value = StockEntry> {
    (
        stock_type_strategy(),
        0u32..4,
        prop::option::of(prop_oneof![Just(dec("50")), Just(dec("100"))]),
        prop::option::of(prop_oneof![Just(5u32), Just(10u32)]),
        prop::option::of(prop_oneof![Just(dec("2.5")), Just(dec("3"))]),
        prop::option::of(1u32..8),
        prop_oneof![Just("63"), Just("75")],
    )
        .prop_map(
            |(stock_type, quantity, unit_len, per_bundle, piece_len, spare_count, od)| {
                let mut parameters = Parameters::new();
                parameters.insert("OD".to_string(), json!(od));
                StockEntry {
                    stock_type,
                    quantity,
                    length_per_unit: unit_len,
                    pieces_per_bundle: per_bundle,
                    piece_length_meters: piece_len,
                    cut_piece_lengths: None,
                    spare_piece_count: spare_count,
                    status: "IN_STOCK".to_string(),
                    parameters,
                    batch_code: None,
                    estimated_value: None,
                    notes: None,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Sum invariant: grouping never gains or loses quantity
    #[test]
    fn prop_grouping_preserves_quantity_sum(
        entries in prop::collection::vec(entry_strategy(), 0..20)
    ) {
        let input_sum: u32 = entries.iter().map(|e| e.quantity).sum();
        let groups = group_entries(&entries);
        let output_sum: u32 = groups.iter().map(|g| g.quantity).sum();

        // Dropped zero-net groups contribute nothing to either side
        prop_assert_eq!(input_sum, output_sum);
        prop_assert!(groups.len() <= entries.len());
    }

    /// Grouping the same multiset in any order yields identical totals
    #[test]
    fn prop_grouping_is_permutation_independent(
        entries in prop::collection::vec(entry_strategy(), 0..20).prop_shuffle()
    ) {
        let mut sorted = entries.clone();
        sorted.sort_by_key(|e| e.quantity);

        let totals = |input: &[StockEntry]| -> BTreeMap<String, (u32, Option<u32>)> {
            group_entries(input)
                .iter()
                .map(|g| (group_identity(g), (g.quantity, g.spare_piece_count)))
                .collect()
        };

        prop_assert_eq!(totals(&entries), totals(&sorted));
    }

    /// Grouping never mutates its input
    #[test]
    fn prop_grouping_leaves_input_unchanged(
        entries in prop::collection::vec(entry_strategy(), 0..20)
    ) {
        let before = entries.clone();
        let _ = group_entries(&entries);
        prop_assert_eq!(entries, before);
    }

    /// Every surviving group carries at least one unit
    #[test]
    fn prop_no_zero_net_groups(
        entries in prop::collection::vec(entry_strategy(), 0..20)
    ) {
        for group in group_entries(&entries) {
            prop_assert!(group.quantity > 0 || group.spare_piece_count.unwrap_or(0) > 0);
        }
    }
}
