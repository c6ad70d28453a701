//! WebAssembly module for the Pipe Inventory Platform
//!
//! Exposes the stock engine to the browser rendering layer:
//! - Grouped display rows
//! - Quantity breakdowns and short-format strings
//! - Snapshot totals
//! - Transaction filtering and sorting

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::breakdown::*;
pub use shared::models::*;

use shared::filter::{filter_and_sort, DatePreset, SortColumn, SortState, TransactionFilters};
use shared::format::{group_label, snapshot_short_format};
use shared::grouping::group_entries;
use shared::metrics::snapshot_totals;
use shared::models::{parse_snapshot, parse_transactions, CountingMode};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn invalid(context: &str, error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, error))
}

/// Group a stock-entry array into merged display rows, returned as JSON
#[wasm_bindgen]
pub fn group_stock_entries(entries_json: &str) -> Result<String, JsValue> {
    let entries: Vec<StockEntry> =
        serde_json::from_str(entries_json).map_err(|e| invalid("Invalid stock entries JSON", e))?;
    let groups = group_entries(&entries);
    serde_json::to_string(&groups).map_err(|e| invalid("Serialization failed", e))
}

/// Group a dispatch/return/scrap item array into merged display rows
#[wasm_bindgen]
pub fn group_dispatch_items(items_json: &str) -> Result<String, JsValue> {
    let items: Vec<ItemBreakdownRecord> =
        serde_json::from_str(items_json).map_err(|e| invalid("Invalid item records JSON", e))?;
    let groups = group_entries(&items);
    serde_json::to_string(&groups).map_err(|e| invalid("Serialization failed", e))
}

/// Display labels for grouped rows, in row order
#[wasm_bindgen]
pub fn group_labels(entries_json: &str) -> Result<Vec<String>, JsValue> {
    let entries: Vec<StockEntry> =
        serde_json::from_str(entries_json).map_err(|e| invalid("Invalid stock entries JSON", e))?;
    Ok(group_entries(&entries).iter().map(group_label).collect())
}

/// Quantity breakdown of a snapshot, returned as JSON
#[wasm_bindgen]
pub fn summarize_snapshot(snapshot_json: &str, product_type: &str) -> Result<String, JsValue> {
    let snapshot = parse_snapshot(snapshot_json).map_err(|e| invalid("Invalid snapshot", e))?;
    let breakdown = shared::breakdown::summarize(
        &snapshot,
        CountingMode::for_product_type(product_type),
    );
    serde_json::to_string(&breakdown).map_err(|e| invalid("Serialization failed", e))
}

/// Compact breakdown string for a snapshot, e.g. "10R + 2B + 5S"
#[wasm_bindgen]
pub fn short_format_snapshot(snapshot_json: &str, product_type: &str) -> Result<String, JsValue> {
    let snapshot = parse_snapshot(snapshot_json).map_err(|e| invalid("Invalid snapshot", e))?;
    Ok(snapshot_short_format(
        &snapshot,
        CountingMode::for_product_type(product_type),
    ))
}

/// The scalar totals (quantity, length, weight, breakdown) for a snapshot
#[wasm_bindgen]
pub fn snapshot_totals_json(
    snapshot_json: &str,
    weight_per_meter: Option<f64>,
    product_type: &str,
) -> Result<String, JsValue> {
    let snapshot = parse_snapshot(snapshot_json).map_err(|e| invalid("Invalid snapshot", e))?;
    let weight_per_meter = weight_per_meter.and_then(|w| Decimal::try_from(w).ok());
    let totals = snapshot_totals(
        &snapshot,
        weight_per_meter,
        CountingMode::for_product_type(product_type),
    );
    serde_json::to_string(&totals).map_err(|e| invalid("Serialization failed", e))
}

/// Filter and sort a transaction list, returned as JSON
///
/// `sort_column` accepts "date", "transaction_type", "product", "weight",
/// or "customer"; anything else leaves the list unsorted.
#[wasm_bindgen]
pub fn filter_and_sort_transactions(
    transactions_json: &str,
    filters_json: &str,
    sort_column: Option<String>,
    ascending: bool,
) -> Result<String, JsValue> {
    let transactions =
        parse_transactions(transactions_json).map_err(|e| invalid("Invalid transactions", e))?;
    let filters: TransactionFilters =
        serde_json::from_str(filters_json).map_err(|e| invalid("Invalid filters JSON", e))?;
    let sort = SortState {
        column: sort_column.as_deref().and_then(SortColumn::from_token),
        ascending,
    };
    let rows = filter_and_sort(&transactions, &filters, sort);
    serde_json::to_string(&rows).map_err(|e| invalid("Serialization failed", e))
}

/// Inclusive date range for a preset token, as JSON
///
/// The one clock read in the module: presets are anchored to the local
/// calendar date at the moment of the call.
#[wasm_bindgen]
pub fn preset_date_range(preset: &str) -> Result<String, JsValue> {
    let preset = DatePreset::from_token(preset)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown date preset: {}", preset)))?;
    let today = chrono::Local::now().date_naive();
    serde_json::to_string(&preset.range(today)).map_err(|e| invalid("Serialization failed", e))
}
