//! Stock snapshot models
//!
//! A stock snapshot is the point-in-time array of stock entries embedded in
//! a transaction record, describing what inventory looked like when that
//! transaction occurred. Field names match the backend JSON verbatim.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Physical stock representations
///
/// `SPARE` and `SPARE_PIECES` are distinct wire tokens with identical
/// arithmetic semantics. An unrecognized token is preserved verbatim so the
/// entry can still be counted and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StockType {
    FullRoll,
    CutRoll,
    Bundle,
    Spare,
    SparePieces,
    Other(String),
}

impl StockType {
    pub fn as_str(&self) -> &str {
        match self {
            StockType::FullRoll => "FULL_ROLL",
            StockType::CutRoll => "CUT_ROLL",
            StockType::Bundle => "BUNDLE",
            StockType::Spare => "SPARE",
            StockType::SparePieces => "SPARE_PIECES",
            StockType::Other(token) => token,
        }
    }

    /// Loose spare pieces, under either wire token
    pub fn is_spare(&self) -> bool {
        matches!(self, StockType::Spare | StockType::SparePieces)
    }
}

impl From<String> for StockType {
    fn from(token: String) -> Self {
        match token.as_str() {
            "FULL_ROLL" => StockType::FullRoll,
            "CUT_ROLL" => StockType::CutRoll,
            "BUNDLE" => StockType::Bundle,
            "SPARE" => StockType::Spare,
            "SPARE_PIECES" => StockType::SparePieces,
            _ => StockType::Other(token),
        }
    }
}

impl From<StockType> for String {
    fn from(stock_type: StockType) -> Self {
        stock_type.as_str().to_string()
    }
}

impl std::fmt::Display for StockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockType::FullRoll => write!(f, "Full Roll"),
            StockType::CutRoll => write!(f, "Cut Roll"),
            StockType::Bundle => write!(f, "Bundle"),
            StockType::Spare | StockType::SparePieces => write!(f, "Spare Pieces"),
            StockType::Other(token) => write!(f, "{}", token),
        }
    }
}

/// Product attribute map (OD, PN, PE, Type)
///
/// Never used for arithmetic; participates only in grouping equality and
/// label rendering. Keys are ordered so canonical serialization is stable.
pub type Parameters = BTreeMap<String, Value>;

/// One physical unit group as snapshotted at transaction time
///
/// Fields irrelevant to the entry's stock type are simply absent on the
/// wire; arithmetic treats them as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub stock_type: StockType,
    /// Count of physical rows this entry represents (not pieces, except for
    /// spare entries without a `spare_piece_count`)
    #[serde(default)]
    pub quantity: u32,
    /// Meters per roll, for full rolls
    pub length_per_unit: Option<Decimal>,
    pub pieces_per_bundle: Option<u32>,
    pub piece_length_meters: Option<Decimal>,
    /// One element per physical cut piece; absent on legacy cut rolls
    pub cut_piece_lengths: Option<Vec<Decimal>>,
    /// Total individual pieces when `quantity` counts groups of spares
    pub spare_piece_count: Option<u32>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_parameters")]
    pub parameters: Parameters,
    pub batch_code: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub notes: Option<String>,
}

/// Serde adapter for [`parse_parameters`], for record types carrying a
/// `parameters` field
pub fn deserialize_parameters<'de, D>(deserializer: D) -> Result<Parameters, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(parse_parameters(raw))
}

/// Decode a `parameters` field
///
/// The backend sends an object, but some records carry it double-JSON-encoded
/// as a string and need one extra parse pass. Anything unparseable degrades
/// to the empty map with a diagnostic; an odd parameter map must never block
/// an inventory view.
pub fn parse_parameters(raw: Option<Value>) -> Parameters {
    match raw {
        None | Some(Value::Null) => Parameters::new(),
        Some(Value::Object(map)) => map.into_iter().collect(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(&encoded) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            Ok(_) => {
                tracing::warn!(raw = %encoded, "parameters string is not a JSON object, using empty map");
                Parameters::new()
            }
            Err(error) => {
                tracing::warn!(%error, "malformed parameters string, using empty map");
                Parameters::new()
            }
        },
        Some(other) => {
            tracing::warn!(raw = %other, "unexpected parameters representation, using empty map");
            Parameters::new()
        }
    }
}
