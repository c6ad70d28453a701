//! Product family classification

use serde::{Deserialize, Serialize};

/// How a product family counts its display total
///
/// Roll goods (HDPE coil and the like) count physical units, so a bundle is
/// one item. Sprinkler pipe is sold by the piece and its display total is
/// the piece count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    #[default]
    Units,
    Pieces,
}

impl CountingMode {
    /// Derive the counting mode from the backend's product-type token
    pub fn for_product_type(product_type: &str) -> Self {
        if product_type.to_ascii_uppercase().contains("SPRINKLER") {
            CountingMode::Pieces
        } else {
            CountingMode::Units
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_mode_for_product_type() {
        assert_eq!(CountingMode::for_product_type("HDPE"), CountingMode::Units);
        assert_eq!(
            CountingMode::for_product_type("SPRINKLER"),
            CountingMode::Pieces
        );
        assert_eq!(
            CountingMode::for_product_type("Sprinkler Pipe"),
            CountingMode::Pieces
        );
    }
}
