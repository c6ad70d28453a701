//! Shared types and stock engine for the Pipe Inventory Platform
//!
//! This crate contains the domain models and the stock-snapshot aggregation
//! engine shared between the host application and the browser front-end
//! (via WASM).

pub mod breakdown;
pub mod filter;
pub mod format;
pub mod grouping;
pub mod metrics;
pub mod models;
pub mod types;

pub use breakdown::*;
pub use filter::*;
pub use format::*;
pub use grouping::*;
pub use metrics::*;
pub use models::*;
pub use types::*;
