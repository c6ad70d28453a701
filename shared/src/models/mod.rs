//! Domain models for the Pipe Inventory Platform

mod product;
mod stock;
mod transaction;

pub use product::*;
pub use stock::*;
pub use transaction::*;
