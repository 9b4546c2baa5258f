pub mod catalog;
pub mod pricing;

pub use catalog::{Catalog, CatalogError};
pub use pricing::{
    format_amount, price_items, DeterministicPricingEngine, PricingEngine, PricingResult,
    PricingTotals,
};
