pub mod catalog;
pub mod pricing;

pub use catalog::{
    Catalog, FixedPriceAssigner, PriceAssigner, RandomPriceAssigner, DEFAULT_PRICE_RANGE,
};
pub use pricing::{
    compute_total, compute_total_with, price_cart, Discount, FlatDiscountPricing, PricingEngine,
    PricingSummary,
};
