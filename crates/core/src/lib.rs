pub mod config;
pub mod domain;
pub mod errors;
pub mod session;
pub mod storefront;

pub use domain::book::{BookAttributes, BookId, BookRecord, CatalogItem, ListMetadata};
pub use domain::cart::{Cart, CartLine};
pub use errors::{ApplicationError, DomainError};
pub use session::{Session, SessionEvent, SessionState, TransitionOutcome};
pub use storefront::{
    compute_total, Catalog, Discount, PriceAssigner, PricingSummary, RandomPriceAssigner,
};
