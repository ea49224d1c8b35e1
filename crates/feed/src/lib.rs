//! Bestseller feed - the storefront's only network dependency.
//!
//! - **Wire** (`wire`) - response envelope of the list endpoint and its mapping to book records
//! - **Sources** (`source`) - `BookFeed` trait with an HTTP client and a canned in-memory feed
//! - **Loader** (`loader`) - one fetch, price assignment, empty catalog on any failure
//!
//! ```text
//! BookFeed::fetch → FeedResponse → FeedListing → PriceAssigner → Catalog
//! ```

pub mod error;
pub mod loader;
pub mod source;
pub mod wire;

pub use error::FeedError;
pub use loader::CatalogLoader;
pub use source::{BookFeed, HttpBookFeed, StaticBookFeed};
pub use wire::{FeedListing, FeedResponse};
