use bookworm_core::storefront::catalog::{Catalog, PriceAssigner};
use tracing::{error, info, warn};

use crate::error::FeedError;
use crate::source::BookFeed;

/// Fetches the bestseller list once and prices it into a [`Catalog`].
///
/// `is_loading` stays true until a load settles, whichever way it ends.
pub struct CatalogLoader<F, P> {
    feed: F,
    pricer: P,
    loading: bool,
}

impl<F, P> CatalogLoader<F, P>
where
    F: BookFeed,
    P: PriceAssigner,
{
    pub fn new(feed: F, pricer: P) -> Self {
        Self { feed, pricer, loading: true }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Never fails: transport and malformed-response errors are logged and
    /// produce an empty catalog.
    pub async fn load(&mut self) -> Catalog {
        match self.try_load().await {
            Ok(catalog) => catalog,
            Err(load_error) => {
                match &load_error {
                    FeedError::MissingField(_) | FeedError::Decode(_) => warn!(
                        event_name = "catalog.load.malformed",
                        source = %self.feed.describe(),
                        error_class = load_error.class(),
                        error = %load_error,
                        "bestseller feed returned no book list; showing empty catalog"
                    ),
                    _ => error!(
                        event_name = "catalog.load.failed",
                        source = %self.feed.describe(),
                        error_class = load_error.class(),
                        error = %load_error,
                        "bestseller feed request failed; showing empty catalog"
                    ),
                }
                Catalog::empty()
            }
        }
    }

    /// Same single attempt as [`load`](Self::load) but hands the error back.
    pub async fn try_load(&mut self) -> Result<Catalog, FeedError> {
        self.loading = true;
        let result = self.fetch_catalog().await;
        self.loading = false;
        result
    }

    async fn fetch_catalog(&mut self) -> Result<Catalog, FeedError> {
        let listing = self.feed.fetch().await?.into_listing()?;
        let catalog = Catalog::from_records(listing.metadata, listing.records, &mut self.pricer);

        info!(
            event_name = "catalog.load.settled",
            source = %self.feed.describe(),
            item_count = catalog.len(),
            "bestseller catalog loaded"
        );
        Ok(catalog)
    }
}
