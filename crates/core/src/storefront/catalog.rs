use std::ops::RangeInclusive;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::book::{BookId, BookRecord, CatalogItem, ListMetadata};

pub const DEFAULT_PRICE_RANGE: RangeInclusive<u32> = 20..=119;

/// Assigns the shelf price of a freshly loaded book.
pub trait PriceAssigner {
    fn assign(&mut self, record: &BookRecord) -> Decimal;
}

/// Draws a whole-unit price uniformly from an inclusive range.
pub struct RandomPriceAssigner<R = StdRng> {
    range: RangeInclusive<u32>,
    rng: R,
}

impl RandomPriceAssigner {
    pub fn new(range: RangeInclusive<u32>) -> Self {
        Self { range, rng: StdRng::from_entropy() }
    }
}

impl Default for RandomPriceAssigner {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_RANGE)
    }
}

impl<R: Rng> RandomPriceAssigner<R> {
    pub fn with_rng(range: RangeInclusive<u32>, rng: R) -> Self {
        Self { range, rng }
    }
}

impl<R: Rng> PriceAssigner for RandomPriceAssigner<R> {
    fn assign(&mut self, _record: &BookRecord) -> Decimal {
        Decimal::from(self.rng.gen_range(self.range.clone()))
    }
}

/// Same price for every book.
#[derive(Clone, Debug)]
pub struct FixedPriceAssigner(pub Decimal);

impl PriceAssigner for FixedPriceAssigner {
    fn assign(&mut self, _record: &BookRecord) -> Decimal {
        self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub metadata: ListMetadata,
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(metadata: ListMetadata, items: Vec<CatalogItem>) -> Self {
        Self { metadata, items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Prices every record once, in feed order. Duplicate ids are kept.
    pub fn from_records<P>(metadata: ListMetadata, records: Vec<BookRecord>, pricer: &mut P) -> Self
    where
        P: PriceAssigner + ?Sized,
    {
        let items = records
            .into_iter()
            .map(|record| {
                let price = pricer.assign(&record);
                CatalogItem::from_record(record, price)
            })
            .collect();

        Self { metadata, items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Zero-based position lookup.
    pub fn get(&self, position: usize) -> Option<&CatalogItem> {
        self.items.get(position)
    }

    /// Resolves an id to the last matching entry.
    pub fn find(&self, id: &BookId) -> Option<&CatalogItem> {
        self.items.iter().rev().find(|item| &item.id == id)
    }
}
