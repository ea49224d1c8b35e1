use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Primary ISBN-10 as reported by the bestseller feed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(pub String);

impl BookId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One book record as delivered by a feed, before pricing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub isbn13: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub rank: Option<u32>,
}

/// A purchasable catalog entry. Immutable once the catalog is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: BookId,
    pub title: String,
    pub image_url: Option<String>,
    pub price: Decimal,
    /// Listing quantity seeded at load time. What the shopper holds lives in the cart.
    pub quantity: u32,
    pub attributes: BookAttributes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAttributes {
    pub isbn13: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub rank: Option<u32>,
}

impl CatalogItem {
    pub fn from_record(record: BookRecord, price: Decimal) -> Self {
        Self {
            id: BookId(record.id),
            title: record.title,
            image_url: record.image_url,
            price,
            quantity: 1,
            attributes: BookAttributes {
                isbn13: record.isbn13,
                author: record.author,
                publisher: record.publisher,
                description: record.description,
                rank: record.rank,
            },
        }
    }
}

/// List-level metadata reported alongside the books.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMetadata {
    pub list_name: Option<String>,
    pub display_name: Option<String>,
    pub published_date: Option<NaiveDate>,
}
