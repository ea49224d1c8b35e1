use bookworm_core::domain::book::{BookRecord, ListMetadata};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::FeedError;

/// Envelope of a `lists/current/{list}.json` response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub num_results: Option<u32>,
    #[serde(default)]
    pub results: Option<ListResults>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ListResults {
    #[serde(default)]
    pub list_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub books: Option<Vec<WireBook>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct WireBook {
    #[serde(default)]
    pub primary_isbn10: Option<String>,
    #[serde(default)]
    pub primary_isbn13: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub book_image: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
}

/// Book records plus list metadata, ready to be priced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedListing {
    pub metadata: ListMetadata,
    pub records: Vec<BookRecord>,
}

pub fn decode(body: &str) -> Result<FeedResponse, FeedError> {
    serde_json::from_str(body).map_err(|error| FeedError::Decode(error.to_string()))
}

impl FeedResponse {
    /// Fails when `results` or `results.books` is absent.
    pub fn into_listing(self) -> Result<FeedListing, FeedError> {
        let results = self.results.ok_or(FeedError::MissingField("results"))?;
        let books = results.books.ok_or(FeedError::MissingField("results.books"))?;

        let metadata = ListMetadata {
            list_name: results.list_name,
            display_name: results.display_name,
            published_date: results
                .published_date
                .as_deref()
                .and_then(|raw| raw.parse::<NaiveDate>().ok()),
        };

        Ok(FeedListing { metadata, records: books.into_iter().map(BookRecord::from).collect() })
    }
}

impl From<WireBook> for BookRecord {
    fn from(book: WireBook) -> Self {
        Self {
            id: book.primary_isbn10.unwrap_or_default(),
            isbn13: non_empty(book.primary_isbn13),
            title: book.title.unwrap_or_default(),
            author: non_empty(book.author),
            image_url: non_empty(book.book_image),
            publisher: non_empty(book.publisher),
            description: non_empty(book.description),
            rank: book.rank,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
