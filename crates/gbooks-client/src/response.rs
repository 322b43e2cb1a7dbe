//! Google Books volumes response parsing
//!
//! API docs: https://developers.google.com/books/docs/v1/reference/volumes

use bookstack_domain::{CanonicalBook, ItemId};
use serde::Deserialize;

use crate::SearchError;

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    id: String,
    #[serde(rename = "volumeInfo")]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    categories: Option<Vec<String>>,
    #[serde(rename = "pageCount")]
    page_count: Option<u32>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

/// One search hit, flattened from the volume payload.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeStub {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub categories: Vec<String>,
    pub page_count: u32,
    pub cover_url: Option<String>,
    pub description: Option<String>,
}

impl VolumeStub {
    /// Convert into the canonical record written to the shared catalog.
    pub fn into_canonical(self) -> CanonicalBook {
        let mut book = CanonicalBook::new(ItemId::new(self.id), self.title)
            .with_authors(self.authors)
            .with_page_count(self.page_count)
            .with_categories(self.categories);
        book.cover_url = self.cover_url;
        book.description = self.description;
        book.publisher = self.publisher;
        book.published_date = self.published_date;
        book
    }
}

/// Parse a volumes search response body.
///
/// A response without `items` is an empty result set, not an error.
pub fn parse_search_response(json: &str) -> Result<Vec<VolumeStub>, SearchError> {
    let response: VolumesResponse =
        serde_json::from_str(json).map_err(|e| SearchError::Parse {
            message: format!("Invalid volumes JSON: {e}"),
        })?;

    Ok(response
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|volume| {
            let info = volume.volume_info.unwrap_or_default();
            VolumeStub {
                id: volume.id,
                title: info.title.unwrap_or_default(),
                authors: info.authors.unwrap_or_default(),
                publisher: info.publisher,
                published_date: info.published_date,
                categories: info.categories.unwrap_or_default(),
                page_count: info.page_count.unwrap_or(0),
                cover_url: info.image_links.and_then(|links| links.thumbnail),
                description: info.description,
            }
        })
        .collect())
}
