//! Google Books volumes API client
//!
//! Thin search collaborator for the bookstack suite: one request per
//! user-initiated search, a single error signal on failure, no automatic
//! retries. Response parsing is split from fetching so it stays testable
//! without a network.

pub mod response;

pub use response::{parse_search_response, VolumeStub};

use std::time::Duration;

use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("Unexpected status {status}")]
    Status { status: u16 },
    #[error("Parse error: {message}")]
    Parse { message: String },
}

/// HTTP client for the Google Books volumes endpoint.
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl GoogleBooksClient {
    pub fn new(user_agent: &str) -> Self {
        Self::with_base_url(user_agent, DEFAULT_BASE_URL)
    }

    /// Client against a non-default endpoint (local stubs in tests).
    pub fn with_base_url(user_agent: &str, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Search volumes by free-text term.
    pub async fn search(&self, term: &str) -> Result<Vec<VolumeStub>, SearchError> {
        let endpoint = format!("{}/volumes", self.base_url);
        let url = reqwest::Url::parse_with_params(&endpoint, &[("q", term)]).map_err(|_| {
            SearchError::InvalidUrl {
                url: endpoint.clone(),
            }
        })?;

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(SearchError::Status { status });
        }

        let body = response.text().await.map_err(|e| SearchError::Parse {
            message: e.to_string(),
        })?;
        parse_search_response(&body)
    }
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new("bookstack/1.0")
    }
}
