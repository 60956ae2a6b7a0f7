use async_trait::async_trait;
use std::time::Duration;

use super::provider::{BookQuery, BookSource};
use crate::error::{BookdeckError, Result};
use crate::globals;
use crate::model::Book;

/// HTTP book source backed by the remote catalog API
#[derive(Debug, Clone)]
pub struct HttpBookSource {
    endpoint: String,
    timeout: Duration,
}

impl HttpBookSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn books_url(&self) -> String {
        format!("{}/api/books", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl BookSource for HttpBookSource {
    async fn fetch_page(&self, query: &BookQuery) -> Result<Vec<Book>> {
        let client = globals::http_client();

        let response = client
            .get(self.books_url())
            .timeout(self.timeout)
            .query(&[
                ("seed", query.seed.to_string()),
                ("page", query.page.to_string()),
                ("region", query.region.to_string()),
                ("reviews", query.reviews.to_string()),
            ])
            .send()
            .await
            .map_err(|e| BookdeckError::BookSource(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BookdeckError::BookSource(format!(
                "HTTP request failed with status: {}",
                response.status()
            )));
        }

        let text = response.text().await.map_err(|e| {
            BookdeckError::BookSource(format!("Failed to read response body: {}", e))
        })?;

        serde_json::from_str(&text).map_err(|e| {
            BookdeckError::BookSource(format!("Failed to parse response as JSON: {}", e))
        })
    }
}
