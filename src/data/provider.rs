use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Book, Region};

/// Parameters of one page request against the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookQuery {
    pub seed: u64,
    /// 1-based page number
    pub page: u64,
    pub region: Region,
    /// Requested minimum review count per book
    pub reviews: u64,
}

/// Trait for book page sources (HTTP today, fakes in tests)
#[async_trait]
pub trait BookSource: Send + Sync {
    /// Fetch one page of books for the given query
    async fn fetch_page(&self, query: &BookQuery) -> Result<Vec<Book>>;
}
