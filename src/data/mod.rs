pub mod http;
pub mod provider;

pub use http::HttpBookSource;
pub use provider::{BookQuery, BookSource};
