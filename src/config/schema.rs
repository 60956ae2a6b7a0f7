use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::model::Region;

/// Base URL of the public catalog server, baked in as in the original deployment
pub const DEFAULT_ENDPOINT: &str = "https://book-store-app-server-yp86.onrender.com";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the book API (the `/api/books` path is appended)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout as a humantime string, e.g. "30s"
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Filter values used until the user changes them
    #[serde(default)]
    pub defaults: FilterDefaults,

    /// Directory `books.csv` is written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterDefaults {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub region: Region,
    #[serde(default = "default_reviews")]
    pub reviews: u64,
}

impl Config {
    pub fn timeout_duration(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            defaults: FilterDefaults::default(),
            export_dir: default_export_dir(),
        }
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            region: Region::default(),
            reviews: default_reviews(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> String {
    "30s".to_string()
}

fn default_seed() -> u64 {
    12345
}

fn default_reviews() -> u64 {
    1
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}
