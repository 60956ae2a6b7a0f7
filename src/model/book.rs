use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A catalog record as returned by the book API. Immutable once received.
#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub uploaded: DateTime<Utc>,
    pub cover: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Book {
    /// Date portion of the upload timestamp, as shown in the table
    pub fn uploaded_date(&self) -> String {
        self.uploaded.format("%Y-%m-%d").to_string()
    }
}

/// A short review attributed to an author and company, nested under a Book
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub text: String,
    pub author: String,
    pub company: String,
}

/// Catalog region the generator localizes books for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    En,
    Fr,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::En => "en",
            Region::Fr => "fr",
        }
    }

    /// Cycle to the other region
    pub fn toggled(&self) -> Self {
        match self {
            Region::En => Region::Fr,
            Region::Fr => Region::En,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::En => "English",
            Region::Fr => "French",
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::En
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Region::En),
            "fr" => Ok(Region::Fr),
            other => Err(format!("Unknown region '{}': expected 'en' or 'fr'", other)),
        }
    }
}
