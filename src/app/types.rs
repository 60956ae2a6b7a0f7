use std::time::Instant;
use tui_input::Input;

use crate::config::FilterDefaults;
use crate::data::BookQuery;
use crate::error::Result;
use crate::model::{Book, Region};

/// Client-side filter state; any seed/region/review change starts a new epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Filters {
    pub seed: u64,
    pub region: Region,
    pub review_count: u64,
    /// 1-based page within the current epoch
    pub page: u64,
}

impl Filters {
    pub fn from_defaults(defaults: &FilterDefaults) -> Self {
        Self {
            seed: defaults.seed,
            region: defaults.region,
            review_count: defaults.reviews,
            page: 1,
        }
    }

    pub fn query(&self) -> BookQuery {
        BookQuery {
            seed: self.seed,
            page: self.page,
            region: self.region,
            reviews: self.review_count,
        }
    }
}

/// Which filter field the line editor is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterField {
    Seed,
    Reviews,
}

impl FilterField {
    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Seed => "Seed",
            FilterField::Reviews => "Reviews",
        }
    }
}

/// Line editor bound to a numeric filter field
#[derive(Debug, Clone)]
pub(crate) struct FilterEditor {
    pub field: FilterField,
    pub input: Input,
}

#[derive(Clone, Copy, PartialEq)]
pub(crate) enum StatusKind {
    Success,
    Error,
}

/// Transient status line message, auto-dismissed after a few seconds
#[derive(Clone)]
pub(crate) struct StatusMessage {
    pub message: String,
    pub kind: StatusKind,
    pub timestamp: Instant,
}

/// Result of one background fetch, tagged with the generation it was issued under
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    pub generation: u64,
    pub page: u64,
    pub result: Result<Vec<Book>>,
}
