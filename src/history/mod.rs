//! Browsing history as seen by the autocomplete engine.

mod database;

pub use database::HistoryDatabase;

use crate::time::ChromeTime;
use serde::Serialize;
use std::sync::Arc;

/// Error type for history lookups
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("History connection lock poisoned")]
    Poisoned,
    #[error("History backend unavailable: {0}")]
    Unavailable(String),
}

/// A single URL row from the history store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub typed_count: i64,
    pub visit_count: i64,
    pub last_visit_time: ChromeTime,
    pub hidden: bool,
}

impl HistoryRow {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: 0,
            url: url.into(),
            title: String::new(),
            typed_count: 0,
            visit_count: 0,
            last_visit_time: ChromeTime::default(),
            hidden: false,
        }
    }
}

/// Read-only lookups the autocomplete engine issues against history.
///
/// Lookups may run concurrently from several threads during one pass,
/// so implementations must be `Sync`. A missing row is `Ok(None)`, never
/// an error.
pub trait HistoryStore: Sync {
    /// Visible rows whose URL lies in `[prefix, prefix + U+00FF)`, ordered by
    /// typed count, visit count and last visit time, all descending.
    fn autocomplete_for_prefix(
        &self,
        prefix: &str,
        max_results: usize,
        typed_only: bool,
    ) -> Result<Vec<HistoryRow>, HistoryError>;

    /// The lexicographically smallest visible row that is a prefix of `url`,
    /// sorts after `base` (or equal to it when `allow_base`), and meets both
    /// count thresholds.
    fn find_shortest_url_from_base(
        &self,
        base: &str,
        url: &str,
        min_visits: i64,
        min_typed: i64,
        allow_base: bool,
    ) -> Result<Option<HistoryRow>, HistoryError>;

    /// Exact lookup, hidden rows included.
    fn row_for_url(&self, url: &str) -> Result<Option<HistoryRow>, HistoryError>;
}

impl<T: HistoryStore + ?Sized> HistoryStore for &T {
    fn autocomplete_for_prefix(
        &self,
        prefix: &str,
        max_results: usize,
        typed_only: bool,
    ) -> Result<Vec<HistoryRow>, HistoryError> {
        (**self).autocomplete_for_prefix(prefix, max_results, typed_only)
    }

    fn find_shortest_url_from_base(
        &self,
        base: &str,
        url: &str,
        min_visits: i64,
        min_typed: i64,
        allow_base: bool,
    ) -> Result<Option<HistoryRow>, HistoryError> {
        (**self).find_shortest_url_from_base(base, url, min_visits, min_typed, allow_base)
    }

    fn row_for_url(&self, url: &str) -> Result<Option<HistoryRow>, HistoryError> {
        (**self).row_for_url(url)
    }
}

impl<T: HistoryStore + Send + ?Sized> HistoryStore for Arc<T> {
    fn autocomplete_for_prefix(
        &self,
        prefix: &str,
        max_results: usize,
        typed_only: bool,
    ) -> Result<Vec<HistoryRow>, HistoryError> {
        (**self).autocomplete_for_prefix(prefix, max_results, typed_only)
    }

    fn find_shortest_url_from_base(
        &self,
        base: &str,
        url: &str,
        min_visits: i64,
        min_typed: i64,
        allow_base: bool,
    ) -> Result<Option<HistoryRow>, HistoryError> {
        (**self).find_shortest_url_from_base(base, url, min_visits, min_typed, allow_base)
    }

    fn row_for_url(&self, url: &str) -> Result<Option<HistoryRow>, HistoryError> {
        (**self).row_for_url(url)
    }
}
