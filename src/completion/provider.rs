//! Completion match types and the provider interface.

use super::input::ClassifiedInput;
use crate::history::HistoryRow;
use serde::Serialize;

/// A single suggestion shown in the address bar dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutocompleteMatch {
    /// URL to load when the match is selected. Canonical, so matches can be
    /// compared by string to avoid dupes.
    pub destination_url: String,
    /// Text loaded into the address bar when the match is arrowed to.
    pub fill_into_edit: String,
    /// Main text displayed in the dropdown.
    pub contents: String,
    /// Helper text such as the page title.
    pub description: String,
    /// Rank signal only; higher sorts first.
    pub relevance: i32,
    /// How often the destination was typed in.
    pub typed_count: i64,
    /// Whether the user may delete this match from history.
    pub deletable: bool,
    pub allowed_to_be_default_match: bool,
    /// Suffix shown selected after the cursor.
    pub inline_autocompletion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<Vec<u8>>,
}

/// A history row under consideration during one ranking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMatch {
    pub row: HistoryRow,
    /// Byte offset of the typed text within `row.url`.
    pub input_location: usize,
    pub match_in_scheme: bool,
    pub match_in_subdomain: bool,
    /// The match sits behind every scheme/"www." the URL has, e.g. typing
    /// "w" innermost-matches "website.com" but not "www.google.com".
    pub innermost_match: bool,
}

/// A source of matches for classified input.
pub trait AutocompleteProvider: Send + Sync {
    fn start(&self, input: &ClassifiedInput) -> Vec<AutocompleteMatch>;
}
