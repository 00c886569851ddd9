use crate::completion::input::{ClassifiedInput, InputType};
use crate::completion::provider::AutocompleteMatch;
use url::Url;

/// Where Enter in the URL bar should take the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlBarInput {
    /// A valid URL to navigate to
    Url(Url),
    /// A search query to send to the search engine
    Search(String),
}

/// Resolve classified input when no suggestion was picked.
///
/// Only URL input navigates directly; ambiguous input is searched for,
/// since the history matches already offered it as a destination.
pub fn parse_input(input: &ClassifiedInput) -> UrlBarInput {
    match (&input.input_type, &input.canonical_url) {
        (InputType::Url, Some(url)) => UrlBarInput::Url(url.clone()),
        _ => UrlBarInput::Search(input.text.trim().to_string()),
    }
}

/// Build a search URL for `query` from a template with a `{}` placeholder
pub fn build_search_url(query: &str, template: &str) -> Result<Url, url::ParseError> {
    let encoded = urlencoding::encode(query);
    let url_str = template.replace("{}", &encoded);
    Url::parse(&url_str)
}

/// The page to load for `input`, preferring a default match when there is one.
/// Returns `None` for empty input.
pub fn destination_for(
    input: &ClassifiedInput,
    default_match: Option<&AutocompleteMatch>,
    search_template: &str,
) -> crate::Result<Option<Url>> {
    if let Some(m) = default_match.filter(|m| m.allowed_to_be_default_match) {
        return Ok(Some(Url::parse(&m.destination_url)?));
    }

    match parse_input(input) {
        UrlBarInput::Url(url) => Ok(Some(url)),
        UrlBarInput::Search(query) if query.is_empty() => Ok(None),
        UrlBarInput::Search(query) => Ok(Some(build_search_url(&query, search_template)?)),
    }
}
