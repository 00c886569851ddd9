//! URL bar navigation.

pub mod parser;

pub use parser::{build_search_url, destination_for, parse_input, UrlBarInput};
