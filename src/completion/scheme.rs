//! Scheme-based input classification hook.

use super::input::InputType;
use std::collections::HashSet;

/// Lets embedders classify input that carries an explicit scheme other than
/// http, https or file.
///
/// Returns [`InputType::Empty`] when the scheme is unknown, in which case the
/// regular heuristics decide.
pub trait SchemeClassifier: Sync {
    fn input_type_for_scheme(&self, scheme: &str) -> InputType;
}

/// Treats a fixed set of schemes as URLs and knows nothing about the rest.
#[derive(Debug, Clone)]
pub struct KnownSchemeClassifier {
    schemes: HashSet<String>,
}

impl KnownSchemeClassifier {
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            schemes: schemes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl Default for KnownSchemeClassifier {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_KNOWN_SCHEMES)
    }
}

impl SchemeClassifier for KnownSchemeClassifier {
    fn input_type_for_scheme(&self, scheme: &str) -> InputType {
        if self.schemes.contains(&scheme.to_ascii_lowercase()) {
            InputType::Url
        } else {
            InputType::Empty
        }
    }
}
