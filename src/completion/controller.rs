//! Entry point the address bar talks to on every keystroke.

use super::history_provider::HistoryUrlProvider;
use super::input::{ClassifiedInput, InputOptions};
use super::provider::{AutocompleteMatch, AutocompleteProvider};
use super::scheme::{KnownSchemeClassifier, SchemeClassifier};
use crate::config::Settings;
use crate::history::HistoryStore;

/// Looks up favicon bytes for a page. Supplied by the embedding browser.
pub trait FaviconResolver: Send + Sync {
    fn resolve(&self, url: &str) -> Option<Vec<u8>>;
}

/// Classifies address bar text and collects matches from every provider.
pub struct OmniboxController {
    providers: Vec<Box<dyn AutocompleteProvider>>,
    schemes: Box<dyn SchemeClassifier + Send>,
    favicons: Option<Box<dyn FaviconResolver>>,
}

impl OmniboxController {
    /// A controller with no providers yet.
    pub fn new(schemes: impl SchemeClassifier + Send + 'static) -> Self {
        Self {
            providers: Vec::new(),
            schemes: Box::new(schemes),
            favicons: None,
        }
    }

    /// History completion over `store`, configured from `settings`.
    pub fn from_settings<S>(store: S, settings: &Settings) -> Self
    where
        S: HistoryStore + Send + 'static,
    {
        let schemes = KnownSchemeClassifier::new(&settings.known_schemes);
        let history = HistoryUrlProvider::with_max_matches(store, settings.max_matches_per_provider);

        Self::new(schemes).with_provider(history)
    }

    pub fn with_provider(mut self, provider: impl AutocompleteProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn with_favicon_resolver(mut self, resolver: impl FaviconResolver + 'static) -> Self {
        self.favicons = Some(Box::new(resolver));
        self
    }

    pub fn classify(&self, text: &str, cursor_position: Option<usize>, options: InputOptions) -> ClassifiedInput {
        let options = InputOptions {
            cursor_position,
            ..options
        };
        ClassifiedInput::new(text, options, self.schemes.as_ref())
    }

    /// Matches from every provider, in provider order.
    pub fn rank(&self, input: &ClassifiedInput) -> Vec<AutocompleteMatch> {
        if input.text.trim().is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<AutocompleteMatch> = self
            .providers
            .iter()
            .flat_map(|provider| provider.start(input))
            .collect();

        if let Some(favicons) = &self.favicons {
            for m in &mut matches {
                m.favicon = favicons.resolve(&m.destination_url);
            }
        }

        log::debug!("{} matches for {:?}", matches.len(), input.text);
        matches
    }

    /// Handle an edit in the address bar. Deleting a character must not
    /// immediately re-complete what was just deleted.
    pub fn on_input_changed(
        &self,
        text: &str,
        cursor_position: Option<usize>,
        just_removed: bool,
    ) -> (ClassifiedInput, Vec<AutocompleteMatch>) {
        let options = InputOptions {
            prevent_inline_autocomplete: just_removed,
            ..InputOptions::default()
        };
        let input = self.classify(text, cursor_position, options);
        let matches = self.rank(&input);
        (input, matches)
    }
}
