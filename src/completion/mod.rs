//! URL completion: input classification and history suggestions.

pub mod components;
pub mod controller;
pub mod history_provider;
pub mod input;
pub mod prefix;
pub mod provider;
pub mod scheme;

pub use controller::{FaviconResolver, OmniboxController};
pub use history_provider::HistoryUrlProvider;
pub use input::{ClassifiedInput, InputOptions, InputType};
pub use provider::{AutocompleteMatch, AutocompleteProvider, HistoryMatch};
pub use scheme::{KnownSchemeClassifier, SchemeClassifier};
