use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application name
pub const APP_NAME: &str = "qayeq-omnibox";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default search engine URL template
/// Use {} as placeholder for the search query
pub const DEFAULT_SEARCH_URL: &str = "https://duckduckgo.com/?q={}";

/// History database filename
pub const HISTORY_DB: &str = "history.db";

/// Settings filename, looked up in the data directory
pub const SETTINGS_FILE: &str = "settings.toml";

// ============================================================================
// Search Engines
// ============================================================================

/// Available search engines: (id, display_name, url_template)
pub const SEARCH_ENGINES: &[(&str, &str, &str)] = &[
    ("duckduckgo", "DuckDuckGo", "https://duckduckgo.com/?q={}"),
    ("google", "Google", "https://www.google.com/search?q={}"),
    ("bing", "Bing", "https://www.bing.com/search?q={}"),
    ("yahoo", "Yahoo!", "https://search.yahoo.com/search?p={}"),
    ("ecosia", "Ecosia", "https://www.ecosia.org/search?q={}"),
    ("custom", "Custom", ""),
];

// ============================================================================
// URL Completion
// ============================================================================

/// Maximum history results a single provider pass returns
pub const MAX_MATCHES_PER_PROVIDER: usize = 3;

/// Rows with at least this many typed visits are never culled
pub const LOW_QUALITY_MATCH_TYPED_LIMIT: i64 = 1;

/// Rows with at least this many visits are never culled
pub const LOW_QUALITY_MATCH_VISIT_LIMIT: i64 = 4;

/// Rows visited within this many days are never culled
pub const LOW_QUALITY_MATCH_AGE_LIMIT_DAYS: i64 = 3;

/// Relevance of the history match promoted to the front of the list
pub const FRONT_HISTORY_RELEVANCE: i32 = 1000;

/// Relevance of the first non-promoted history match
pub const FIRST_HISTORY_RELEVANCE: i32 = 999;

/// Relevance of the what-you-typed match whenever it is emitted
pub const WHAT_YOU_TYPED_RELEVANCE: i32 = 1000;

/// Schemes the default classifier recognises as navigable
pub const DEFAULT_KNOWN_SCHEMES: &[&str] = &[
    "about", "blob", "data", "filesystem", "ftp", "mailto", "view-source", "ws", "wss",
];

/// Common top-level domains for URL detection
pub const COMMON_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "io", "co", "uk", "de", "fr", "jp", "cn",
    "ru", "br", "in", "it", "nl", "au", "es", "pl", "se", "no", "fi", "dk", "be",
    "at", "ch", "cz", "hu", "pt", "gr", "ro", "sk", "bg", "hr", "si", "rs", "ua",
    "me", "dev", "app", "ai", "cloud", "tech", "online", "site", "info", "biz",
];

/// User-tunable settings, persisted as TOML next to the history database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cap on history matches per pass (one extra for an exact hit)
    pub max_matches_per_provider: usize,
    /// Search engine id from [`SEARCH_ENGINES`]
    pub search_engine: String,
    /// URL template used when `search_engine` is "custom"
    pub custom_search_url: Option<String>,
    /// Schemes classified as URL input without further heuristics
    pub known_schemes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_matches_per_provider: MAX_MATCHES_PER_PROVIDER,
            search_engine: SEARCH_ENGINES[0].0.to_string(),
            custom_search_url: None,
            known_schemes: DEFAULT_KNOWN_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Load settings from a data directory. A missing file yields defaults.
    pub fn load(data_dir: &Path) -> crate::Result<Self> {
        let path = data_dir.join(SETTINGS_FILE);

        if !path.exists() {
            log::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let settings = toml::from_str(&contents)?;
        log::info!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a data directory
    pub fn save(&self, data_dir: &Path) -> crate::Result<()> {
        let path = data_dir.join(SETTINGS_FILE);
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        log::debug!("Settings saved to {:?}", path);
        Ok(())
    }

    /// The search URL template for the configured engine.
    /// Unknown ids and an empty custom template fall back to the default.
    pub fn search_url_template(&self) -> &str {
        if self.search_engine == "custom" {
            return match self.custom_search_url.as_deref() {
                Some(template) if template.contains("{}") => template,
                _ => DEFAULT_SEARCH_URL,
            };
        }

        SEARCH_ENGINES
            .iter()
            .find(|(id, _, _)| *id == self.search_engine)
            .map(|(_, _, template)| *template)
            .filter(|template| !template.is_empty())
            .unwrap_or(DEFAULT_SEARCH_URL)
    }
}

/// Directory holding the history database and settings
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "myyc", APP_NAME).map(|dirs| dirs.data_dir().to_path_buf())
}
