use crate::history::HistoryError;

/// Error type for everything outside a single ranking pass
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("History error: {0}")]
    History(#[from] HistoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings: {0}")]
    SettingsParse(#[from] toml::de::Error),
    #[error("Could not write settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("No data directory available")]
    NoDataDir,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
