//! Address bar autocomplete for the qayeq browser.

pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod time;
pub mod url_bar;

pub use error::{Error, Result};
