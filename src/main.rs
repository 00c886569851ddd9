use clap::Parser;
use qayeq_omnibox::completion::{AutocompleteMatch, ClassifiedInput, InputOptions, OmniboxController};
use qayeq_omnibox::config::{self, Settings};
use qayeq_omnibox::history::HistoryDatabase;
use qayeq_omnibox::url_bar;
use qayeq_omnibox::Error;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "qayeq-omnibox", version, about = "Classify address bar text and rank history completions.")]
struct Cli {
    /// Directory holding history.db and settings.toml
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Treat the text as if a character was just deleted
    #[arg(long)]
    prevent_inline: bool,

    /// TLD to append to the typed host (ctrl+enter)
    #[arg(long, value_name = "TLD", default_value = "")]
    desired_tld: String,

    /// Record a visit to URL instead of completing
    #[arg(long, value_name = "URL")]
    record: Option<String>,

    /// Count the recorded visit as typed
    #[arg(long, requires = "record")]
    typed: bool,

    /// Title for the recorded visit
    #[arg(long, requires = "record")]
    title: Option<String>,

    /// Address bar text
    #[arg(required_unless_present = "record")]
    text: Option<String>,
}

#[derive(Serialize)]
struct Output<'a> {
    input: &'a ClassifiedInput,
    matches: Vec<AutocompleteMatch>,
    navigate_to: Option<String>,
}

fn run(cli: Cli) -> qayeq_omnibox::Result<()> {
    let data_dir = match cli.db {
        Some(dir) => dir,
        None => config::data_dir().ok_or(Error::NoDataDir)?,
    };
    std::fs::create_dir_all(&data_dir)?;

    let settings = Settings::load(&data_dir)?;
    let history = Arc::new(HistoryDatabase::new(&data_dir)?);

    if let Some(url) = cli.record {
        let url = Url::parse(&url)?;
        history.record_visit(&url, cli.title.as_deref(), cli.typed)?;
        log::info!("Recorded visit to {}", url);
        return Ok(());
    }

    let text = cli.text.unwrap_or_default();
    let controller = OmniboxController::from_settings(Arc::clone(&history), &settings);

    let options = InputOptions {
        desired_tld: cli.desired_tld,
        prevent_inline_autocomplete: cli.prevent_inline,
        ..InputOptions::default()
    };
    let input = controller.classify(&text, Some(text.chars().count()), options);
    let matches = controller.rank(&input);
    let navigate_to =
        url_bar::destination_for(&input, matches.first(), settings.search_url_template())?.map(String::from);

    let output = Output {
        input: &input,
        matches,
        navigate_to,
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize results: {}", e),
    }

    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", config::APP_NAME, config::APP_VERSION);

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
