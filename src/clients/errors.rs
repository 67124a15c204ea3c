use rspotify::{ClientError, model::idtypes::IdError};
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    #[error("Invalid playlist id: {0}")]
    InvalidPlaylistId(#[from] IdError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // headless_chrome reports failures as `anyhow::Error`, kept as text
    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Failed to scrape {url}: {reason}")]
    ScrapeError { url: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}
