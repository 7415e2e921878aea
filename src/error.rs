//! Error types shared by the extractors and the fetch layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed or returned an error status
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream address could not be built
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Reading a local source file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Interactive prompt failed
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// The input holds text but no markup at all
    #[error("Input is not an HTML document")]
    NotMarkup,

    /// The page was fetched but holds no schedule table
    #[error("No timetable found at {url}")]
    NoTimetable { url: String },

    /// Navigation ended on an entry without schedule selectors
    #[error("\"{label}\" has no schedule attached")]
    NoLeafSelected { label: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
