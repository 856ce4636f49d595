//! Error types for fetching, caching, parsing and converting rates.

use std::path::PathBuf;

use thiserror::Error;

/// Why a rate document could not be turned into a [`RateTable`](crate::RateTable).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is not valid XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("document is not UTF-8: {0}")]
    Encoding(#[source] std::string::FromUtf8Error),

    #[error("no Cube element carries a time attribute")]
    MissingTime,

    #[error("invalid publication date {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A rate entry lacks `currency` or `rate`. `index` is zero-based in document order.
    #[error("rate entry #{index} has no {attribute} attribute")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    #[error("invalid currency code {0:?}")]
    InvalidCurrency(String),

    #[error("invalid rate {value:?} for {currency}")]
    InvalidRate { currency: String, value: String },

    #[error("currency {0} appears more than once")]
    DuplicateCurrency(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("malformed rate document: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// True for every failure of the remote fetch itself.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network { .. } | Error::HttpStatus { .. } | Error::Timeout { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
