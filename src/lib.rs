//! Euro foreign exchange reference rates from the ECB daily feed.
//!
//! The feed is cached on disk and refetched once it is more than a day past
//! its publication moment (the document's date at the 15:00 cutoff). Rates are
//! quoted against EUR; conversions between two quoted currencies go through it.

pub mod cache;
pub mod config;
pub mod conversion;
mod cube;
pub mod document;
pub mod error;
pub mod parser;
pub mod rate_table;
pub mod service;
pub mod source;

pub use cache::{Freshness, RateCache, is_stale};
pub use config::Config;
pub use conversion::{convert, convert_input, parse_amount};
pub use document::RateDocument;
pub use error::{Error, ParseError, Result};
pub use parser::RateTableParser;
pub use rate_table::RateTable;
pub use service::RateService;
pub use source::{HttpRateSource, RateSource};
