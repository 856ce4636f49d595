//! The on-disk rate document and its freshness rule.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, TimeDelta};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::document::{RateDocument, cache_dir};
use crate::error::{Error, Result};
use crate::parser::RateTableParser;
use crate::rate_table::RateTable;
use crate::source::RateSource;

pub const CACHE_FILENAME: &str = "eurofxref-daily.xml";
pub const DEFAULT_STALE_AFTER_HOURS: i64 = 24;

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Fresh => f.write_str("fresh"),
            Freshness::Stale => f.write_str("stale"),
        }
    }
}

/// Stale once strictly more than `threshold` has passed since `published_at`.
pub fn is_stale(published_at: NaiveDateTime, now: NaiveDateTime, threshold: TimeDelta) -> bool {
    now.signed_duration_since(published_at) > threshold
}

/// Owns the cached document and refreshes it from a [`RateSource`] when stale.
///
/// Loads and refreshes are serialized, so concurrent callers never fetch or
/// write the cache file at the same time.
pub struct RateCache<S> {
    source: S,
    parser: RateTableParser,
    path: PathBuf,
    stale_after: TimeDelta,
    clock: Clock,
    lock: Mutex<()>,
}

impl<S: RateSource> RateCache<S> {
    pub fn new(source: S, parser: RateTableParser, path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            parser,
            path: path.into(),
            stale_after: TimeDelta::hours(DEFAULT_STALE_AFTER_HOURS),
            clock: Box::new(|| Local::now().naive_local()),
            lock: Mutex::new(()),
        }
    }

    pub fn with_stale_after(mut self, stale_after: TimeDelta) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parser(&self) -> &RateTableParser {
        &self.parser
    }

    pub fn freshness(&self, published_at: NaiveDateTime) -> Freshness {
        if is_stale(published_at, (self.clock)(), self.stale_after) {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }

    /// Returns the cached document, fetching it first if it is missing or stale.
    ///
    /// A cached document without a readable publication date is an error; it
    /// is not refetched here.
    pub async fn get_current(&self) -> Result<RateDocument> {
        let _guard = self.lock.lock().await;

        let Some(document) = RateDocument::read(&self.path).await? else {
            info!("No cached rates at {}", self.path.display());
            return self.fetch().await;
        };

        let published_at = self.parser.published_at(&document)?;
        match self.freshness(published_at) {
            Freshness::Fresh => {
                debug!("Cached rates published at {} are fresh", published_at);
                Ok(document)
            }
            Freshness::Stale => {
                let elapsed = (self.clock)().signed_duration_since(published_at);
                info!(
                    "Cached rates published at {} are {}h old, refreshing",
                    published_at,
                    elapsed.num_hours()
                );
                self.fetch().await
            }
        }
    }

    /// Parsed form of [`get_current`](Self::get_current).
    pub async fn current_table(&self) -> Result<RateTable> {
        let document = self.get_current().await?;
        let table = self.parser.parse(&document)?;
        debug!("Loaded {} rates published at {}", table.len(), table.published_at());
        Ok(table)
    }

    /// Fetches unconditionally, replacing whatever is cached.
    pub async fn refresh(&self) -> Result<RateDocument> {
        let _guard = self.lock.lock().await;
        self.fetch().await
    }

    /// Publication moment of the cached document without touching the network.
    pub async fn cached_published_at(&self) -> Result<Option<NaiveDateTime>> {
        let _guard = self.lock.lock().await;
        match RateDocument::read(&self.path).await? {
            Some(document) => Ok(Some(self.parser.published_at(&document)?)),
            None => Ok(None),
        }
    }

    async fn fetch(&self) -> Result<RateDocument> {
        let dir = cache_dir(&self.path);
        tokio::fs::create_dir_all(&dir).await.map_err(Error::io(&dir))?;

        self.source.fetch(&self.path, &self.parser).await?;

        let document = RateDocument::read(&self.path).await?.ok_or_else(|| Error::Io {
            path: self.path.clone(),
            source: std::io::ErrorKind::NotFound.into(),
        })?;

        let published_at = self.parser.published_at(&document)?;
        if self.freshness(published_at) == Freshness::Stale {
            warn!(
                "Provider has nothing newer than {}, keeping it until the next start",
                published_at
            );
        }

        Ok(document)
    }
}
