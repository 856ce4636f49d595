//! Session-level entry points for a user interface.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::cache::RateCache;
use crate::config::Config;
use crate::error::Result;
use crate::parser::RateTableParser;
use crate::rate_table::RateTable;
use crate::source::{HttpRateSource, RateSource};

/// Loads the rate table once per session.
///
/// Every caller of [`current_table`](Self::current_table) awaits the same
/// load. A failed load is not remembered, so the next call tries again.
pub struct RateService<S> {
    cache: RateCache<S>,
    table: OnceCell<Arc<RateTable>>,
}

impl RateService<HttpRateSource> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = HttpRateSource::new(config.rates_url.clone(), config.fetch_timeout)?;
        let cache = RateCache::new(
            source,
            RateTableParser::new(config.cutoff_hour),
            config.cache_path(),
        )
        .with_stale_after(config.stale_after());

        Ok(Self::new(cache))
    }
}

impl<S: RateSource> RateService<S> {
    pub fn new(cache: RateCache<S>) -> Self {
        Self {
            cache,
            table: OnceCell::new(),
        }
    }

    pub fn cache(&self) -> &RateCache<S> {
        &self.cache
    }

    pub async fn current_table(&self) -> Result<Arc<RateTable>> {
        let table = self
            .table
            .get_or_try_init(|| async { self.cache.current_table().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(table))
    }
}

/// Codes to offer for selection, in document order.
pub fn list_currency_codes(table: &RateTable) -> Vec<String> {
    table.codes().map(str::to_string).collect()
}
