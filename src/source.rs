//! Where fresh rate documents come from.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use crate::document::RateDocument;
use crate::error::{Error, Result};
use crate::parser::RateTableParser;

pub const ECB_DAILY_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";

/// Fetches the latest rate document and stores it at `dest`.
///
/// Implementations must leave `dest` untouched when they fail, including when
/// the fetched body has no publication date `parser` can read.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, dest: &Path, parser: &RateTableParser) -> Result<RateDocument>;
}

/// Downloads the feed over HTTP and persists the body verbatim.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if let Err(err) = reqwest::Url::parse(&url) {
            return Err(Error::Config(format!("rates URL {url:?} is invalid: {err}")));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(client_error)?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn load_xml(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| self.request_error(err))?;
        if !resp.status().is_success() {
            return Err(Error::HttpStatus {
                url: self.url.clone(),
                status: resp.status(),
            });
        }

        resp.text().await.map_err(|err| self.request_error(err))
    }

    fn request_error(&self, source: reqwest::Error) -> Error {
        if source.is_timeout() {
            Error::Timeout {
                url: self.url.clone(),
            }
        } else {
            Error::Network {
                url: self.url.clone(),
                source,
            }
        }
    }
}

fn client_error(source: reqwest::Error) -> Error {
    Error::Config(format!("can't build HTTP client: {source}"))
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self, dest: &Path, parser: &RateTableParser) -> Result<RateDocument> {
        info!("Downloading rates from {}", self.url);
        let document = RateDocument::new(self.load_xml().await?);

        document.replace(dest, parser).await?;
        debug!("Stored {} bytes at {}", document.as_str().len(), dest.display());

        Ok(document)
    }
}
