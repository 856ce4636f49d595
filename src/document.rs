use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, ParseError, Result};
use crate::parser::RateTableParser;

/// Raw body of the daily rates feed, exactly as served and cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDocument {
    body: String,
}

impl RateDocument {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Reads the cached document, `None` if the cache slot is empty.
    ///
    /// A file that is not UTF-8 is malformed content, not an I/O failure.
    pub async fn read(path: &Path) -> Result<Option<Self>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Error::io(path)(err)),
        };
        let body = String::from_utf8(bytes).map_err(ParseError::Encoding)?;

        Ok(Some(Self { body }))
    }

    /// Writes this document over `path` only if it carries a publication date.
    ///
    /// Anything else (an error page, a captive portal) is rejected and the
    /// previous file stays in place.
    pub async fn replace(&self, path: &Path, parser: &RateTableParser) -> Result<()> {
        parser.published_at(self)?;
        self.write_atomic(path).await
    }

    /// Replaces the file at `path` with this document.
    ///
    /// The body goes to a temporary file in the same directory which is then
    /// renamed over the target, so readers see either the old or the new file.
    pub async fn write_atomic(&self, path: &Path) -> Result<()> {
        let path = path.to_path_buf();
        let body = self.body.clone();

        let joined = tokio::task::spawn_blocking({
            let path = path.clone();
            move || persist(&path, body.as_bytes())
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) => Err(Error::Io {
                path,
                source: std::io::Error::other(err),
            }),
        }
    }
}

fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = cache_dir(path);
    std::fs::create_dir_all(&dir).map_err(Error::io(&dir))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(Error::io(&dir))?;
    tmp.write_all(bytes).map_err(Error::io(tmp.path()))?;
    tmp.as_file().sync_all().map_err(Error::io(tmp.path()))?;
    tmp.persist(path).map_err(|err| Error::Io {
        path: path.to_path_buf(),
        source: err.error,
    })?;

    Ok(())
}

pub(crate) fn cache_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let read = RateDocument::read(&dir.path().join("eurofxref-daily.xml"))
            .await
            .unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("eurofxref-daily.xml");

        RateDocument::new("first").write_atomic(&path).await.unwrap();
        RateDocument::new("second").write_atomic(&path).await.unwrap();

        let read = RateDocument::read(&path).await.unwrap().unwrap();
        assert_eq!(read.as_str(), "second");

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn non_utf8_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eurofxref-daily.xml");
        let mut bytes = include_bytes!("../tests/fixtures/eurofxref-daily.xml").to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        std::fs::write(&path, bytes).unwrap();

        let err = RateDocument::read(&path).await.unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::Encoding(_))), "got {err}");
    }

    #[tokio::test]
    async fn replace_rejects_undated_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eurofxref-daily.xml");
        std::fs::write(&path, "previous").unwrap();

        let err = RateDocument::new("<html>captive portal</html>")
            .replace(&path, &RateTableParser::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Parse(_)), "got {err}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }

    #[tokio::test]
    async fn replace_writes_dated_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eurofxref-daily.xml");
        let daily = include_str!("../tests/fixtures/eurofxref-daily.xml");

        RateDocument::new(daily)
            .replace(&path, &RateTableParser::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), daily);
    }

    #[test]
    fn bare_file_name_lives_in_current_dir() {
        assert_eq!(cache_dir(Path::new("rates.xml")), PathBuf::from("."));
        assert_eq!(cache_dir(Path::new("cache/rates.xml")), PathBuf::from("cache"));
    }
}
