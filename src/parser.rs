//! Turns a cached ECB document into a [`RateTable`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::cube::{DatedCube, Envelope};
use crate::document::RateDocument;
use crate::error::ParseError;
use crate::rate_table::{RateTable, is_currency_code};

/// Hour of day after which the ECB rates for that day are considered published.
pub const DEFAULT_CUTOFF_HOUR: u32 = 15;

/// Parser for the `eurofxref-daily.xml` format.
///
/// Parsing is strict: a single bad rate entry fails the whole document.
#[derive(Debug, Clone, Copy)]
pub struct RateTableParser {
    cutoff: TimeDelta,
}

impl RateTableParser {
    pub fn new(cutoff_hour: u32) -> Self {
        Self {
            cutoff: TimeDelta::hours(i64::from(cutoff_hour)),
        }
    }

    /// Publication date at midnight plus the provider cutoff.
    pub fn published_at(&self, document: &RateDocument) -> Result<NaiveDateTime, ParseError> {
        let dated = dated_cube(document)?;
        self.effective_moment(dated.time.as_deref())
    }

    pub fn parse(&self, document: &RateDocument) -> Result<RateTable, ParseError> {
        let dated = dated_cube(document)?;
        let published_at = self.effective_moment(dated.time.as_deref())?;

        let mut pairs = Vec::with_capacity(dated.rates.len());
        for (index, cube) in dated.rates.into_iter().enumerate() {
            let currency = cube.currency.ok_or(ParseError::MissingAttribute {
                index,
                attribute: "currency",
            })?;
            let value = cube.rate.ok_or(ParseError::MissingAttribute {
                index,
                attribute: "rate",
            })?;
            if !is_currency_code(&currency) {
                return Err(ParseError::InvalidCurrency(currency));
            }
            let rate = match value.trim().parse::<f64>() {
                Ok(rate) => rate,
                Err(_) => return Err(ParseError::InvalidRate { currency, value }),
            };
            pairs.push((currency, rate));
        }

        RateTable::try_from_pairs(published_at, pairs)
    }

    fn effective_moment(&self, time: Option<&str>) -> Result<NaiveDateTime, ParseError> {
        let value = time.ok_or(ParseError::MissingTime)?;
        let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| {
            ParseError::InvalidDate {
                value: value.to_string(),
                source,
            }
        })?;

        Ok(date.and_time(NaiveTime::MIN) + self.cutoff)
    }
}

impl Default for RateTableParser {
    fn default() -> Self {
        Self::new(DEFAULT_CUTOFF_HOUR)
    }
}

fn dated_cube(document: &RateDocument) -> Result<DatedCube, ParseError> {
    let envelope: Envelope = quick_xml::de::from_str(document.as_str())?;
    envelope.into_dated().ok_or(ParseError::MissingTime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DAILY: &str = include_str!("../tests/fixtures/eurofxref-daily.xml");

    fn doc(body: &str) -> RateDocument {
        RateDocument::new(body)
    }

    fn envelope(day: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
	<gesmes:subject>Reference rates</gesmes:subject>
	<Cube>{day}</Cube>
</gesmes:Envelope>"#
        )
    }

    #[test]
    fn parses_daily_feed() {
        let table = RateTableParser::default().parse(&doc(DAILY)).unwrap();

        assert_eq!(
            table.published_at(),
            NaiveDate::from_ymd_opt(2023, 1, 10)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap()
        );
        assert_eq!(table.len(), 30);
        assert_eq!(table.codes().take(3).collect::<Vec<_>>(), ["USD", "JPY", "BGN"]);
        assert_eq!(table.rate("USD"), Some(1.0742));
        assert_eq!(table.rate("JPY"), Some(142.05));
        assert_eq!(table.rate("ZAR"), Some(18.2875));
        assert!(!table.contains("EUR"));
    }

    #[test]
    fn cutoff_hour_shifts_publication_moment() {
        let at = RateTableParser::new(0).published_at(&doc(DAILY)).unwrap();
        assert_eq!(at.to_string(), "2023-01-10 00:00:00");

        let at = RateTableParser::new(16).published_at(&doc(DAILY)).unwrap();
        assert_eq!(at.to_string(), "2023-01-10 16:00:00");
    }

    #[test]
    fn missing_time_attribute_fails() {
        let body = envelope("<Cube><Cube currency='USD' rate='1.07'/></Cube>");
        let err = RateTableParser::default().parse(&doc(&body)).unwrap_err();
        assert!(matches!(err, ParseError::MissingTime));

        let err = RateTableParser::default().published_at(&doc(&body)).unwrap_err();
        assert!(matches!(err, ParseError::MissingTime));
    }

    #[test]
    fn bad_date_fails() {
        let body = envelope("<Cube time='10.01.2023'><Cube currency='USD' rate='1.07'/></Cube>");
        let err = RateTableParser::default().parse(&doc(&body)).unwrap_err();
        assert!(matches!(err, ParseError::InvalidDate { value, .. } if value == "10.01.2023"));
    }

    #[test]
    fn non_numeric_rate_fails_whole_document() {
        let body = envelope(
            "<Cube time='2023-01-10'><Cube currency='USD' rate='1.07'/><Cube currency='JPY' rate='n/a'/></Cube>",
        );
        let err = RateTableParser::default().parse(&doc(&body)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidRate { currency, value } if currency == "JPY" && value == "n/a"
        ));
    }

    #[test]
    fn missing_currency_fails_whole_document() {
        let body = envelope(
            "<Cube time='2023-01-10'><Cube currency='USD' rate='1.07'/><Cube rate='2.0'/></Cube>",
        );
        let err = RateTableParser::default().parse(&doc(&body)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingAttribute {
                index: 1,
                attribute: "currency"
            }
        ));
    }

    #[test]
    fn duplicate_currency_fails() {
        let body = envelope(
            "<Cube time='2023-01-10'><Cube currency='USD' rate='1.07'/><Cube currency='USD' rate='1.08'/></Cube>",
        );
        let err = RateTableParser::default().parse(&doc(&body)).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateCurrency(code) if code == "USD"));
    }

    #[test]
    fn empty_day_is_an_empty_table() {
        let body = envelope("<Cube time='2023-01-10'></Cube>");
        let table = RateTableParser::default().parse(&doc(&body)).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = RateTableParser::default()
            .parse(&doc("<html><body>503</body>"))
            .unwrap_err();
        assert!(matches!(err, ParseError::Xml(_) | ParseError::MissingTime));

        let err = RateTableParser::default().parse(&doc("")).unwrap_err();
        assert!(matches!(err, ParseError::Xml(_) | ParseError::MissingTime));
    }
}
