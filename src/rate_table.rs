use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::error::ParseError;

/// Rates against the implicit base currency (EUR for the ECB feed), keyed by
/// currency code in document order, plus the effective publication moment.
///
/// Every key is three ASCII uppercase letters and every rate is finite and
/// greater than zero. A table is never mutated; a refresh builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    published_at: NaiveDateTime,
    rates: IndexMap<String, f64>,
}

impl RateTable {
    /// Builds a table from `(code, rate)` pairs, rejecting anything that breaks
    /// the table invariants.
    pub fn try_from_pairs<I, S>(published_at: NaiveDateTime, pairs: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut rates = IndexMap::new();

        for (code, rate) in pairs {
            let code = code.into();
            if !is_currency_code(&code) {
                return Err(ParseError::InvalidCurrency(code));
            }
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ParseError::InvalidRate {
                    currency: code,
                    value: rate.to_string(),
                });
            }
            if rates.contains_key(&code) {
                return Err(ParseError::DuplicateCurrency(code));
            }
            rates.insert(code, rate);
        }

        Ok(Self {
            published_at,
            rates,
        })
    }

    pub fn published_at(&self) -> NaiveDateTime {
        self.published_at
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Currency codes in document order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

pub(crate) fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}
