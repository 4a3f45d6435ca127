//! Per-day currency rate records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// A single currency's rate on a single day, expressed as units of this
/// currency per one unit of the feed's reference currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRecord {
    code: String,
    rate: Decimal,
}

impl CurrencyRecord {
    pub fn new(code: impl Into<String>, rate: Decimal) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }

    /// Builds a record from the feed's textual rate. Text that is not a number
    /// yields a zero rate so one bad entry never aborts a whole load.
    pub fn from_feed(code: impl Into<String>, raw_rate: &str) -> Self {
        let code = code.into();
        let rate = parse_rate(raw_rate).unwrap_or_else(|| {
            debug!(%code, raw_rate, "Unreadable rate in feed, using zero");
            Decimal::ZERO
        });
        Self { code, rate }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

fn parse_rate(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// One calendar day's full set of currency rates.
///
/// The reference currency is always present with a rate of exactly one, since
/// feeds leave their own base unit out of the published list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRecord {
    date: NaiveDate,
    currencies: HashMap<String, CurrencyRecord>,
}

impl DateRecord {
    pub fn new<I>(date: NaiveDate, currencies: I, reference_code: &str) -> Self
    where
        I: IntoIterator<Item = CurrencyRecord>,
    {
        let mut by_code = HashMap::new();
        for currency in currencies {
            // First listing of a code wins
            by_code.entry(currency.code.clone()).or_insert(currency);
        }
        by_code.insert(
            reference_code.to_string(),
            CurrencyRecord::new(reference_code, Decimal::ONE),
        );

        Self {
            date,
            currencies: by_code,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn currency(&self, code: &str) -> Option<&CurrencyRecord> {
        self.currencies.get(code)
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

/// The day a caller asks about. Text that does not parse as a `YYYY-MM-DD`
/// date is kept as-is; it then simply never matches a day in a rate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionDate {
    Calendar(NaiveDate),
    Unparsed(String),
}

impl TransactionDate {
    pub fn parse(raw: &str) -> Self {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => TransactionDate::Calendar(date),
            Err(_) => TransactionDate::Unparsed(raw.to_string()),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TransactionDate::Calendar(date) => Some(*date),
            TransactionDate::Unparsed(_) => None,
        }
    }
}

impl From<NaiveDate> for TransactionDate {
    fn from(date: NaiveDate) -> Self {
        TransactionDate::Calendar(date)
    }
}

impl From<&str> for TransactionDate {
    fn from(raw: &str) -> Self {
        TransactionDate::parse(raw)
    }
}

impl From<String> for TransactionDate {
    fn from(raw: String) -> Self {
        TransactionDate::parse(&raw)
    }
}

impl From<&String> for TransactionDate {
    fn from(raw: &String) -> Self {
        TransactionDate::parse(raw)
    }
}

impl Display for TransactionDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionDate::Calendar(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            TransactionDate::Unparsed(raw) => write!(f, "{raw}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_feed_rate_parsing() {
        assert_eq!(
            CurrencyRecord::from_feed("USD", "1.1648").rate(),
            Decimal::new(11648, 4)
        );
        assert_eq!(
            CurrencyRecord::from_feed("JPY", " 130.2 ").rate(),
            Decimal::new(1302, 1)
        );
        assert_eq!(
            CurrencyRecord::from_feed("XAU", "1.5e3").rate(),
            Decimal::new(1500, 0)
        );
    }

    #[test]
    fn test_malformed_feed_rate_is_zero() {
        assert_eq!(CurrencyRecord::from_feed("USD", "").rate(), Decimal::ZERO);
        assert_eq!(CurrencyRecord::from_feed("USD", "n/a").rate(), Decimal::ZERO);
    }

    #[test]
    fn test_date_record_adds_reference_currency() {
        let record = DateRecord::new(
            day("2017-07-21"),
            vec![
                CurrencyRecord::from_feed("USD", "1.1642"),
                CurrencyRecord::from_feed("GBP", "0.89568"),
            ],
            "EUR",
        );

        assert_eq!(record.len(), 3);
        assert_eq!(record.currency("EUR").unwrap().rate(), Decimal::ONE);
        assert!(record.currency("CHF").is_none());
    }

    #[test]
    fn test_reference_currency_rate_is_forced_to_one() {
        let record = DateRecord::new(
            day("2017-07-21"),
            vec![CurrencyRecord::from_feed("EUR", "2.0")],
            "EUR",
        );
        assert_eq!(record.len(), 1);

        // A day with no listed rates still carries the reference currency
        let bare = DateRecord::new(day("2017-07-22"), vec![], "EUR");
        assert!(!bare.is_empty());
        assert_eq!(record.currency("EUR").unwrap().rate(), Decimal::ONE);
    }

    #[test]
    fn test_duplicate_code_keeps_first_listing() {
        let record = DateRecord::new(
            day("2017-07-21"),
            vec![
                CurrencyRecord::from_feed("USD", "1.1"),
                CurrencyRecord::from_feed("USD", "9.9"),
            ],
            "EUR",
        );
        assert_eq!(record.currency("USD").unwrap().rate(), Decimal::new(11, 1));
    }

    #[test]
    fn test_transaction_date_normalization() {
        assert_eq!(
            TransactionDate::from("2017-07-19"),
            TransactionDate::Calendar(day("2017-07-19"))
        );
        assert_eq!(
            TransactionDate::from(day("2017-07-19")).to_string(),
            "2017-07-19"
        );

        let raw = TransactionDate::from("last tuesday");
        assert_eq!(raw, TransactionDate::Unparsed("last tuesday".to_string()));
        assert!(raw.as_date().is_none());
        assert_eq!(raw.to_string(), "last tuesday");
    }
}
