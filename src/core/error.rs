//! Error kinds raised while resolving an exchange rate

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T, E = FxError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("Please provide one of these valid source keys: [{}].", .valid.join(", "))]
    InvalidSourceKey { key: String, valid: Vec<String> },

    #[error("No rate source is registered for key: {0}")]
    UnknownSourceProvider(String),

    #[error("Rate data unavailable from {source_key}: {reason}")]
    DataUnavailable { source_key: String, reason: String },

    #[error("Rate feed could not be read: {0}")]
    InvalidFeed(String),

    #[error("Unable to find your date: {0}")]
    DateNotFound(String),

    #[error("Unable to find currency '{code}' on {date}")]
    CurrencyNotFound { code: String, date: NaiveDate },

    #[error("Rate for '{code}' on {date} is zero")]
    ZeroRate { code: String, date: NaiveDate },

    #[error("Rate of '{counter}' per '{base}' on {date} is out of range")]
    RateOverflow {
        base: String,
        counter: String,
        date: NaiveDate,
    },

    #[error("Rate {0} cannot be represented as a float")]
    NotRepresentable(Decimal),
}
