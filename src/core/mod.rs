//! Core rate model and abstractions

pub mod currency;
pub mod error;
pub mod log;
pub mod rate_set;
pub mod source;

// Re-export main types for cleaner imports
pub use currency::{CurrencyRecord, DateRecord, TransactionDate};
pub use error::FxError;
pub use rate_set::{PairRates, RateSet};
pub use source::{RateSource, SourceOptions, SourceRegistry};
