//! A provider's complete set of per-day rates and the lookups over it

use crate::core::currency::{CurrencyRecord, DateRecord, TransactionDate};
use crate::core::error::{FxError, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Every day returned by one provider query, keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSet {
    dates: BTreeMap<NaiveDate, DateRecord>,
}

/// The two sides of a currency pair on the day that was selected. Either side
/// is `None` when the day has no rate for that code.
#[derive(Debug, Clone, Copy)]
pub struct PairRates<'a> {
    pub date: NaiveDate,
    pub counter: Option<&'a CurrencyRecord>,
    pub base: Option<&'a CurrencyRecord>,
}

impl RateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a day to the set. Providers must not emit the same date twice;
    /// when they do, the later record replaces the earlier one and is reported.
    pub fn insert(&mut self, record: DateRecord) -> Option<DateRecord> {
        let date = record.date();
        let replaced = self.dates.insert(date, record);
        if replaced.is_some() {
            warn!(%date, "Rate source produced a duplicate date");
        }
        replaced
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DateRecord> {
        self.dates.get(&date)
    }

    pub fn latest(&self) -> Option<&DateRecord> {
        self.dates.values().next_back()
    }

    pub fn dates(&self) -> impl Iterator<Item = &DateRecord> {
        self.dates.values()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Picks the day for `date`. An exact match wins; otherwise a permissive
    /// lookup takes the most recent day in the whole set, however far it is
    /// from the requested one.
    pub fn select_date(&self, date: &TransactionDate, permissive: bool) -> Result<&DateRecord> {
        if let Some(record) = date.as_date().and_then(|d| self.get(d)) {
            return Ok(record);
        }

        if !permissive {
            return Err(FxError::DateNotFound(date.to_string()));
        }

        let latest = self
            .latest()
            .ok_or_else(|| FxError::DateNotFound(date.to_string()))?;
        debug!(requested = %date, using = %latest.date(), "Falling back to latest available date");
        Ok(latest)
    }

    /// Looks up both sides of a pair on the selected day, counter first.
    pub fn resolve_pair(
        &self,
        date: &TransactionDate,
        base_code: &str,
        counter_code: &str,
        permissive: bool,
    ) -> Result<PairRates<'_>> {
        let record = self.select_date(date, permissive)?;

        Ok(PairRates {
            date: record.date(),
            counter: record.currency(counter_code),
            base: record.currency(base_code),
        })
    }
}

impl FromIterator<DateRecord> for RateSet {
    fn from_iter<T: IntoIterator<Item = DateRecord>>(iter: T) -> Self {
        let mut set = RateSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}
