//! Reporting periods and structured transaction filters.
//!
//! A [`Period`] is a validated calendar month. A [`TransactionFilter`] carries the
//! optional date range, category and wallet criteria that report and ledger queries
//! accept; it is translated into bound query predicates, never into query text.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A (month, year) pair scoping ledger and plan queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, rejecting months outside 1..=12.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] for an out-of-range month or a year chrono
    /// cannot represent.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid_input(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::invalid_input(format!("unsupported year {year}")))?;
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month number, 1..=12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number in the integer type of the plan table.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) const fn month_column(self) -> i32 {
        self.month as i32
    }

    /// First day of the period.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following period (exclusive upper bound).
    #[must_use]
    pub fn next_first_day(self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    /// Whether `date` falls inside the period.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Chart label, `YYYY-MM`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Inclusive date bounds; either side may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First included day
    pub start: Option<NaiveDate>,
    /// Last included day
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Builds a range from optional bounds.
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// The days of one period.
    #[must_use]
    pub fn for_period(period: Period) -> Self {
        Self {
            start: Some(period.first_day()),
            end: period.next_first_day().pred_opt(),
        }
    }

    /// Whether `date` lies within both bounds.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Filter criteria for ledger retrieval and report scoping.
///
/// Empty names count as "no filter". A non-empty name is matched exactly; a name
/// that matches nothing selects no transactions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Optional inclusive date range
    pub date_range: DateRange,
    /// Optional exact category name
    pub category_name: Option<String>,
    /// Optional exact wallet name
    pub wallet_name: Option<String>,
}

impl TransactionFilter {
    /// A filter with no criteria.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to one wallet and/or a date range, as the dashboard reports do.
    #[must_use]
    pub fn for_wallet_and_range(
        wallet_name: Option<&str>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        Self {
            date_range: DateRange::new(start, end),
            category_name: None,
            wallet_name: wallet_name.map(str::to_string),
        }
    }

    /// Restricts to the days of one period.
    #[must_use]
    pub fn for_period(period: Period) -> Self {
        Self {
            date_range: DateRange::for_period(period),
            ..Self::default()
        }
    }

    /// Sets the category criterion.
    #[must_use]
    pub fn with_category(mut self, name: &str) -> Self {
        self.category_name = Some(name.to_string());
        self
    }

    /// Category name, `None` when absent or empty.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Wallet name, `None` when absent or empty.
    #[must_use]
    pub fn wallet(&self) -> Option<&str> {
        self.wallet_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Parses user-entered amount text into a finite number.
///
/// # Errors
/// Returns [`Error::InvalidInput`] when the text is not a number or is NaN/infinite.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| Error::invalid_input(format!("'{trimmed}' is not a numeric amount")))?;
    if !amount.is_finite() {
        return Err(Error::invalid_input(format!(
            "'{trimmed}' is not a finite amount"
        )));
    }
    Ok(amount)
}
