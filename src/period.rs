use crate::clock::Clock;
use crate::config::LabelLocale;
use crate::error::{BillReportError, Result};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar year-month, the canonical reporting period of a bill.
///
/// The textual form is always `YYYY-MM`, so the derived ordering matches the
/// lexicographic ordering of period keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Returns `None` unless `year` has four digits and `month` is 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (0..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The preceding calendar month, or `None` before `0000-01`.
    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The following calendar month, or `None` after `9999-12`.
    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = BillReportError;

    /// Strict `YYYY-MM` parser: exactly four year digits, a dash and a two digit month 01-12.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BillReportError::InvalidPeriodFormat(s.to_string());

        let bytes = s.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year_part, month_part) = (&s[..4], &s[5..]);
        if !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

/// One of the four fixed three-month groups of a calendar year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quarter {
    type Err = BillReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Q1" | "q1" => Ok(Quarter::Q1),
            "Q2" | "q2" => Ok(Quarter::Q2),
            "Q3" | "q3" => Ok(Quarter::Q3),
            "Q4" | "q4" => Ok(Quarter::Q4),
            other => Err(BillReportError::InvalidQuarter(other.to_string())),
        }
    }
}

/// Returns the current local calendar period as `YYYY-MM`.
pub fn current_period(clock: &dyn Clock) -> String {
    Period::from_date(clock.today()).key()
}

/// Returns the calendar month immediately preceding `period`, rolling over year boundaries.
pub fn previous_period(period: &str) -> Result<String> {
    let parsed: Period = period.parse()?;
    parsed
        .previous()
        .map(|p| p.key())
        .ok_or_else(|| BillReportError::InvalidPeriodFormat(period.to_string()))
}

pub fn quarter_months(quarter: Quarter) -> [&'static str; 3] {
    match quarter {
        Quarter::Q1 => ["01", "02", "03"],
        Quarter::Q2 => ["04", "05", "06"],
        Quarter::Q3 => ["07", "08", "09"],
        Quarter::Q4 => ["10", "11", "12"],
    }
}

/// Expands quarters into the sorted, de-duplicated period keys of `year`.
pub fn expand_quarters(quarters: &[Quarter], year: i32) -> Vec<String> {
    let mut periods: Vec<String> = quarters
        .iter()
        .flat_map(|q| quarter_months(*q))
        .map(|month| format!("{:04}-{}", year, month))
        .collect();
    periods.sort();
    periods.dedup();
    periods
}

/// True iff `due_date` falls strictly before `today`. Time of day plays no part.
pub fn is_overdue(due_date: NaiveDate, today: NaiveDate) -> bool {
    due_date < today
}

/// Sorts period keys newest first.
pub fn sort_periods_desc(periods: &mut [String]) {
    periods.sort_by(|a, b| b.cmp(a));
}

/// Returns the `count` calendar periods ending at `end` (inclusive), oldest first.
/// The window is cut short at `0000-01`.
pub fn trailing_periods(end: Period, count: usize) -> Vec<Period> {
    let mut periods = Vec::with_capacity(count);
    let mut current = Some(end);
    while let Some(period) = current {
        if periods.len() == count {
            break;
        }
        periods.push(period);
        current = period.previous();
    }
    periods.reverse();
    periods
}

/// Localized three-letter month name for chart axes. Months outside 1..=12 yield an empty label.
pub fn month_short_label(month: u32, locale: LabelLocale) -> &'static str {
    const EN: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    const ES: [&str; 12] = [
        "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
    ];

    let names = match locale {
        LabelLocale::En => &EN,
        LabelLocale::Es => &ES,
    };
    month
        .checked_sub(1)
        .and_then(|idx| names.get(idx as usize))
        .copied()
        .unwrap_or("")
}
