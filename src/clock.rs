use chrono::{Datelike, Local, NaiveDate};

/// Source of the current calendar date.
///
/// Trend windows and overdue checks depend on "today"; routing that through a trait keeps
/// every computation reproducible in tests.
pub trait Clock: Send + Sync {
    /// Returns the current local calendar date.
    fn today(&self) -> NaiveDate;

    /// Returns the current calendar year.
    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

/// Clock backed by the local system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Returns `None` when the components do not form a valid date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
