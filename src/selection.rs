use crate::error::{BillReportError, Result};
use crate::period::{expand_quarters, Period, Quarter};
use crate::schema::BillRecord;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode", content = "location")]
pub enum LocationFilter {
    #[default]
    All,
    Only(String),
}

impl LocationFilter {
    pub fn matches(&self, location: &str) -> bool {
        match self {
            LocationFilter::All => true,
            LocationFilter::Only(wanted) => wanted == location,
        }
    }
}

/// What the user currently has selected on the dashboard.
///
/// Quarter selection and explicit period selection override each other: picking periods
/// clears the quarters, picking quarters rewrites the period list for `year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    selected_periods: BTreeSet<String>,
    selected_quarters: Vec<Quarter>,
    year: i32,
    location_filter: LocationFilter,
    compare_active: bool,
    compare_periods: BTreeSet<String>,
}

impl SelectionState {
    pub fn new(year: i32) -> Self {
        Self {
            selected_periods: BTreeSet::new(),
            selected_quarters: Vec::new(),
            year,
            location_filter: LocationFilter::All,
            compare_active: false,
            compare_periods: BTreeSet::new(),
        }
    }

    pub fn selected_periods(&self) -> &BTreeSet<String> {
        &self.selected_periods
    }

    pub fn selected_quarters(&self) -> &[Quarter] {
        &self.selected_quarters
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn location_filter(&self) -> &LocationFilter {
        &self.location_filter
    }

    pub fn compare_active(&self) -> bool {
        self.compare_active
    }

    pub fn compare_periods(&self) -> &BTreeSet<String> {
        &self.compare_periods
    }

    /// The lexicographically greatest selected period.
    pub fn latest_period(&self) -> Option<&str> {
        self.selected_periods.iter().next_back().map(String::as_str)
    }

    /// Replaces the period selection and clears any quarter selection.
    /// Every key is validated before anything changes.
    pub fn select_periods<I, S>(&mut self, periods: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selected_periods = validated_periods(periods)?;
        self.selected_quarters.clear();
        Ok(())
    }

    /// Replaces the period selection with every month of `quarters` in `year`.
    /// An empty quarter list clears the quarters but leaves the periods as they are.
    /// A year outside `0..=9999` is rejected and nothing changes.
    pub fn select_quarters(&mut self, quarters: &[Quarter], year: i32) -> Result<()> {
        validate_year(year)?;
        self.year = year;
        self.selected_quarters = quarters.to_vec();
        self.selected_quarters.sort();
        self.selected_quarters.dedup();
        self.expand_selected_quarters();
        Ok(())
    }

    /// Changing the year re-expands any selected quarters for the new year.
    pub fn set_year(&mut self, year: i32) -> Result<()> {
        validate_year(year)?;
        self.year = year;
        self.expand_selected_quarters();
        Ok(())
    }

    pub fn set_location_filter(&mut self, filter: LocationFilter) {
        self.location_filter = filter;
    }

    pub fn set_compare_active(&mut self, active: bool) {
        self.compare_active = active;
    }

    pub fn select_compare_periods<I, S>(&mut self, periods: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.compare_periods = validated_periods(periods)?;
        Ok(())
    }

    /// Bills matching the primary selection.
    pub fn filter<'a>(&self, bills: &'a [BillRecord]) -> Vec<&'a BillRecord> {
        filter_bills(bills, &self.selected_periods, &self.location_filter)
    }

    /// Bills matching the compare selection, sharing the primary location filter.
    /// Empty when compare mode is off or no compare periods are chosen.
    pub fn filter_compare<'a>(&self, bills: &'a [BillRecord]) -> Vec<&'a BillRecord> {
        if !self.compare_active || self.compare_periods.is_empty() {
            return Vec::new();
        }
        filter_bills(bills, &self.compare_periods, &self.location_filter)
    }

    fn expand_selected_quarters(&mut self) {
        if self.selected_quarters.is_empty() {
            return;
        }
        self.selected_periods = expand_quarters(&self.selected_quarters, self.year)
            .into_iter()
            .collect();
        debug!(
            "Expanded quarters {:?} of {} into {} periods",
            self.selected_quarters,
            self.year,
            self.selected_periods.len()
        );
    }
}

/// Quarter expansion writes `YYYY-MM` keys, so the year must fit in four digits.
fn validate_year(year: i32) -> Result<()> {
    Period::new(year, 1)
        .map(|_| ())
        .ok_or(BillReportError::InvalidYear(year))
}

fn validated_periods<I, S>(periods: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    periods
        .into_iter()
        .map(|p| p.as_ref().parse::<Period>().map(|period| period.key()))
        .collect()
}

/// Keeps bills whose period is in `periods` and whose location passes `location`.
/// An empty `periods` set places no restriction on the period.
pub fn filter_bills<'a>(
    bills: &'a [BillRecord],
    periods: &BTreeSet<String>,
    location: &LocationFilter,
) -> Vec<&'a BillRecord> {
    bills
        .iter()
        .filter(|bill| periods.is_empty() || periods.contains(&bill.period))
        .filter(|bill| location.matches(&bill.location))
        .collect()
}
