use crate::period::sort_periods_desc;
use crate::schema::BillRecord;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// The values a selection UI can offer, derived from the full bill collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct periods, newest first.
    pub available_periods: Vec<String>,
    /// Distinct non-empty locations, alphabetical.
    pub available_locations: Vec<String>,
    /// Distinct years, newest first. Falls back to the current year when no bill carries a
    /// numeric year, so it is never empty.
    pub available_years: Vec<i32>,
}

impl FilterOptions {
    pub fn derive(bills: &[BillRecord], current_year: i32) -> Self {
        let mut available_periods: Vec<String> = bills
            .iter()
            .map(|b| b.period.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        sort_periods_desc(&mut available_periods);

        let available_locations: Vec<String> = bills
            .iter()
            .filter(|b| !b.location.is_empty())
            .map(|b| b.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let years: BTreeSet<i32> = bills
            .iter()
            .filter_map(|b| b.year_key())
            .filter_map(|y| y.parse::<i32>().ok())
            .collect();
        let available_years = if years.is_empty() {
            vec![current_year]
        } else {
            years.into_iter().rev().collect()
        };

        debug!(
            "Derived filter options: {} periods, {} locations, {} years",
            available_periods.len(),
            available_locations.len(),
            available_years.len()
        );

        Self {
            available_periods,
            available_locations,
            available_years,
        }
    }
}
