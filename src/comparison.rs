use crate::engine::{period_total, Breakdown, DashboardAggregate, TrendSeries};
use crate::schema::BillRecord;
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Compare-side values re-indexed onto the main result's axes, ready to plot side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedComparison {
    /// One amount per period of the main trend.
    pub trend: Vec<f64>,
    /// One amount per main category label.
    pub categories: Vec<f64>,
    /// One amount per main location label.
    pub locations: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub main: DashboardAggregate,
    /// `None` when compare mode is off.
    pub compare: Option<DashboardAggregate>,
    /// `None` when compare mode is off or the compare subset is empty. An all-zero
    /// comparison is reported as `Some` with zeros.
    pub aligned: Option<AlignedComparison>,
}

/// Aligns the compare aggregate onto the main aggregate.
///
/// The trend is re-sliced from `compare_bills` onto the main trend's periods rather than
/// taken from the compare aggregate's own window. Categories and locations follow the main
/// labels and their order; labels missing on the compare side become `0.0`.
pub fn compose<B: Borrow<BillRecord>>(
    main: &DashboardAggregate,
    compare: &DashboardAggregate,
    compare_bills: &[B],
    compare_active: bool,
) -> Option<AlignedComparison> {
    if !compare_active || compare_bills.is_empty() {
        return None;
    }

    let aligned = AlignedComparison {
        trend: align_trend(&main.trend, compare_bills),
        categories: align_breakdown(&main.category_breakdown, &compare.category_breakdown),
        locations: align_breakdown(&main.location_breakdown, &compare.location_breakdown),
    };

    debug!(
        "Aligned comparison over {} bills: {} trend points, {} categories, {} locations",
        compare_bills.len(),
        aligned.trend.len(),
        aligned.categories.len(),
        aligned.locations.len()
    );

    Some(aligned)
}

pub fn align_trend<B: Borrow<BillRecord>>(
    main_trend: &TrendSeries,
    compare_bills: &[B],
) -> Vec<f64> {
    main_trend
        .periods
        .iter()
        .map(|period| period_total(compare_bills, period))
        .collect()
}

/// For each main label, the compare amount with the same label or `0.0`.
pub fn align_breakdown(main: &Breakdown, compare: &Breakdown) -> Vec<f64> {
    main.labels
        .iter()
        .map(|label| compare.amount_for(label).unwrap_or(0.0))
        .collect()
}
