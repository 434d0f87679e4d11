//! # Utility Bill Reporting
//!
//! Period-based aggregation of utility and service bills (electricity, water, gas, ...)
//! into the figures a reporting dashboard shows.
//!
//! ## Core Concepts
//!
//! - **Period**: a `YYYY-MM` key identifying a bill's reporting cycle
//! - **Selection**: the periods (or quarters of a year), location and optional compare
//!   periods chosen by the user
//! - **Aggregate**: KPIs, a fixed six-month trend, per-category and per-location totals
//! - **Comparison**: a second aggregate aligned onto the first one's axes
//!
//! Everything is a pure function of the bill collection, the selection and the clock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use utility_bill_reporting::*;
//!
//! let bills = parse_bills_json(&std::fs::read_to_string("bills.json")?)?;
//! let mut selection = SelectionState::new(2025);
//! selection.select_quarters(&[Quarter::Q2], 2025)?;
//!
//! let report = DashboardProcessor::new(ReportConfig::default()).build(&bills, &selection);
//! println!("{:.0}", report.comparison.main.kpis.monthly_total);
//! ```

pub mod clock;
pub mod comparison;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter_options;
pub mod ingestion;
pub mod period;
pub mod schema;
pub mod selection;

pub use clock::{Clock, FixedClock, SystemClock};
pub use comparison::{align_breakdown, align_trend, compose, AlignedComparison, ComparisonResult};
pub use config::{LabelLocale, ReportConfig};
pub use engine::{
    location_breakdown, percent_change, period_total, AggregationEngine, Breakdown,
    CategoryBreakdown, DashboardAggregate, KpiSummary, LocationBreakdown, TrendSeries,
    TREND_WINDOW_MONTHS,
};
pub use error::{BillReportError, Result};
pub use filter_options::FilterOptions;
pub use ingestion::*;
pub use period::*;
pub use schema::*;
pub use selection::{filter_bills, LocationFilter, SelectionState};

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Everything the dashboard renders for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub options: FilterOptions,
    pub comparison: ComparisonResult,
}

pub struct DashboardProcessor<C: Clock = SystemClock> {
    config: ReportConfig,
    engine: AggregationEngine<C>,
}

impl DashboardProcessor<SystemClock> {
    pub fn new(config: ReportConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> DashboardProcessor<C> {
    pub fn with_clock(config: ReportConfig, clock: C) -> Self {
        let engine = AggregationEngine::with_clock(&config, clock);
        Self { config, engine }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Filter options for the selection controls.
    pub fn options(&self, bills: &[BillRecord]) -> FilterOptions {
        let current_year = self
            .config
            .fallback_year
            .unwrap_or_else(|| self.engine.clock().current_year());
        FilterOptions::derive(bills, current_year)
    }

    /// Aggregates the primary selection and, when compare mode is on, the compare selection.
    pub fn compare(&self, bills: &[BillRecord], selection: &SelectionState) -> ComparisonResult {
        let filtered = selection.filter(bills);
        let main = self
            .engine
            .aggregate(&filtered, selection.selected_periods(), bills);

        if !selection.compare_active() {
            return ComparisonResult {
                main,
                compare: None,
                aligned: None,
            };
        }

        let compare_bills = selection.filter_compare(bills);
        let compare = self
            .engine
            .aggregate(&compare_bills, selection.compare_periods(), bills);
        let aligned = compose(&main, &compare, &compare_bills, true);

        debug!(
            "Compare mode: {} main bills, {} compare bills, aligned: {}",
            filtered.len(),
            compare_bills.len(),
            aligned.is_some()
        );

        ComparisonResult {
            main,
            compare: Some(compare),
            aligned,
        }
    }

    pub fn build(&self, bills: &[BillRecord], selection: &SelectionState) -> DashboardReport {
        info!(
            "Building dashboard for {} bills ({} periods selected, location {:?}, compare {})",
            bills.len(),
            selection.selected_periods().len(),
            selection.location_filter(),
            selection.compare_active()
        );

        DashboardReport {
            options: self.options(bills),
            comparison: self.compare(bills, selection),
        }
    }

    /// Fetches every bill from `source` and builds the report. Filtering happens in memory
    /// because the trend and previous-period lookups need the full collection.
    pub fn build_from_source<S: BillSource + ?Sized>(
        &self,
        source: &S,
        selection: &SelectionState,
    ) -> Result<DashboardReport> {
        let bills = source.get_all(&BillQuery::all())?;
        Ok(self.build(&bills, selection))
    }
}

pub fn build_dashboard(bills: &[BillRecord], selection: &SelectionState) -> DashboardReport {
    DashboardProcessor::new(ReportConfig::default()).build(bills, selection)
}
