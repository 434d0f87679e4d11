use crate::clock::{Clock, SystemClock};
use crate::config::{LabelLocale, ReportConfig};
use crate::period::{is_overdue, month_short_label, previous_period, trailing_periods, Period};
use crate::schema::{BillRecord, BillStatus, ServiceType};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;

/// Number of calendar months in the trailing trend, ending at the current month.
pub const TREND_WINDOW_MONTHS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub monthly_total: f64,
    /// Change against the calendar month before the latest selected period. `0.0` when
    /// there is nothing to compare with.
    pub monthly_change_percent: f64,
    pub pending_count: usize,
    /// Pending bills whose due date has passed.
    pub overdue_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub periods: Vec<String>,
    pub labels: Vec<String>,
    pub amounts: Vec<f64>,
}

/// Parallel label/amount arrays feeding a bar or pie chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Breakdown {
    pub labels: Vec<String>,
    pub amounts: Vec<f64>,
}

pub type CategoryBreakdown = Breakdown;
pub type LocationBreakdown = Breakdown;

impl Breakdown {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn amount_for(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|idx| self.amounts.get(idx).copied())
    }

    pub fn total(&self) -> f64 {
        self.amounts.iter().sum()
    }

    fn push(&mut self, label: impl Into<String>, amount: f64) {
        self.labels.push(label.into());
        self.amounts.push(amount);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAggregate {
    pub kpis: KpiSummary,
    pub trend: TrendSeries,
    pub category_breakdown: CategoryBreakdown,
    pub location_breakdown: LocationBreakdown,
}

pub struct AggregationEngine<C: Clock = SystemClock> {
    clock: C,
    locale: LabelLocale,
}

impl AggregationEngine<SystemClock> {
    pub fn new(config: &ReportConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> AggregationEngine<C> {
    pub fn with_clock(config: &ReportConfig, clock: C) -> Self {
        Self {
            clock,
            locale: config.locale,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Derives every dashboard figure from a caller-filtered subset.
    ///
    /// `all_bills` is the unfiltered collection: the previous-period total and the trend are
    /// always computed from it, regardless of the active location filter.
    pub fn aggregate<B, I, S>(
        &self,
        filtered_bills: &[B],
        selected_periods: I,
        all_bills: &[BillRecord],
    ) -> DashboardAggregate
    where
        B: Borrow<BillRecord>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let latest = selected_periods
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .max();

        let kpis = self.compute_kpis(filtered_bills, latest.as_deref(), all_bills);
        let trend = self.compute_trend(all_bills);
        let category_breakdown = self.category_breakdown(filtered_bills);
        let location_breakdown = location_breakdown(filtered_bills);

        debug!(
            "Aggregated {} of {} bills: total {:.0}, {} categories, {} locations",
            filtered_bills.len(),
            all_bills.len(),
            kpis.monthly_total,
            category_breakdown.len(),
            location_breakdown.len()
        );

        DashboardAggregate {
            kpis,
            trend,
            category_breakdown,
            location_breakdown,
        }
    }

    pub fn compute_kpis<B: Borrow<BillRecord>>(
        &self,
        filtered_bills: &[B],
        latest_period: Option<&str>,
        all_bills: &[BillRecord],
    ) -> KpiSummary {
        let today = self.clock.today();

        let mut monthly_total = 0.0;
        let mut pending_count = 0;
        let mut overdue_count = 0;

        for bill in records(filtered_bills) {
            monthly_total += bill.total_amount;
            if bill.status == BillStatus::Pending {
                pending_count += 1;
                if is_overdue(bill.due_date, today) {
                    overdue_count += 1;
                }
            }
        }

        let monthly_change_percent = match latest_period {
            Some(latest) => match previous_period(latest) {
                Ok(previous) => {
                    let previous_total = period_total(all_bills, &previous);
                    percent_change(monthly_total, previous_total)
                }
                Err(e) => {
                    warn!("Cannot compute monthly change: {}", e);
                    0.0
                }
            },
            None => 0.0,
        };

        KpiSummary {
            monthly_total,
            monthly_change_percent,
            pending_count,
            overdue_count,
        }
    }

    /// Totals for the six calendar months ending at the current month, oldest first.
    pub fn compute_trend(&self, all_bills: &[BillRecord]) -> TrendSeries {
        let current = Period::from_date(self.clock.today());
        let window = trailing_periods(current, TREND_WINDOW_MONTHS);

        let mut totals: HashMap<&str, f64> = HashMap::new();
        for bill in all_bills {
            *totals.entry(bill.period.as_str()).or_insert(0.0) += bill.total_amount;
        }

        let mut trend = TrendSeries {
            periods: Vec::with_capacity(TREND_WINDOW_MONTHS),
            labels: Vec::with_capacity(TREND_WINDOW_MONTHS),
            amounts: Vec::with_capacity(TREND_WINDOW_MONTHS),
        };
        for period in window {
            let key = period.key();
            trend
                .amounts
                .push(totals.get(key.as_str()).copied().unwrap_or(0.0));
            trend
                .labels
                .push(month_short_label(period.month(), self.locale).to_string());
            trend.periods.push(key);
        }

        trend
    }

    /// Per service type totals in canonical order. Types with no positive total are omitted.
    pub fn category_breakdown<B: Borrow<BillRecord>>(
        &self,
        filtered_bills: &[B],
    ) -> CategoryBreakdown {
        let mut totals: HashMap<ServiceType, f64> = HashMap::new();
        for bill in records(filtered_bills) {
            *totals.entry(bill.service_type).or_insert(0.0) += bill.total_amount;
        }

        let mut breakdown = Breakdown::default();
        for service_type in ServiceType::ALL {
            let amount = totals.get(&service_type).copied().unwrap_or(0.0);
            if amount > 0.0 {
                breakdown.push(service_type.label(self.locale), amount);
            }
        }
        breakdown
    }
}

/// Per location totals, in the order each location first appears.
pub fn location_breakdown<B: Borrow<BillRecord>>(filtered_bills: &[B]) -> LocationBreakdown {
    let mut breakdown = Breakdown::default();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for bill in records(filtered_bills) {
        match index.get(bill.location.as_str()) {
            Some(&idx) => breakdown.amounts[idx] += bill.total_amount,
            None => {
                index.insert(bill.location.as_str(), breakdown.len());
                breakdown.push(bill.location.clone(), bill.total_amount);
            }
        }
    }
    breakdown
}

/// Sum of `total_amount` over bills of exactly `period`.
pub fn period_total<B: Borrow<BillRecord>>(bills: &[B], period: &str) -> f64 {
    records(bills)
        .filter(|b| b.period == period)
        .map(|b| b.total_amount)
        .sum()
}

fn records<B: Borrow<BillRecord>>(bills: &[B]) -> impl Iterator<Item = &BillRecord> {
    bills.iter().map(|b| b.borrow())
}

/// Percentage change from `previous` to `current`. A zero baseline means no change.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    let change = (current - previous) / previous * 100.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::from_ymd(2025, 5, 20).unwrap()
    }

    fn engine() -> AggregationEngine<FixedClock> {
        AggregationEngine::with_clock(&ReportConfig::default(), clock())
    }

    fn paid(period: &str, service_type: ServiceType, location: &str, amount: f64) -> BillRecord {
        BillRecord {
            id: format!("{}-{}", period, location),
            period: period.to_string(),
            service_type,
            location: location.to_string(),
            status: BillStatus::Paid,
            total_amount: amount,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        }
    }

    /// An April water bill for site "A" with the given status and due date.
    fn april_water(status: BillStatus, due: (i32, u32, u32)) -> BillRecord {
        BillRecord {
            status,
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            ..paid("2025-04", ServiceType::Water, "A", 10.0)
        }
    }

    #[test]
    fn test_monthly_change_against_previous_period() {
        let bills = vec![
            BillRecord {
                status: BillStatus::Pending,
                ..paid("2025-05", ServiceType::Water, "A", 100.0)
            },
            paid("2025-04", ServiceType::Water, "A", 50.0),
        ];
        let filtered: Vec<&BillRecord> = bills.iter().filter(|b| b.period == "2025-05").collect();

        let result = engine().aggregate(&filtered, ["2025-05"], &bills);
        assert_eq!(result.kpis.monthly_total, 100.0);
        assert_eq!(result.kpis.monthly_change_percent, 100.0);
        assert_eq!(result.kpis.pending_count, 1);
        assert_eq!(result.kpis.overdue_count, 0);
    }

    #[test]
    fn test_change_uses_latest_selected_period_and_full_collection() {
        // Previous-period lookup ignores the location filter
        let bills = vec![
            paid("2025-03", ServiceType::Gas, "North", 300.0),
            paid("2025-02", ServiceType::Gas, "North", 100.0),
            paid("2025-02", ServiceType::Gas, "South", 100.0),
            paid("2025-01", ServiceType::Gas, "North", 999.0),
        ];
        let filtered: Vec<&BillRecord> = bills
            .iter()
            .filter(|b| b.location == "North" && (b.period == "2025-03" || b.period == "2025-01"))
            .collect();

        let result = engine().aggregate(&filtered, ["2025-03", "2025-01"], &bills);
        assert_eq!(result.kpis.monthly_total, 1299.0);
        // (1299 - 200) / 200 * 100
        assert!((result.kpis.monthly_change_percent - 549.5).abs() < 1e-9);
    }

    #[test]
    fn test_change_is_zero_without_baseline_or_selection() {
        let bills = vec![paid("2025-05", ServiceType::Rent, "A", 80.0)];

        let no_previous = engine().aggregate(&bills, ["2025-05"], &bills);
        assert_eq!(no_previous.kpis.monthly_change_percent, 0.0);

        let no_selection = engine().aggregate(&bills, Vec::<String>::new(), &bills);
        assert_eq!(no_selection.kpis.monthly_change_percent, 0.0);
        assert_eq!(no_selection.kpis.monthly_total, 80.0);
    }

    #[test]
    fn test_malformed_latest_period_yields_no_change() {
        let bills = vec![paid("2025-05", ServiceType::Rent, "A", 80.0)];
        let result = engine().aggregate(&bills, ["2025-5"], &bills);
        assert_eq!(result.kpis.monthly_change_percent, 0.0);
    }

    #[test]
    fn test_only_pending_bills_can_be_overdue() {
        let bills = vec![
            april_water(BillStatus::Pending, (2025, 5, 19)),
            april_water(BillStatus::Pending, (2025, 5, 20)),
            april_water(BillStatus::Approved, (2025, 1, 1)),
            paid("2025-04", ServiceType::Water, "A", 10.0),
            april_water(BillStatus::Overdue, (2025, 1, 1)),
        ];

        let kpis = engine().compute_kpis(&bills, None, &bills);
        assert_eq!(kpis.pending_count, 2);
        assert_eq!(kpis.overdue_count, 1);
    }

    #[test]
    fn test_trend_is_fixed_window_ending_at_current_month() {
        let bills = vec![
            paid("2025-05", ServiceType::Gas, "A", 5.0),
            paid("2025-05", ServiceType::Gas, "B", 7.0),
            paid("2024-12", ServiceType::Gas, "A", 3.0),
            paid("2024-11", ServiceType::Gas, "A", 100.0),
            paid("2025-06", ServiceType::Gas, "A", 100.0),
        ];

        let trend = engine().compute_trend(&bills);
        assert_eq!(
            trend.periods,
            vec!["2024-12", "2025-01", "2025-02", "2025-03", "2025-04", "2025-05"]
        );
        assert_eq!(trend.labels, vec!["Dec", "Jan", "Feb", "Mar", "Apr", "May"]);
        assert_eq!(trend.amounts, vec![3.0, 0.0, 0.0, 0.0, 0.0, 12.0]);
    }

    #[test]
    fn test_trend_labels_follow_locale() {
        let config = ReportConfig {
            locale: LabelLocale::Es,
            ..ReportConfig::default()
        };
        let engine =
            AggregationEngine::with_clock(&config, FixedClock::from_ymd(2025, 1, 3).unwrap());
        let trend = engine.compute_trend(&[]);
        assert_eq!(trend.labels, vec!["Ago", "Sep", "Oct", "Nov", "Dic", "Ene"]);
    }

    #[test]
    fn test_category_breakdown_keeps_canonical_order_and_skips_zero() {
        let bills = vec![
            paid("2025-05", ServiceType::Other, "A", 5.0),
            paid("2025-05", ServiceType::Water, "A", 500.0),
            paid("2025-05", ServiceType::Electricity, "A", 20.0),
            paid("2025-05", ServiceType::Gas, "A", 0.0),
            paid("2025-05", ServiceType::Water, "A", 1.0),
        ];

        let breakdown = engine().category_breakdown(&bills);
        assert_eq!(breakdown.labels, vec!["Electricity", "Water", "Other"]);
        assert_eq!(breakdown.amounts, vec![20.0, 501.0, 5.0]);

        let filtered_total: f64 = bills.iter().map(|b| b.total_amount).sum();
        assert!(breakdown.total() <= filtered_total);
        assert_eq!(breakdown.total(), filtered_total);
    }

    #[test]
    fn test_location_breakdown_keeps_first_seen_order() {
        let bills = vec![
            paid("2025-05", ServiceType::Gas, "Zeta", 1.0),
            paid("2025-05", ServiceType::Gas, "Alpha", 2.0),
            paid("2025-05", ServiceType::Gas, "Zeta", 4.0),
        ];

        let breakdown = location_breakdown(&bills);
        assert_eq!(breakdown.labels, vec!["Zeta", "Alpha"]);
        assert_eq!(breakdown.amounts, vec![5.0, 2.0]);
        assert_eq!(breakdown.amount_for("Alpha"), Some(2.0));
        assert_eq!(breakdown.amount_for("Beta"), None);
    }

    #[test]
    fn test_empty_collection_yields_zeroed_outputs() {
        let empty: Vec<BillRecord> = Vec::new();
        let result = engine().aggregate(&empty, Vec::<String>::new(), &empty);
        assert_eq!(result.kpis.monthly_total, 0.0);
        assert_eq!(result.kpis.monthly_change_percent, 0.0);
        assert_eq!(result.trend.amounts, vec![0.0; TREND_WINDOW_MONTHS]);
        assert!(result.category_breakdown.is_empty());
        assert!(result.location_breakdown.is_empty());
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
        assert_eq!(percent_change(10.0, 0.0), 0.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }
}
