use crate::error::{BillReportError, Result};
use crate::period::Period;
use crate::schema::BillRecord;
use crate::selection::{filter_bills, LocationFilter};
use log::{debug, info};
use std::collections::BTreeSet;
use std::path::Path;

/// Narrowing applied by a [`BillSource`] before bills reach the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillQuery {
    /// Empty means every period.
    pub periods: BTreeSet<String>,
    pub location: LocationFilter,
}

impl BillQuery {
    pub fn all() -> Self {
        Self::default()
    }
}

/// The data-fetch collaborator. Storage and transport live behind this trait.
pub trait BillSource {
    fn get_all(&self, query: &BillQuery) -> Result<Vec<BillRecord>>;
}

/// A [`BillSource`] over bills already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBillSource {
    bills: Vec<BillRecord>,
}

impl InMemoryBillSource {
    /// Validates every bill before accepting the collection.
    pub fn new(bills: Vec<BillRecord>) -> Result<Self> {
        validate_bills(&bills)?;
        Ok(Self { bills })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self {
            bills: parse_bills_json(json)?,
        })
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }
}

impl BillSource for InMemoryBillSource {
    fn get_all(&self, query: &BillQuery) -> Result<Vec<BillRecord>> {
        let matching: Vec<BillRecord> = filter_bills(&self.bills, &query.periods, &query.location)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            "In-memory source returned {} of {} bills",
            matching.len(),
            self.bills.len()
        );
        Ok(matching)
    }
}

/// Parses and validates a JSON array of bills.
pub fn parse_bills_json(json: &str) -> Result<Vec<BillRecord>> {
    let bills: Vec<BillRecord> = serde_json::from_str(json)?;
    validate_bills(&bills)?;
    info!("Loaded {} bills", bills.len());
    Ok(bills)
}

pub fn load_bills_from_file(path: impl AsRef<Path>) -> Result<Vec<BillRecord>> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    parse_bills_json(&raw)
}

/// Checks what the engine assumes but never re-checks: well-formed periods and
/// non-negative, finite amounts.
pub fn validate_bills(bills: &[BillRecord]) -> Result<()> {
    for bill in bills {
        bill.period.parse::<Period>()?;

        if !bill.total_amount.is_finite() {
            return Err(BillReportError::ValidationError {
                bill: bill.id.clone(),
                details: format!("total_amount {} is not a finite number", bill.total_amount),
            });
        }
        if bill.total_amount < 0.0 {
            return Err(BillReportError::ValidationError {
                bill: bill.id.clone(),
                details: format!("total_amount {} is negative", bill.total_amount),
            });
        }
    }
    Ok(())
}
