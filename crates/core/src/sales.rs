//! Sales history → chart series.
//!
//! Period codes are `YYYYMM` integers. The source already sorts them chronologically, so the
//! series keeps input order. A single malformed code fails the whole series: a chart with a
//! silently missing month reads as a real dip.

use crate::domain::store::SalesPeriod;
use crate::error::ClientError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `es-MX` short month names, as rendered by the chart axis.
const MONTHS_ES_MX: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodParts {
    pub year: i32,
    /// Zero-based, `0..=11`.
    pub month_index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl SalesSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

pub fn decompose(period_code: i64) -> Result<PeriodParts, ClientError> {
    let malformed = |why: &str| ClientError::parse("sales period", format!("{period_code}: {why}"));

    let year = i32::try_from(period_code / 100).map_err(|_| malformed("year out of range"))?;
    let month = period_code % 100;
    if !(1..=9999).contains(&year) {
        return Err(malformed("year must have four digits"));
    }
    if !(1..=12).contains(&month) {
        return Err(malformed("month must be 01..12"));
    }

    let month = month as u32;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| malformed("not a calendar month"))?;

    Ok(PeriodParts {
        year,
        month_index: month - 1,
    })
}

pub fn label(parts: PeriodParts) -> String {
    format!("{} {}", MONTHS_ES_MX[parts.month_index as usize], parts.year)
}

pub fn transform(periods: &[SalesPeriod]) -> Result<SalesSeries, ClientError> {
    let mut series = SalesSeries {
        labels: Vec::with_capacity(periods.len()),
        values: Vec::with_capacity(periods.len()),
    };

    for period in periods {
        let parts = decompose(period.period_code)?;
        series.labels.push(label(parts));
        series.values.push(period.total_sales);
    }

    Ok(series)
}

/// Transform for display: a malformed history renders as "no data".
pub fn transform_or_empty(periods: &[SalesPeriod]) -> SalesSeries {
    match transform(periods) {
        Ok(series) => series,
        Err(err) => {
            tracing::warn!(error = %err, points = periods.len(), "discarding malformed sales history");
            SalesSeries::default()
        }
    }
}
