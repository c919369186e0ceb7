//! Per-store lookup for existing stores: sales performance, demographic profile and the sales
//! trend series.

use crate::backend::StoreBackend;
use crate::domain::store::{DemographicProfile, SalesPerformance};
use crate::error::ClientError;
use crate::sales::{self, SalesSeries};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreReport {
    pub store_id: i64,
    pub performance: SalesPerformance,
    pub demographics: DemographicProfile,
}

pub struct StoreInsights {
    backend: Arc<dyn StoreBackend>,
}

impl StoreInsights {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Performance and demographics are fetched concurrently; either failing fails the report.
    pub async fn report(&self, store_id: i64) -> Result<StoreReport, ClientError> {
        let (performance, demographics) = tokio::try_join!(
            self.backend.sales_performance(store_id),
            self.backend.demographic_profile(store_id),
        )?;

        Ok(StoreReport {
            store_id,
            performance,
            demographics,
        })
    }

    /// Trend series for the chart. Fetch or parse failures yield an empty ("no data") series.
    pub async fn sales_series(&self, store_id: i64) -> SalesSeries {
        match self.backend.sales_history(store_id).await {
            Ok(periods) => sales::transform_or_empty(&periods),
            Err(err) => {
                tracing::warn!(store_id, error = %err, "sales history unavailable");
                SalesSeries::default()
            }
        }
    }
}

/// Whole pesos with thousands separators, e.g. `$1,985,931`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs() as u64))
}

/// `comparativo_vs_promedio_pct` is already a percentage; `None` renders as `N/A`.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        None => "N/A".to_string(),
        Some(v) => {
            let text = format!("{v:.1}");
            let text = text.strip_suffix(".0").unwrap_or(&text);
            format!("{text}%")
        }
    }
}

pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(rounded.abs() as u64))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
