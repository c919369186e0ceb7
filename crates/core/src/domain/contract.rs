//! Wire shapes of the scoring backend and the recommendation proxy.

use crate::domain::evaluation::{
    Coordinates, Environment, EvaluationResult, OptimizedParameters, SuccessLabel,
};
use crate::domain::store::{SalesPeriod, StoreMarker};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequestBody {
    #[serde(rename = "LATITUD_NUM")]
    pub latitude: f64,
    #[serde(rename = "LONGITUD_NUM")]
    pub longitude: f64,
    #[serde(rename = "ENTORNO_DES")]
    pub environment: String,
}

impl EvaluateRequestBody {
    pub fn new(coords: Coordinates, environment: Environment) -> Self {
        Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            environment: environment.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    #[serde(default)]
    pub porciento: Option<f64>,
    #[serde(default)]
    pub exito: Option<String>,
    #[serde(default)]
    pub detalles: Option<EvaluateDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateDetails {
    #[serde(default)]
    pub resultado_optimizado: Option<OptimizedResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedResult {
    pub mts2_optimo: f64,
    pub puertas_refrigeracion_optimo: f64,
    pub cajones_estacionamiento_optimo: f64,
    pub probabilidad_optima: f64,
}

impl EvaluateResponse {
    /// Missing `exito`/`porciento` fall back to `mejorable`/0; an unknown label is rejected.
    pub fn validate_and_into_result(self) -> anyhow::Result<EvaluationResult> {
        let success_label = match self.exito.as_deref() {
            None | Some("") => SuccessLabel::Improvable,
            Some(raw) => match SuccessLabel::from_wire(raw) {
                Some(label) => label,
                None => bail!("unknown exito label: {raw:?}"),
            },
        };

        let percent_gap = self.porciento.unwrap_or(0.0);
        ensure!(
            percent_gap.is_finite(),
            "porciento must be a finite number (got {percent_gap})"
        );

        // A bad optimizer block only costs the recommendation, never the score itself.
        let optimized_parameters = match self.detalles.and_then(|d| d.resultado_optimizado) {
            None => None,
            Some(raw) => match raw.validate_and_into_parameters() {
                Ok(params) => Some(params),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding invalid resultado_optimizado");
                    None
                }
            },
        };

        Ok(EvaluationResult {
            success_label,
            percent_gap,
            optimized_parameters,
            recommendation_text: None,
        })
    }
}

impl OptimizedResult {
    pub fn validate_and_into_parameters(self) -> anyhow::Result<OptimizedParameters> {
        ensure!(
            self.mts2_optimo.is_finite() && self.mts2_optimo > 0.0,
            "mts2_optimo must be positive (got {})",
            self.mts2_optimo
        );
        let refrigeration_doors = whole_count("puertas_refrigeracion_optimo", self.puertas_refrigeracion_optimo)?;
        let parking_spots = whole_count("cajones_estacionamiento_optimo", self.cajones_estacionamiento_optimo)?;
        ensure!(
            (0.0..=1.0).contains(&self.probabilidad_optima),
            "probabilidad_optima must be between 0 and 1 (got {})",
            self.probabilidad_optima
        );

        Ok(OptimizedParameters {
            area_m2: self.mts2_optimo,
            refrigeration_doors,
            parking_spots,
            optimal_probability: self.probabilidad_optima,
        })
    }
}

impl From<&OptimizedParameters> for OptimizedResult {
    fn from(p: &OptimizedParameters) -> Self {
        Self {
            mts2_optimo: p.area_m2,
            puertas_refrigeracion_optimo: f64::from(p.refrigeration_doors),
            cajones_estacionamiento_optimo: f64::from(p.parking_spots),
            probabilidad_optima: p.optimal_probability,
        }
    }
}

// The optimizer works in floats; counts are rounded to the nearest unit.
fn whole_count(field: &str, value: f64) -> anyhow::Result<u32> {
    ensure!(
        value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX),
        "{field} must be a non-negative count (got {value})"
    );
    Ok(value.round() as u32)
}

/// One row of `GET /api/tiendas`. The backend dumps a whole table, so unknown columns are
/// ignored and the id may arrive as a number or a string.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRecord {
    #[serde(rename = "TIENDA_ID")]
    pub id: Value,
    #[serde(rename = "LATITUD_NUM")]
    pub latitude: Option<f64>,
    #[serde(rename = "LONGITUD_NUM")]
    pub longitude: Option<f64>,
    #[serde(rename = "EXITO", default)]
    pub success: Value,
}

impl StoreRecord {
    pub fn validate_and_into_marker(self) -> anyhow::Result<StoreMarker> {
        let id = match self.id {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => bail!("TIENDA_ID must be a string or number (got {other})"),
        };
        let latitude = self.latitude.context("LATITUD_NUM is missing")?;
        let longitude = self.longitude.context("LONGITUD_NUM is missing")?;
        ensure!(
            latitude.is_finite() && longitude.is_finite(),
            "store {id} has non-finite coordinates"
        );

        let is_successful = match self.success {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64() == Some(1.0),
            _ => false,
        };

        Ok(StoreMarker {
            id,
            latitude,
            longitude,
            is_successful,
        })
    }
}

/// Decodes the store list, skipping rows that do not describe a placeable marker.
pub fn parse_store_records(rows: Vec<Value>) -> Vec<StoreMarker> {
    let total = rows.len();
    let mut markers = Vec::with_capacity(total);
    let mut skipped: usize = 0;

    for (idx, row) in rows.into_iter().enumerate() {
        let parsed = serde_json::from_value::<StoreRecord>(row)
            .context("store record has unexpected shape")
            .and_then(StoreRecord::validate_and_into_marker);
        match parsed {
            Ok(marker) => markers.push(marker),
            Err(err) => {
                skipped += 1;
                tracing::warn!(idx, error = %err, "skipping malformed store record");
            }
        }
    }

    if skipped > 0 {
        tracing::info!(total, skipped, kept = markers.len(), "store list decoded with skips");
    }
    markers
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesHistoryResponse {
    pub tienda_id: i64,
    pub historial_ventas: Vec<SalesHistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesHistoryEntry {
    pub mes_id: i64,
    pub venta_total: f64,
}

impl SalesHistoryResponse {
    pub fn into_periods(self) -> Vec<SalesPeriod> {
        self.historial_ventas
            .into_iter()
            .map(|e| SalesPeriod {
                period_code: e.mes_id,
                total_sales: e.venta_total,
            })
            .collect()
    }
}

/// Body of the recommendation proxy call. Structured so the proxy owns the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequestBody {
    pub exito: String,
    pub resultado_optimizado: OptimizedResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponseBody {
    pub recomendacion: String,
}
