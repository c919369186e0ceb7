use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMarker {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_successful: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesPeriod {
    /// `YYYYMM`.
    pub period_code: i64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesPerformance {
    #[serde(rename = "venta_ultimo_mes")]
    pub last_month: f64,
    #[serde(rename = "promedio_6_meses_previos")]
    pub six_month_average: f64,
    #[serde(rename = "venta_maxima_historica")]
    pub historical_max: f64,
    #[serde(rename = "venta_minima_historica")]
    pub historical_min: f64,
    #[serde(rename = "comparativo_vs_promedio_pct", default)]
    pub vs_average_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemographicProfile {
    #[serde(rename = "poblacion_total")]
    pub total_population: f64,
    #[serde(rename = "total_hogares")]
    pub total_households: f64,
    #[serde(rename = "poblacion_economicamente_activa")]
    pub economically_active: f64,
    #[serde(rename = "viviendas_con_automovil")]
    pub households_with_car: f64,
}
