//! In-memory [`StoreBackend`] for unit tests.

use crate::backend::StoreBackend;
use crate::domain::evaluation::{Coordinates, Environment, EvaluationResult, SuccessLabel};
use crate::domain::store::{DemographicProfile, SalesPerformance, SalesPeriod, StoreMarker};
use crate::error::ClientError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub fail_stores: bool,
    /// Scoring reply per submitted latitude; other latitudes score `buena`, 85%.
    pub scores: Vec<(f64, Result<EvaluationResult, String>)>,
    /// Scoring at this latitude waits for the notify before replying.
    pub gate: Option<(f64, Arc<Notify>)>,
    pub hang_scoring: bool,
    pub history: Vec<SalesPeriod>,
    pub fail_demographics: bool,
    pub calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeBackend {
    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, op: &'static str) {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
    }
}

#[async_trait::async_trait]
impl StoreBackend for FakeBackend {
    async fn list_stores(&self) -> Result<Vec<StoreMarker>, ClientError> {
        self.record("list_stores");
        if self.fail_stores {
            return Err(ClientError::network("/api/tiendas", "connection refused"));
        }
        Ok(vec![
            StoreMarker {
                id: "1".to_string(),
                latitude: 25.67,
                longitude: -100.31,
                is_successful: true,
            },
            StoreMarker {
                id: "2".to_string(),
                latitude: 25.70,
                longitude: -100.20,
                is_successful: false,
            },
        ])
    }

    async fn evaluate_location(
        &self,
        coords: Coordinates,
        _environment: Environment,
    ) -> Result<EvaluationResult, ClientError> {
        self.record("evaluate_location");
        if self.hang_scoring {
            std::future::pending::<()>().await;
        }
        if let Some((lat, notify)) = &self.gate {
            if *lat == coords.latitude {
                notify.notified().await;
            }
        }

        let reply = self
            .scores
            .iter()
            .find(|(lat, _)| *lat == coords.latitude)
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Ok(result)) => Ok(result),
            Some(Err(detail)) => Err(ClientError::network("/api/evaluar", detail)),
            None => Ok(EvaluationResult {
                success_label: SuccessLabel::Good,
                percent_gap: 85.0,
                optimized_parameters: None,
                recommendation_text: None,
            }),
        }
    }

    async fn sales_history(&self, _store_id: i64) -> Result<Vec<SalesPeriod>, ClientError> {
        self.record("sales_history");
        Ok(self.history.clone())
    }

    async fn sales_performance(&self, _store_id: i64) -> Result<SalesPerformance, ClientError> {
        self.record("sales_performance");
        Ok(SalesPerformance {
            last_month: 759_744.0,
            six_month_average: 1_985_931.0,
            historical_max: 2_276_754.0,
            historical_min: 759_744.0,
            vs_average_pct: Some(61.7),
        })
    }

    async fn demographic_profile(
        &self,
        _store_id: i64,
    ) -> Result<DemographicProfile, ClientError> {
        self.record("demographic_profile");
        if self.fail_demographics {
            return Err(ClientError::network("/api/perfil-demografico/33", "HTTP 500"));
        }
        Ok(DemographicProfile {
            total_population: 2_934.0,
            total_households: 850.0,
            economically_active: 1_435.0,
            households_with_car: 732.0,
        })
    }
}
