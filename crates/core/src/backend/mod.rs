#[cfg(test)]
pub(crate) mod fake;
pub mod http;

use crate::domain::evaluation::{Coordinates, Environment, EvaluationResult};
use crate::domain::store::{DemographicProfile, SalesPerformance, SalesPeriod, StoreMarker};
use crate::error::ClientError;

pub use http::HttpStoreBackend;

/// Calls offered by the scoring backend.
#[async_trait::async_trait]
pub trait StoreBackend: Send + Sync {
    async fn list_stores(&self) -> Result<Vec<StoreMarker>, ClientError>;

    async fn evaluate_location(
        &self,
        coords: Coordinates,
        environment: Environment,
    ) -> Result<EvaluationResult, ClientError>;

    async fn sales_history(&self, store_id: i64) -> Result<Vec<SalesPeriod>, ClientError>;

    async fn sales_performance(&self, store_id: i64) -> Result<SalesPerformance, ClientError>;

    async fn demographic_profile(&self, store_id: i64)
        -> Result<DemographicProfile, ClientError>;
}
