use crate::backend::StoreBackend;
use crate::config::Settings;
use crate::domain::contract::{
    parse_store_records, EvaluateRequestBody, EvaluateResponse, SalesHistoryResponse,
};
use crate::domain::evaluation::{Coordinates, Environment, EvaluationResult};
use crate::domain::store::{DemographicProfile, SalesPerformance, SalesPeriod, StoreMarker};
use crate::error::ClientError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const STORES_PATH: &str = "/api/tiendas";
const EVALUATE_PATH: &str = "/api/evaluar";
const BODY_SNIPPET_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpStoreBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStoreBackend {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::with_base_url(&settings.backend_base_url, settings.backend_timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build backend http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let req = self.http.get(self.url(path));
        self.send_json(path, req).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = self.http.post(self.url(path)).json(body);
        self.send_json(path, req).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        path: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let res = req.send().await.map_err(|e| request_error(path, e))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| request_error(path, e))?;

        if !status.is_success() {
            return Err(ClientError::network(
                path,
                format!("HTTP {status}: {}", snippet(&text)),
            ));
        }

        let raw_json = serde_json::from_str::<Value>(&text)
            .map_err(|e| ClientError::parse(path, format!("invalid JSON ({e}): {}", snippet(&text))))?;
        serde_json::from_value::<T>(raw_json).map_err(|e| ClientError::parse(path, e))
    }
}

#[async_trait::async_trait]
impl StoreBackend for HttpStoreBackend {
    async fn list_stores(&self) -> Result<Vec<StoreMarker>, ClientError> {
        let rows: Vec<Value> = self.get_json(STORES_PATH).await?;
        let markers = parse_store_records(rows);
        tracing::debug!(count = markers.len(), "fetched store markers");
        Ok(markers)
    }

    async fn evaluate_location(
        &self,
        coords: Coordinates,
        environment: Environment,
    ) -> Result<EvaluationResult, ClientError> {
        let body = EvaluateRequestBody::new(coords, environment);
        let resp: EvaluateResponse = self.post_json(EVALUATE_PATH, &body).await?;
        resp.validate_and_into_result()
            .map_err(|e| ClientError::parse(EVALUATE_PATH, format!("{e:#}")))
    }

    async fn sales_history(&self, store_id: i64) -> Result<Vec<SalesPeriod>, ClientError> {
        let path = format!("/api/historial-ventas/{store_id}");
        let resp: SalesHistoryResponse = self.get_json(&path).await?;
        if resp.tienda_id != store_id {
            tracing::warn!(
                requested = store_id,
                returned = resp.tienda_id,
                "sales history returned for a different store id"
            );
        }
        Ok(resp.into_periods())
    }

    async fn sales_performance(&self, store_id: i64) -> Result<SalesPerformance, ClientError> {
        self.get_json(&format!("/api/desempeno-ventas/{store_id}"))
            .await
    }

    async fn demographic_profile(
        &self,
        store_id: i64,
    ) -> Result<DemographicProfile, ClientError> {
        self.get_json(&format!("/api/perfil-demografico/{store_id}"))
            .await
    }
}

fn request_error(path: &str, err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::network(path, "request timed out")
    } else {
        ClientError::network(path, err)
    }
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let backend =
            HttpStoreBackend::with_base_url("http://localhost:8000/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(backend.url(STORES_PATH), "http://localhost:8000/api/tiendas");
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let long = "ñ".repeat(BODY_SNIPPET_LEN + 10);
        assert_eq!(snippet(&long).chars().count(), BODY_SNIPPET_LEN);
        assert_eq!(snippet("short"), "short");
    }
}
