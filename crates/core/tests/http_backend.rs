//! `HttpStoreBackend` and `ProxyRecommendationClient` against a local `wiremock` server.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ubica_core::backend::{HttpStoreBackend, StoreBackend};
use ubica_core::domain::evaluation::{
    Coordinates, Environment, OptimizedParameters, SuccessLabel,
};
use ubica_core::domain::recommendation::RecommendationInput;
use ubica_core::llm::error::LlmDiagnosticsError;
use ubica_core::llm::proxy::ProxyRecommendationClient;
use ubica_core::llm::RecommendationClient;
use ubica_core::sales;

fn backend(server: &MockServer) -> HttpStoreBackend {
    HttpStoreBackend::with_base_url(&server.uri(), Duration::from_secs(5))
        .expect("failed to build test backend")
}

fn coords() -> Coordinates {
    Coordinates {
        latitude: 2.569107,
        longitude: -100.21261,
    }
}

#[tokio::test]
async fn list_stores_keeps_valid_rows_only() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tiendas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "TIENDA_ID": 101, "LATITUD_NUM": 25.67, "LONGITUD_NUM": -100.31, "EXITO": 1, "PLAZA_CVE": 3 },
            { "TIENDA_ID": "A-7", "LATITUD_NUM": 25.70, "LONGITUD_NUM": -100.29, "EXITO": 0 },
            { "TIENDA_ID": 102, "LATITUD_NUM": null, "LONGITUD_NUM": -100.3, "EXITO": 1 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let markers = backend(&server).list_stores().await.unwrap();

    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].id, "101");
    assert!(markers[0].is_successful);
    assert_eq!(markers[1].id, "A-7");
    assert!(!markers[1].is_successful);
}

#[tokio::test]
async fn evaluate_posts_uppercase_contract() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/evaluar"))
        .and(body_json(json!({
            "LATITUD_NUM": 2.569107,
            "LONGITUD_NUM": -100.21261,
            "ENTORNO_DES": "Peatonal"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "porciento": 12.5,
            "exito": "buena",
            "detalles": {
                "resultado_optimizado": {
                    "mts2_optimo": 118.4,
                    "puertas_refrigeracion_optimo": 6.6,
                    "cajones_estacionamiento_optimo": 2.2,
                    "probabilidad_optima": 0.91
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server)
        .evaluate_location(coords(), Environment::Peatonal)
        .await
        .unwrap();

    assert_eq!(result.success_label, SuccessLabel::Good);
    assert_eq!(result.percent_gap, 12.5);
    let params = result.optimized_parameters.expect("parameters present");
    assert_eq!(params.refrigeration_doors, 7);
    assert_eq!(params.parking_spots, 2);
    assert_eq!(result.recommendation_text, None);
}

#[tokio::test]
async fn evaluate_without_details_has_no_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/evaluar"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "porciento": 42, "exito": "mejorable" })),
        )
        .mount(&server)
        .await;

    let result = backend(&server)
        .evaluate_location(coords(), Environment::Hogar)
        .await
        .unwrap();

    assert_eq!(result.success_label, SuccessLabel::Improvable);
    assert_eq!(result.percent_gap, 42.0);
    assert!(result.optimized_parameters.is_none());
}

#[tokio::test]
async fn server_error_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/evaluar"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .evaluate_location(coords(), Environment::Base)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "network");
    let msg = err.to_string();
    assert!(msg.contains("500"), "unexpected message: {msg}");
    assert!(msg.contains("model not loaded"), "unexpected message: {msg}");
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tiendas"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).list_stores().await.unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn unknown_success_label_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/evaluar"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "porciento": 3, "exito": "regular" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .evaluate_location(coords(), Environment::Receso)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn slow_backend_times_out_as_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tiendas"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let backend = HttpStoreBackend::with_base_url(&server.uri(), Duration::from_millis(100))
        .expect("failed to build test backend");
    let err = backend.list_stores().await.unwrap_err();

    assert_eq!(err.kind(), "network");
    assert!(err.to_string().contains("timed out"), "unexpected: {err}");
}

#[tokio::test]
async fn sales_history_feeds_the_chart_series() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/historial-ventas/33"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tienda_id": 33,
            "historial_ventas": [
                { "mes_id": 202311, "venta_total": 910000.0 },
                { "mes_id": 202312, "venta_total": 1250000.5 },
                { "mes_id": 202401, "venta_total": 870000.0 }
            ]
        })))
        .mount(&server)
        .await;

    let periods = backend(&server).sales_history(33).await.unwrap();
    let series = sales::transform(&periods).unwrap();

    assert_eq!(series.labels, vec!["nov 2023", "dic 2023", "ene 2024"]);
    assert_eq!(series.values, vec![910000.0, 1250000.5, 870000.0]);
}

#[tokio::test]
async fn performance_and_demographics_decode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/desempeno-ventas/33"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "venta_ultimo_mes": 759744.0,
            "promedio_6_meses_previos": 469875.5,
            "venta_maxima_historica": 1985931.0,
            "venta_minima_historica": 120.0,
            "comparativo_vs_promedio_pct": null
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/perfil-demografico/33"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "poblacion_total": 2934,
            "total_hogares": 812,
            "poblacion_economicamente_activa": 1420,
            "viviendas_con_automovil": 390
        })))
        .mount(&server)
        .await;

    let backend = backend(&server);
    let performance = backend.sales_performance(33).await.unwrap();
    let demographics = backend.demographic_profile(33).await.unwrap();

    assert_eq!(performance.last_month, 759744.0);
    assert_eq!(performance.vs_average_pct, None);
    assert_eq!(demographics.total_population, 2934.0);
    assert_eq!(demographics.households_with_car, 390.0);
}

fn recommendation_input() -> RecommendationInput {
    RecommendationInput {
        success_label: SuccessLabel::Improvable,
        optimized_parameters: OptimizedParameters {
            area_m2: 110.0,
            refrigeration_doors: 6,
            parking_spots: 2,
            optimal_probability: 0.8,
        },
    }
}

#[tokio::test]
async fn proxy_posts_structured_input() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/recomendacion"))
        .and(body_json(json!({
            "exito": "mejorable",
            "resultado_optimizado": {
                "mts2_optimo": 110.0,
                "puertas_refrigeracion_optimo": 6.0,
                "cajones_estacionamiento_optimo": 2.0,
                "probabilidad_optima": 0.8
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recomendacion": "  1. Amplía el área de refrigeración.\n"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        ProxyRecommendationClient::with_url(&server.uri(), "api/recomendacion", Duration::from_secs(5))
            .unwrap();
    let text = client
        .generate_recommendation(&recommendation_input())
        .await
        .unwrap();

    assert_eq!(text, "1. Amplía el área de refrigeración.");
}

#[tokio::test]
async fn proxy_failure_keeps_diagnostics() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/recomendacion"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream overloaded"))
        .mount(&server)
        .await;

    let client =
        ProxyRecommendationClient::with_url(&server.uri(), "/api/recomendacion", Duration::from_secs(5))
            .unwrap();
    let err = client
        .generate_recommendation(&recommendation_input())
        .await
        .unwrap_err();

    let diag = err
        .downcast_ref::<LlmDiagnosticsError>()
        .expect("diagnostics error");
    assert_eq!(diag.stage, "http");
    assert_eq!(diag.status, Some(502));
    assert_eq!(diag.raw_output.as_deref(), Some("upstream overloaded"));
}

#[tokio::test]
async fn proxy_empty_text_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/recomendacion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "recomendacion": "   " })))
        .mount(&server)
        .await;

    let client =
        ProxyRecommendationClient::with_url(&server.uri(), "/api/recomendacion", Duration::from_secs(5))
            .unwrap();
    assert!(client
        .generate_recommendation(&recommendation_input())
        .await
        .is_err());
}
