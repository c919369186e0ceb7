use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ubica_core::domain::contract::{RecommendationRequestBody, RecommendationResponseBody};
use ubica_core::domain::recommendation::RecommendationInput;
use ubica_core::llm::anthropic::AnthropicClient;
use ubica_core::llm::RecommendationClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = ubica_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let llm: Option<Arc<dyn RecommendationClient>> = match AnthropicClient::from_settings(&settings)
    {
        Ok(client) => Some(Arc::new(client) as Arc<dyn RecommendationClient>),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "recommendation client unavailable; starting API in degraded mode");
            None
        }
    };

    let state = AppState { llm };
    let app = router(state, &settings.recommendation_path);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, path = %settings.recommendation_path, "recommendation proxy listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.layer(TraceLayer::new_for_http()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState, recommendation_path: &str) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(recommendation_path, post(recommend))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    llm: Option<Arc<dyn RecommendationClient>>,
}

async fn recommend(
    State(state): State<AppState>,
    Json(body): Json<RecommendationRequestBody>,
) -> Result<Json<RecommendationResponseBody>, StatusCode> {
    let Some(llm) = &state.llm else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let input = RecommendationInput::try_from(body).map_err(|e| {
        tracing::info!(error = %e, "rejecting recommendation request");
        StatusCode::UNPROCESSABLE_ENTITY
    })?;

    let recomendacion = llm.generate_recommendation(&input).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %format!("{e:#}"), provider = ?llm.provider(), "recommendation generation failed");
        StatusCode::BAD_GATEWAY
    })?;

    Ok(Json(RecommendationResponseBody { recomendacion }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &ubica_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
