use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ubica_core::backend::{HttpStoreBackend, StoreBackend};
use ubica_core::domain::evaluation::{Environment, EvaluationRequest};
use ubica_core::insights::StoreInsights;
use ubica_core::llm::proxy::ProxyRecommendationClient;
use ubica_core::map::MapViewModel;
use ubica_core::markers::MarkerCache;
use ubica_core::orchestrator::{EvaluationOrchestrator, Timeouts};

mod output;

#[derive(Debug, Parser)]
#[command(name = "ubica", about = "Evaluate candidate store locations against the scoring backend")]
struct Args {
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a candidate location and show where the map moves.
    Evaluate {
        /// Latitude, e.g. 2.569107. Left blank, the request is rejected before any call.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        lat: String,

        /// Longitude, e.g. -100.21261.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        lon: String,

        /// Base, Hogar, Peatonal or Receso.
        #[arg(long, default_value = "Hogar")]
        entorno: Environment,
    },

    /// Show the store map plan.
    Stores {
        /// Store id to draw highlighted.
        #[arg(long)]
        highlight: Option<String>,
    },

    /// Monthly sales trend for one store.
    Sales {
        store_id: i64,
    },

    /// Sales performance, demographic profile and sales trend for one store.
    Store {
        store_id: i64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = ubica_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let backend: Arc<dyn StoreBackend> = Arc::new(HttpStoreBackend::from_settings(&settings)?);

    let res = match args.command {
        Command::Evaluate { lat, lon, entorno } => {
            let recommender = Arc::new(ProxyRecommendationClient::from_settings(&settings)?);
            let orchestrator = EvaluationOrchestrator::new(
                backend.clone(),
                recommender,
                Timeouts::from_settings(&settings),
            );
            let markers = MarkerCache::new(backend);
            evaluate(
                &orchestrator,
                &markers,
                EvaluationRequest::from_form(&lat, &lon, entorno),
                args.json,
            )
            .await
        }
        Command::Stores { highlight } => {
            let markers = MarkerCache::new(backend).markers().await;
            let mut vm = MapViewModel::new();
            if let Some(id) = highlight {
                vm = vm.with_highlight(id);
            }
            output::print_plan(&vm.render(&markers, None), args.json)
        }
        Command::Sales { store_id } => {
            let series = StoreInsights::new(backend).sales_series(store_id).await;
            output::print_series(&series, args.json)
        }
        Command::Store { store_id } => {
            let insights = StoreInsights::new(backend);
            let (report, series) =
                tokio::join!(insights.report(store_id), insights.sales_series(store_id));
            let report = report.with_context(|| format!("store {store_id} lookup failed"))?;
            output::print_store(&report, &series, args.json)
        }
    };

    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
    }
    res
}

/// Runs the evaluation while the map follows the published focus, the way the page does.
async fn evaluate(
    orchestrator: &EvaluationOrchestrator,
    markers: &MarkerCache,
    request: EvaluationRequest,
    json: bool,
) -> anyhow::Result<()> {
    let mut focus_rx = orchestrator.subscribe_focus();
    let markers = markers.markers().await;

    let vm = MapViewModel::new();
    let initial = vm.render(&markers, None);
    let vm = vm.settle(&initial);

    let evaluation = orchestrator.evaluate(request);
    tokio::pin!(evaluation);

    let mut plan = None;
    let outcome = loop {
        tokio::select! {
            res = &mut evaluation => break res,
            changed = focus_rx.changed(), if plan.is_none() => {
                if changed.is_err() {
                    break (&mut evaluation).await;
                }
                if let Some(focus) = *focus_rx.borrow_and_update() {
                    let next = vm.render(&markers, Some(&focus));
                    tracing::info!(lat = focus.latitude, lon = focus.longitude, "map retargeted");
                    plan = Some(next);
                }
            }
        }
    };

    // Focus published right before scoring finished.
    let plan = plan.or_else(|| {
        orchestrator
            .focus()
            .map(|focus| vm.render(&markers, Some(&focus)))
    });

    let view = orchestrator.view();
    match outcome {
        Ok(_) => output::print_evaluation(&view, plan.as_ref(), json),
        Err(err) => {
            output::print_evaluation(&view, None, json)?;
            Err(anyhow::Error::new(err).context("evaluation was not submitted"))
        }
    }
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
