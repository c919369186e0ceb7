//! End-to-end evaluation of a candidate location.
//!
//! Each call to [`EvaluationOrchestrator::evaluate`] is tagged with a sequence number. Every
//! transition is published as a whole [`EvaluationView`] snapshot, and a snapshot is only
//! published while its sequence number is still the latest issued. A slow response to an older
//! submission is therefore returned to its own caller but never reaches the display.
//!
//! Phases: `Idle → Validating → Scoring → (ScoringFailed | RecommendationPending →
//! RecommendationReady | RecommendationFailed)`. A score without optimized parameters goes
//! straight back to `Idle`. Every phase accepts a new submission.

use crate::backend::StoreBackend;
use crate::config::Settings;
use crate::domain::evaluation::{EvaluationRequest, EvaluationResult, FocusRequest};
use crate::domain::recommendation::{RecommendationInput, FALLBACK_RECOMMENDATION};
use crate::error::{ClientError, ValidationError};
use crate::llm::RecommendationClient;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const MISSING_COORDINATES_MESSAGE: &str = "Por favor, introduce latitud y longitud.";
pub const SCORING_FAILED_MESSAGE: &str =
    "Error al conectar con el servidor. Por favor, intenta nuevamente.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPhase {
    #[default]
    Idle,
    Validating,
    Scoring,
    ScoringFailed,
    RecommendationPending,
    RecommendationReady,
    RecommendationFailed,
}

impl EvaluationPhase {
    /// A call is still pending for this phase.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            EvaluationPhase::Validating
                | EvaluationPhase::Scoring
                | EvaluationPhase::RecommendationPending
        )
    }
}

/// Display state for one submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationView {
    pub sequence: u64,
    pub phase: EvaluationPhase,
    /// Scoring in progress.
    pub loading: bool,
    /// Scoring done, recommendation text still pending.
    pub recommendation_loading: bool,
    pub result: Option<EvaluationResult>,
    /// User-facing message.
    pub error: Option<String>,
}

impl EvaluationView {
    fn new(sequence: u64, phase: EvaluationPhase) -> Self {
        Self {
            sequence,
            phase,
            loading: matches!(phase, EvaluationPhase::Validating | EvaluationPhase::Scoring),
            recommendation_loading: phase == EvaluationPhase::RecommendationPending,
            result: None,
            error: None,
        }
    }

    fn with_result(mut self, result: &EvaluationResult) -> Self {
        self.result = Some(result.clone());
        self
    }

    fn with_error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub scoring: Duration,
    pub recommendation: Duration,
}

impl Timeouts {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            scoring: settings.backend_timeout,
            recommendation: settings.recommendation_timeout,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub struct EvaluationOrchestrator {
    backend: Arc<dyn StoreBackend>,
    recommender: Arc<dyn RecommendationClient>,
    timeouts: Timeouts,
    issued: AtomicU64,
    view: watch::Sender<EvaluationView>,
    focus: watch::Sender<Option<FocusRequest>>,
}

impl EvaluationOrchestrator {
    pub fn new(
        backend: Arc<dyn StoreBackend>,
        recommender: Arc<dyn RecommendationClient>,
        timeouts: Timeouts,
    ) -> Self {
        let (view, _) = watch::channel(EvaluationView::default());
        let (focus, _) = watch::channel(None);
        Self {
            backend,
            recommender,
            timeouts,
            issued: AtomicU64::new(0),
            view,
            focus,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EvaluationView> {
        self.view.subscribe()
    }

    pub fn subscribe_focus(&self) -> watch::Receiver<Option<FocusRequest>> {
        self.focus.subscribe()
    }

    pub fn view(&self) -> EvaluationView {
        self.view.borrow().clone()
    }

    pub fn focus(&self) -> Option<FocusRequest> {
        *self.focus.borrow()
    }

    /// Scores `request` and, when the service suggests a configuration, annotates it with a
    /// generated recommendation.
    ///
    /// Only input validation fails this call. Scoring failures come back as the pessimistic
    /// default result (with the error shown in the view), and recommendation failures only
    /// replace the recommendation text with a fallback.
    pub async fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> Result<EvaluationResult, ValidationError> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(EvaluationView::new(seq, EvaluationPhase::Validating));

        let coords = match request.validate() {
            Ok(coords) => coords,
            Err(err) => {
                tracing::info!(seq, "evaluation rejected before scoring: {err}");
                self.publish(
                    EvaluationView::new(seq, EvaluationPhase::Idle)
                        .with_error(MISSING_COORDINATES_MESSAGE),
                );
                return Err(err);
            }
        };

        // The map starts moving while the score is still pending.
        self.publish_focus(seq, FocusRequest::at(coords));
        self.publish(EvaluationView::new(seq, EvaluationPhase::Scoring));

        tracing::info!(
            seq,
            latitude = coords.latitude,
            longitude = coords.longitude,
            environment = %request.environment,
            "scoring location"
        );

        let scored = bounded(
            self.timeouts.scoring,
            self.backend.evaluate_location(coords, request.environment),
            |detail| ClientError::network("/api/evaluar", detail),
        )
        .await;

        let mut result = match scored {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(seq, kind = err.kind(), error = %err, "scoring failed; showing pessimistic default");
                let result = EvaluationResult::pessimistic();
                self.publish(
                    EvaluationView::new(seq, EvaluationPhase::ScoringFailed)
                        .with_result(&result)
                        .with_error(SCORING_FAILED_MESSAGE),
                );
                return Ok(result);
            }
        };
        result.recommendation_text = None;

        let Some(optimized_parameters) = result.optimized_parameters else {
            self.publish(EvaluationView::new(seq, EvaluationPhase::Idle).with_result(&result));
            return Ok(result);
        };

        self.publish(
            EvaluationView::new(seq, EvaluationPhase::RecommendationPending).with_result(&result),
        );

        let input = RecommendationInput {
            success_label: result.success_label,
            optimized_parameters,
        };
        let generated = bounded(
            self.timeouts.recommendation,
            async {
                self.recommender
                    .generate_recommendation(&input)
                    .await
                    .map_err(|e| ClientError::Recommendation(format!("{e:#}")))
            },
            ClientError::Recommendation,
        )
        .await;

        let phase = match generated {
            Ok(text) => {
                result.recommendation_text = Some(text);
                EvaluationPhase::RecommendationReady
            }
            Err(err) => {
                tracing::warn!(
                    seq,
                    provider = ?self.recommender.provider(),
                    error = %err,
                    "recommendation failed; using fallback text"
                );
                result.recommendation_text = Some(FALLBACK_RECOMMENDATION.to_string());
                EvaluationPhase::RecommendationFailed
            }
        };

        self.publish(EvaluationView::new(seq, phase).with_result(&result));
        Ok(result)
    }

    fn is_current(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    fn publish(&self, next: EvaluationView) -> bool {
        let seq = next.sequence;
        let published = self.view.send_if_modified(|view| {
            if !self.is_current(seq) {
                return false;
            }
            *view = next;
            true
        });
        if !published {
            tracing::debug!(seq, "discarding stale evaluation update");
        }
        published
    }

    fn publish_focus(&self, seq: u64, focus: FocusRequest) {
        self.focus.send_if_modified(|current| {
            if !self.is_current(seq) {
                return false;
            }
            *current = Some(focus);
            true
        });
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ClientError>>,
    on_timeout: impl FnOnce(String) -> ClientError,
) -> Result<T, ClientError> {
    match tokio::time::timeout(limit, call).await {
        Ok(res) => res,
        Err(_) => Err(on_timeout(format!("timed out after {limit:?}"))),
    }
}
