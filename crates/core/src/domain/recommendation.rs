use crate::domain::contract::{OptimizedResult, RecommendationRequestBody};
use crate::domain::evaluation::{OptimizedParameters, SuccessLabel};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Text shown when the recommendation could not be generated.
pub const FALLBACK_RECOMMENDATION: &str =
    "No fue posible generar recomendaciones en este momento. Intenta nuevamente más tarde.";

/// Everything the recommendation generator is allowed to see about an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationInput {
    pub success_label: SuccessLabel,
    pub optimized_parameters: OptimizedParameters,
}

impl RecommendationInput {
    pub fn to_request_body(&self) -> RecommendationRequestBody {
        RecommendationRequestBody {
            exito: self.success_label.as_wire().to_string(),
            resultado_optimizado: OptimizedResult::from(&self.optimized_parameters),
        }
    }
}

impl TryFrom<RecommendationRequestBody> for RecommendationInput {
    type Error = anyhow::Error;

    fn try_from(body: RecommendationRequestBody) -> anyhow::Result<Self> {
        let success_label = SuccessLabel::from_wire(&body.exito)
            .with_context(|| format!("unknown exito label: {:?}", body.exito))?;
        let optimized_parameters = body.resultado_optimizado.validate_and_into_parameters()?;
        Ok(Self {
            success_label,
            optimized_parameters,
        })
    }
}
