//! Prompt text for recommendation generation. Output depends only on the input values.

use crate::domain::evaluation::SuccessLabel;
use crate::domain::recommendation::RecommendationInput;

pub fn system_prompt() -> String {
    [
        "Eres un analista de expansión de tiendas de conveniencia en México.",
        "Respondes en español, con un tono claro y profesional.",
        "Devuelve exactamente tres recomendaciones numeradas (1., 2., 3.), una por línea.",
        "Cada recomendación debe tener como máximo dos oraciones.",
        "No incluyas encabezados, markdown ni texto adicional.",
    ]
    .join("\n")
}

pub fn user_prompt(input: &RecommendationInput) -> String {
    let p = &input.optimized_parameters;
    let outlook = match input.success_label {
        SuccessLabel::Good => "buena: se espera que supere las ventas objetivo",
        SuccessLabel::Improvable => "mejorable: aún no alcanza las ventas objetivo",
    };

    format!(
        "La localización evaluada es {outlook}.\n\
El modelo sugiere la siguiente configuración física:\n\
- Área de venta: {area:.1} m²\n\
- Puertas de refrigeración: {doors}\n\
- Cajones de estacionamiento: {parking}\n\
- Probabilidad de éxito con esta configuración: {prob:.1}%\n\n\
Con base en esta información, escribe tres recomendaciones concretas para abrir la tienda en esta ubicación.",
        area = p.area_m2,
        doors = p.refrigeration_doors,
        parking = p.parking_spots,
        prob = p.optimal_probability * 100.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::OptimizedParameters;

    fn input(label: SuccessLabel) -> RecommendationInput {
        RecommendationInput {
            success_label: label,
            optimized_parameters: OptimizedParameters {
                area_m2: 118.25,
                refrigeration_doors: 8,
                parking_spots: 4,
                optimal_probability: 0.873,
            },
        }
    }

    #[test]
    fn user_prompt_is_deterministic() {
        let a = user_prompt(&input(SuccessLabel::Good));
        let b = user_prompt(&input(SuccessLabel::Good));
        assert_eq!(a, b);
    }

    #[test]
    fn user_prompt_mentions_every_parameter() {
        let text = user_prompt(&input(SuccessLabel::Improvable));
        assert!(text.contains("mejorable"));
        assert!(text.contains("118.2 m²") || text.contains("118.3 m²"));
        assert!(text.contains("Puertas de refrigeración: 8"));
        assert!(text.contains("Cajones de estacionamiento: 4"));
        assert!(text.contains("87.3%"));
    }

    #[test]
    fn label_changes_the_prompt() {
        assert_ne!(
            user_prompt(&input(SuccessLabel::Good)),
            user_prompt(&input(SuccessLabel::Improvable))
        );
    }
}
