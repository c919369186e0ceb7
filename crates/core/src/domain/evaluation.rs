use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FOCUS_ZOOM: u8 = 16;

/// Site environment submitted to the scoring service as `ENTORNO_DES`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Base,
    #[default]
    Hogar,
    Peatonal,
    Receso,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Base,
        Environment::Hogar,
        Environment::Peatonal,
        Environment::Receso,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Base => "Base",
            Environment::Hogar => "Hogar",
            Environment::Peatonal => "Peatonal",
            Environment::Receso => "Receso",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown environment {s:?} (expected Base, Hogar, Peatonal or Receso)"))
    }
}

/// Raw submission. Coordinates stay optional until [`EvaluationRequest::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub environment: Environment,
}

impl EvaluationRequest {
    pub fn new(latitude: f64, longitude: f64, environment: Environment) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            environment,
        }
    }

    /// Builds a request from form text. Blank or non-numeric input is treated as absent.
    pub fn from_form(latitude: &str, longitude: &str, environment: Environment) -> Self {
        Self {
            latitude: parse_coordinate(latitude),
            longitude: parse_coordinate(longitude),
            environment,
        }
    }

    pub fn validate(&self) -> Result<Coordinates, ValidationError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Ok(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => Err(ValidationError::MISSING_COORDINATES),
        }
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Viewport retarget published when an evaluation is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl FocusRequest {
    pub fn at(coords: Coordinates) -> Self {
        Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            zoom: DEFAULT_FOCUS_ZOOM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessLabel {
    Good,
    Improvable,
}

impl SuccessLabel {
    /// Label as the scoring service spells it.
    pub fn as_wire(self) -> &'static str {
        match self {
            SuccessLabel::Good => "buena",
            SuccessLabel::Improvable => "mejorable",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "buena" => Some(SuccessLabel::Good),
            "mejorable" => Some(SuccessLabel::Improvable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizedParameters {
    pub area_m2: f64,
    pub refrigeration_doors: u32,
    pub parking_spots: u32,
    pub optimal_probability: f64,
}

/// Direction-aware reading of `percent_gap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gap {
    /// Percent of sales still missing to reach the success threshold.
    ShortOfThreshold(f64),
    /// Percent of sales above the expected level.
    AboveExpectation(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub success_label: SuccessLabel,
    pub percent_gap: f64,
    pub optimized_parameters: Option<OptimizedParameters>,
    pub recommendation_text: Option<String>,
}

impl EvaluationResult {
    /// Result shown when scoring could not be completed.
    pub fn pessimistic() -> Self {
        Self {
            success_label: SuccessLabel::Improvable,
            percent_gap: 0.0,
            optimized_parameters: None,
            recommendation_text: None,
        }
    }

    pub fn gap(&self) -> Gap {
        match self.success_label {
            SuccessLabel::Improvable => Gap::ShortOfThreshold(self.percent_gap),
            SuccessLabel::Good => Gap::AboveExpectation(self.percent_gap),
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "La localización en esta zona es {}.",
            self.success_label.as_wire()
        )
    }

    pub fn gap_sentence(&self) -> String {
        match self.gap() {
            Gap::ShortOfThreshold(p) => {
                format!("Le falta aumentar {p}% de las ventas para el éxito")
            }
            Gap::AboveExpectation(p) => {
                format!("Supera {p}% de las ventas esperadas para el éxito")
            }
        }
    }
}
