//! Map view-model: which store markers to draw, how to style them, and where the viewport
//! should be.
//!
//! Rendering is pure. [`MapViewModel::render`] describes the frame; [`MapViewModel::settle`]
//! returns the model that results once that frame's viewport animation has finished.
//!
//! Deduplication keys on the exact `(latitude, longitude)` pair and keeps the first marker in
//! input order, so the surviving `id` for a shared location is only as stable as the order the
//! backend returns stores in.

use crate::domain::evaluation::FocusRequest;
use crate::domain::store::StoreMarker;
use serde::Serialize;
use std::collections::HashSet;

pub const OVERVIEW_ZOOM: u8 = 6;
pub const BASE_RADIUS: f64 = 5.0;
pub const HIGHLIGHT_RADIUS: f64 = 9.0;
pub const BASE_OPACITY: f64 = 0.7;
pub const HIGHLIGHT_OPACITY: f64 = 1.0;
pub const FOCUS_ANIMATION_MS: u64 = 1_500;
pub const LOADING_MESSAGE: &str = "Cargando mapa...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Green,
    Red,
}

impl MarkerColor {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerColor::Green => "green",
            MarkerColor::Red => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: MarkerColor,
    pub radius: f64,
    pub opacity: f64,
    pub highlighted: bool,
    pub popup: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

impl From<FocusRequest> for Viewport {
    fn from(f: FocusRequest) -> Self {
        Self {
            latitude: f.latitude,
            longitude: f.longitude,
            zoom: f.zoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewportPlan {
    Static(Viewport),
    FlyTo {
        from: Viewport,
        to: Viewport,
        duration_ms: u64,
    },
}

impl ViewportPlan {
    pub fn target(&self) -> Viewport {
        match *self {
            ViewportPlan::Static(v) => v,
            ViewportPlan::FlyTo { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderPlan {
    Loading {
        message: &'static str,
    },
    Map {
        viewport: ViewportPlan,
        markers: Vec<MarkerStyle>,
    },
}

impl RenderPlan {
    pub fn is_loading(&self) -> bool {
        matches!(self, RenderPlan::Loading { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapViewModel {
    highlighted_id: Option<String>,
    current: Option<Viewport>,
}

impl MapViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker with this store id is drawn larger and fully opaque.
    pub fn with_highlight(mut self, store_id: impl Into<String>) -> Self {
        self.highlighted_id = Some(store_id.into());
        self
    }

    pub fn current_viewport(&self) -> Option<Viewport> {
        self.current
    }

    pub fn render(&self, markers: &[StoreMarker], focus: Option<&FocusRequest>) -> RenderPlan {
        let Some(overview) = overview_viewport(markers) else {
            return RenderPlan::Loading {
                message: LOADING_MESSAGE,
            };
        };

        let here = self.current.unwrap_or(overview);
        let viewport = match focus {
            None => ViewportPlan::Static(here),
            Some(f) => {
                let to = Viewport::from(*f);
                if self.current == Some(to) {
                    ViewportPlan::Static(to)
                } else {
                    ViewportPlan::FlyTo {
                        from: here,
                        to,
                        duration_ms: FOCUS_ANIMATION_MS,
                    }
                }
            }
        };

        let markers = dedupe_by_coordinates(markers)
            .into_iter()
            .map(|m| self.style(m))
            .collect();

        RenderPlan::Map { viewport, markers }
    }

    /// Model after the plan's viewport transition completes.
    pub fn settle(&self, plan: &RenderPlan) -> Self {
        let mut next = self.clone();
        if let RenderPlan::Map { viewport, .. } = plan {
            next.current = Some(viewport.target());
        }
        next
    }

    fn style(&self, marker: StoreMarker) -> MarkerStyle {
        let highlighted = self.highlighted_id.as_deref() == Some(marker.id.as_str());
        let color = if marker.is_successful {
            MarkerColor::Green
        } else {
            MarkerColor::Red
        };
        let (radius, opacity) = if highlighted {
            (HIGHLIGHT_RADIUS, HIGHLIGHT_OPACITY)
        } else {
            (BASE_RADIUS, BASE_OPACITY)
        };

        MarkerStyle {
            popup: format!("Tienda: {}", marker.id),
            id: marker.id,
            latitude: marker.latitude,
            longitude: marker.longitude,
            color,
            radius,
            opacity,
            highlighted,
        }
    }
}

/// Keeps the first marker seen at each exact coordinate pair.
pub fn dedupe_by_coordinates(markers: &[StoreMarker]) -> Vec<StoreMarker> {
    let mut seen = HashSet::with_capacity(markers.len());
    markers
        .iter()
        .filter(|m| seen.insert(coord_key(m.latitude, m.longitude)))
        .cloned()
        .collect()
}

// Bit-level equality, with -0.0 folded into 0.0 so both spellings share a key.
fn coord_key(latitude: f64, longitude: f64) -> (u64, u64) {
    fn bits(v: f64) -> u64 {
        if v == 0.0 {
            0.0_f64.to_bits()
        } else {
            v.to_bits()
        }
    }
    (bits(latitude), bits(longitude))
}

/// Mean of every marker position at the overview zoom; `None` for an empty list.
fn overview_viewport(markers: &[StoreMarker]) -> Option<Viewport> {
    if markers.is_empty() {
        return None;
    }
    let n = markers.len() as f64;
    let (lat_sum, lon_sum) = markers
        .iter()
        .fold((0.0, 0.0), |(la, lo), m| (la + m.latitude, lo + m.longitude));

    Some(Viewport {
        latitude: lat_sum / n,
        longitude: lon_sum / n,
        zoom: OVERVIEW_ZOOM,
    })
}
