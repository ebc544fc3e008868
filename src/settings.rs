//! Application settings
//!
//! Read once at startup from an optional JSON blob on the page; never written back.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tessellation detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    #[serde(alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "Medium", alias = "med")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Case-insensitive name lookup
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        [Self::Low, Self::Medium, Self::High]
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("med").then_some(Self::Medium))
    }

    /// Most vertices tessellated per frame; strokes past the cap are dropped
    pub fn max_vertices(&self) -> usize {
        match self {
            Self::Low => 200_000,
            Self::Medium => 1_000_000,
            Self::High => 4_000_000,
        }
    }

    /// Low draws every lane solid
    pub fn dashes_enabled(&self) -> bool {
        !matches!(self, Self::Low)
    }
}

/// Tunables for the grid, input handling and rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Lane count at startup
    pub default_dimension: usize,
    /// Above this many lanes the pattern dump is refreshed lazily
    pub soft_dimension_ceiling: usize,
    /// Quiet window for debounced display updates (ms)
    pub debounce_ms: f64,
    /// Scale change per unit of wheel delta
    pub wheel_zoom_sensitivity: f32,
    /// Visible grid line count above which the grid becomes a flat fill
    pub grid_line_budget: i64,
    /// Drag to pan
    pub drag_enabled: bool,
    /// Wheel to zoom
    pub zoom_enabled: bool,
    /// Render quality
    pub quality: QualityPreset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_dimension: DEFAULT_DIMENSION,
            soft_dimension_ceiling: SOFT_DIMENSION_CEILING,
            debounce_ms: DEBOUNCE_MS,
            wheel_zoom_sensitivity: WHEEL_ZOOM_SENSITIVITY,
            grid_line_budget: GRID_LINE_BUDGET,
            drag_enabled: true,
            zoom_enabled: true,
            quality: QualityPreset::default(),
        }
    }
}

impl Settings {
    /// Parse settings JSON, falling back to defaults (with a warning) on error.
    ///
    /// Missing fields take their defaults; the dimension is clamped to `1..=MAX_DIMENSION`.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.default_dimension = settings.default_dimension.clamp(1, MAX_DIMENSION);
                log::info!("Loaded settings (quality {})", settings.quality.as_str());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings JSON, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Element id of the optional settings blob
    const ELEMENT_ID: &'static str = "railgun-settings";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => Self::from_json(&json),
            _ => {
                log::info!("No #{} element, using default settings", Self::ELEMENT_ID);
                Self::default()
            }
        }
    }

    /// Outside the browser there is no page to read from
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No #{} element outside the browser", Self::ELEMENT_ID);
        Settings::default()
    }
}
