use std::path::Path;

use anyhow::Context as _;

use crate::flow::params::{DurationClamp, HydraulicInputs};
use crate::foundation::error::{FlowError, FlowResult};
use crate::geometry::source::DEFAULT_STROKE_WIDTH_PX;
use crate::motion::placement::{PhaseSpacing, WiggleConfig};
use crate::sampling::resample::DEFAULT_POINT_COUNT;
use crate::sampling::sampler::DEFAULT_OVERSAMPLE;

/// Names accepted by [`ScatterConfig::preset`].
pub const PRESET_NAMES: &[&str] = &["default", "trent", "leen-canal"];

/// Everything a scatter run can be tuned with.
///
/// Every section has defaults, so an empty JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Waterway and composition-scale inputs.
    pub hydraulics: HydraulicInputs,
    /// Loop-duration bounds.
    pub durations: DurationClamp,
    /// Oversampling and resampling resolution.
    pub sampling: SamplingConfig,
    /// Lateral wiggle settings.
    pub wiggle: WiggleConfig,
    /// Phase-offset convention.
    pub spacing: PhaseSpacing,
    /// Particle sizing and appearance.
    pub style: ParticleStyle,
    /// Global seed for per-object random streams.
    pub seed: u64,
    /// Upper bound on the derived object count.
    pub max_object_count: u32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            hydraulics: HydraulicInputs::default(),
            durations: DurationClamp::default(),
            sampling: SamplingConfig::default(),
            wiggle: WiggleConfig::default(),
            spacing: PhaseSpacing::default(),
            style: ParticleStyle::default(),
            seed: 0,
            max_object_count: 100_000,
        }
    }
}

/// Path sampling resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Parametric subdivisions per Bezier segment.
    pub oversample: usize,
    /// Number of arc-length-uniform points to keep.
    pub point_count: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            oversample: DEFAULT_OVERSAMPLE,
            point_count: DEFAULT_POINT_COUNT,
        }
    }
}

/// Particle sizing relative to the source stroke.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParticleStyle {
    /// Stroke width to use instead of the one found on the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width_px: Option<f64>,
    /// Stroke width when neither the override nor the source provide one.
    pub fallback_stroke_width_px: f64,
    /// Particle diameter as a fraction of the stroke width.
    pub size_fraction: f64,
    /// Fill colour, straight RGB8.
    pub fill_rgb8: [u8; 3],
    /// Particle layer lifetime, in loops.
    pub lifetime_loops: f64,
}

impl Default for ParticleStyle {
    fn default() -> Self {
        Self {
            stroke_width_px: None,
            fallback_stroke_width_px: DEFAULT_STROKE_WIDTH_PX,
            size_fraction: 0.25,
            fill_rgb8: [0, 179, 219],
            lifetime_loops: 10.0,
        }
    }
}

/// Particle style with the stroke width settled.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedStyle {
    /// Stroke width the band is derived from.
    pub stroke_width_px: f64,
    /// Particle diameter.
    pub particle_size_px: f64,
    /// Width available to particle centres, `stroke - size`.
    pub allowed_band_px: f64,
    /// Fill colour, straight RGB8.
    pub fill_rgb8: [u8; 3],
    /// Seconds a particle layer should stay alive.
    pub lifetime_secs: f64,
}

impl ParticleStyle {
    /// Settle the stroke width (override, then source, then fallback) and
    /// derive the particle size and allowed band from it.
    pub fn resolve(&self, source_stroke: Option<f64>, loop_duration_secs: f64) -> ResolvedStyle {
        let usable = |w: Option<f64>| w.filter(|w| w.is_finite() && *w > 0.0);
        let stroke_width_px = usable(self.stroke_width_px)
            .or_else(|| usable(source_stroke))
            .unwrap_or(self.fallback_stroke_width_px);
        let particle_size_px = stroke_width_px * self.size_fraction;
        ResolvedStyle {
            stroke_width_px,
            particle_size_px,
            allowed_band_px: (stroke_width_px - particle_size_px).max(0.0),
            fill_rgb8: self.fill_rgb8,
            lifetime_secs: self.lifetime_loops * loop_duration_secs,
        }
    }
}

impl ScatterConfig {
    /// Built-in parameter sets.
    ///
    /// `default` and `trent` are the river settings (0.4 m/s, 80 m³/s);
    /// `leen-canal` is the canal case (1 m/s, 0.7 m³/s).
    pub fn preset(name: &str) -> FlowResult<Self> {
        let mut cfg = Self::default();
        match name {
            "default" | "trent" => {}
            "leen-canal" => {
                cfg.hydraulics.velocity_mps = 1.0;
                cfg.hydraulics.discharge_cumecs = 0.7;
            }
            other => {
                return Err(FlowError::validation(format!(
                    "unknown preset '{other}' (expected one of: {})",
                    PRESET_NAMES.join(", ")
                )));
            }
        }
        Ok(cfg)
    }

    /// Parse a config from JSON text and validate it.
    pub fn from_json_str(s: &str) -> FlowResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| FlowError::serde(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: &Path) -> FlowResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check everything that would otherwise only fail deep inside a run.
    pub fn validate(&self) -> FlowResult<()> {
        if self.sampling.oversample == 0 {
            return Err(FlowError::validation("sampling.oversample must be >= 1"));
        }
        if self.sampling.point_count < 2 {
            return Err(FlowError::validation("sampling.point_count must be >= 2"));
        }
        self.durations.validate()?;
        self.wiggle.validate()?;
        self.spacing.validate()?;

        let h = &self.hydraulics;
        let fields = [
            ("velocity_mps", h.velocity_mps),
            ("discharge_cumecs", h.discharge_cumecs),
            ("comp_scale_px_per_km", h.comp_scale_px_per_km),
            ("particles_per_km_per_cumec", h.particles_per_km_per_cumec),
            ("time_factor", h.time_factor),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(FlowError::validation(format!(
                    "hydraulics.{name} must be finite and >= 0, got {v}"
                )));
            }
        }

        let s = &self.style;
        if !s.fallback_stroke_width_px.is_finite() || s.fallback_stroke_width_px <= 0.0 {
            return Err(FlowError::validation(
                "style.fallback_stroke_width_px must be > 0",
            ));
        }
        if !(0.0..=1.0).contains(&s.size_fraction) {
            return Err(FlowError::validation(
                "style.size_fraction must be within [0, 1]",
            ));
        }
        if !s.lifetime_loops.is_finite() || s.lifetime_loops <= 0.0 {
            return Err(FlowError::validation("style.lifetime_loops must be > 0"));
        }
        if self.max_object_count == 0 {
            return Err(FlowError::validation("max_object_count must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/config.rs"]
mod tests;
