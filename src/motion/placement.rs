use crate::foundation::error::{FlowError, FlowResult};
use crate::foundation::math::Rng64;

/// How per-object phase offsets are spaced around the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum PhaseSpacing {
    /// `index / object_count`: objects evenly fill one loop.
    #[default]
    Even,
    /// `index / capacity`: objects keep the spacing of a fixed nominal set, so a
    /// subset stays spatially consistent with the full design.
    NominalCapacity {
        /// Nominal number of objects, at least 1.
        capacity: u32,
    },
}

impl PhaseSpacing {
    /// Phase offset in `[0, 1)` for object `index` out of `count`.
    pub fn offset(self, index: u32, count: u32) -> f64 {
        let denom = match self {
            Self::Even => count.max(1),
            Self::NominalCapacity { capacity } => capacity.max(1),
        };
        (f64::from(index) / f64::from(denom)).rem_euclid(1.0)
    }

    /// Reject a zero capacity.
    pub fn validate(self) -> FlowResult<()> {
        match self {
            Self::NominalCapacity { capacity: 0 } => Err(FlowError::validation(
                "nominal phase capacity must be >= 1",
            )),
            _ => Ok(()),
        }
    }
}

/// Lateral wiggle settings shared by all objects.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WiggleConfig {
    /// Nominal wiggle rate in Hz.
    pub frequency_hz: f64,
    /// Fraction of the allowed band the wiggle may use.
    pub magnitude_fraction: f64,
    /// Multiplier from nominal rate to sinusoid frequency.
    pub frequency_scale: f64,
    /// Per-object relative spread of the sinusoid frequency, in `[0, 1)`.
    pub frequency_jitter: f64,
    /// Sinusoid amplitude as a fraction of the maximum wiggle.
    pub amplitude_scale: f64,
}

impl Default for WiggleConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1.0,
            magnitude_fraction: 0.15,
            frequency_scale: 0.2,
            frequency_jitter: 0.25,
            amplitude_scale: 0.5,
        }
    }
}

impl WiggleConfig {
    /// Check ranges of every field.
    pub fn validate(&self) -> FlowResult<()> {
        let fields = [
            ("frequency_hz", self.frequency_hz),
            ("magnitude_fraction", self.magnitude_fraction),
            ("frequency_scale", self.frequency_scale),
            ("frequency_jitter", self.frequency_jitter),
            ("amplitude_scale", self.amplitude_scale),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(FlowError::validation(format!(
                    "wiggle {name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if self.magnitude_fraction > 0.5 {
            return Err(FlowError::validation(
                "wiggle magnitude_fraction must be <= 0.5",
            ));
        }
        if self.frequency_jitter >= 1.0 {
            return Err(FlowError::validation("wiggle frequency_jitter must be < 1"));
        }
        Ok(())
    }
}

/// Lateral limits derived from the allowed band width.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LateralBand {
    /// Total width objects may occupy across the path.
    pub allowed_band: f64,
    /// Largest wiggle excursion, `allowed_band * magnitude_fraction`.
    pub max_wiggle: f64,
    /// Half-range of the static offset, `allowed_band / 2 - max_wiggle` (>= 0).
    pub static_band: f64,
    /// Amplitude of the sinusoidal wiggle.
    pub wiggle_amplitude: f64,
}

impl LateralBand {
    /// Derive limits from a band width; non-finite or negative widths give zero.
    pub fn new(allowed_band: f64, wiggle: &WiggleConfig) -> Self {
        let allowed_band = if allowed_band.is_finite() {
            allowed_band.max(0.0)
        } else {
            0.0
        };
        let max_wiggle = allowed_band * wiggle.magnitude_fraction;
        Self {
            allowed_band,
            max_wiggle,
            static_band: (allowed_band / 2.0 - max_wiggle).max(0.0),
            wiggle_amplitude: max_wiggle * wiggle.amplitude_scale,
        }
    }
}

/// One scattered object and its seeded lateral parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScatteredObject {
    /// Creation-order index.
    pub index: u32,
    /// Fraction of a loop this object leads by at `t = 0`.
    pub phase_offset: f64,
    /// Constant perpendicular offset from the path.
    pub static_lateral_offset: f64,
    /// Sinusoid phase in radians.
    pub wiggle_phase: f64,
    /// Sinusoid frequency in Hz.
    pub wiggle_frequency_hz: f64,
}

impl ScatteredObject {
    /// Build object `index` of `count`; lateral parameters come from a stream
    /// keyed by `(seed, index)` only.
    pub fn new(
        index: u32,
        count: u32,
        spacing: PhaseSpacing,
        band: &LateralBand,
        wiggle: &WiggleConfig,
        seed: u64,
    ) -> Self {
        let mut rng = Rng64::for_index(seed, index);
        let static_lateral_offset = rng.range(-band.static_band, band.static_band);
        let wiggle_phase = rng.angle();
        let spread = rng.range(-1.0, 1.0);
        let wiggle_frequency_hz = wiggle.frequency_hz
            * wiggle.frequency_scale
            * (1.0 + wiggle.frequency_jitter * spread);
        Self {
            index,
            phase_offset: spacing.offset(index, count),
            static_lateral_offset,
            wiggle_phase,
            wiggle_frequency_hz,
        }
    }

    /// Resampled point index an object starts nearest to, for initial placement.
    pub fn anchor_index(&self, point_count: usize) -> usize {
        if point_count == 0 {
            return 0;
        }
        let last = point_count - 1;
        let idx = (self.phase_offset * last as f64).floor();
        if idx.is_finite() {
            (idx.max(0.0) as usize).min(last)
        } else {
            0
        }
    }
}

/// Create `count` objects in index order.
pub fn scatter_objects(
    count: u32,
    spacing: PhaseSpacing,
    band: &LateralBand,
    wiggle: &WiggleConfig,
    seed: u64,
) -> FlowResult<Vec<ScatteredObject>> {
    spacing.validate()?;
    if let PhaseSpacing::NominalCapacity { capacity } = spacing
        && capacity < count
    {
        tracing::warn!(
            capacity,
            count,
            "nominal capacity below object count; phase offsets wrap"
        );
    }
    Ok((0..count)
        .map(|i| ScatteredObject::new(i, count, spacing, band, wiggle, seed))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/motion/placement.rs"]
mod tests;
