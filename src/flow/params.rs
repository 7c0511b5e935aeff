//! Hydraulic inputs to animation timing and particle count.
//!
//! Both mappings are linear heuristics: discharge and density scale how many
//! particles sit on each kilometre of path, velocity and the visual time
//! factor scale how long one loop along the path lasts.

use crate::foundation::error::{FlowError, FlowResult};

/// Physical description of the waterway and the composition scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HydraulicInputs {
    /// Flow velocity in metres per second.
    pub velocity_mps: f64,
    /// Discharge in cubic metres per second.
    pub discharge_cumecs: f64,
    /// Composition pixels per kilometre.
    pub comp_scale_px_per_km: f64,
    /// Particles per kilometre of path per cumec of discharge.
    pub particles_per_km_per_cumec: f64,
    /// Visual speed-up; higher loops faster.
    pub time_factor: f64,
}

impl Default for HydraulicInputs {
    fn default() -> Self {
        Self {
            velocity_mps: 0.4,
            discharge_cumecs: 80.0,
            comp_scale_px_per_km: 733.0,
            particles_per_km_per_cumec: 2.0,
            time_factor: 100_000.0,
        }
    }
}

/// Bounds applied to the derived loop duration, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DurationClamp {
    /// Smallest accepted duration; anything shorter uses `fallback_secs`.
    pub min_secs: f64,
    /// Longest duration; anything longer is capped here.
    pub max_secs: f64,
    /// Substitute for non-finite or too-short durations.
    pub fallback_secs: f64,
}

impl Default for DurationClamp {
    fn default() -> Self {
        Self {
            min_secs: 0.1,
            max_secs: 600.0,
            fallback_secs: 10.0,
        }
    }
}

impl DurationClamp {
    /// Require `0 < min <= fallback <= max`, all finite.
    pub fn validate(&self) -> FlowResult<()> {
        let Self {
            min_secs,
            max_secs,
            fallback_secs,
        } = *self;
        if ![min_secs, max_secs, fallback_secs]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(FlowError::validation("duration bounds must be finite"));
        }
        if min_secs <= 0.0 {
            return Err(FlowError::validation("min duration must be > 0"));
        }
        if !(min_secs <= fallback_secs && fallback_secs <= max_secs) {
            return Err(FlowError::validation(format!(
                "duration bounds must satisfy min <= fallback <= max (got {min_secs}, {fallback_secs}, {max_secs})"
            )));
        }
        Ok(())
    }

    /// Nearest bounds satisfying `0 < min <= fallback <= max`, all finite.
    ///
    /// Non-finite or non-positive fields fall back to the defaults; `max` is
    /// raised to `min` and `fallback` is clamped between them.
    pub fn repaired(&self) -> Self {
        let defaults = Self::default();
        let min_secs = if self.min_secs.is_finite() && self.min_secs > 0.0 {
            self.min_secs
        } else {
            defaults.min_secs
        };
        let max_secs = if self.max_secs.is_finite() {
            self.max_secs
        } else {
            defaults.max_secs
        }
        .max(min_secs);
        let fallback_secs = if self.fallback_secs.is_finite() {
            self.fallback_secs
        } else {
            defaults.fallback_secs
        }
        .clamp(min_secs, max_secs);
        Self {
            min_secs,
            max_secs,
            fallback_secs,
        }
    }
}

/// A clamp or substitution applied while deriving [`FlowParameters`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterAdjustment {
    /// The duration bounds were inconsistent; see [`DurationClamp::repaired`].
    DurationBoundsRepaired,
    /// The raw object count was NaN or infinite; replaced with 1.
    ObjectCountNonFinite,
    /// The raw object count rounded below 1; raised to 1.
    ObjectCountRaisedToOne,
    /// The raw object count exceeded the configured cap.
    ObjectCountCapped,
    /// The raw duration was NaN or infinite; replaced with the fallback.
    DurationNonFinite,
    /// The raw duration was below the minimum; replaced with the fallback.
    DurationBelowMinimum,
    /// The raw duration was above the maximum; capped.
    DurationCapped,
}

/// Derived, immutable per-run animation parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FlowParameters {
    /// Number of scattered objects, at least 1.
    pub object_count: u32,
    /// Seconds for one full loop along the path, within the clamp bounds.
    pub loop_duration_secs: f64,
    /// Path length converted to kilometres.
    pub path_length_km: f64,
    /// Clamps and fallbacks that fired, in derivation order.
    pub adjustments: Vec<ParameterAdjustment>,
}

impl FlowParameters {
    /// Whether any clamp or fallback fired.
    pub fn was_adjusted(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

/// Derive object count and loop duration from path length and hydraulics.
///
/// Never fails: every degenerate intermediate is replaced by a documented
/// constant and recorded in [`FlowParameters::adjustments`].
pub fn derive_flow_parameters(
    path_length_px: f64,
    inputs: &HydraulicInputs,
    clamp: &DurationClamp,
    max_object_count: u32,
) -> FlowParameters {
    let mut adjustments = Vec::new();

    let repaired = clamp.repaired();
    if repaired != *clamp {
        adjustments.push(ParameterAdjustment::DurationBoundsRepaired);
    }
    let clamp = &repaired;

    let path_length_km = path_length_px / inputs.comp_scale_px_per_km;

    let raw_count =
        (inputs.discharge_cumecs * inputs.particles_per_km_per_cumec * path_length_km).round();
    let max_object_count = max_object_count.max(1);
    let object_count = if !raw_count.is_finite() {
        adjustments.push(ParameterAdjustment::ObjectCountNonFinite);
        1
    } else if raw_count < 1.0 {
        adjustments.push(ParameterAdjustment::ObjectCountRaisedToOne);
        1
    } else if raw_count > f64::from(max_object_count) {
        adjustments.push(ParameterAdjustment::ObjectCountCapped);
        max_object_count
    } else {
        raw_count as u32
    };

    let path_length_m = path_length_km * 1000.0;
    let raw_duration = (path_length_m / inputs.velocity_mps) / (inputs.time_factor / 1000.0);
    let loop_duration_secs = if !raw_duration.is_finite() {
        adjustments.push(ParameterAdjustment::DurationNonFinite);
        clamp.fallback_secs
    } else if raw_duration < clamp.min_secs {
        adjustments.push(ParameterAdjustment::DurationBelowMinimum);
        clamp.fallback_secs
    } else if raw_duration > clamp.max_secs {
        adjustments.push(ParameterAdjustment::DurationCapped);
        clamp.max_secs
    } else {
        raw_duration
    };

    for adj in &adjustments {
        tracing::warn!(
            adjustment = ?adj,
            raw_count,
            raw_duration,
            "flow parameter adjusted"
        );
    }
    tracing::info!(
        object_count,
        loop_duration_secs,
        path_length_km,
        "derived flow parameters"
    );

    FlowParameters {
        object_count,
        loop_duration_secs,
        path_length_km,
        adjustments,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flow/params.rs"]
mod tests;
