//! Per-frame motion of scattered objects along a resampled path.
//!
//! Everything here is a pure function of `(t, object)`. Evaluation never
//! fails: degenerate geometry and non-finite arithmetic resolve to the origin
//! with zero rotation, and the returned [`MotionSample`] says why.

use std::f64::consts::TAU;
use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::{Point, Vec2};
use crate::motion::placement::{LateralBand, ScatteredObject};
use crate::sampling::resample::ResampledPath;

/// Tangents shorter than this are treated as degenerate.
pub const MIN_TANGENT_LENGTH: f64 = 1e-6;

/// Why a sample fell back to the safe default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionFallback {
    /// Both path samples bracketing the object coincide.
    DegenerateTangent,
    /// An intermediate or final value was NaN or infinite.
    NonFinite,
}

/// Position and heading of one object at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct MotionSample {
    /// Position in the common space.
    pub position: Point,
    /// Heading in degrees, `atan2` of the path tangent.
    pub rotation_deg: f64,
    /// Loop progress in `[0, 1)` used for this sample.
    pub phase: f64,
    /// Set when the safe default was returned.
    pub fallback: Option<MotionFallback>,
}

impl MotionSample {
    fn fallback(phase: f64, reason: MotionFallback) -> Self {
        Self {
            position: Point::ZERO,
            rotation_deg: 0.0,
            phase: if phase.is_finite() { phase } else { 0.0 },
            fallback: Some(reason),
        }
    }
}

/// Shared, read-only state every object's motion is evaluated against.
#[derive(Clone, Debug)]
pub struct MotionField {
    path: Arc<ResampledPath>,
    loop_duration_secs: f64,
    band: LateralBand,
}

impl MotionField {
    /// Bundle the resampled path with loop timing and lateral limits.
    pub fn new(path: Arc<ResampledPath>, loop_duration_secs: f64, band: LateralBand) -> Self {
        Self {
            path,
            loop_duration_secs,
            band,
        }
    }

    /// The shared resampled path.
    pub fn path(&self) -> &Arc<ResampledPath> {
        &self.path
    }

    /// Seconds per loop.
    pub fn loop_duration_secs(&self) -> f64 {
        self.loop_duration_secs
    }

    /// Lateral limits.
    pub fn band(&self) -> &LateralBand {
        &self.band
    }

    /// Loop progress of `object` at time `t`, in `[0, 1)`.
    pub fn phase(&self, object: &ScatteredObject, t: f64) -> f64 {
        let p = (t / self.loop_duration_secs + object.phase_offset).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
        if p >= 1.0 { 0.0 } else { p }
    }

    /// Lateral wiggle of `object` at time `t`.
    pub fn wiggle(&self, object: &ScatteredObject, t: f64) -> f64 {
        (t * object.wiggle_frequency_hz * TAU + object.wiggle_phase).sin()
            * self.band.wiggle_amplitude
    }

    /// Evaluate `object` at time `t` (seconds).
    pub fn sample(&self, object: &ScatteredObject, t: f64) -> MotionSample {
        let phase = self.phase(object, t);
        if !phase.is_finite() {
            return MotionSample::fallback(phase, MotionFallback::NonFinite);
        }

        let pts = self.path.points();
        let last = pts.len() - 1;
        let p = phase * last as f64;
        let i0 = (p.floor().max(0.0) as usize).min(last);
        let i1 = (p.ceil() as usize).min(last);
        let frac = p - i0 as f64;
        let base = pts[i0].lerp(pts[i1], frac);

        let j = i0.min(last - 1);
        let tangent = pts[j + 1] - pts[j];
        let norm = tangent.length();
        if !norm.is_finite() {
            return MotionSample::fallback(phase, MotionFallback::NonFinite);
        }
        if norm < MIN_TANGENT_LENGTH {
            return MotionSample::fallback(phase, MotionFallback::DegenerateTangent);
        }
        let perp = Vec2::new(-tangent.y / norm, tangent.x / norm);

        let lateral = object.static_lateral_offset + self.wiggle(object, t);
        let position = base + perp * lateral;
        let rotation_deg = tangent.atan2().to_degrees();

        if !position.is_finite() || !rotation_deg.is_finite() {
            return MotionSample::fallback(phase, MotionFallback::NonFinite);
        }
        MotionSample {
            position,
            rotation_deg,
            phase,
            fallback: None,
        }
    }

    /// Evaluate every object at time `t`, preserving input order.
    ///
    /// With `parallel` set the work is spread over the rayon pool; results are
    /// identical to the sequential path since objects share no mutable state.
    pub fn sample_all(
        &self,
        objects: &[ScatteredObject],
        t: f64,
        parallel: bool,
    ) -> Vec<MotionSample> {
        if parallel {
            objects.par_iter().map(|o| self.sample(o, t)).collect()
        } else {
            objects.iter().map(|o| self.sample(o, t)).collect()
        }
    }

    /// Bind one object to this field, yielding its motion as a function of time.
    pub fn object(&self, object: ScatteredObject) -> ObjectMotion {
        ObjectMotion {
            field: self.clone(),
            object,
        }
    }
}

/// A single object's motion: a pure function of time.
#[derive(Clone, Debug)]
pub struct ObjectMotion {
    field: MotionField,
    object: ScatteredObject,
}

impl ObjectMotion {
    /// The object this motion belongs to.
    pub fn object(&self) -> &ScatteredObject {
        &self.object
    }

    /// Evaluate at time `t` (seconds).
    pub fn at(&self, t: f64) -> MotionSample {
        self.field.sample(&self.object, t)
    }

    /// Turn into a closure `t -> sample`.
    pub fn into_fn(self) -> impl Fn(f64) -> MotionSample + Send + Sync + 'static {
        move |t| self.at(t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/field.rs"]
mod tests;
