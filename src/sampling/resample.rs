use crate::foundation::core::Point;
use crate::foundation::error::{FlowError, FlowResult};
use crate::sampling::sampler::SampledPolyline;

/// Default number of resampled points.
pub const DEFAULT_POINT_COUNT: usize = 100;

/// Arc lengths at or below this fraction of the coordinate scale are rounding
/// noise, not geometry.
const DEGENERATE_LENGTH_RATIO: f64 = 1e-9;

/// Points spaced uniformly by arc length along a path.
///
/// This is the only path representation motion evaluation reads. It is
/// immutable once built and is shared between objects behind an `Arc`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResampledPath {
    points: Vec<Point>,
    arc_length: f64,
}

impl ResampledPath {
    /// Wrap an existing point sequence (e.g. parsed back from an annotation).
    ///
    /// The arc length is taken as the sum of chord lengths.
    pub fn from_points(points: Vec<Point>) -> FlowResult<Self> {
        if points.len() < 2 {
            return Err(FlowError::validation(format!(
                "resampled path needs at least 2 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(FlowError::validation(
                "resampled path contains non-finite points",
            ));
        }
        let arc_length = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        Ok(Self { points, arc_length })
    }

    /// Resampled points, first at arc length 0 and last at [`Self::arc_length`].
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points (`N`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a resampled path holds at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arc length of the source path.
    pub fn arc_length(&self) -> f64 {
        self.arc_length
    }

    /// Nominal distance between consecutive points, `L / (N - 1)`.
    pub fn nominal_spacing(&self) -> f64 {
        self.arc_length / (self.points.len() - 1) as f64
    }

    /// Largest absolute difference between a chord and the nominal spacing.
    pub fn max_spacing_deviation(&self) -> f64 {
        let nominal = self.nominal_spacing();
        self.points
            .windows(2)
            .map(|w| (w[0].distance(w[1]) - nominal).abs())
            .fold(0.0, f64::max)
    }

    /// Coordinates flattened as `x0, y0, x1, y1, ...`.
    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }
}

/// Pick `count` points uniformly spaced by arc length along `polyline`.
///
/// Each target length is located by binary search in the cumulative table and
/// linearly interpolated between the bracketing samples. The first and last
/// outputs are the polyline's first and last points.
#[tracing::instrument(skip(polyline), fields(samples = polyline.len()))]
pub fn resample(polyline: &SampledPolyline, count: usize) -> FlowResult<ResampledPath> {
    if count < 2 {
        return Err(FlowError::validation(format!(
            "resampled point count must be >= 2, got {count}"
        )));
    }

    let pts = polyline.points();
    let total = polyline.total_length();
    let scale = pts
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(1.0, f64::max);
    if !total.is_finite() || total <= DEGENERATE_LENGTH_RATIO * scale {
        return Err(FlowError::DegeneratePath { length: total });
    }

    let lengths = polyline.lengths();
    let last = pts.len() - 1;
    let denom = (count - 1) as f64;

    let mut out = Vec::with_capacity(count);
    for k in 0..count {
        if k == 0 {
            out.push(pts[0]);
            continue;
        }
        if k == count - 1 {
            out.push(pts[last]);
            continue;
        }

        let target = (k as f64 / denom) * total;
        let idx = lengths.partition_point(|&l| l < target).min(last);
        if idx == 0 {
            out.push(pts[0]);
            continue;
        }

        let (l0, l1) = (lengths[idx - 1], lengths[idx]);
        let span = l1 - l0;
        if span <= 0.0 {
            out.push(pts[idx]);
            continue;
        }
        let frac = ((target - l0) / span).clamp(0.0, 1.0);
        out.push(pts[idx - 1].lerp(pts[idx], frac));
    }

    tracing::debug!(points = out.len(), arc_length = total, "resampled path");
    Ok(ResampledPath {
        points: out,
        arc_length: total,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/resample.rs"]
mod tests;
