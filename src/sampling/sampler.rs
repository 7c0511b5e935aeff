use kurbo::ParamCurve as _;

use crate::foundation::core::Point;
use crate::foundation::error::{FlowError, FlowResult};
use crate::geometry::path::BezierPath;

/// Default number of parametric subdivisions per segment.
pub const DEFAULT_OVERSAMPLE: usize = 1000;

/// Dense polyline approximation of a [`BezierPath`] with cumulative arc length.
///
/// `lengths[k]` is the polyline distance from the first point to `points[k]`,
/// so `lengths[0] == 0` and the sequence never decreases.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledPolyline {
    points: Vec<Point>,
    lengths: Vec<f64>,
}

impl SampledPolyline {
    /// Build a polyline from raw points, computing cumulative lengths.
    pub fn from_points(points: Vec<Point>) -> FlowResult<Self> {
        if points.is_empty() {
            return Err(FlowError::validation("polyline needs at least one point"));
        }
        let mut lengths = Vec::with_capacity(points.len());
        lengths.push(0.0);
        let mut acc = 0.0;
        for w in points.windows(2) {
            acc += w[0].distance(w[1]);
            lengths.push(acc);
        }
        Ok(Self { points, lengths })
    }

    /// Sampled points in path order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Cumulative arc length at each point.
    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Total arc length.
    pub fn total_length(&self) -> f64 {
        self.lengths[self.lengths.len() - 1]
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a polyline holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Oversample every segment of `path` at `resolution` parametric steps.
///
/// Each segment contributes `t = j / resolution` for `j in 0..resolution`; the
/// last segment also contributes its `t = 1` endpoint. Segment seams are
/// therefore sampled once and the final sample is exactly the path end.
#[tracing::instrument(skip(path), fields(segments = path.segments().len()))]
pub fn sample_path(path: &BezierPath, resolution: usize) -> FlowResult<SampledPolyline> {
    if resolution == 0 {
        return Err(FlowError::validation("oversample resolution must be >= 1"));
    }

    let segments = path.segments();
    let mut points = Vec::with_capacity(segments.len() * resolution + 1);
    let k = resolution as f64;
    for seg in segments {
        // Evaluating a collapsed segment would only add rounding noise.
        if seg.p1 == seg.p0 && seg.p2 == seg.p0 && seg.p3 == seg.p0 {
            points.extend(std::iter::repeat_n(seg.p0, resolution));
            continue;
        }
        for j in 0..resolution {
            points.push(seg.eval(j as f64 / k));
        }
    }
    points.push(path.end());

    let polyline = SampledPolyline::from_points(points)?;
    tracing::debug!(
        samples = polyline.len(),
        length = polyline.total_length(),
        "sampled path"
    );
    Ok(polyline)
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/sampler.rs"]
mod tests;
