//! One scatter run: source path in, everything needed to animate out.
//!
//! [`ScatterPlan::build`] is all-or-nothing. Structural problems with the
//! source or the configuration abort before any result exists; recoverable
//! arithmetic problems are clamped and recorded on [`FlowParameters`].

use std::sync::Arc;

use crate::annotation::marker::encode_annotation;
use crate::expression::emit::{HostExpressions, emit_expressions};
use crate::flow::params::{FlowParameters, derive_flow_parameters};
use crate::foundation::core::Point;
use crate::foundation::error::FlowResult;
use crate::geometry::path::BezierPath;
use crate::geometry::source::PathSource;
use crate::motion::field::{MotionField, MotionSample, ObjectMotion};
use crate::motion::placement::{LateralBand, ScatteredObject, scatter_objects};
use crate::plan::config::{ResolvedStyle, ScatterConfig};
use crate::sampling::resample::{ResampledPath, resample};
use crate::sampling::sampler::sample_path;

/// Shape statistics of a source path, as sampled.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PathSummary {
    /// Vertex count of the source.
    pub vertex_count: usize,
    /// Cubic segments after closing.
    pub segment_count: usize,
    /// Whether the last vertex connects back to the first.
    pub closed: bool,
    /// Oversampled arc length in common-space pixels.
    pub arc_length_px: f64,
    /// First point in the common space.
    pub start: Point,
    /// Last point in the common space.
    pub end: Point,
}

impl PathSummary {
    /// Sample `source` at `oversample` and report its shape.
    pub fn measure(source: &dyn PathSource, oversample: usize) -> FlowResult<Self> {
        let path = BezierPath::from_source(source)?;
        let polyline = sample_path(&path, oversample)?;
        Ok(Self::of(&path, polyline.total_length()))
    }

    fn of(path: &BezierPath, arc_length_px: f64) -> Self {
        Self {
            vertex_count: path.vertex_count(),
            segment_count: path.segments().len(),
            closed: path.is_closed(),
            arc_length_px,
            start: path.start(),
            end: path.end(),
        }
    }
}

/// The complete, immutable result of a scatter run.
#[derive(Clone, Debug)]
pub struct ScatterPlan {
    summary: PathSummary,
    path: Arc<ResampledPath>,
    params: FlowParameters,
    band: LateralBand,
    style: ResolvedStyle,
    objects: Vec<ScatteredObject>,
    annotation: String,
}

impl ScatterPlan {
    /// Run the whole pipeline for `source` under `config`.
    #[tracing::instrument(skip(source, config), fields(seed = config.seed))]
    pub fn build(source: &dyn PathSource, config: &ScatterConfig) -> FlowResult<Self> {
        config.validate()?;

        let bezier = BezierPath::from_source(source)?;
        let polyline = sample_path(&bezier, config.sampling.oversample)?;
        let path = Arc::new(resample(&polyline, config.sampling.point_count)?);
        let summary = PathSummary::of(&bezier, polyline.total_length());

        let params = derive_flow_parameters(
            path.arc_length(),
            &config.hydraulics,
            &config.durations,
            config.max_object_count,
        );

        let style = config
            .style
            .resolve(source.stroke_width(), params.loop_duration_secs);
        let band = LateralBand::new(style.allowed_band_px, &config.wiggle);
        let objects = scatter_objects(
            params.object_count,
            config.spacing,
            &band,
            &config.wiggle,
            config.seed,
        )?;
        let annotation = encode_annotation(&path);

        tracing::debug!(
            segments = summary.segment_count,
            arc_length = path.arc_length(),
            objects = objects.len(),
            allowed_band = band.allowed_band,
            "scatter plan built"
        );

        Ok(Self {
            summary,
            path,
            params,
            band,
            style,
            objects,
            annotation,
        })
    }

    /// Source path statistics.
    pub fn summary(&self) -> &PathSummary {
        &self.summary
    }

    /// The shared resampled path.
    pub fn path(&self) -> &Arc<ResampledPath> {
        &self.path
    }

    /// Derived count and timing.
    pub fn params(&self) -> &FlowParameters {
        &self.params
    }

    /// Lateral limits.
    pub fn band(&self) -> &LateralBand {
        &self.band
    }

    /// Particle size, colour and lifetime.
    pub fn style(&self) -> &ResolvedStyle {
        &self.style
    }

    /// Objects in creation order.
    pub fn objects(&self) -> &[ScatteredObject] {
        &self.objects
    }

    /// `pathPoints:` text to persist on the source path.
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Starting point of each object on the resampled path.
    pub fn anchors(&self) -> Vec<Point> {
        let pts = self.path.points();
        self.objects
            .iter()
            .map(|o| pts[o.anchor_index(pts.len())])
            .collect()
    }

    /// Motion field over the plan's path and timing.
    pub fn field(&self) -> MotionField {
        MotionField::new(
            Arc::clone(&self.path),
            self.params.loop_duration_secs,
            self.band,
        )
    }

    /// One motion function per object.
    pub fn motions(&self) -> Vec<ObjectMotion> {
        let field = self.field();
        self.objects.iter().map(|o| field.object(*o)).collect()
    }

    /// Evaluate every object at time `t`.
    pub fn sample_at(&self, t: f64, parallel: bool) -> Vec<MotionSample> {
        self.field().sample_all(&self.objects, t, parallel)
    }

    /// Host expressions for every object, reading the annotation on `path_layer`.
    pub fn expressions(&self, path_layer: &str) -> Vec<HostExpressions> {
        let field = self.field();
        self.objects
            .iter()
            .map(|o| emit_expressions(path_layer, &field, o))
            .collect()
    }

    /// Serializable view of the plan.
    pub fn report(&self, path_layer: Option<&str>) -> PlanReport {
        let anchors = self.anchors();
        let expressions = path_layer.map(|layer| self.expressions(layer));
        let objects = self
            .objects
            .iter()
            .zip(anchors)
            .enumerate()
            .map(|(i, (object, anchor))| ObjectReport {
                object: *object,
                anchor,
                expressions: expressions.as_ref().map(|e| e[i].clone()),
            })
            .collect();
        PlanReport {
            path: self.summary,
            point_count: self.path.len(),
            resampled_arc_length_px: self.path.arc_length(),
            params: self.params.clone(),
            band: self.band,
            style: self.style,
            annotation: self.annotation.clone(),
            objects,
        }
    }
}

/// JSON shape of a plan.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PlanReport {
    /// Source path statistics.
    pub path: PathSummary,
    /// Resampled point count.
    pub point_count: usize,
    /// Arc length carried by the resampled path.
    pub resampled_arc_length_px: f64,
    /// Derived count and timing.
    pub params: FlowParameters,
    /// Lateral limits.
    pub band: LateralBand,
    /// Particle style.
    pub style: ResolvedStyle,
    /// Annotation text.
    pub annotation: String,
    /// Per-object data.
    pub objects: Vec<ObjectReport>,
}

/// One object in a [`PlanReport`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct ObjectReport {
    /// Seeded parameters.
    #[serde(flatten)]
    pub object: ScatteredObject,
    /// Starting point on the path.
    pub anchor: Point,
    /// Host expressions, when a path layer name was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expressions: Option<HostExpressions>,
}

#[cfg(test)]
#[path = "../../tests/unit/plan/batch.rs"]
mod tests;
