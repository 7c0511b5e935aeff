//! Pathflow scatters particle objects along a drawn path and animates them
//! flowing along it at a speed derived from a waterway's velocity and discharge.
//!
//! # Pipeline overview
//!
//! 1. **Source**: a [`PathSource`] (JSON [`ShapeLayer`], [`SvgPath`], or your own)
//!    becomes a common-space [`BezierPath`].
//! 2. **Sample**: [`sample_path`] oversamples every segment into a [`SampledPolyline`]
//!    with cumulative arc length.
//! 3. **Resample**: [`resample`] keeps `N` points uniformly spaced by arc length
//!    ([`ResampledPath`]), persisted as a `pathPoints:` annotation.
//! 4. **Derive**: [`derive_flow_parameters`] maps path length and [`HydraulicInputs`]
//!    to an object count and a loop duration.
//! 5. **Scatter**: [`scatter_objects`] gives every object a phase offset and seeded
//!    lateral parameters.
//! 6. **Animate**: [`MotionField::sample`] evaluates any object at any time;
//!    [`emit_expressions`] produces the same motion as host expression text.
//!
//! [`ScatterPlan::build`] runs steps 1 to 5 in one all-or-nothing call.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the same source, config and seed give identical output.
//! - **Pure motion**: evaluation is a function of `(t, object)` and never fails.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod annotation;
mod expression;
mod flow;
mod foundation;
mod geometry;
mod motion;
mod plan;
mod sampling;

pub use annotation::marker::{
    ANNOTATION_TAG, annotation_payload, decode_annotation, encode_annotation,
    parse_annotation_points,
};
pub use expression::emit::{HostExpressions, emit_expressions};
pub use flow::params::{
    DurationClamp, FlowParameters, HydraulicInputs, ParameterAdjustment, derive_flow_parameters,
};
pub use foundation::core::{Affine, Fps, FrameIndex, Point, Vec2};
pub use foundation::error::{FlowError, FlowResult};
pub use foundation::math::Rng64;
pub use geometry::path::BezierPath;
pub use geometry::source::{
    DEFAULT_STROKE_WIDTH_PX, LayerPath, LayerSource, PathSource, ShapeDocument, ShapeLayer,
    ShapePath, SvgPath,
};
pub use motion::field::{
    MIN_TANGENT_LENGTH, MotionFallback, MotionField, MotionSample, ObjectMotion,
};
pub use motion::placement::{
    LateralBand, PhaseSpacing, ScatteredObject, WiggleConfig, scatter_objects,
};
pub use plan::batch::{ObjectReport, PathSummary, PlanReport, ScatterPlan};
pub use plan::config::{
    PRESET_NAMES, ParticleStyle, ResolvedStyle, SamplingConfig, ScatterConfig,
};
pub use sampling::resample::{DEFAULT_POINT_COUNT, ResampledPath, resample};
pub use sampling::sampler::{DEFAULT_OVERSAMPLE, SampledPolyline, sample_path};
