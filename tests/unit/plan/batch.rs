use super::*;
use crate::annotation::marker::decode_annotation;
use crate::foundation::error::FlowError;
use crate::geometry::source::{ShapeDocument, ShapePath, SvgPath};

fn square(side: f64) -> ShapePath {
    ShapePath::polyline(
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ],
        true,
    )
}

fn straight(len: f64) -> ShapePath {
    ShapePath::polyline(vec![Point::new(0.0, 0.0), Point::new(len, 0.0)], false)
}

#[test]
fn builds_every_output_for_a_closed_square() {
    let plan = ScatterPlan::build(&square(4.0), &ScatterConfig::default()).unwrap();

    let summary = plan.summary();
    assert_eq!(summary.vertex_count, 4);
    assert_eq!(summary.segment_count, 4);
    assert!(summary.closed);
    assert!((summary.arc_length_px - 16.0).abs() < 1e-9);

    assert_eq!(plan.path().len(), 100);
    assert_eq!(plan.path().points()[0], Point::new(0.0, 0.0));
    assert_eq!(plan.path().points()[99], Point::new(0.0, 0.0));

    let n = plan.params().object_count as usize;
    assert!(n >= 1);
    assert_eq!(plan.objects().len(), n);
    assert_eq!(plan.anchors().len(), n);
    assert_eq!(plan.motions().len(), n);
    assert_eq!(plan.anchors()[0], plan.path().points()[0]);

    assert_eq!(plan.style().stroke_width_px, 8.0);
    assert_eq!(plan.band().allowed_band, 6.0);
}

#[test]
fn annotation_round_trips_to_the_resampled_path() {
    let plan = ScatterPlan::build(&square(4.0), &ScatterConfig::default()).unwrap();
    assert!(plan.annotation().starts_with("pathPoints:"));
    let back = decode_annotation(plan.annotation()).unwrap();
    assert_eq!(back.points(), plan.path().points());
}

#[test]
fn leen_canal_kilometre_has_one_object_and_ten_second_loop() {
    let cfg = ScatterConfig::preset("leen-canal").unwrap();
    let plan = ScatterPlan::build(&straight(733.0), &cfg).unwrap();
    assert_eq!(plan.params().object_count, 1);
    assert!((plan.params().loop_duration_secs - 10.0).abs() < 1e-9);
    assert!((plan.style().lifetime_secs - 100.0).abs() < 1e-9);
}

#[test]
fn structural_errors_abort_the_run() {
    let single = ShapePath::polyline(vec![Point::new(1.0, 1.0)], false);
    assert!(matches!(
        ScatterPlan::build(&single, &ScatterConfig::default()).unwrap_err(),
        FlowError::InsufficientGeometry { vertices: 1 }
    ));

    let empty = ShapePath::default();
    assert!(matches!(
        ScatterPlan::build(&empty, &ScatterConfig::default()).unwrap_err(),
        FlowError::MissingGeometry(_)
    ));

    let collapsed = ShapePath::polyline(vec![Point::new(3.0, 3.0), Point::new(3.0, 3.0)], false);
    assert!(matches!(
        ScatterPlan::build(&collapsed, &ScatterConfig::default()).unwrap_err(),
        FlowError::DegeneratePath { .. }
    ));
}

#[test]
fn invalid_config_is_rejected_before_sampling() {
    let mut cfg = ScatterConfig::default();
    cfg.sampling.point_count = 1;
    assert!(matches!(
        ScatterPlan::build(&ShapePath::default(), &cfg).unwrap_err(),
        FlowError::Validation(_)
    ));
}

#[test]
fn stroke_width_comes_from_the_layer() {
    let doc = ShapeDocument::from_json_str(
        r#"{ "layers": [ {
            "name": "River",
            "position": { "x": 10.0, "y": 20.0 },
            "stroke_width_px": 20.0,
            "path": { "bezier": { "vertices": [ { "x": 0.0, "y": 0.0 }, { "x": 100.0, "y": 0.0 } ] } }
        } ] }"#,
    )
    .unwrap();
    let source = doc.layer(Some("River")).unwrap().source().unwrap();
    let plan = ScatterPlan::build(&source, &ScatterConfig::default()).unwrap();
    assert_eq!(plan.style().stroke_width_px, 20.0);
    assert_eq!(plan.style().particle_size_px, 5.0);
    assert_eq!(plan.band().allowed_band, 15.0);
    assert_eq!(plan.path().points()[0], Point::new(10.0, 20.0));
}

#[test]
fn svg_and_vertex_sources_agree() {
    let cfg = ScatterConfig::default();
    let from_svg = ScatterPlan::build(&SvgPath::parse("M0 0 L4 0 L4 4 L0 4 Z").unwrap(), &cfg)
        .unwrap();
    let from_vertices = ScatterPlan::build(&square(4.0), &cfg).unwrap();
    for (a, b) in from_svg
        .path()
        .points()
        .iter()
        .zip(from_vertices.path().points())
    {
        assert!(a.distance(*b) < 1e-9, "{a:?} vs {b:?}");
    }
    assert_eq!(from_svg.params(), from_vertices.params());
}

#[test]
fn parallel_and_sequential_sampling_agree() {
    let plan = ScatterPlan::build(&straight(2000.0), &ScatterConfig::default()).unwrap();
    assert!(plan.objects().len() > 100);
    for t in [0.0, 1.25, 7.5, 1000.0] {
        assert_eq!(plan.sample_at(t, false), plan.sample_at(t, true));
    }
}

#[test]
fn seed_controls_lateral_parameters_only() {
    let mut cfg = ScatterConfig::default();
    let a = ScatterPlan::build(&straight(500.0), &cfg).unwrap();
    let again = ScatterPlan::build(&straight(500.0), &cfg).unwrap();
    assert_eq!(a.objects(), again.objects());

    cfg.seed = 99;
    let b = ScatterPlan::build(&straight(500.0), &cfg).unwrap();
    assert_eq!(a.objects().len(), b.objects().len());
    assert_eq!(a.objects()[3].phase_offset, b.objects()[3].phase_offset);
    assert_ne!(
        a.objects()[3].static_lateral_offset,
        b.objects()[3].static_lateral_offset
    );
}

#[test]
fn report_includes_expressions_on_request() {
    let plan = ScatterPlan::build(&square(4.0), &ScatterConfig::default()).unwrap();

    let bare = serde_json::to_value(plan.report(None)).unwrap();
    assert_eq!(bare["point_count"], 100);
    assert!(bare["objects"][0].get("expressions").is_none());
    assert!(bare["objects"][0].get("phase_offset").is_some());

    let full = serde_json::to_value(plan.report(Some("River"))).unwrap();
    let pos = full["objects"][0]["expressions"]["position"].as_str().unwrap();
    assert!(pos.contains(r#"thisComp.layer("River")"#));
}
