use super::*;
use crate::foundation::core::Vec2;
use crate::geometry::path::BezierPath;
use crate::geometry::source::ShapePath;
use crate::sampling::sampler::sample_path;

fn closed_square(side: f64) -> SampledPolyline {
    let shape = ShapePath::polyline(
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ],
        true,
    );
    sample_path(&BezierPath::from_source(&shape).unwrap(), 1000).unwrap()
}

fn s_curve() -> SampledPolyline {
    let shape = ShapePath {
        vertices: vec![
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            Point::new(400.0, 0.0),
        ],
        in_tangents: vec![Vec2::ZERO, Vec2::new(-60.0, -80.0), Vec2::new(-60.0, 80.0)],
        out_tangents: vec![Vec2::new(60.0, -80.0), Vec2::new(60.0, 80.0), Vec2::ZERO],
        closed: false,
    };
    sample_path(&BezierPath::from_source(&shape).unwrap(), 1000).unwrap()
}

fn close(a: Point, b: Point) -> bool {
    a.distance(b) < 1e-6
}

#[test]
fn closed_square_lands_on_corners() {
    let poly = closed_square(4.0);
    assert!((poly.total_length() - 16.0).abs() < 1e-9);

    let r = resample(&poly, 5).unwrap();
    assert_eq!(r.len(), 5);
    let expected = [
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(0.0, 4.0),
        Point::new(0.0, 0.0),
    ];
    for (got, want) in r.points().iter().zip(expected) {
        assert!(close(*got, want), "got {got:?}, want {want:?}");
    }
}

#[test]
fn endpoints_are_preserved_exactly() {
    let poly = s_curve();
    let r = resample(&poly, 100).unwrap();
    assert_eq!(r.len(), 100);
    assert_eq!(r.points()[0], poly.points()[0]);
    assert_eq!(r.points()[99], poly.points()[poly.len() - 1]);
    assert_eq!(r.arc_length(), poly.total_length());
}

#[test]
fn spacing_stays_near_nominal_on_smooth_curves() {
    let r = resample(&s_curve(), 100).unwrap();
    let nominal = r.nominal_spacing();
    assert!(r.max_spacing_deviation() < nominal * 0.01);
}

#[test]
fn progress_along_path_is_monotonic() {
    let poly = s_curve();
    let r = resample(&poly, 64).unwrap();
    // Re-measure every resampled point's arc position via the chord sum.
    let mut acc = 0.0;
    let mut prev = r.points()[0];
    for p in &r.points()[1..] {
        let step = prev.distance(*p);
        assert!(step > 0.0);
        acc += step;
        prev = *p;
    }
    assert!(acc <= poly.total_length() + 1e-9);
}

#[test]
fn degenerate_path_is_rejected() {
    let poly = SampledPolyline::from_points(vec![Point::new(1.0, 1.0); 10]).unwrap();
    assert!(matches!(
        resample(&poly, 10).unwrap_err(),
        FlowError::DegeneratePath { .. }
    ));
}

#[test]
fn point_count_below_two_is_rejected() {
    let poly = closed_square(4.0);
    assert!(matches!(
        resample(&poly, 1).unwrap_err(),
        FlowError::Validation(_)
    ));
}

#[test]
fn from_points_measures_chords_and_flattens() {
    let r = ResampledPath::from_points(vec![
        Point::new(0.0, 0.0),
        Point::new(3.0, 4.0),
        Point::new(3.0, 10.0),
    ])
    .unwrap();
    assert_eq!(r.arc_length(), 11.0);
    assert_eq!(r.to_flat(), vec![0.0, 0.0, 3.0, 4.0, 3.0, 10.0]);
    assert!(ResampledPath::from_points(vec![Point::ZERO]).is_err());
    assert!(ResampledPath::from_points(vec![Point::ZERO, Point::new(f64::NAN, 0.0)]).is_err());
}

#[test]
fn rounding_noise_far_from_origin_is_degenerate() {
    let base = 1.0e6;
    let pts = (0..50)
        .map(|i| {
            let wobble = if i % 2 == 0 { 0.0 } else { 1.0e-9 };
            Point::new(base + wobble, base - wobble)
        })
        .collect();
    let poly = SampledPolyline::from_points(pts).unwrap();
    assert!(poly.total_length() > 0.0);
    assert!(matches!(
        resample(&poly, 10).unwrap_err(),
        FlowError::DegeneratePath { .. }
    ));
}

#[test]
fn short_paths_near_origin_still_resample() {
    let poly =
        SampledPolyline::from_points(vec![Point::new(0.0, 0.0), Point::new(1.0e-6, 0.0)]).unwrap();
    let r = resample(&poly, 5).unwrap();
    assert_eq!(r.len(), 5);
}
