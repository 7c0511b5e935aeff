use super::*;

fn band(width: f64) -> LateralBand {
    LateralBand::new(width, &WiggleConfig::default())
}

#[test]
fn even_spacing_fills_one_loop() {
    let objs = scatter_objects(4, PhaseSpacing::Even, &band(6.0), &WiggleConfig::default(), 0)
        .unwrap();
    let offsets: Vec<f64> = objs.iter().map(|o| o.phase_offset).collect();
    assert_eq!(offsets, vec![0.0, 0.25, 0.5, 0.75]);
    assert_eq!(
        objs.iter().map(|o| o.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

#[test]
fn nominal_capacity_keeps_subset_spacing() {
    let spacing = PhaseSpacing::NominalCapacity { capacity: 1000 };
    let objs = scatter_objects(3, spacing, &band(6.0), &WiggleConfig::default(), 0).unwrap();
    assert_eq!(objs[1].phase_offset, 0.001);
    assert_eq!(objs[2].phase_offset, 0.002);
}

#[test]
fn offsets_wrap_when_capacity_is_small() {
    let spacing = PhaseSpacing::NominalCapacity { capacity: 2 };
    assert_eq!(spacing.offset(3, 5), 0.5);
}

#[test]
fn zero_capacity_is_rejected() {
    let spacing = PhaseSpacing::NominalCapacity { capacity: 0 };
    assert!(scatter_objects(1, spacing, &band(6.0), &WiggleConfig::default(), 0).is_err());
}

#[test]
fn band_limits_follow_magnitude_fraction() {
    let b = band(6.0);
    assert!((b.max_wiggle - 0.9).abs() < 1e-12);
    assert!((b.static_band - 2.1).abs() < 1e-12);
    assert!((b.wiggle_amplitude - 0.45).abs() < 1e-12);

    let narrow = LateralBand::new(-3.0, &WiggleConfig::default());
    assert_eq!(narrow.allowed_band, 0.0);
    assert_eq!(narrow.static_band, 0.0);

    let wide_wiggle = WiggleConfig {
        magnitude_fraction: 0.5,
        ..WiggleConfig::default()
    };
    assert_eq!(LateralBand::new(6.0, &wide_wiggle).static_band, 0.0);
}

#[test]
fn seeded_parameters_are_reproducible_and_bounded() {
    let b = band(6.0);
    let w = WiggleConfig::default();
    let a = scatter_objects(50, PhaseSpacing::Even, &b, &w, 42).unwrap();
    let again = scatter_objects(50, PhaseSpacing::Even, &b, &w, 42).unwrap();
    assert_eq!(a, again);

    let base = w.frequency_hz * w.frequency_scale;
    for o in &a {
        assert!(o.static_lateral_offset.abs() <= b.static_band);
        assert!((0.0..std::f64::consts::TAU).contains(&o.wiggle_phase));
        assert!(o.wiggle_frequency_hz >= base * (1.0 - w.frequency_jitter));
        assert!(o.wiggle_frequency_hz <= base * (1.0 + w.frequency_jitter));
    }
}

#[test]
fn lateral_parameters_depend_only_on_seed_and_index() {
    let b = band(6.0);
    let w = WiggleConfig::default();
    let small = scatter_objects(3, PhaseSpacing::Even, &b, &w, 9).unwrap();
    let large = scatter_objects(300, PhaseSpacing::Even, &b, &w, 9).unwrap();
    for (s, l) in small.iter().zip(&large) {
        assert_eq!(s.static_lateral_offset, l.static_lateral_offset);
        assert_eq!(s.wiggle_phase, l.wiggle_phase);
        assert_eq!(s.wiggle_frequency_hz, l.wiggle_frequency_hz);
    }
    let other_seed = scatter_objects(3, PhaseSpacing::Even, &b, &w, 10).unwrap();
    assert_ne!(small[0].wiggle_phase, other_seed[0].wiggle_phase);
}

#[test]
fn anchor_index_stays_in_range() {
    let objs = scatter_objects(4, PhaseSpacing::Even, &band(6.0), &WiggleConfig::default(), 0)
        .unwrap();
    let anchors: Vec<usize> = objs.iter().map(|o| o.anchor_index(100)).collect();
    assert_eq!(anchors, vec![0, 24, 49, 74]);
    assert_eq!(objs[3].anchor_index(0), 0);
    assert_eq!(objs[3].anchor_index(1), 0);
}

#[test]
fn wiggle_validation() {
    assert!(WiggleConfig::default().validate().is_ok());
    let bad = WiggleConfig {
        magnitude_fraction: 0.6,
        ..WiggleConfig::default()
    };
    assert!(bad.validate().is_err());
    let jitter = WiggleConfig {
        frequency_jitter: 1.0,
        ..WiggleConfig::default()
    };
    assert!(jitter.validate().is_err());
    let negative = WiggleConfig {
        frequency_hz: -1.0,
        ..WiggleConfig::default()
    };
    assert!(negative.validate().is_err());
}
