use super::*;

fn leen_canal() -> HydraulicInputs {
    HydraulicInputs {
        velocity_mps: 1.0,
        discharge_cumecs: 0.7,
        comp_scale_px_per_km: 733.0,
        particles_per_km_per_cumec: 2.0,
        time_factor: 100_000.0,
    }
}

fn derive(len_px: f64, inputs: &HydraulicInputs) -> FlowParameters {
    derive_flow_parameters(len_px, inputs, &DurationClamp::default(), 100_000)
}

#[test]
fn leen_canal_one_kilometre() {
    let p = derive(733.0, &leen_canal());
    assert_eq!(p.object_count, 1);
    assert!((p.loop_duration_secs - 10.0).abs() < 1e-12);
    assert!((p.path_length_km - 1.0).abs() < 1e-12);
    assert!(!p.was_adjusted());
}

#[test]
fn default_inputs_scale_linearly() {
    let p = derive(733.0, &HydraulicInputs::default());
    assert_eq!(p.object_count, 160);
    assert!((p.loop_duration_secs - 25.0).abs() < 1e-9);

    let p2 = derive(1466.0, &HydraulicInputs::default());
    assert_eq!(p2.object_count, 320);
    assert!((p2.loop_duration_secs - 50.0).abs() < 1e-9);
}

#[test]
fn zero_discharge_still_yields_one_object() {
    let inputs = HydraulicInputs {
        discharge_cumecs: 0.0,
        ..leen_canal()
    };
    let p = derive(733.0, &inputs);
    assert_eq!(p.object_count, 1);
    assert_eq!(p.adjustments, vec![ParameterAdjustment::ObjectCountRaisedToOne]);
}

#[test]
fn vanishing_path_length_is_safe() {
    let p = derive(1e-12, &leen_canal());
    assert_eq!(p.object_count, 1);
    assert_eq!(p.loop_duration_secs, 10.0);
    assert!(p.adjustments.contains(&ParameterAdjustment::DurationBelowMinimum));
}

#[test]
fn zero_velocity_uses_fallback_duration() {
    let inputs = HydraulicInputs {
        velocity_mps: 0.0,
        ..leen_canal()
    };
    let p = derive(733.0, &inputs);
    assert_eq!(p.loop_duration_secs, 10.0);
    assert!(p.adjustments.contains(&ParameterAdjustment::DurationNonFinite));
}

#[test]
fn zero_comp_scale_recovers_both_parameters() {
    let inputs = HydraulicInputs {
        comp_scale_px_per_km: 0.0,
        ..leen_canal()
    };
    let p = derive(733.0, &inputs);
    assert_eq!(p.object_count, 1);
    assert_eq!(p.loop_duration_secs, 10.0);
    assert_eq!(
        p.adjustments,
        vec![
            ParameterAdjustment::ObjectCountNonFinite,
            ParameterAdjustment::DurationNonFinite
        ]
    );
}

#[test]
fn long_slow_paths_are_capped() {
    let inputs = HydraulicInputs {
        velocity_mps: 0.001,
        ..leen_canal()
    };
    let p = derive(733.0 * 50.0, &inputs);
    assert_eq!(p.loop_duration_secs, 600.0);
    assert!(p.adjustments.contains(&ParameterAdjustment::DurationCapped));
}

#[test]
fn object_count_respects_cap() {
    let p = derive_flow_parameters(
        733.0 * 1000.0,
        &HydraulicInputs::default(),
        &DurationClamp::default(),
        500,
    );
    assert_eq!(p.object_count, 500);
    assert!(p.adjustments.contains(&ParameterAdjustment::ObjectCountCapped));
}

#[test]
fn duration_always_within_bounds_for_positive_velocity() {
    let clamp = DurationClamp::default();
    for v in [1e-9, 0.01, 0.4, 1.0, 25.0, 1e9] {
        for len in [0.5, 10.0, 733.0, 1e6] {
            let inputs = HydraulicInputs {
                velocity_mps: v,
                ..HydraulicInputs::default()
            };
            let p = derive_flow_parameters(len, &inputs, &clamp, 100_000);
            assert!(p.loop_duration_secs >= clamp.min_secs);
            assert!(p.loop_duration_secs <= clamp.max_secs);
            assert!(p.object_count >= 1);
        }
    }
}

#[test]
fn clamp_validation() {
    assert!(DurationClamp::default().validate().is_ok());
    let bad_order = DurationClamp {
        min_secs: 1.0,
        max_secs: 5.0,
        fallback_secs: 10.0,
    };
    assert!(bad_order.validate().is_err());
    let zero_min = DurationClamp {
        min_secs: 0.0,
        ..DurationClamp::default()
    };
    assert!(zero_min.validate().is_err());
    let nan = DurationClamp {
        max_secs: f64::NAN,
        ..DurationClamp::default()
    };
    assert!(nan.validate().is_err());
}

#[test]
fn fallback_above_max_is_pulled_into_bounds() {
    let clamp = DurationClamp {
        min_secs: 1.0,
        max_secs: 5.0,
        fallback_secs: 10.0,
    };
    let stalled = HydraulicInputs {
        velocity_mps: 0.0,
        ..leen_canal()
    };
    let p = derive_flow_parameters(733.0, &stalled, &clamp, 100_000);
    assert!((1.0..=5.0).contains(&p.loop_duration_secs));
    assert_eq!(p.loop_duration_secs, 5.0);
    assert!(p.adjustments.contains(&ParameterAdjustment::DurationBoundsRepaired));
    assert!(p.adjustments.contains(&ParameterAdjustment::DurationNonFinite));
}

#[test]
fn inverted_and_nan_bounds_still_yield_a_duration_in_range() {
    let inverted = DurationClamp {
        min_secs: 50.0,
        max_secs: 20.0,
        fallback_secs: 30.0,
    };
    let fixed = inverted.repaired();
    assert!(fixed.validate().is_ok());
    assert_eq!((fixed.min_secs, fixed.max_secs, fixed.fallback_secs), (50.0, 50.0, 50.0));

    let nan = DurationClamp {
        min_secs: f64::NAN,
        max_secs: f64::NAN,
        fallback_secs: f64::NAN,
    };
    assert_eq!(nan.repaired(), DurationClamp::default());

    let p = derive_flow_parameters(733.0, &leen_canal(), &inverted, 100_000);
    assert_eq!(p.loop_duration_secs, 50.0);
}

#[test]
fn valid_bounds_are_left_alone() {
    let clamp = DurationClamp::default();
    assert_eq!(clamp.repaired(), clamp);
    let p = derive(733.0, &leen_canal());
    assert!(!p.adjustments.contains(&ParameterAdjustment::DurationBoundsRepaired));
}
