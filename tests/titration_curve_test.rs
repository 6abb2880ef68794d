use titration_lab::config::{LabConfig, ReagentConfig};
use titration_lab::core::chemistry::{compute_ph, indicator_color};
use titration_lab::core::session::TickOutcome;
use titration_lab::{IndicatorColor, LabEvent, Readouts, Rejection, TitrationSession, VesselKind};

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}

fn prepared_session() -> TitrationSession {
    let mut session = TitrationSession::new(LabConfig::default());
    session.place_vessel(VesselKind::Flask).unwrap();
    session.add_sample().unwrap();
    session.place_burette().unwrap();
    session
}

#[test]
fn test_half_way_to_equivalence() {
    // 0.0005 mol excess acid in 15 mL
    let ph = compute_ph(&ReagentConfig::default(), 5.0);
    assert_close(ph, 1.48, 0.005);
}

#[test]
fn test_past_equivalence() {
    // 0.0005 mol excess base in 25 mL
    let ph = compute_ph(&ReagentConfig::default(), 15.0);
    assert_close(ph, 12.30, 0.005);
}

#[test]
fn test_equivalence_at_ten_millilitres() {
    assert_eq!(compute_ph(&ReagentConfig::default(), 10.0), 7.0);
}

#[test]
fn test_curve_is_monotonic() {
    let reagents = ReagentConfig::default();
    let mut previous = compute_ph(&reagents, 0.0);
    for step in 1..=400 {
        let ph = compute_ph(&reagents, step as f64 * 0.1);
        assert!(
            ph >= previous,
            "pH fell from {} to {} at {} mL",
            previous,
            ph,
            step as f64 * 0.1
        );
        previous = ph;
    }
}

#[test]
fn test_dripped_curve_is_monotonic_and_hits_seven() {
    let mut session = prepared_session();
    let token = session.open_valve().unwrap();

    let mut previous = session.current_ph().unwrap();
    assert_close(previous, 1.0, 1e-9);

    for tick in 1..=200 {
        assert!(matches!(session.drip_tick(token), TickOutcome::Dripped { .. }));
        let ph = session.current_ph().unwrap();
        assert!(ph >= previous);
        if tick == 100 {
            assert_eq!(ph, 7.0);
        }
        previous = ph;
    }
}

#[test]
fn test_indicator_ramp_points() {
    assert_eq!(indicator_color(8.2, 8.2), IndicatorColor::Pink { intensity: 0.0 });
    assert_eq!(indicator_color(7.99, 8.2), IndicatorColor::Clear);

    match indicator_color(8.45, 8.2) {
        IndicatorColor::Pink { intensity } => assert_close(intensity, 0.5, 1e-9),
        other => panic!("expected pink, got {:?}", other),
    }
    match indicator_color(8.7, 8.2) {
        IndicatorColor::Pink { intensity } => assert_close(intensity, 1.0, 1e-9),
        other => panic!("expected pink, got {:?}", other),
    }
    assert_eq!(indicator_color(13.0, 8.2), IndicatorColor::Pink { intensity: 1.0 });
}

#[test]
fn test_sample_volume_counted_once() {
    let mut session = TitrationSession::new(LabConfig::default());
    session.place_vessel(VesselKind::Flask).unwrap();
    session.add_sample().unwrap();
    assert_eq!(session.add_sample(), Err(Rejection::SampleAlreadyAdded));
    assert_eq!(session.vessel().unwrap().liquid_volume_ml, 10.0);
}

#[test]
fn test_ph_undefined_without_sample() {
    let mut session = TitrationSession::new(LabConfig::default());
    assert_eq!(session.current_ph(), None);
    session.place_vessel(VesselKind::Flask).unwrap();
    assert_eq!(session.current_ph(), None);
    assert_eq!(session.readouts().ph_text(), "--");
}

#[test]
fn test_reset_returns_to_empty_state() {
    let mut session = prepared_session();
    session.add_indicator().unwrap();
    let token = session.open_valve().unwrap();
    for _ in 0..120 {
        session.drip_tick(token);
    }
    assert!(matches!(
        session.indicator_color(),
        Some(IndicatorColor::Pink { .. })
    ));

    assert_eq!(session.reset(), LabEvent::Reset);
    assert_eq!(session.current_ph(), None);
    assert_eq!(session.total_titrant_ml(), 0.0);
    assert_eq!(session.indicator_color(), None);
    assert_eq!(session.readouts(), Readouts::default());

    // the bench is usable again after a reset
    assert!(session.place_vessel(VesselKind::Beaker).is_ok());
}

#[test]
fn test_custom_reagents_shift_equivalence() {
    let mut config = LabConfig::default();
    config.reagents.sample_volume_ml = 20.0;
    config.drip.increment_ml = 0.5;

    let mut session = TitrationSession::new(config);
    session.place_vessel(VesselKind::Flask).unwrap();
    assert_eq!(
        session.add_sample(),
        Ok(LabEvent::SampleAdded { volume_ml: 20.0 })
    );
    session.place_burette().unwrap();
    let token = session.open_valve().unwrap();
    for _ in 0..40 {
        session.drip_tick(token);
    }
    assert_eq!(session.total_titrant_ml(), 20.0);
    assert_eq!(session.current_ph(), Some(7.0));
}
