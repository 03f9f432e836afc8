//! Request construction and parsing tests.

use std::time::Duration;

use clipgif::{ClipError, ConversionRequest, Quality, Repeat};

#[test]
fn default_request_matches_form_defaults() {
    let request = ConversionRequest::default();
    assert_eq!(request.start_time(), Duration::ZERO);
    assert_eq!(request.duration(), Duration::from_secs(3));
    assert_eq!(request.sample_interval(), Duration::from_millis(500));
    assert_eq!(request.playback_interval(), Duration::from_millis(200));
    assert_eq!(request.quality(), Quality::Best);
    assert_eq!(request.repeat(), Repeat::PlayOnce);
}

#[test]
fn from_secs_builds_exact_durations() {
    let request = ConversionRequest::from_secs(1.5, 3.0, 0.25, 0.1).unwrap();
    assert_eq!(request.start_time(), Duration::from_millis(1500));
    assert_eq!(request.duration(), Duration::from_secs(3));
    assert_eq!(request.sample_interval(), Duration::from_millis(250));
    assert!((request.frames_per_second() - 10.0).abs() < 1e-9);
}

#[test]
fn zero_intervals_are_rejected() {
    for (args, field) in [
        ((0.0, 0.0, 0.5, 0.2), "duration"),
        ((0.0, 3.0, 0.0, 0.2), "sample_interval"),
        ((0.0, 3.0, 0.5, 0.0), "playback_interval"),
    ] {
        match ConversionRequest::from_secs(args.0, args.1, args.2, args.3) {
            Err(ClipError::InvalidParameter { name, .. }) => assert_eq!(name, field),
            other => panic!("Expected InvalidParameter for {field}, got: {other:?}"),
        }
    }
}

#[test]
fn negative_and_non_finite_seconds_are_rejected() {
    assert!(ConversionRequest::from_secs(-1.0, 3.0, 0.5, 0.2).is_err());
    assert!(ConversionRequest::from_secs(0.0, f64::NAN, 0.5, 0.2).is_err());
    assert!(ConversionRequest::from_secs(0.0, 3.0, f64::INFINITY, 0.2).is_err());
}

#[test]
fn builders_replace_policy_fields() {
    let request = ConversionRequest::default()
        .with_quality(Quality::Low)
        .with_repeat(Repeat::Loop);
    assert_eq!(request.quality(), Quality::Low);
    assert_eq!(request.repeat(), Repeat::Loop);
    assert_eq!(request.duration(), Duration::from_secs(3));
}

#[test]
fn quality_parses_case_insensitively() {
    assert_eq!("best".parse::<Quality>().unwrap(), Quality::Best);
    assert_eq!(" Good ".parse::<Quality>().unwrap(), Quality::Good);
    assert_eq!("MEDIUM".parse::<Quality>().unwrap(), Quality::Medium);
    assert_eq!("low".parse::<Quality>().unwrap(), Quality::Low);
    assert!(matches!(
        "ultra".parse::<Quality>(),
        Err(ClipError::InvalidParameter { name: "quality", .. })
    ));

    for quality in Quality::ALL {
        assert_eq!(quality.to_string().parse::<Quality>().unwrap(), quality);
    }
}

#[test]
fn repeat_accepts_form_labels() {
    assert_eq!("Repeat".parse::<Repeat>().unwrap(), Repeat::Loop);
    assert_eq!("loop".parse::<Repeat>().unwrap(), Repeat::Loop);
    assert_eq!("No repeat".parse::<Repeat>().unwrap(), Repeat::PlayOnce);
    assert_eq!("once".parse::<Repeat>().unwrap(), Repeat::PlayOnce);
    assert!("sometimes".parse::<Repeat>().is_err());
}
