//! Cycle detector state machine and watchdog tests


use pose_cycle::{
    config::DetectorConfig,
    cycle_detector::{CycleDetector, CycleEvent, CycleState},
    timer::ManualClock,
};
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{cycle_frames, end_frame, mixed_frame, start_frame};

fn detector() -> (CycleDetector, Arc<ManualClock>) {
    let clock = ManualClock::new();
    (CycleDetector::new(&DetectorConfig::default(), clock.clone()), clock)
}

#[test]
fn test_start_is_idempotent() {
    let (mut detector, _clock) = detector();

    for _ in 0..5 {
        detector.analyze(&start_frame());
        assert_eq!(detector.state(), CycleState::Started);
    }

    let starts = detector
        .take_events()
        .into_iter()
        .filter(|e| *e == CycleEvent::Started)
        .count();
    assert_eq!(starts, 1);
    assert_eq!(detector.cycle_count(), 0);
}

#[test]
fn test_end_increments_by_one_and_cancels_watchdog() {
    let (mut detector, _clock) = detector();
    detector.analyze(&start_frame());
    assert!(detector.is_watchdog_armed());

    detector.analyze(&end_frame());
    assert_eq!(detector.state(), CycleState::Idle);
    assert_eq!(detector.cycle_count(), 1);
    assert!(!detector.is_watchdog_armed());
    assert!(!detector.is_timed_out());

    // Further end frames while idle change nothing
    detector.analyze(&end_frame());
    assert_eq!(detector.cycle_count(), 1);
}

#[test]
fn test_mixed_frames_are_ignored() {
    let (mut detector, clock) = detector();

    detector.analyze(&mixed_frame());
    assert_eq!(detector.state(), CycleState::Idle);

    detector.analyze(&start_frame());
    clock.advance_secs(1.0);
    detector.analyze(&mixed_frame());
    assert_eq!(detector.state(), CycleState::Started);
    assert!(detector.is_watchdog_armed());
}

#[test]
fn test_end_without_start_is_ignored() {
    let (mut detector, _clock) = detector();
    detector.analyze(&end_frame());
    assert_eq!(detector.state(), CycleState::Idle);
    assert_eq!(detector.cycle_count(), 0);
    assert!(detector.take_events().is_empty());
}

#[test]
fn test_many_cycles() {
    let (mut detector, clock) = detector();
    for frame in cycle_frames(12, 4) {
        clock.advance_secs(1.0 / 30.0);
        detector.analyze(&frame);
    }
    assert_eq!(detector.cycle_count(), 12);

    let completed: Vec<u32> = detector
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            CycleEvent::CycleCompleted(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(completed, (1..=12).collect::<Vec<_>>());
}

#[test]
fn test_timeout_resets_to_idle() {
    let (mut detector, clock) = detector();
    for frame in cycle_frames(3, 2) {
        detector.analyze(&frame);
    }
    assert_eq!(detector.cycle_count(), 3);

    detector.analyze(&start_frame());
    clock.advance(Duration::from_millis(2400));
    assert!(!detector.poll());
    assert_eq!(detector.state(), CycleState::Started);

    clock.advance(Duration::from_millis(100));
    assert!(detector.poll());
    assert_eq!(detector.state(), CycleState::Idle);
    assert_eq!(detector.cycle_count(), 0);
    assert!(detector.is_timed_out());
    assert!(!detector.is_watchdog_armed());

    // The watchdog fires only once
    clock.advance_secs(5.0);
    assert!(!detector.poll());
}

#[test]
fn test_expired_watchdog_applies_before_next_frame() {
    let (mut detector, clock) = detector();
    detector.analyze(&start_frame());
    clock.advance_secs(3.0);

    // The late end frame must not complete the stale cycle
    detector.analyze(&end_frame());
    assert_eq!(detector.cycle_count(), 0);
    assert!(detector.is_timed_out());
    assert!(detector.take_events().contains(&CycleEvent::TimedOut));
}

#[test]
fn test_completed_cycle_clears_timeout_flag() {
    let (mut detector, clock) = detector();
    detector.analyze(&start_frame());
    clock.advance_secs(2.5);
    detector.poll();
    assert!(detector.is_timed_out());

    detector.analyze(&start_frame());
    assert!(!detector.is_timed_out());
    detector.analyze(&end_frame());
    assert_eq!(detector.cycle_count(), 1);
}

#[test]
fn test_restart_rearms_full_duration() {
    let (mut detector, clock) = detector();
    detector.analyze(&start_frame());
    clock.advance_secs(2.0);
    detector.analyze(&end_frame());

    detector.analyze(&start_frame());
    clock.advance_secs(2.0);
    assert!(!detector.poll());
    assert_eq!(detector.cycle_count(), 1);
}

#[test]
fn test_reset() {
    let (mut detector, clock) = detector();
    for frame in cycle_frames(2, 1) {
        detector.analyze(&frame);
    }
    detector.analyze(&start_frame());
    detector.reset();

    assert_eq!(detector.state(), CycleState::Idle);
    assert_eq!(detector.cycle_count(), 0);
    assert!(!detector.is_watchdog_armed());

    clock.advance_secs(10.0);
    assert!(!detector.poll());
}

#[test]
fn test_custom_thresholds() {
    let config = DetectorConfig {
        arms_close_threshold: 2.0,
        feet_close_threshold: 1.0,
        timeout_secs: 1.0,
    };
    let clock = ManualClock::new();
    let mut detector = CycleDetector::new(&config, clock.clone());

    // Wide arms still count as close with the relaxed threshold
    detector.analyze(&mixed_frame());
    assert_eq!(detector.state(), CycleState::Started);

    clock.advance_secs(1.0);
    assert!(detector.poll());
}
