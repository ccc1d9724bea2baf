//! Integration tests for the record → review path


use pose_cycle::{
    app::{run_analyze, run_play, run_record, Acquisition, CapturePipeline, ReviewSession},
    config::Config,
    cycle_detector::CycleEvent,
    storage::{FileStorage, MemoryStorage, Storage},
    timer::ManualClock,
};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use test_helpers::{cycle_frames, indexed_frames, start_frame, to_lines};

fn write_recording(dir: &Path, name: &str, lines: &[String]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content).expect("Failed to write recording");
    path
}

/// Record a jumping-jack session and review it frame by frame
#[test]
fn test_record_then_review() {
    let clock = ManualClock::new();
    let storage = MemoryStorage::new();
    let config = Config::default();

    let mut pipeline = CapturePipeline::new(&config, Box::new(storage.clone()), clock.clone());
    let destination = pipeline.start_recording("mia", Some("Hampelmann"), None).unwrap();
    for frame in cycle_frames(20, 3) {
        clock.advance(Duration::from_millis(33));
        pipeline.process(&Acquisition::Tracked(frame)).unwrap();
    }
    assert!(!pipeline.session().is_recording());

    let mut review = ReviewSession::new(&config, clock.clone());
    assert_eq!(review.load(&storage, &destination).unwrap(), 60);

    // Cycles 7 through 15 are complete inside the recorded window
    assert_eq!(review.analyze_all().unwrap(), 9);
    assert_eq!(review.detector().cycle_count(), 9);
}

#[test]
fn test_review_scrub_reports_events() {
    let clock = ManualClock::new();
    let storage = MemoryStorage::new();
    storage.insert("short.txt", to_lines(&cycle_frames(2, 1)));

    let mut review = ReviewSession::new(&Config::default(), clock.clone());
    review.load(&storage, "short.txt").unwrap();

    assert_eq!(review.scrub(0).unwrap(), vec![CycleEvent::Started]);
    assert_eq!(review.scrub(1).unwrap(), vec![CycleEvent::CycleCompleted(1)]);
    assert!(review.scrub(3).is_err());
    assert!(!review.playback().is_running());
}

#[test]
fn test_review_scrub_timeout() {
    let clock = ManualClock::new();
    let storage = MemoryStorage::new();
    storage.insert("slow.txt", to_lines(&[start_frame(), start_frame(), start_frame()]));

    let mut review = ReviewSession::new(&Config::default(), clock.clone());
    review.load(&storage, "slow.txt").unwrap();
    review.scrub(0).unwrap();
    clock.advance_secs(3.0);

    let events = review.scrub(1).unwrap();
    assert_eq!(events, vec![CycleEvent::TimedOut, CycleEvent::Started]);
}

#[test]
fn test_file_storage_roundtrip() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new();
    let config = Config::default();
    let storage = FileStorage::new(dir.path());

    let mut pipeline = CapturePipeline::new(&config, Box::new(storage.clone()), clock.clone());
    let destination = pipeline.start_recording("leo", None, Some("80")).unwrap();
    for frame in cycle_frames(20, 2) {
        clock.advance(Duration::from_millis(40));
        pipeline.process(&Acquisition::Tracked(frame)).unwrap();
    }

    assert!(dir.path().join(&destination).exists());
    let lines = storage.read_all_lines(&destination).unwrap();
    assert_eq!(lines.len(), 40);

    let mut review = ReviewSession::new(&config, clock);
    assert_eq!(review.load(&storage, &destination).unwrap(), 40);
}

#[test]
fn test_run_record_persists_settled_window() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let input = write_recording(input_dir.path(), "session.txt", &to_lines(&cycle_frames(20, 3)));

    let mut config = Config::default();
    config.sensor.frame_rate = 1000.0;
    config.capture.output_dir = output_dir.path().to_path_buf();

    let written = run_record(&config, &input, "ida", Some("Hampelmann"), Some("60")).unwrap();
    assert_eq!(written, 60);

    let content = fs::read_to_string(output_dir.path().join("idaHampelmann60.txt")).unwrap();
    assert_eq!(content.lines().count(), 60);
}

#[test]
fn test_run_record_rejects_placeholder_name() {
    let input_dir = TempDir::new().unwrap();
    let input = write_recording(input_dir.path(), "session.txt", &to_lines(&cycle_frames(1, 1)));

    let mut config = Config::default();
    config.capture.output_dir = input_dir.path().to_path_buf();

    let err = run_record(&config, &input, "Dateiname", None, None).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_run_analyze_counts_cycles() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(dir.path(), "cycles.txt", &to_lines(&cycle_frames(4, 1)));

    // The trimmed tail frame is the last end frame, so the fourth cycle is cut
    assert_eq!(run_analyze(&Config::default(), &path).unwrap(), 3);
}

#[test]
fn test_run_play_renders_every_tick() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(dir.path(), "five.txt", &to_lines(&indexed_frames(5)));
    let config = Config::default();

    assert_eq!(run_play(&config, &path, Some(120.0), false).unwrap(), 4);
    assert_eq!(run_play(&config, &path, Some(120.0), true).unwrap(), 4);
}

#[test]
fn test_run_play_errors() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();

    assert!(run_play(&config, &dir.path().join("missing.txt"), None, false).is_err());

    let path = write_recording(dir.path(), "five.txt", &to_lines(&indexed_frames(5)));
    assert!(run_play(&config, &path, Some(0.0), false).is_err());
    assert!(run_play(&config, &path, Some(1e-20), false).unwrap_err().is_validation());

    let empty = dir.path().join("empty.txt");
    fs::write(&empty, "").unwrap();
    assert_eq!(run_play(&config, &empty, None, false).unwrap(), 0);
}
