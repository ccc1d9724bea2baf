//! Tests for command-line argument parsing

use clap::Parser;
use pose_cycle::cli::{Args, Command};
use std::path::PathBuf;

#[test]
fn test_record_arguments() {
    let args = Args::try_parse_from([
        "pose-cycle",
        "record",
        "--input",
        "live.txt",
        "-n",
        "anna",
        "-e",
        "Hampelmann",
        "--weight",
        "70",
    ])
    .unwrap();

    assert_eq!(
        args.command,
        Command::Record {
            input: PathBuf::from("live.txt"),
            name: "anna".to_string(),
            exercise: Some("Hampelmann".to_string()),
            weight: Some("70".to_string()),
        }
    );
    assert!(!args.debug);
    assert!(args.config.is_none());
}

#[test]
fn test_record_labels_are_optional() {
    let args = Args::try_parse_from(["pose-cycle", "record", "-i", "live.txt", "-n", "anna"]).unwrap();
    match args.command {
        Command::Record { exercise, weight, .. } => {
            assert!(exercise.is_none());
            assert!(weight.is_none());
        }
        other => panic!("Expected record command, got {:?}", other),
    }
}

#[test]
fn test_play_arguments() {
    let args = Args::try_parse_from(["pose-cycle", "play", "-f", "take.txt", "--rate", "60", "--reverse"]).unwrap();
    assert_eq!(
        args.command,
        Command::Play {
            file: PathBuf::from("take.txt"),
            rate: Some(60.0),
            reverse: true,
        }
    );

    let args = Args::try_parse_from(["pose-cycle", "play", "--file", "take.txt"]).unwrap();
    assert_eq!(
        args.command,
        Command::Play {
            file: PathBuf::from("take.txt"),
            rate: None,
            reverse: false,
        }
    );
}

#[test]
fn test_analyze_and_config_commands() {
    let args = Args::try_parse_from(["pose-cycle", "analyze", "-f", "take.txt"]).unwrap();
    assert_eq!(
        args.command,
        Command::Analyze {
            file: PathBuf::from("take.txt")
        }
    );

    let args = Args::try_parse_from(["pose-cycle", "config"]).unwrap();
    assert_eq!(args.command, Command::Config);
}

#[test]
fn test_global_flags_anywhere() {
    let args = Args::try_parse_from(["pose-cycle", "--debug", "-C", "settings.yaml", "config"]).unwrap();
    assert!(args.debug);
    assert_eq!(args.config, Some(PathBuf::from("settings.yaml")));

    let args = Args::try_parse_from(["pose-cycle", "analyze", "-f", "take.txt", "-d", "--config", "other.yaml"]).unwrap();
    assert!(args.debug);
    assert_eq!(args.config, Some(PathBuf::from("other.yaml")));
}

#[test]
fn test_invalid_arguments() {
    let test_cases: Vec<Vec<&str>> = vec![
        vec!["pose-cycle"],
        vec!["pose-cycle", "record", "-n", "anna"],
        vec!["pose-cycle", "record", "-i", "live.txt"],
        vec!["pose-cycle", "play"],
        vec!["pose-cycle", "play", "-f", "take.txt", "--rate", "fast"],
        vec!["pose-cycle", "analyze"],
        vec!["pose-cycle", "dance"],
    ];

    for argv in test_cases {
        assert!(Args::try_parse_from(argv.iter().copied()).is_err(), "Expected error for {:?}", argv);
    }
}
