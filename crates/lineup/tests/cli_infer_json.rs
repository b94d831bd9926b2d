mod cli_support;

use cli_support::{args, run_cli, run_cli_json, write_config, QUIET_ENV};
use serde::Deserialize;
use std::collections::BTreeMap;
use tempfile::TempDir;

#[derive(Debug, Deserialize)]
struct InferOutput {
    group_pattern: String,
    group_token: String,
    group_position: usize,
    samples: usize,
    pending_segments: Vec<String>,
    type_confidence: BTreeMap<String, f64>,
    written: bool,
}

const SAMPLES: [&str; 4] = [
    "car_ABC123_front.jpg",
    "car_ABC123_rear.jpg",
    "car_XYZ9_front.jpg",
    "photos/car_XYZ9_rear.jpg",
];

#[test]
fn test_infer_json_pattern() {
    let mut cmd = args(&["infer"]);
    cmd.extend(args(&SAMPLES));
    cmd.extend(args(&["--group-token", "ABC123", "--json"]));

    let output: InferOutput = run_cli_json(&cmd, &QUIET_ENV);
    assert_eq!(output.group_token, "ABC123");
    assert_eq!(output.group_position, 1);
    assert_eq!(output.samples, 4);
    assert!(output.pending_segments.is_empty());
    assert!(!output.written);
    assert!(output.group_pattern.starts_with(r"^car[_\-.\s]+([\w-]+)[_\-.\s]+"));
    assert!(output.group_pattern.ends_with("(?i:jpg)$"));
    assert_eq!(output.type_confidence.get("EXTENSION"), Some(&1.0));
}

#[test]
fn test_infer_reports_and_applies_segment_labels() {
    let dir = TempDir::new().expect("create temp dir");
    let files = ["car_A1_tmp_front.jpg", "car_B2_tmp_rear.jpg"];

    let mut cmd = args(&["infer"]);
    cmd.extend(args(&files));
    cmd.extend(args(&["--group-token", "A1", "--json"]));
    let output: InferOutput = run_cli_json(&cmd, &QUIET_ENV);
    assert_eq!(output.pending_segments, vec!["tmp".to_string()]);
    assert!(output.group_pattern.contains(r"\w*"));

    let config = write_config(
        dir.path(),
        r#"
[[segment_labels]]
value = "tmp"
action = "IGNORE"
"#,
    );
    let mut cmd = args(&["infer"]);
    cmd.extend(args(&files));
    cmd.extend(args(&["--group-token", "A1", "--json", "--config"]));
    cmd.push(config.to_string_lossy().to_string());
    let output: InferOutput = run_cli_json(&cmd, &QUIET_ENV);
    assert!(output.pending_segments.is_empty());
    assert!(!output.group_pattern.contains(r"\w*"));
}

#[test]
fn test_infer_write_creates_config() {
    let dir = TempDir::new().expect("create temp dir");
    let config = dir.path().join("new.toml");

    let mut cmd = args(&["infer"]);
    cmd.extend(args(&SAMPLES));
    cmd.extend(args(&["--group-token", "abc123", "--write", "--json", "--config"]));
    cmd.push(config.to_string_lossy().to_string());

    let output: InferOutput = run_cli_json(&cmd, &QUIET_ENV);
    assert!(output.written);
    assert_eq!(output.group_token, "ABC123");

    let saved = std::fs::read_to_string(&config).expect("config written");
    assert!(saved.contains("group_pattern"));
    assert!(saved.contains("group_id_token = \"ABC123\""));
}

#[test]
fn test_infer_unknown_group_token_fails() {
    let mut cmd = args(&["infer"]);
    cmd.extend(args(&SAMPLES));
    cmd.extend(args(&["--group-token", "NOPE", "--json"]));

    let output = run_cli(&cmd, &QUIET_ENV);
    assert!(!output.status.success());
    let payload = cli_support::parse_json_output(&output);
    assert!(payload["error"].as_str().unwrap().contains("NOPE"));
}
