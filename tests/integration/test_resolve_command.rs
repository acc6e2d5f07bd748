//! Integration tests for the resolve command.

use serde_json::Value;
use tempfile::TempDir;

use crate::helpers::{FixtureBuilder, IMPACT, LaneSpec, SampleSpec, read_json, run_tnpair};

#[test]
fn test_resolve_writes_payload_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new()
        .sample(&SampleSpec::normal("10075_D_2", "10075_D", "C-DRKHP7"))
        .sample(&SampleSpec::normal("10075_D_5_2", "10075_D_5", "C-OTHER1"))
        .write(temp_dir.path(), "db.json");

    let result = run_tnpair([
        "resolve",
        "-f",
        fixture.to_str().unwrap(),
        "-p",
        "C-DRKHP7",
        "-b",
        IMPACT,
        "-r",
        "10075_D",
    ]);
    assert!(result.status.success(), "resolve failed: {}", String::from_utf8_lossy(&result.stderr));

    let payload: Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(payload["igo_id"], "10075_D_2");
    assert_eq!(payload["patient_id"], "C-DRKHP7");
    assert_eq!(payload["tumor_type"], "Normal");
    assert_eq!(payload["LB"], "10075_D_2");
    assert_eq!(payload["ID"][0], "s_C_DRKHP7_N001_d_HCYYWBBXY");
}

#[test]
fn test_resolve_without_request_uses_latest_normal() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new()
        .sample(&SampleSpec::normal("10075_D_2_3", "10075_D_2", "C-8VK0V7").run_date("2019-12-12"))
        .sample(&SampleSpec::normal("10075_D_4_3", "10075_D_4", "C-8VK0V7").lanes(vec![
            LaneSpec::new("HCYYWBBXY", "2019-12-11"),
            LaneSpec::new("HCVJGBBXY", "2019-12-13"),
        ]))
        .write(temp_dir.path(), "db.json");
    let output = temp_dir.path().join("normal.json");

    let result = run_tnpair([
        "resolve",
        "-f",
        fixture.to_str().unwrap(),
        "-p",
        "C-8VK0V7",
        "-b",
        IMPACT,
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    let payload = read_json(&output);
    assert_eq!(payload["igo_id"], "10075_D_4_3");
    assert_eq!(payload["PU"].as_array().unwrap().len(), 2);
    assert_eq!(payload["request_id"], serde_json::json!(["10075_D_4"]));
}

#[test]
fn test_resolve_no_normal_fails() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new()
        .sample(&SampleSpec::tumor("10075_D_1", "10075_D", "C-DRKHP7"))
        .write(temp_dir.path(), "db.json");

    let result =
        run_tnpair(["resolve", "-f", fixture.to_str().unwrap(), "-p", "C-DRKHP7", "-b", IMPACT]);
    assert!(!result.status.success());
    assert!(result.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("No normal found for patient C-DRKHP7"), "unexpected stderr: {stderr}");
}

#[test]
fn test_resolve_match_bait_set() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new()
        .sample(
            &SampleSpec::normal("10075_D_2", "10075_D", "C-DRKHP7")
                .bait_set("AgilentExon_51MB_b37_v3"),
        )
        .write(temp_dir.path(), "db.json");
    let fixture = fixture.to_str().unwrap();

    let any_bait_set = run_tnpair(["resolve", "-f", fixture, "-p", "C-DRKHP7", "-b", IMPACT]);
    assert!(any_bait_set.status.success());
    let payload: Value = serde_json::from_slice(&any_bait_set.stdout).unwrap();
    assert_eq!(payload["bait_set"], "AgilentExon_51MB_b37_v3");

    let matched =
        run_tnpair(["resolve", "-f", fixture, "-p", "C-DRKHP7", "-b", IMPACT, "--match-bait-set"]);
    assert!(!matched.status.success());
}

#[test]
fn test_resolve_blank_patient_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new().write(temp_dir.path(), "db.json");
    let result = run_tnpair(["resolve", "-f", fixture.to_str().unwrap(), "-p", " ", "-b", IMPACT]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("patient-id"));
}
