//! Integration tests for the pair command.

use serde_json::json;
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

use crate::helpers::{
    FixtureBuilder, LaneSpec, SampleSpec, read_json, record, run_tnpair, write_samples,
};

/// The normal of patient C-DRKHP7 as recorded in the repository.
fn drkhp7_normal() -> SampleSpec {
    let mut lane = LaneSpec::new("HCYYWBBXY", "2019-12-12");
    lane.r1_id = Uuid::parse_str("40a07e9a-2198-40b7-9f7f-7696c9d6429e").unwrap();
    lane.r2_id = Uuid::parse_str("bb7ff922-b741-4df7-ba2a-4f3b8549e8b5").unwrap();
    lane.stem = Some(
        "/ifs/archive/GCL/hiseq/FASTQ/JAX_0397_BHCYYWBBXY/Project_10075_D/\
         Sample_31-N_IGO_10075_D_2/31-N_IGO_10075_D_2_S14"
            .to_string(),
    );
    SampleSpec::normal("10075_D_2", "10075_D", "C-DRKHP7").lanes(vec![lane])
}

#[test]
fn test_pair_local_normal() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new().write(temp_dir.path(), "empty.json");
    let samples = write_samples(
        temp_dir.path(),
        &json!([record("C-W86LMR", "Normal"), record("C-W86LMR", "Tumor")]),
    );
    let output = temp_dir.path().join("pairs.json");

    let result = run_tnpair([
        "pair",
        "-f",
        fixture.to_str().unwrap(),
        "-s",
        samples.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);

    assert!(result.status.success(), "pair failed: {}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(
        read_json(&output),
        json!({
            "tumor": [{"patient_id": "C-W86LMR", "bait_set": "IMPACT468_BAITS", "tumor_type": "Tumor"}],
            "normal": [{"patient_id": "C-W86LMR", "bait_set": "IMPACT468_BAITS", "tumor_type": "Normal"}],
        })
    );
}

#[test]
fn test_pair_normals_repeat_for_each_tumor() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new().write(temp_dir.path(), "empty.json");
    let samples = write_samples(
        temp_dir.path(),
        &json!([
            record("C-DRKHP7", "Normal"),
            record("C-8VK0V7", "Normal"),
            record("C-DRKHP7", "Tumor"),
            record("C-8VK0V7", "Tumor"),
            record("C-DRKHP7", "Tumor"),
        ]),
    );
    let output = temp_dir.path().join("pairs.json");

    let result = run_tnpair([
        "pair",
        "-f",
        fixture.to_str().unwrap(),
        "-s",
        samples.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    let pairs = read_json(&output);
    let tumors: Vec<&str> =
        pairs["tumor"].as_array().unwrap().iter().map(|t| t["patient_id"].as_str().unwrap()).collect();
    let normals: Vec<&str> =
        pairs["normal"].as_array().unwrap().iter().map(|n| n["patient_id"].as_str().unwrap()).collect();
    assert_eq!(tumors, vec!["C-DRKHP7", "C-8VK0V7", "C-DRKHP7"]);
    assert_eq!(normals, tumors);
    assert!(pairs["normal"].as_array().unwrap().iter().all(|n| n["tumor_type"] == "Normal"));
}

#[test]
fn test_pair_normal_only_input_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new().write(temp_dir.path(), "empty.json");
    let samples = write_samples(temp_dir.path(), &json!([record("C-DRKHP7", "Normal")]));
    let output = temp_dir.path().join("pairs.json");

    let result = run_tnpair([
        "pair",
        "-f",
        fixture.to_str().unwrap(),
        "-s",
        samples.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success());
    assert_eq!(read_json(&output), json!({"tumor": [], "normal": []}));
}

#[test]
fn test_pair_resolves_normal_from_repository() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new().sample(&drkhp7_normal()).write(temp_dir.path(), "db.json");
    let samples = write_samples(
        temp_dir.path(),
        &json!([{
            "patient_id": "C-DRKHP7",
            "bait_set": "IMPACT468_BAITS",
            "tumor_type": "Tumor",
            "igo_id": "10075_D_1",
            "request_id": "10075_D",
        }]),
    );
    let output = temp_dir.path().join("pairs.json");

    let result = run_tnpair([
        "pair",
        "-f",
        fixture.to_str().unwrap(),
        "-s",
        samples.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "pair failed: {}", String::from_utf8_lossy(&result.stderr));

    let pairs = read_json(&output);
    assert_eq!(pairs["tumor"][0]["igo_id"], "10075_D_1");
    let r1 = "/ifs/archive/GCL/hiseq/FASTQ/JAX_0397_BHCYYWBBXY/Project_10075_D/\
              Sample_31-N_IGO_10075_D_2/31-N_IGO_10075_D_2_S14_R1_001.fastq.gz";
    let r2 = "/ifs/archive/GCL/hiseq/FASTQ/JAX_0397_BHCYYWBBXY/Project_10075_D/\
              Sample_31-N_IGO_10075_D_2/31-N_IGO_10075_D_2_S14_R2_001.fastq.gz";
    assert_eq!(
        pairs["normal"][0],
        json!({
            "CN": "MSKCC",
            "PL": "Illumina",
            "PU": ["HCYYWBBXY"],
            "LB": "10075_D_2",
            "SM": "s_C_DRKHP7_N001_d",
            "ID": ["s_C_DRKHP7_N001_d_HCYYWBBXY"],
            "R1": [r1],
            "R2": [r2],
            "R1_bid": ["40a07e9a-2198-40b7-9f7f-7696c9d6429e"],
            "R2_bid": ["bb7ff922-b741-4df7-ba2a-4f3b8549e8b5"],
            "species": "Human",
            "specimen_type": "Blood",
            "request_id": ["10075_D"],
            "run_date": ["2019-12-12"],
            "patient_id": "C-DRKHP7",
            "bait_set": "IMPACT468_BAITS",
            "igo_id": "10075_D_2",
            "tumor_type": "Normal",
        })
    );
}

#[test]
fn test_pair_prefers_most_recent_cross_request_normal() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new()
        .sample(&SampleSpec::normal("10075_D_2_3", "10075_D_2", "C-8VK0V7").run_date("2019-12-12"))
        .sample(&SampleSpec::normal("10075_D_4_3", "10075_D_4", "C-8VK0V7").run_date("2019-12-13"))
        .write(temp_dir.path(), "db.json");
    let samples = write_samples(
        temp_dir.path(),
        &json!([{
            "patient_id": "C-8VK0V7",
            "bait_set": "IMPACT468_BAITS",
            "tumor_type": "Tumor",
            "igo_id": "10075_D_3_5",
            "request_id": "10075_D_3",
        }]),
    );
    let output = temp_dir.path().join("pairs.json");
    let metrics = temp_dir.path().join("pairing.tsv");

    let result = run_tnpair([
        "pair",
        "-f",
        fixture.to_str().unwrap(),
        "-s",
        samples.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "-m",
        metrics.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    let pairs = read_json(&output);
    assert_eq!(pairs["normal"][0]["igo_id"], "10075_D_4_3");
    assert_eq!(pairs["normal"][0]["SM"], "s_C_8VK0V7_N001_d");
    assert_eq!(pairs["normal"][0]["run_date"], json!(["2019-12-13"]));

    let tsv = fs::read_to_string(&metrics).unwrap();
    let mut lines = tsv.lines();
    let header: Vec<&str> = lines.next().unwrap().split('\t').collect();
    let row: Vec<&str> = lines.next().unwrap().split('\t').collect();
    let field = |name: &str| row[header.iter().position(|h| *h == name).unwrap()];
    assert_eq!(field("tumor_igo_id"), "10075_D_3_5");
    assert_eq!(field("normal_igo_id"), "10075_D_4_3");
    assert_eq!(field("normal_request_ids"), "10075_D_4");
    assert_eq!(field("source"), "cross_request");
    assert_eq!(field("ambiguous"), "false");
}

#[test]
fn test_pair_request_from_repository() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new()
        .sample(&SampleSpec::tumor("10075_D_1", "10075_D", "C-DRKHP7"))
        .sample(&drkhp7_normal())
        .sample(&SampleSpec::tumor("10075_D_7", "10075_D", "C-UNKNWN").incomplete())
        .write(temp_dir.path(), "db.json");
    let output = temp_dir.path().join("pairs.json");

    let result = run_tnpair([
        "pair",
        "-f",
        fixture.to_str().unwrap(),
        "-r",
        "10075_D",
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "pair failed: {}", String::from_utf8_lossy(&result.stderr));

    let pairs = read_json(&output);
    assert_eq!(pairs["tumor"].as_array().unwrap().len(), 1);
    assert_eq!(pairs["tumor"][0]["igo_id"], "10075_D_1");
    assert_eq!(pairs["tumor"][0]["request_id"], "10075_D");
    assert_eq!(pairs["normal"][0]["igo_id"], "10075_D_2");
    assert_eq!(pairs["normal"][0]["tumor_type"], "Normal");
}

#[test]
fn test_pair_missing_normal_policies() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new().write(temp_dir.path(), "empty.json");
    let samples = write_samples(
        temp_dir.path(),
        &json!([record("C-W86LMR", "Normal"), record("C-W86LMR", "Tumor"), record("C-LONELY", "Tumor")]),
    );
    let omit = temp_dir.path().join("omit.json");
    let keep = temp_dir.path().join("keep.json");
    let fail = temp_dir.path().join("fail.json");
    let summary = temp_dir.path().join("summary.tsv");

    let run = |policy: &str, output: &std::path::Path| {
        run_tnpair([
            "pair",
            "-f",
            fixture.to_str().unwrap(),
            "-s",
            samples.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--summary",
            summary.to_str().unwrap(),
            "--missing-normal",
            policy,
        ])
    };

    assert!(run("omit", &omit).status.success());
    let pairs = read_json(&omit);
    assert_eq!(pairs["tumor"].as_array().unwrap().len(), 1);
    assert_eq!(pairs["unpaired"][0]["patient_id"], "C-LONELY");

    let tsv = fs::read_to_string(&summary).unwrap();
    let mut lines = tsv.lines();
    let header: Vec<&str> = lines.next().unwrap().split('\t').collect();
    let row: Vec<&str> = lines.next().unwrap().split('\t').collect();
    let field = |name: &str| row[header.iter().position(|h| *h == name).unwrap()];
    assert_eq!(field("tumors"), "2");
    assert_eq!(field("paired"), "1");
    assert_eq!(field("unpaired"), "1");
    assert_eq!(field("local"), "1");

    assert!(run("keep", &keep).status.success());
    let pairs = read_json(&keep);
    assert_eq!(pairs["normal"], json!([record("C-W86LMR", "Normal"), null]));
    assert!(pairs.get("unpaired").is_none());

    let result = run("fail", &fail);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("No normal found"));
}

#[test]
fn test_pair_rejects_malformed_sample() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new().write(temp_dir.path(), "empty.json");
    let samples = write_samples(
        temp_dir.path(),
        &json!([record("C-W86LMR", "Tumor"), {"patient_id": "C-W86LMR", "tumor_type": "Normal"}]),
    );
    let output = temp_dir.path().join("pairs.json");

    let result = run_tnpair([
        "pair",
        "-f",
        fixture.to_str().unwrap(),
        "-s",
        samples.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Sample record 1"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("bait_set"));
    assert!(!output.exists());
}

#[test]
fn test_pair_missing_fixture() {
    let temp_dir = TempDir::new().unwrap();
    let samples = write_samples(temp_dir.path(), &json!([]));
    let result = run_tnpair([
        "pair",
        "-f",
        "/nonexistent/db.json",
        "-s",
        samples.to_str().unwrap(),
        "-o",
        temp_dir.path().join("pairs.json").to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("/nonexistent/db.json"));
}
