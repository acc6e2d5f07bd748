//! End-to-end tests of the pairing library: fixture loading, request sample building,
//! resolution through the tier chain, and pairing.

use serde_json::json;
use tempfile::TempDir;
use tnpair_lib::repository::{FixtureLoader, MetadataRepository, SampleFilter, load_fixtures};
use tnpair_lib::request::RequestSampleBuilder;
use tnpair_lib::{
    MissingNormalPolicy, NormalQuery, NormalResolutionChain, NormalSample, NormalSource,
    PairingEngine, ReadGroupAssembler, ReadGroupPayload, ResolutionOptions, SampleRecord,
    TumorType,
};

use crate::helpers::{FixtureBuilder, IMPACT, SampleSpec};

#[test]
fn test_request_pairs_across_fixture_files() {
    let temp_dir = TempDir::new().unwrap();
    let current = FixtureBuilder::new()
        .sample(&SampleSpec::tumor("10075_D_3_5", "10075_D_3", "C-8VK0V7"))
        .sample(&SampleSpec::tumor("10075_D_3_6", "10075_D_3", "C-DRKHP7"))
        .write(temp_dir.path(), "current.json");
    let archive = FixtureBuilder::new()
        .sample(&SampleSpec::normal("10075_D_2_3", "10075_D_2", "C-8VK0V7").run_date("2019-12-12"))
        .sample(&SampleSpec::normal("10075_D_4_3", "10075_D_4", "C-8VK0V7").run_date("2019-12-13"))
        .write(temp_dir.path(), "archive.json");

    let repository = load_fixtures(&[current, archive]).unwrap();
    let assembler = ReadGroupAssembler::default();
    let samples = RequestSampleBuilder::new(assembler.clone())
        .with_read_groups(true)
        .samples(&repository, "10075_D_3")
        .unwrap();
    assert_eq!(samples.len(), 2);
    assert!(samples.iter().all(|s| s.read_group.is_some()));

    let result = PairingEngine::new(&repository)
        .with_chain(NormalResolutionChain::new(ResolutionOptions::default(), assembler))
        .with_policy(MissingNormalPolicy::Keep)
        .pair(&samples)
        .unwrap();

    assert_eq!(result.len(), 2);
    let pairs: Vec<_> = result.pairs().collect();
    assert_eq!(pairs[0].0.igo_id.as_deref(), Some("10075_D_3_5"));
    assert_eq!(pairs[0].1.and_then(NormalSample::igo_id), Some("10075_D_4_3"));
    assert_eq!(pairs[1].0.igo_id.as_deref(), Some("10075_D_3_6"));
    assert!(pairs[1].1.is_none());

    let summary = result.summary();
    assert_eq!(summary.tumors, 2);
    assert_eq!(summary.cross_request, 1);
    assert_eq!(summary.unpaired, 1);
    assert_eq!(summary.ambiguous, 0);
}

#[test]
fn test_same_request_normal_beats_newer_cross_request_normal() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = FixtureBuilder::new()
        .sample(&SampleSpec::normal("10075_D_2", "10075_D", "C-DRKHP7").run_date("2019-12-12"))
        .sample(&SampleSpec::normal("10080_A_1", "10080_A", "C-DRKHP7").run_date("2020-06-01"))
        .write(temp_dir.path(), "db.json");
    let repository = load_fixtures(&[fixture]).unwrap();

    let tumor = SampleRecord::new("C-DRKHP7", IMPACT, TumorType::Tumor)
        .with_igo_id("10075_D_1")
        .with_request_id("10075_D");
    let engine = PairingEngine::new(&repository);

    let resolution = engine.resolve_normal(&NormalQuery::for_tumor(&tumor)).unwrap().unwrap();
    assert_eq!(resolution.payload.igo_id, "10075_D_2");
    assert_eq!(resolution.source, NormalSource::SameRequest);

    let without_request = SampleRecord::new("C-DRKHP7", IMPACT, TumorType::Tumor);
    let resolution =
        engine.resolve_normal(&NormalQuery::for_tumor(&without_request)).unwrap().unwrap();
    assert_eq!(resolution.payload.igo_id, "10080_A_1");
    assert_eq!(resolution.source, NormalSource::CrossRequest);
}

#[test]
fn test_tied_run_dates_pick_lowest_igo_id() {
    let temp_dir = TempDir::new().unwrap();
    let path = FixtureBuilder::new()
        .sample(&SampleSpec::normal("10075_D_9", "10075_D_9", "C-TIE001"))
        .sample(&SampleSpec::normal("10075_D_10", "10075_D_10", "C-TIE001"))
        .sample(&SampleSpec::tumor("10075_D_1", "10075_D", "C-TIE001"))
        .write(temp_dir.path(), "db.json");
    let repository = load_fixtures(&[path]).unwrap();

    let tumor = SampleRecord::new("C-TIE001", IMPACT, TumorType::Tumor).with_igo_id("10075_D_1");
    let result = PairingEngine::new(&repository).pair(&[tumor]).unwrap();

    let normal = result.normal[0].as_ref().unwrap();
    assert_eq!(normal.igo_id(), Some("10075_D_10"));
    assert!(result.metrics()[0].ambiguous);
    assert_eq!(result.summary().ambiguous, 1);
}

#[test]
fn test_pooled_normal_fallback() {
    let mut loader = FixtureLoader::new();
    loader.add_str(&json!([]).to_string(), "empty").unwrap();
    let repository = loader.finish();
    assert!(repository.is_empty());

    let temp_dir = TempDir::new().unwrap();
    let pool_fixture = FixtureBuilder::new()
        .sample(&SampleSpec::normal("POOL_FFPE_1", "POOLS", "POOLEDNORMAL").bait_set(IMPACT))
        .write(temp_dir.path(), "pool.json");
    let pool = load_fixtures(&[pool_fixture]).unwrap();
    let entries = pool.find_samples(&SampleFilter::new().igo_id("POOL_FFPE_1")).unwrap();
    let pooled: ReadGroupPayload = ReadGroupAssembler::default().assemble(&entries).unwrap();

    let chain = NormalResolutionChain::new(ResolutionOptions::default(), ReadGroupAssembler::default())
        .with_pooled_normal(Box::new(move |bait_set: &str, specimen: Option<&str>| {
            Ok((bait_set == IMPACT && specimen == Some("FFPE")).then(|| pooled.clone()))
        }));

    let ffpe = SampleRecord::new("C-NOMATCH", IMPACT, TumorType::Tumor)
        .with_igo_id("10075_D_8")
        .with_specimen_type("FFPE");
    let blood = SampleRecord::new("C-NOMATCH", IMPACT, TumorType::Tumor).with_igo_id("10075_D_9");

    let result = PairingEngine::new(&repository).with_chain(chain).pair(&[ffpe, blood]).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.normal[0].as_ref().and_then(NormalSample::igo_id), Some("POOL_FFPE_1"));
    assert_eq!(result.metrics()[0].source, Some(NormalSource::PooledNormal));
    assert_eq!(result.unpaired.len(), 1);
    assert_eq!(result.unpaired[0].igo_id.as_deref(), Some("10075_D_9"));
}
