use std::fs;

use serde_json::json;

use super::*;

fn jsonl(records: &[Value]) -> String {
    records
        .iter()
        .map(|record| format!("{record}\n"))
        .collect::<String>()
}

fn record(page_id: &str, attribute: &str, start: usize, end: usize, text: &str) -> Value {
    json!({
        "page_id": page_id,
        "attribute": attribute,
        "text_offset": {
            "start": {"line_id": 0, "offset": start},
            "end": {"line_id": 0, "offset": end},
            "text": text
        }
    })
}

fn gold_record(
    page_id: &str,
    attribute: &str,
    ene: &str,
    start: usize,
    end: usize,
    text: &str,
) -> Value {
    let mut value = record(page_id, attribute, start, end, text);
    value["ENE"] = json!(ene);
    value
}

struct Fixture {
    dir: tempfile::TempDir,
    settings_path: PathBuf,
    submission_dir: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let root = dir.path();

    fs::create_dir_all(root.join("gold")).expect("gold dir should be created");
    fs::write(
        root.join("gold/company.json"),
        jsonl(&[
            gold_record("10", "本社所在地", "1.4.6.2", 0, 2, "東京"),
            gold_record("11", "本社所在地", "1.4.6.2", 0, 2, "大阪"),
        ]),
    )
    .expect("company gold should be written");
    fs::write(
        root.join("gold/city.json"),
        jsonl(&[
            gold_record("20", "人口", "1.5.1.1", 0, 3, "100"),
            gold_record("21", "人口", "1.5.1.1", 0, 3, "200"),
        ]),
    )
    .expect("city gold should be written");
    fs::write(root.join("gold/city_target.csv"), "20\n").expect("target csv should be written");

    let settings_path = root.join("settings.json");
    fs::write(
        &settings_path,
        serde_json::to_vec_pretty(&json!({
            "manifest_version": 1,
            "categories": [
                {"submission_file": "Company.json", "gold_path": "gold/company.json", "target": [10, "11"]},
                {"submission_file": "City.json", "gold_path": "gold/city.json", "target": "gold/city_target.csv"}
            ]
        }))
        .expect("settings should serialize"),
    )
    .expect("settings should be written");

    let submission_dir = root.join("submission");
    fs::create_dir_all(&submission_dir).expect("submission dir should be created");
    fs::write(
        submission_dir.join("Company.json"),
        jsonl(&[record("10", "本社所在地", 0, 2, "東京")]),
    )
    .expect("company submission should be written");
    fs::write(
        submission_dir.join("City.json"),
        jsonl(&[
            record("20", "人口", 0, 3, "100"),
            record("21", "人口", 0, 2, "20"),
        ]),
    )
    .expect("city submission should be written");

    Fixture {
        dir,
        settings_path,
        submission_dir,
    }
}

#[test]
fn score_batch_averages_category_headline_scores() {
    let fixture = fixture();
    let settings = load_settings(&fixture.settings_path).expect("settings should load");

    let report = score_batch(&settings, &fixture.settings_path, &fixture.submission_dir, None)
        .expect("batch should score");

    assert_eq!(report.category_count, 2);
    let company = &report.categories[0];
    assert_eq!(company.category, "Company");
    assert_eq!(company.ene, "1.4.6.2");
    assert_eq!(company.target_count, 2);
    assert_eq!(company.headline_kind, Some(OffsetKind::Text));
    assert!((company.headline_f1 - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(company.submission_sha256.len(), 64);

    let city = &report.categories[1];
    assert_eq!(city.category, "City");
    assert_eq!(city.target_count, 1);
    assert!((city.headline_f1 - 1.0).abs() < 1e-9);

    assert!((report.overall - (2.0 / 3.0 + 1.0) / 2.0).abs() < 1e-9);
}

#[test]
fn score_batch_writes_category_score_csvs() {
    let fixture = fixture();
    let settings = load_settings(&fixture.settings_path).expect("settings should load");
    let score_dir = fixture.dir.path().join("scores");

    score_batch(
        &settings,
        &fixture.settings_path,
        &fixture.submission_dir,
        Some(&score_dir),
    )
    .expect("batch should score");

    assert!(score_dir.join("Company").join("text_score.csv").is_file());
    assert!(score_dir.join("City").join("text_score.csv").is_file());
}

#[test]
fn score_batch_rejects_submission_missing_a_category() {
    let fixture = fixture();
    fs::remove_file(fixture.submission_dir.join("City.json")).expect("fixture file should exist");
    let settings = load_settings(&fixture.settings_path).expect("settings should load");

    let error = score_batch(&settings, &fixture.settings_path, &fixture.submission_dir, None)
        .expect_err("City.json is missing");
    assert!(
        error.to_string().contains("missing 1 of 2 categories"),
        "unexpected error: {error}"
    );
    assert!(matches!(
        error.downcast_ref::<ScoreError>(),
        Some(ScoreError::NotFound { .. })
    ));
}

#[test]
fn load_settings_rejects_unknown_version_and_duplicates() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("settings.json");

    fs::write(
        &path,
        r#"{"manifest_version": 2, "categories": [{"submission_file": "A.json", "gold_path": "a.json"}]}"#,
    )
    .expect("settings should be written");
    let error = load_settings(&path).expect_err("version 2 is unsupported");
    assert!(error.to_string().contains("manifest_version"), "unexpected error: {error}");

    fs::write(
        &path,
        r#"{"manifest_version": 1, "categories": [
            {"submission_file": "A.json", "gold_path": "a.json"},
            {"submission_file": "A.json", "gold_path": "b.json"}
        ]}"#,
    )
    .expect("settings should be written");
    let error = load_settings(&path).expect_err("duplicate category");
    assert!(error.to_string().contains("more than once"), "unexpected error: {error}");
}

#[test]
fn resolve_target_handles_arrays_literals_and_relative_paths() {
    let category = |target: Value| CategorySettings {
        submission_file: "City.json".to_string(),
        gold_path: PathBuf::from("gold.json"),
        target: Some(target),
        html_dir: None,
        text_dir: Some(PathBuf::from("plain")),
    };
    let base = Path::new("/data/shinra");

    match category(json!([1, "2"])).resolve_target(base) {
        Ok(Some(Target::Pages(pages))) => assert_eq!(pages, vec!["1", "2"]),
        other => panic!("unexpected target: {other:?}"),
    }
    match category(json!("[3]")).resolve_target(base) {
        Ok(Some(Target::Argument(literal))) => assert_eq!(literal, "[3]"),
        other => panic!("unexpected target: {other:?}"),
    }
    match category(json!("targets/city.csv")).resolve_target(base) {
        Ok(Some(Target::Argument(path))) => {
            assert_eq!(PathBuf::from(path), base.join("targets/city.csv"))
        }
        other => panic!("unexpected target: {other:?}"),
    }
    assert!(category(json!({"pages": []})).resolve_target(base).is_err());

    let sources = category(Value::Null).sources(base);
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].0, OffsetKind::Text);
    assert_eq!(sources[0].1.dir(), base.join("plain"));
}
