//! Fixture and property tests for sequence collection and filename matching.

use serde::Deserialize;
use shotforged_parser::frames::replace_frame_number_with_token;
use shotforged_parser::{classify, collect_sequences, Confidence, FilenameMatcher};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Fixture {
    entity_codes: Vec<String>,
    project_code: String,
    cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct TestCase {
    input: String,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    shot_code: Option<String>,
    task: Option<String>,
    subset: Option<String>,
    delivery_version: Option<u32>,
    extension: String,
    family: String,
    representation_name: String,
    confidence: String,
}

fn load_fixture() -> Fixture {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/vendor_filenames.json");
    let content = fs::read_to_string(&path).expect("fixture file is readable");
    serde_json::from_str(&content).expect("fixture file is valid JSON")
}

#[test]
fn test_vendor_filename_fixtures() {
    let fixture = load_fixture();
    let matcher = FilenameMatcher::builder()
        .entity_codes(fixture.entity_codes.clone())
        .project_code(fixture.project_code.clone())
        .build();

    let mut failures = Vec::new();
    for case in &fixture.cases {
        let result = matcher.match_filename(&case.input);
        let fields = classify(&result, matcher.tasks());
        let expected = &case.expected;

        let actual = (
            result.shot_code.clone(),
            fields.task.clone(),
            fields.subset.clone(),
            result.delivery_version,
            result.extension.clone(),
            fields.family.to_string(),
            fields.representation_name.clone(),
            result.confidence.to_string(),
        );
        let wanted = (
            expected.shot_code.clone(),
            expected.task.clone(),
            expected.subset.clone(),
            expected.delivery_version,
            expected.extension.clone(),
            expected.family.clone(),
            expected.representation_name.clone(),
            expected.confidence.clone(),
        );
        if actual != wanted {
            failures.push(format!("{}\n  got:      {:?}\n  expected: {:?}", case.input, actual, wanted));
        }
    }

    assert!(failures.is_empty(), "fixture mismatches:\n{}", failures.join("\n"));
}

#[test]
fn test_strict_matches_capture_groups_exactly() {
    let codes = ["ab_sq010_0010", "ab_sq010_0020"];
    let tasks = ["roto", "paint", "comp", "track", "edit"];
    let matcher = FilenameMatcher::new(&codes, &tasks);

    for code in codes {
        for task in tasks {
            for (version, frame) in [(1u32, ".1001"), (27, ".%04d"), (100, "")] {
                let name = format!("{code}_fgPlate_{task}_v{version:03}{frame}.exr");
                let result = matcher.match_filename(&name);
                assert_eq!(result.confidence, Confidence::Strict, "{name}");
                assert_eq!(result.shot_code.as_deref(), Some(code), "{name}");
                assert_eq!(result.task.as_deref(), Some(task), "{name}");
                assert_eq!(result.subset.as_deref(), Some("fgPlate"), "{name}");
                assert_eq!(result.delivery_version, Some(version), "{name}");
                assert_eq!(result.extension, ".exr", "{name}");
            }
        }
    }
}

#[test]
fn test_substring_anywhere_in_path() {
    let matcher = FilenameMatcher::new(&["xx_0010_bg"], &["roto"]);
    for path in [
        "/vendor/XX_0010_BG/notes.pdf",
        "/vendor/misc/final_xx_0010_bg_grade.ccc",
        "/vendor/misc/xx_0010_bg-v2.mov",
    ] {
        let result = matcher.match_filename(path);
        assert_eq!(result.confidence, Confidence::Substring, "{path}");
        assert_eq!(result.shot_code.as_deref(), Some("xx_0010_bg"), "{path}");
    }
}

#[test]
fn test_collect_sequences_order_independence() {
    let frames: [i64; 5] = [1001, 1002, 1003, 1007, 1010];
    let files: Vec<String> = frames.iter().map(|f| format!("/r/sh010_plate_v001.{f}.exr")).collect();

    let mut rotations = Vec::new();
    for shift in 0..files.len() {
        let mut rotated = files.clone();
        rotated.rotate_left(shift);
        rotations.push(rotated.clone());
        rotated.reverse();
        rotations.push(rotated);
    }

    for listing in rotations {
        let groups = collect_sequences(&listing);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].frame_indexes.iter().copied().collect::<Vec<_>>(), frames);
    }
}

#[test]
fn test_glob_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let count: i64 = 24;
    for frame in 1001..1001 + count {
        fs::write(dir.path().join(format!("sh010_comp_v003.{frame}.exr")), b"").unwrap();
    }

    let member = dir.path().join("sh010_comp_v003.1010.exr");
    let pattern = replace_frame_number_with_token(&member.to_string_lossy(), "*", false);
    let found: Vec<String> = glob::glob(&pattern)
        .unwrap()
        .filter_map(Result::ok)
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    let groups = collect_sequences(&found);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].frame_range(), Some((1001, 1000 + count)));
}
