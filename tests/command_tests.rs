mod common;

use common::{banded, blank, FakeRasterizer, PDF};
use pdf_snapshot::commands::{
    execute_check, execute_compare, execute_match_with, validate_args, CheckArgs, CompareArgs,
    MatchArgs,
};
use pdf_snapshot::raster::RasterPage;
use pdf_snapshot::service::{LocalEngine, MatchOptions, MatchRequest, MatchResponse, PageResult};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_png(dir: &Path, name: &str, page: &RasterPage) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, page.to_png().unwrap()).unwrap();
    path
}

#[test]
fn test_match_command_writes_response() {
    let dir = tempdir().unwrap();
    let request = MatchRequest::encode(PDF, &[blank(8, 8)], MatchOptions::default()).unwrap();
    let request_path = dir.path().join("request.json");
    fs::write(&request_path, serde_json::to_string(&request).unwrap()).unwrap();
    let output_path = dir.path().join("response.json");

    let args = MatchArgs {
        request: request_path,
        output: Some(output_path.clone()),
        poppler_bin: None,
    };
    let engine = LocalEngine::new(FakeRasterizer::new(vec![blank(8, 8), banded(8, 8, 1)]));

    let response = execute_match_with(&args, &engine).unwrap();

    let written: MatchResponse =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(written, response);
    assert_eq!(written.results[0], PageResult::Pass { diff_ratio: 0.0 });
    assert!(matches!(written.results[1], PageResult::Added { .. }));
}

#[test]
fn test_match_command_rejects_garbage_request() {
    let dir = tempdir().unwrap();
    let request_path = dir.path().join("request.json");
    fs::write(&request_path, "{\"snapshots\": 3}").unwrap();

    let args = MatchArgs {
        request: request_path,
        output: None,
        poppler_bin: None,
    };
    let engine = LocalEngine::new(FakeRasterizer::new(vec![]));

    assert!(execute_match_with(&args, &engine).is_err());
}

#[test]
fn test_compare_command_relaxed_threshold() {
    let dir = tempdir().unwrap();
    let args = CompareArgs {
        reference: write_png(dir.path(), "reference.png", &blank(10, 10)),
        received: write_png(dir.path(), "received.png", &banded(10, 10, 1)),
        threshold: 0.2,
        output: Some(dir.path().join("diff.png")),
    };

    let diff = execute_compare(args).unwrap();

    assert_eq!(diff.diff_ratio(), 0.1);
    assert!(!dir.path().join("diff.png").exists());
}

#[test]
fn test_compare_command_size_mismatch() {
    let dir = tempdir().unwrap();
    let args = CompareArgs {
        reference: write_png(dir.path(), "reference.png", &blank(10, 10)),
        received: write_png(dir.path(), "received.png", &blank(9, 10)),
        threshold: 1.0,
        output: None,
    };

    let err = execute_compare(args).unwrap_err();
    assert!(format!("{:#}", err).contains("different sizes"));
}

#[test]
fn test_check_command_missing_pdf() {
    let dir = tempdir().unwrap();
    let args = CheckArgs {
        pdf: dir.path().join("missing.pdf"),
        test_path: dir.path().join("report_test.rs"),
        test_name: "missing document".to_string(),
        ..Default::default()
    };

    assert!(validate_args(&args).is_ok());
    assert!(execute_check(args).is_err());
    assert!(!dir.path().join("__pdf_snapshots__").exists());
}

#[test]
fn test_check_command_unreachable_server() {
    let dir = tempdir().unwrap();
    let pdf_path = dir.path().join("doc.pdf");
    fs::write(&pdf_path, PDF).unwrap();

    let args = CheckArgs {
        pdf: pdf_path,
        test_path: dir.path().join("report_test.rs"),
        test_name: "remote check".to_string(),
        server_url: Some("http://127.0.0.1:9".to_string()),
        ..Default::default()
    };

    assert!(validate_args(&args).is_ok());
    assert!(execute_check(args).is_err());
}
