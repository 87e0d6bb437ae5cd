mod common;

use common::{banded, blank, FakeRasterizer, PDF};
use pdf_snapshot::raster::encode_base64;
use pdf_snapshot::rpc::types::{ServiceResponse, ServiceResult};
use pdf_snapshot::rpc::RpcClient;
use pdf_snapshot::service::{
    process, LocalEngine, MatchEngine, MatchOptions, MatchRequest, MatchResponse, PageResult,
};
use pdf_snapshot::utils::error::{MatchError, RpcError};
use pretty_assertions::assert_eq;
use serde_json::json;

fn engine(pages: Vec<pdf_snapshot::raster::RasterPage>) -> LocalEngine<FakeRasterizer> {
    LocalEngine::new(FakeRasterizer::new(pages))
}

#[test]
fn test_process_classifies_every_ordinal() {
    let rendered = vec![blank(10, 10), banded(10, 10, 1), blank(10, 10)];
    let stored = vec![blank(10, 10), blank(10, 10)];
    let request = MatchRequest::encode(PDF, &stored, MatchOptions::default()).unwrap();

    let response = process(&request, &engine(rendered)).unwrap();

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0], PageResult::Pass { diff_ratio: 0.0 });
    assert!(matches!(
        response.results[1],
        PageResult::Fail { diff_ratio, .. } if diff_ratio == 0.1
    ));
    assert!(matches!(response.results[2], PageResult::Added { .. }));
}

#[test]
fn test_response_wire_shapes() {
    let rendered = vec![blank(4, 4)];
    let stored = vec![blank(4, 4), blank(4, 4)];
    let request = MatchRequest::encode(PDF, &stored, MatchOptions::default()).unwrap();

    let response = process(&request, &engine(rendered)).unwrap();
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(
        value,
        json!({
            "results": [
                { "pass": true, "diffRatio": 0.0 },
                { "deleted": true }
            ]
        })
    );
}

#[test]
fn test_request_json_is_camel_case() {
    let raw = json!({
        "pdf": encode_base64(PDF),
        "options": { "scale": 2.0, "failureThreshold": 0.25 }
    });

    let request: MatchRequest = serde_json::from_value(raw).unwrap();
    let decoded = request.decode().unwrap();

    assert_eq!(decoded.pdf, PDF.to_vec());
    assert!(decoded.snapshots.is_empty());
    assert_eq!(decoded.options.scale(), 2.0);
    assert_eq!(decoded.options.failure_threshold(), 0.25);
}

#[test]
fn test_options_default_when_absent() {
    let request: MatchRequest =
        serde_json::from_value(json!({ "pdf": encode_base64(PDF) })).unwrap();
    let decoded = request.decode().unwrap();

    assert_eq!(decoded.options.scale(), 1.0);
    assert_eq!(decoded.options.failure_threshold(), 0.0);
}

#[test]
fn test_bad_payloads_are_invalid_usage() {
    let bad_pdf = MatchRequest {
        pdf: "%%% not base64 %%%".to_string(),
        snapshots: vec![],
        options: None,
    };
    assert!(matches!(
        process(&bad_pdf, &engine(vec![])),
        Err(MatchError::InvalidUsage(_))
    ));

    let bad_snapshot = MatchRequest {
        pdf: encode_base64(PDF),
        snapshots: vec![encode_base64(b"definitely not a png")],
        options: None,
    };
    assert!(matches!(
        process(&bad_snapshot, &engine(vec![])),
        Err(MatchError::InvalidUsage(_))
    ));
}

#[test]
fn test_out_of_range_options_rejected_before_rendering() {
    let request = MatchRequest::encode(
        PDF,
        &[],
        MatchOptions {
            scale: Some(0.5),
            failure_threshold: None,
        },
    )
    .unwrap();
    let engine = engine(vec![blank(4, 4)]);

    assert!(matches!(
        process(&request, &engine),
        Err(MatchError::InvalidUsage(_))
    ));
    assert_eq!(engine.source().last_scale(), None);
}

#[test]
fn test_response_converts_back_to_report() {
    let rendered = vec![banded(10, 10, 2), blank(10, 10)];
    let stored = vec![blank(10, 10)];
    let engine = engine(rendered);

    let report = engine
        .match_document(PDF, &stored, &MatchOptions::default())
        .unwrap();
    let response = MatchResponse::from_report(&report).unwrap();

    assert_eq!(response.into_report().unwrap(), report);
}

#[test]
fn test_service_envelope_parsing() {
    let ok: ServiceResponse<MatchResponse> = serde_json::from_value(json!({
        "result": { "data": { "results": [{ "added": true, "newPage": "data:image/png;base64,AAAA" }] } }
    }))
    .unwrap();
    assert!(ok.error.is_none());
    let ServiceResult { data } = ok.result.unwrap();
    assert_eq!(data.results.len(), 1);

    let err: ServiceResponse<MatchResponse> = serde_json::from_value(json!({
        "error": { "code": -32600, "message": "scale out of range" }
    }))
    .unwrap();
    let error = err.error.unwrap();
    assert_eq!(error.code_string(), "-32600");
    assert_eq!(error.message, "scale out of range");
}

#[test]
fn test_rpc_client_unreachable_service() {
    let client = RpcClient::new("http://127.0.0.1:9").unwrap();
    assert_eq!(client.endpoint(), "http://127.0.0.1:9/matchPdfSnapshot");

    let request = MatchRequest::encode(PDF, &[], MatchOptions::default()).unwrap();
    assert!(matches!(
        client.match_pdf_snapshot(&request),
        Err(RpcError::RequestFailed(_))
    ));
}
