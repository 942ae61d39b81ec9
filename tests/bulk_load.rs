//! End-to-end runs against a mock `_bulk` endpoint.

use encoding_rs::EUC_KR;
use health_bulk_loader::{
    LoadError,
    chunks::ChunkReader,
    pipeline::run_pipeline,
    sink::{BulkSink, HttpBulkSink},
};
use indicatif::ProgressBar;
use reqwest::Client;
use serde_json::{Value, json};
use std::{fs, net::TcpListener, path::PathBuf};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

const HEADER: &str =
    "기준년도,성별코드,연령대코드,시도코드,주상병코드,부상병코드,심결요양급여비용총액,심결본인부담금,심결보험자부담금,총처방일수";

/// Writes `rows` under a header line in the legacy Korean code page.
fn write_cp949_csv(dir: &TempDir, rows: &[&str]) -> PathBuf {
    let mut text = String::from(HEADER);
    text.push_str("\r\n");
    for row in rows {
        text.push_str(row);
        text.push_str("\r\n");
    }
    let (bytes, _, had_errors) = EUC_KR.encode(&text);
    assert!(!had_errors);
    let path = dir.path().join("healthData.csv");
    fs::write(&path, bytes).expect("Failed writing test CSV");
    path
}

fn bulk_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"took": 1, "errors": false, "items": []}))
}

#[tokio::test]
async fn loads_cp949_file_in_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/medical_data_mapping/_bulk"))
        .and(header("content-type", "application/json"))
        .respond_with(bulk_ok())
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_cp949_csv(
        &dir,
        &[
            "2021,1,5,11,I109,J00,150000,30000,120000,",
            "2021,2,6,26,Z999,E119,20000,5000,15000,7",
            "2021,9,5,11,J00,,15000000,1,1,1",
        ],
    );

    let chunks = ChunkReader::open(&input, "cp949", 2).unwrap();
    let sink = HttpBulkSink::new(Client::new(), &format!("{}/", server.uri()));
    let mut statuses = Vec::new();
    let summary = run_pipeline(
        chunks,
        &sink,
        "medical_data_mapping",
        &ProgressBar::hidden(),
        |n, r| statuses.push((n, r.status)),
    )
    .await
    .unwrap();

    // Second chunk holds one row, whose cost is over the threshold. Its empty
    // payload still goes out and its response is still reported.
    assert_eq!(summary.chunks, 2);
    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.rows_kept, 2);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(summary.chunks_sent, 2);
    assert_eq!(summary.empty_chunks, 1);
    assert_eq!(statuses, vec![(1, 200), (2, 200)]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].body.is_empty());
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], r#"{"index":{"_index":"medical_data_mapping"}}"#);
    assert_eq!(lines[2], lines[0]);

    let first: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(first["성별"], "남자");
    assert_eq!(first["시도"], "서울특별시");
    assert_eq!(first["총처방일수"], 0);

    let second: Value = serde_json::from_str(lines[3]).unwrap();
    assert_eq!(second["성별"], "여자");
    assert_eq!(second["연령대"], "25~29세");
    assert_eq!(second["시도"], "부산광역시");
    assert_eq!(second["주상병"], "Z999");
    assert_eq!(second["부상병"], "합병증을 동반하지 않은 2형 당뇨병");
    assert_eq!(second["총처방일수"], 7);
}

#[tokio::test]
async fn server_errors_are_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/medical_data_mapping/_bulk"))
        .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_cp949_csv(
        &dir,
        &[
            "2021,1,5,11,I109,J00,1,1,1,1",
            "2022,2,5,11,I109,J00,1,1,1,1",
        ],
    );

    let chunks = ChunkReader::open(&input, "cp949", 1).unwrap();
    let sink = HttpBulkSink::new(Client::new(), &server.uri());
    let mut bodies = Vec::new();
    let summary = run_pipeline(
        chunks,
        &sink,
        "medical_data_mapping",
        &ProgressBar::hidden(),
        |_, r| bodies.push(r.body.clone()),
    )
    .await
    .unwrap();

    assert_eq!(summary.chunks_sent, 2);
    assert_eq!(summary.failed_chunks, 2);
    assert_eq!(bodies, vec!["mapper_parsing_exception"; 2]);
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    // Bind an ephemeral port, then release it so nothing is listening there.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let uri = format!("http://127.0.0.1:{port}");

    let sink = HttpBulkSink::new(Client::new(), &uri);
    let err = sink
        .send("medical_data_mapping", "{}\n".to_string())
        .await
        .unwrap_err();

    match err {
        LoadError::Network { url, .. } => {
            assert_eq!(url, format!("{uri}/medical_data_mapping/_bulk"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_row_stops_before_its_chunk_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(bulk_ok())
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_cp949_csv(
        &dir,
        &[
            "2021,1,5,11,I109,J00,1,1,1,1",
            "2021,1,5,11,I109,J00,1,1,1,1",
            "2021,1,오,11,I109,J00,1,1,1,1",
        ],
    );

    let chunks = ChunkReader::open(&input, "cp949", 2).unwrap();
    let sink = HttpBulkSink::new(Client::new(), &server.uri());
    let progress = ProgressBar::hidden();
    let err = run_pipeline(chunks, &sink, "medical_data_mapping", &progress, |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Parse { line: 4, .. }));
}

#[tokio::test]
async fn negative_cost_row_is_loaded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/medical_data_mapping/_bulk"))
        .respond_with(bulk_ok())
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let input = write_cp949_csv(
        &dir,
        &[
            "2021,1,5,11,I109,J00,1,1,1,1",
            "2021,1,5,11,I109,J00,-5,1,1,1",
        ],
    );

    let chunks = ChunkReader::open(&input, "cp949", 10).unwrap();
    let sink = HttpBulkSink::new(Client::new(), &server.uri());
    let summary = run_pipeline(
        chunks,
        &sink,
        "medical_data_mapping",
        &ProgressBar::hidden(),
        |_, _| {},
    )
    .await
    .unwrap();

    assert_eq!(summary.rows_kept, 2);
    assert_eq!(summary.rows_skipped, 0);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    let second: Value = serde_json::from_str(body.lines().nth(3).unwrap()).unwrap();
    assert_eq!(second["심결요양급여비용총액"], -5);
}
