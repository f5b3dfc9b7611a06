//! End-to-end batch runs against a local mock server.

mod support;

use std::sync::Arc;

use mediafetch_core::{BatchScheduler, NullSink, SchedulerConfig, TaskOutcome};
use support::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scheduler_for(root: &std::path::Path) -> BatchScheduler {
    BatchScheduler::new(SchedulerConfig::new(root.to_path_buf()), Arc::new(NullSink))
}

async fn mount_file(server: &MockServer, route: &str, body: Vec<u8>) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).insert_header("content-length", body.len().to_string()),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_batch_places_files_in_library_layout() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/A.Movie.2020.mkv", vec![1u8; 2048]).await;
    mount_file(&server, "/B.S01E02.mkv", vec![2u8; 1024]).await;

    let temp = TempDir::new().unwrap();
    let links = vec![
        format!("{}/A.Movie.2020.mkv", server.uri()),
        format!("{}/B.S01E02.mkv", server.uri()),
    ];

    let result = scheduler_for(temp.path()).run(&links).await;

    assert_eq!(result.completed(), 2, "{}", result.summary());
    let movie = temp
        .path()
        .join("Movies")
        .join("A Movie")
        .join("A.Movie.2020.mkv");
    let episode = temp
        .path()
        .join("Shows")
        .join("B")
        .join("S01")
        .join("B.S01E02.mkv");
    assert_eq!(std::fs::metadata(&movie).unwrap().len(), 2048);
    assert_eq!(std::fs::metadata(&episode).unwrap().len(), 1024);
}

#[tokio::test]
async fn test_resubmitted_complete_file_is_skipped_without_transfer() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("HEAD"))
        .and(path("/A.Movie.2020.mkv"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-length", "512"))
        .mount(&server)
        .await;
    // The body must be fetched exactly once across both runs.
    Mock::given(method("GET"))
        .and(path("/A.Movie.2020.mkv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 512]))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let links = vec![format!("{}/A.Movie.2020.mkv", server.uri())];
    let scheduler = scheduler_for(temp.path());

    let first = scheduler.run(&links).await;
    assert_eq!(first.completed(), 1, "{}", first.summary());

    let second = scheduler.run(&links).await;
    assert_eq!(second.skipped(), 1, "{}", second.summary());
    assert!(matches!(
        second.outcomes()[0].1,
        TaskOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn test_malformed_link_does_not_poison_batch() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/A.Movie.2020.mkv", vec![1u8; 256]).await;

    let temp = TempDir::new().unwrap();
    let links = vec![
        "definitely not a url".to_string(),
        format!("{}/A.Movie.2020.mkv", server.uri()),
    ];

    let result = scheduler_for(temp.path()).run(&links).await;

    assert_eq!(result.completed(), 1);
    assert_eq!(result.failed(), 1);
    // Outcomes stay in submission order.
    assert!(matches!(result.outcomes()[0].1, TaskOutcome::Failed { .. }));
    assert!(matches!(
        result.outcomes()[1].1,
        TaskOutcome::Completed { .. }
    ));
}

#[tokio::test]
async fn test_unknown_remote_size_still_downloads() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("HEAD"))
        .and(path("/A.Movie.2020.mkv"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/A.Movie.2020.mkv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![3u8; 777]))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let links = vec![format!("{}/A.Movie.2020.mkv", server.uri())];

    let result = scheduler_for(temp.path()).run(&links).await;

    assert_eq!(result.completed(), 1, "{}", result.summary());
    let file = temp
        .path()
        .join("Movies")
        .join("A Movie")
        .join("A.Movie.2020.mkv");
    assert_eq!(std::fs::metadata(&file).unwrap().len(), 777);
}

#[tokio::test]
async fn test_stale_partial_is_overwritten() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_file(&server, "/A.Movie.2020.mkv", vec![4u8; 1000]).await;

    let temp = TempDir::new().unwrap();
    let dest_dir = temp.path().join("Movies").join("A Movie");
    std::fs::create_dir_all(&dest_dir).unwrap();
    let candidate = dest_dir.join("A.Movie.2020.mkv");
    std::fs::write(&candidate, vec![0u8; 123]).unwrap();

    let links = vec![format!("{}/A.Movie.2020.mkv", server.uri())];
    let result = scheduler_for(temp.path()).run(&links).await;

    assert_eq!(result.completed(), 1, "{}", result.summary());
    assert_eq!(std::fs::read(&candidate).unwrap(), vec![4u8; 1000]);
}

#[tokio::test]
async fn test_failed_transfer_leaves_no_partial_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("HEAD"))
        .and(path("/A.Movie.2020.mkv"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-length", "1000"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/A.Movie.2020.mkv"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let links = vec![format!("{}/A.Movie.2020.mkv", server.uri())];

    let result = scheduler_for(temp.path()).run(&links).await;

    assert_eq!(result.failed(), 1, "{}", result.summary());
    let candidate = temp
        .path()
        .join("Movies")
        .join("A Movie")
        .join("A.Movie.2020.mkv");
    assert!(!candidate.exists(), "Partial file left behind");
}
