//! Full round trip against a mocked file API and the local filesystem backend.

#![cfg(feature = "storage-local")]

mod common;

use common::png;
use filesdk::{BackendKind, FileSdk, SdkConfig, UploadOptions};
use mockito::Matcher;
use serde_json::json;

fn stored_record(dir: &str) -> serde_json::Value {
    json!({
        "_id": "rec-1",
        "name": "chart.png",
        "bucketType": "local",
        "bucketFilePath": dir,
        "bucketFileName": "chart.png",
        "originalFileName": "chart.png",
        "extension": "png",
        "size": 100,
        "url": "http://cdn.test/media/reports/chart.png",
        "thumbnailUrl": "http://cdn.test/media/reports/chart@50pc.png",
        "compressions": [
            { "quality": 1.0, "url": "http://cdn.test/media/reports/chart.png",
              "bucketFilePath": dir, "bucketFileName": "chart.png" },
            { "quality": 0.5, "url": "http://cdn.test/media/reports/chart@50pc.png",
              "bucketFilePath": dir, "bucketFileName": "chart@50pc.png" }
        ],
        "mimeType": "image/png"
    })
}

#[tokio::test]
async fn upload_then_hard_delete_through_the_file_api() {
    let mut server = mockito::Server::new_async().await;
    let storage = tempfile::tempdir().unwrap();

    let config = SdkConfig::new(server.url())
        .with_authorization("Bearer svc")
        .with_bucket_file_path("reports")
        .with_bucket_type(BackendKind::Local)
        .with_local_storage(storage.path(), "http://cdn.test/media");
    let sdk = FileSdk::from_config(config).await.unwrap();

    let create_token = server
        .mock("GET", "/files/token/create")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("bucketType".into(), "local".into()),
            Matcher::UrlEncoded("filePath".into(), "reports".into()),
        ]))
        .match_header("authorization", "Bearer svc")
        .with_header("content-type", "application/json")
        .with_body(json!({ "bucketType": "local", "sas": "unused" }).to_string())
        .create_async()
        .await;
    let create_record = server
        .mock("POST", "/files/plain")
        .match_body(Matcher::PartialJson(json!({
            "bucketType": "local",
            "bucketFilePath": "reports",
            "bucketFileName": "chart.png",
            "mimeType": "image/png",
            "thumbnailUrl": "http://cdn.test/media/reports/chart%4050pc.png"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(stored_record("reports").to_string())
        .create_async()
        .await;

    let record = sdk
        .upload_from_bytes(png(60, 40), UploadOptions::named("chart.png").with_qualities([0.5]))
        .await
        .unwrap();

    create_token.assert_async().await;
    create_record.assert_async().await;
    assert_eq!(record.id.as_deref(), Some("rec-1"));
    assert!(storage.path().join("reports/chart.png").exists());
    assert!(storage.path().join("reports/chart@50pc.png").exists());

    let get_record = server
        .mock("GET", "/files/rec-1")
        .with_header("content-type", "application/json")
        .with_body(stored_record("reports").to_string())
        .create_async()
        .await;
    let delete_token = server
        .mock("GET", "/files/token/delete")
        .match_query(Matcher::UrlEncoded("bucketType".into(), "local".into()))
        .with_header("content-type", "application/json")
        .with_body(json!({ "bucketType": "local", "sas": "unused" }).to_string())
        .create_async()
        .await;
    let delete_record = server
        .mock("DELETE", "/files/rec-1")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    sdk.delete_one("rec-1", false, None).await.unwrap();

    get_record.assert_async().await;
    delete_token.assert_async().await;
    delete_record.assert_async().await;
    assert!(!storage.path().join("reports/chart.png").exists());
    assert!(!storage.path().join("reports/chart@50pc.png").exists());
}
