use async_trait::async_trait;
use filesdk_core::{FileRecord, MetadataStore, SdkError, SdkResult};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::{ids_query, ApiError, FileApiClient};

/// Body of `GET /files?_ids[]=...`.
#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    docs: Vec<FileRecord>,
}

fn file_path(id: &str) -> String {
    format!("/files/{}", urlencoding::encode(id))
}

fn metadata_error(operation: &str, id: &str, err: ApiError) -> SdkError {
    if err.status() == Some(StatusCode::NOT_FOUND) {
        return SdkError::NotFound(format!("file {}", id));
    }
    SdkError::Metadata(format!("{} {}: {}", operation, id, err))
}

fn batch_error(operation: &str, ids: &[String], err: ApiError) -> SdkError {
    SdkError::Metadata(format!("{} [{}]: {}", operation, ids.join(", "), err))
}

#[async_trait]
impl MetadataStore for FileApiClient {
    async fn create(&self, record: &FileRecord, authorization: Option<&str>) -> SdkResult<FileRecord> {
        let body = serde_json::to_value(record)?;
        self.call_json(Method::POST, "/files/plain", &[], Some(&body), authorization)
            .await
            .map_err(|e| SdkError::Metadata(format!("create {}: {}", record.name, e)))
    }

    async fn get(&self, id: &str, authorization: Option<&str>) -> SdkResult<FileRecord> {
        self.call_json(Method::GET, &file_path(id), &[], None, authorization)
            .await
            .map_err(|e| metadata_error("get", id, e))
    }

    async fn get_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<Vec<FileRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let list: FileList = self
            .call_json(Method::GET, "/files", &ids_query(ids), None, authorization)
            .await
            .map_err(|e| batch_error("get", ids, e))?;
        Ok(list.docs)
    }

    async fn archive(&self, id: &str, authorization: Option<&str>) -> SdkResult<()> {
        self.call(
            Method::PUT,
            &format!("{}/archive", file_path(id)),
            &[],
            authorization,
        )
        .await
        .map_err(|e| metadata_error("archive", id, e))
    }

    async fn archive_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.call(Method::PUT, "/files/batch", &ids_query(ids), authorization)
            .await
            .map_err(|e| batch_error("archive", ids, e))
    }

    async fn delete(&self, id: &str, authorization: Option<&str>) -> SdkResult<()> {
        self.call(Method::DELETE, &file_path(id), &[], authorization)
            .await
            .map_err(|e| metadata_error("delete", id, e))
    }

    async fn delete_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.call(Method::DELETE, "/files", &ids_query(ids), authorization)
            .await
            .map_err(|e| batch_error("delete", ids, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filesdk_core::{BackendKind, FileMetadataExtras, Quality, StoredVariant};
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn client(url: &str) -> FileApiClient {
        FileApiClient::new(url, None, Duration::from_secs(5)).unwrap()
    }

    fn record() -> FileRecord {
        FileRecord::assemble(
            BackendKind::Azure,
            "photos",
            "cat.png",
            3,
            "image/png",
            vec![StoredVariant {
                quality: Quality::ORIGINAL,
                url: "https://acme.blob.core.windows.net/photos/cat.png".to_string(),
                object_path: "photos".to_string(),
                object_name: "cat.png".to_string(),
            }],
            FileMetadataExtras::default(),
        )
        .unwrap()
    }

    fn stored(id: &str) -> serde_json::Value {
        let mut value = serde_json::to_value(record()).unwrap();
        value["_id"] = json!(id);
        value
    }

    #[tokio::test]
    async fn create_posts_record_and_returns_stored_copy() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/files/plain")
            .match_header("authorization", "Bearer caller")
            .match_body(Matcher::PartialJson(json!({
                "bucketType": "azure",
                "bucketFileName": "cat.png",
                "thumbnailUrl": "https://acme.blob.core.windows.net/photos/cat.png"
            })))
            .with_status(201)
            .with_body(stored("f1").to_string())
            .create_async()
            .await;

        let created = client(&server.url())
            .create(&record(), Some("Bearer caller"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id.as_deref(), Some("f1"));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/files/nope")
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server.url()).get("nope", None).await.unwrap_err();
        assert!(matches!(err, SdkError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_many_sends_ids_array() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("_ids[]".into(), "f1".into()),
                Matcher::UrlEncoded("_ids[]".into(), "f2".into()),
            ]))
            .with_status(200)
            .with_body(json!({ "docs": [stored("f1"), stored("f2")] }).to_string())
            .create_async()
            .await;

        let records = client(&server.url())
            .get_many(&["f1".to_string(), "f2".to_string()], None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id.as_deref(), Some("f2"));
    }

    #[tokio::test]
    async fn archive_and_delete_endpoints() {
        let mut server = mockito::Server::new_async().await;
        let archive = server
            .mock("PUT", "/files/f1/archive")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let archive_many = server
            .mock("PUT", "/files/batch")
            .match_query(Matcher::UrlEncoded("_ids[]".into(), "f2".into()))
            .with_status(200)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/files/f1")
            .with_status(200)
            .create_async()
            .await;
        let delete_many = server
            .mock("DELETE", "/files")
            .match_query(Matcher::UrlEncoded("_ids[]".into(), "f2".into()))
            .with_status(200)
            .create_async()
            .await;

        let api = client(&server.url());
        let ids = vec!["f2".to_string()];
        api.archive("f1", None).await.unwrap();
        api.archive_many(&ids, None).await.unwrap();
        api.delete("f1", None).await.unwrap();
        api.delete_many(&ids, None).await.unwrap();

        archive.assert_async().await;
        archive_many.assert_async().await;
        delete.assert_async().await;
        delete_many.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_metadata_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/files/f1")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client(&server.url()).delete("f1", None).await.unwrap_err();
        assert!(matches!(err, SdkError::Metadata(ref m) if m.contains("boom")));
    }
}
