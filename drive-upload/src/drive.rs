#![doc = "Google Drive v3 implementation of the core ObjectStore contract."]
//
//! # Drive client
//!
//! [`DriveClient`] speaks the Drive v3 REST API with a bearer token:
//!
//! - `list` → `GET /drive/v3/files?q=…`, following `nextPageToken`
//! - `create` → multipart upload `POST /upload/drive/v3/files`
//! - `update` → multipart upload `PATCH /upload/drive/v3/files/{id}` (name only, parents untouched)
//! - `download` → `GET /drive/v3/files/{id}?alt=media`
//!
//! Every call sets `supportsAllDrives`, so shared drives behave like My Drive.
//! Non-success responses are turned into a [`StoreError`] carrying status and body.

use async_trait::async_trait;
use drive_upload_core::contract::{NewObject, ObjectQuery, ObjectStore, RemoteObject, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::auth::AccessToken;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const LIST_FIELDS: &str = "nextPageToken,files(id,name,parents)";
const FILE_FIELDS: &str = "id,name,parents";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

impl From<DriveFile> for RemoteObject {
    fn from(file: DriveFile) -> Self {
        RemoteObject {
            id: file.id,
            name: file.name,
            parents: file.parents,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<&'a [String]>,
}

/// A `multipart/related` body: JSON metadata part followed by the media part.
pub struct MultipartBody {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Builds the body for a Drive multipart upload.
pub fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    media: &[u8],
) -> MultipartBody {
    let mut body = Vec::with_capacity(media.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    MultipartBody {
        content_type: format!("multipart/related; boundary={boundary}"),
        body,
    }
}

pub struct DriveClient {
    http: reqwest::Client,
    token: AccessToken,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    pub fn new(http: reqwest::Client, token: AccessToken) -> Self {
        Self::with_endpoints(http, token, DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE)
    }

    pub fn with_endpoints(
        http: reqwest::Client,
        token: AccessToken,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            upload_base: upload_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(format!("Drive API returned {status}: {}", body.trim()).into())
    }

    async fn upload(
        &self,
        request: reqwest::RequestBuilder,
        metadata: serde_json::Value,
        media: &[u8],
    ) -> Result<RemoteObject, StoreError> {
        let boundary = format!("drive-upload-{}", uuid::Uuid::new_v4().simple());
        let multipart = multipart_related(&boundary, &metadata, media);
        let response = request
            .bearer_auth(self.token.secret())
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", FILE_FIELDS),
            ])
            .header(reqwest::header::CONTENT_TYPE, multipart.content_type)
            .body(multipart.body)
            .send()
            .await?;
        let file: DriveFile = Self::check(response).await?.json().await?;
        Ok(file.into())
    }
}

#[async_trait]
impl ObjectStore for DriveClient {
    async fn list(&self, query: &ObjectQuery) -> Result<Vec<RemoteObject>, StoreError> {
        let q = query.to_query_string();
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http
                .get(format!("{}/files", self.api_base))
                .bearer_auth(self.token.secret())
                .query(&[
                    ("q", q.as_str()),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("fields", LIST_FIELDS),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = request.send().await?;
            let page: FileList = Self::check(response).await?.json().await?;
            debug!(query = %q, files = page.files.len(), "Listed page of files");
            objects.extend(page.files.into_iter().map(RemoteObject::from));
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }
        Ok(objects)
    }

    async fn create(&self, object: NewObject) -> Result<RemoteObject, StoreError> {
        info!(name = %object.name, parents = ?object.parents, size = object.content.len(), "Uploading new file");
        let metadata = serde_json::to_value(FileMetadata {
            name: &object.name,
            parents: Some(object.parents.as_slice()),
        })?;
        let request = self.http.post(format!("{}/files", self.upload_base));
        self.upload(request, metadata, &object.content)
            .await
            .map_err(|e| {
                error!(name = %object.name, error = %e, "Drive create failed");
                e
            })
    }

    async fn update(
        &self,
        id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<RemoteObject, StoreError> {
        info!(id = %id, name = %name, size = content.len(), "Uploading new content for file");
        let metadata = serde_json::to_value(FileMetadata {
            name,
            parents: None,
        })?;
        let request = self.http.patch(format!("{}/files/{id}", self.upload_base));
        self.upload(request, metadata, content).await.map_err(|e| {
            error!(id = %id, error = %e, "Drive update failed");
            e
        })
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        info!(id = %id, "Downloading file content");
        let response = self
            .http
            .get(format!("{}/files/{id}", self.api_base))
            .bearer_auth(self.token.secret())
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
