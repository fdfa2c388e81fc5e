//! Google Drive v3 API client.
//!
//! This module provides the HTTP implementation of [`DriveApi`], handling
//! request building, pagination, multipart uploads and response parsing.

use chrono::{DateTime, Utc};
use futures_util::Stream;
use hubdrive_core::{Corpora, DriveItem, FOLDER_MIME_TYPE, FolderName, ItemFilter, children_query};
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::{BoxFuture, DriveApi, Permission, ProgressFn, UploadFile};
use crate::error::{ProviderResult, Service};
use crate::http::{build_client, check_status, read_json, send_error, tagged};

use super::config::DriveConfig;

/// Fields requested for every file resource.
const FILE_FIELDS: &str = "id,name,mimeType,webViewLink,parents,createdTime";

/// Size of the chunks an upload body is streamed in.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Google Drive API client.
#[derive(Debug)]
pub struct DriveClient {
    http_client: reqwest::Client,
    config: DriveConfig,
    corpora: Corpora,
}

impl DriveClient {
    /// Creates a new Drive client.
    pub fn new(config: DriveConfig) -> ProviderResult<Self> {
        let http_client = build_client(config.timeout, &config.user_agent)?;
        let corpora = Corpora::from_team_drive(config.team_drive_id.as_deref());
        Ok(Self {
            http_client,
            config,
            corpora,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/files/{}", self.config.api_base, urlencoding::encode(id))
    }

    /// Builds the query parameters of one `files.list` page.
    fn list_params(
        &self,
        folder_id: &str,
        filter: &ItemFilter,
        page_token: Option<&str>,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", children_query(folder_id, filter)),
            ("corpora", self.corpora.as_param().to_string()),
            ("includeTeamDriveItems", "true".to_string()),
            ("supportsAllDrives", "true".to_string()),
            ("fields", format!("nextPageToken,files({FILE_FIELDS})")),
            ("pageSize", self.config.page_size.to_string()),
        ];
        if let Some(id) = self.corpora.team_drive_id() {
            params.push(("teamDriveId", id.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        params
    }

    async fn list_page(
        &self,
        token: &str,
        folder_id: &str,
        filter: &ItemFilter,
        page_token: Option<&str>,
    ) -> ProviderResult<FileListResponse> {
        let response = self
            .http_client
            .get(format!("{}/files", self.config.api_base))
            .bearer_auth(token)
            .query(&self.list_params(folder_id, filter, page_token))
            .send()
            .await
            .map_err(send_error)?;

        read_json(check_status(response, "folder").await?).await
    }

    async fn list_all(
        &self,
        token: &str,
        folder_id: &str,
        filter: &ItemFilter,
    ) -> ProviderResult<Vec<DriveItem>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(token, folder_id, filter, page_token.as_deref())
                .await?;
            items.extend(page.files.into_iter().map(DriveItem::from));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(folder = folder_id, count = items.len(), "listed folder");
        Ok(items)
    }

    async fn fetch_item(&self, token: &str, id: &str) -> ProviderResult<DriveItem> {
        let response = self
            .http_client
            .get(self.file_url(id))
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
            .send()
            .await
            .map_err(send_error)?;

        let file: ApiFile = read_json(check_status(response, "file").await?).await?;
        Ok(file.into())
    }

    async fn post_folder(
        &self,
        token: &str,
        parent_id: &str,
        name: &FolderName,
    ) -> ProviderResult<DriveItem> {
        let metadata = serde_json::json!({
            "name": name.as_str(),
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });

        let response = self
            .http_client
            .post(format!("{}/files", self.config.api_base))
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
            .json(&metadata)
            .send()
            .await
            .map_err(send_error)?;

        let file: ApiFile = read_json(check_status(response, "parent folder").await?).await?;
        info!(id = %file.id, name = %file.name, "created folder");
        Ok(file.into())
    }

    async fn post_upload(
        &self,
        token: &str,
        parent_id: &str,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> ProviderResult<DriveItem> {
        let boundary = format!(
            "hubdrive-{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let body = multipart_body(&boundary, parent_id, &file);
        let total = body.len() as u64;
        debug!(name = %file.name, bytes = file.len(), "uploading file");

        let response = self
            .http_client
            .post(format!("{}/files", self.config.upload_base))
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", FILE_FIELDS),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .header(reqwest::header::CONTENT_LENGTH, total)
            .body(streamed_body(body, progress))
            .send()
            .await
            .map_err(send_error)?;

        let uploaded: ApiFile = read_json(check_status(response, "parent folder").await?).await?;
        info!(id = %uploaded.id, name = %uploaded.name, "uploaded file");
        Ok(uploaded.into())
    }

    async fn send_delete(&self, token: &str, id: &str) -> ProviderResult<()> {
        let response = self
            .http_client
            .delete(self.file_url(id))
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(send_error)?;

        check_status(response, "file").await?;
        info!(id, "deleted item");
        Ok(())
    }

    async fn post_permission(
        &self,
        token: &str,
        file_id: &str,
        permission: &Permission,
    ) -> ProviderResult<()> {
        let response = self
            .http_client
            .post(format!("{}/permissions", self.file_url(file_id)))
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")])
            .json(permission)
            .send()
            .await
            .map_err(send_error)?;

        check_status(response, "file").await?;
        info!(file_id, email = %permission.email_address, role = permission.role.as_str(), "shared file");
        Ok(())
    }
}

impl DriveApi for DriveClient {
    fn list_folder<'a>(
        &'a self,
        token: &'a str,
        folder_id: &'a str,
        filter: &'a ItemFilter,
    ) -> BoxFuture<'a, ProviderResult<Vec<DriveItem>>> {
        tagged(Service::Drive, self.list_all(token, folder_id, filter))
    }

    fn get_item<'a>(
        &'a self,
        token: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        tagged(Service::Drive, self.fetch_item(token, id))
    }

    fn create_folder<'a>(
        &'a self,
        token: &'a str,
        parent_id: &'a str,
        name: &'a FolderName,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        tagged(Service::Drive, self.post_folder(token, parent_id, name))
    }

    fn upload<'a>(
        &'a self,
        token: &'a str,
        parent_id: &'a str,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        tagged(Service::Drive, self.post_upload(token, parent_id, file, progress))
    }

    fn delete<'a>(&'a self, token: &'a str, id: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
        tagged(Service::Drive, self.send_delete(token, id))
    }

    fn add_permission<'a>(
        &'a self,
        token: &'a str,
        file_id: &'a str,
        permission: &'a Permission,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        tagged(Service::Drive, self.post_permission(token, file_id, permission))
    }
}

/// Builds a `multipart/related` body: JSON metadata, then the file content.
fn multipart_body(boundary: &str, parent_id: &str, file: &UploadFile) -> Vec<u8> {
    let metadata = serde_json::json!({
        "name": file.name,
        "mimeType": file.mime_type,
        "parents": [parent_id],
    });

    let mut body = Vec::with_capacity(file.data.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.mime_type).as_bytes());
    body.extend_from_slice(&file.data);
    body.extend_from_slice(format!("\r\n--{}--", boundary).as_bytes());
    body
}

/// Wraps a body in a chunked stream that reports bytes handed to the transport.
fn streamed_body(body: Vec<u8>, progress: Option<ProgressFn>) -> reqwest::Body {
    reqwest::Body::wrap_stream(progress_stream(body, progress))
}

fn progress_stream(
    body: Vec<u8>,
    progress: Option<ProgressFn>,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + 'static {
    let total = body.len() as u64;
    let chunks: Vec<Vec<u8>> = body.chunks(UPLOAD_CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let mut sent = 0u64;

    futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(report) = &progress {
            report(sent, total);
        }
        Ok(chunk)
    }))
}

// API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<ApiFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    web_view_link: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
    created_time: Option<DateTime<Utc>>,
}

impl From<ApiFile> for DriveItem {
    fn from(file: ApiFile) -> Self {
        let mut item = DriveItem::new(file.id, file.name, file.mime_type).with_parents(file.parents);
        item.web_view_link = file.web_view_link;
        item.created_time = file.created_time;
        item
    }
}
