//! The Drive operations the file browser depends on.
//!
//! [`DriveApi`] is the seam between the browser logic and HTTP. The real
//! implementation is [`crate::google::DriveClient`]; tests substitute an
//! in-memory double.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hubdrive_core::{DriveItem, FolderName, ItemFilter};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Upload progress callback receiving `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A local file ready to be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Name the file gets in Drive.
    pub name: String,
    /// MIME type sent with the content.
    pub mime_type: String,
    /// File content.
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Creates an upload, guessing the MIME type from the file name.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        Self {
            name,
            mime_type,
            data,
        }
    }

    /// Overrides the guessed MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Returns the content length in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns true for an empty file.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Access level granted by a permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only access.
    #[default]
    Reader,
    /// Read and comment.
    Commenter,
    /// Read and write.
    Writer,
}

impl Role {
    /// Returns the Drive API value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Commenter => "commenter",
            Self::Writer => "writer",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reader" | "viewer" => Ok(Self::Reader),
            "commenter" => Ok(Self::Commenter),
            "writer" | "editor" => Ok(Self::Writer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user permission to add to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Granted role.
    pub role: Role,
    /// Grantee type; always `"user"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Grantee address.
    pub email_address: String,
}

impl Permission {
    /// Creates a user permission.
    pub fn user(email: impl Into<String>, role: Role) -> Self {
        Self {
            role,
            kind: "user",
            email_address: email.into(),
        }
    }
}

/// Drive operations used by the file browser.
///
/// Every call takes the bearer token explicitly; the caller owns the session.
pub trait DriveApi: Send + Sync {
    /// Lists the non-trashed children of a folder matching `filter`.
    ///
    /// Handles pagination internally. The order of the result is unspecified.
    fn list_folder<'a>(
        &'a self,
        token: &'a str,
        folder_id: &'a str,
        filter: &'a ItemFilter,
    ) -> BoxFuture<'a, ProviderResult<Vec<DriveItem>>>;

    /// Fetches a single item, including its parents.
    fn get_item<'a>(&'a self, token: &'a str, id: &'a str)
    -> BoxFuture<'a, ProviderResult<DriveItem>>;

    /// Creates a folder under `parent_id`.
    fn create_folder<'a>(
        &'a self,
        token: &'a str,
        parent_id: &'a str,
        name: &'a FolderName,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>>;

    /// Uploads a file into `parent_id`, reporting progress if asked to.
    fn upload<'a>(
        &'a self,
        token: &'a str,
        parent_id: &'a str,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>>;

    /// Deletes an item permanently.
    fn delete<'a>(&'a self, token: &'a str, id: &'a str) -> BoxFuture<'a, ProviderResult<()>>;

    /// Grants a permission on an item.
    fn add_permission<'a>(
        &'a self,
        token: &'a str,
        file_id: &'a str,
        permission: &'a Permission,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

impl<T: DriveApi + ?Sized> DriveApi for Arc<T> {
    fn list_folder<'a>(
        &'a self,
        token: &'a str,
        folder_id: &'a str,
        filter: &'a ItemFilter,
    ) -> BoxFuture<'a, ProviderResult<Vec<DriveItem>>> {
        (**self).list_folder(token, folder_id, filter)
    }

    fn get_item<'a>(
        &'a self,
        token: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        (**self).get_item(token, id)
    }

    fn create_folder<'a>(
        &'a self,
        token: &'a str,
        parent_id: &'a str,
        name: &'a FolderName,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        (**self).create_folder(token, parent_id, name)
    }

    fn upload<'a>(
        &'a self,
        token: &'a str,
        parent_id: &'a str,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        (**self).upload(token, parent_id, file, progress)
    }

    fn delete<'a>(&'a self, token: &'a str, id: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
        (**self).delete(token, id)
    }

    fn add_permission<'a>(
        &'a self,
        token: &'a str,
        file_id: &'a str,
        permission: &'a Permission,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        (**self).add_permission(token, file_id, permission)
    }
}

/// Returns the folder named `name` under `parent_id`, creating it if missing.
///
/// When several folders share the name, the first one in listing order wins.
pub async fn ensure_child_folder<A: DriveApi + ?Sized>(
    api: &A,
    token: &str,
    parent_id: &str,
    name: &FolderName,
) -> ProviderResult<DriveItem> {
    let filter = ItemFilter::FolderNamed(name.as_str().to_string());
    let existing = hubdrive_core::sorted(api.list_folder(token, parent_id, &filter).await?);

    if let Some(folder) = existing.into_iter().find(DriveItem::is_folder) {
        return Ok(folder);
    }

    let created = api.create_folder(token, parent_id, name).await?;
    info!(id = %created.id, name = %created.name, "created missing folder");
    Ok(created)
}

/// Splits a comma-separated list of addresses, keeping the plausible ones.
///
/// An address is kept when it is non-empty after trimming and contains `@`.
/// Repeats are dropped, case-insensitively, keeping the first spelling.
pub fn parse_emails(raw: &str) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for email in raw.split(',').map(str::trim) {
        if email.is_empty() || !email.contains('@') {
            continue;
        }
        if !emails.iter().any(|e| e.eq_ignore_ascii_case(email)) {
            emails.push(email.to_string());
        }
    }
    emails
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_guesses_mime_type() {
        let file = UploadFile::new("report.pdf", vec![1, 2, 3]);
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.len(), 3);

        let unknown = UploadFile::new("blob.zzzunknown", Vec::new());
        assert_eq!(unknown.mime_type, "application/octet-stream");
        assert!(unknown.is_empty());
    }

    #[test]
    fn upload_debug_hides_content() {
        let file = UploadFile::new("a.txt", b"secret".to_vec());
        let debug = format!("{file:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("len: 6"));
    }

    #[test]
    fn role_parsing_accepts_aliases() {
        assert_eq!("viewer".parse::<Role>(), Ok(Role::Reader));
        assert_eq!("Editor".parse::<Role>(), Ok(Role::Writer));
        assert_eq!("commenter".parse::<Role>(), Ok(Role::Commenter));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn permission_body_shape() {
        let body = serde_json::to_value(Permission::user("a@b.com", Role::Writer)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"role": "writer", "type": "user", "emailAddress": "a@b.com"})
        );
    }

    #[test]
    fn parse_emails_drops_invalid_entries() {
        assert_eq!(
            parse_emails(" a@b.com, ,nope, c@d.org "),
            vec!["a@b.com".to_string(), "c@d.org".to_string()]
        );
        assert!(parse_emails("").is_empty());
    }

    #[test]
    fn parse_emails_drops_repeats() {
        assert_eq!(parse_emails("a@b.com,A@B.com, a@b.com"), vec!["a@b.com".to_string()]);
    }
}
