//! Drive item types.
//!
//! This module provides the core representation of entries returned by the
//! Google Drive API:
//! - [`DriveItem`]: a file or folder record
//! - [`FileKind`]: the closed classification of an item's MIME type
//!
//! The MIME string is parsed into a [`FileKind`] once, when the item is
//! constructed. Everything downstream (icons, URLs, click handling, ordering)
//! dispatches on the enum instead of inspecting the raw MIME type again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type Google Drive uses to mark folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix shared by all Google Workspace native document types.
const WORKSPACE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// The kind of a Drive item, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A Drive folder.
    Folder,
    /// A native Google Docs document.
    GoogleDoc,
    /// A native Google Sheets spreadsheet.
    GoogleSheet,
    /// A native Google Slides presentation.
    GoogleSlides,
    /// Any other Workspace native type (Forms, Drawings, ...).
    GoogleOther,
    /// An uploaded spreadsheet (xlsx, ods, ...).
    Spreadsheet,
    /// An uploaded word-processing document.
    Document,
    /// An uploaded presentation.
    Presentation,
    /// A PDF file.
    Pdf,
    /// An image.
    Image,
    /// A video.
    Video,
    /// An audio file.
    Audio,
    /// A compressed archive.
    Archive,
    /// Anything else.
    Other,
}

impl FileKind {
    /// Classifies a MIME type.
    pub fn from_mime(mime: &str) -> Self {
        if mime == FOLDER_MIME_TYPE {
            return Self::Folder;
        }

        if let Some(native) = mime.strip_prefix(WORKSPACE_MIME_PREFIX) {
            return match native {
                "document" => Self::GoogleDoc,
                "spreadsheet" => Self::GoogleSheet,
                "presentation" => Self::GoogleSlides,
                _ => Self::GoogleOther,
            };
        }

        // OOXML types all contain "officedocument", so presentations are
        // matched before the generic document check.
        if mime.contains("spreadsheet") || mime.contains("sheet") {
            Self::Spreadsheet
        } else if mime.contains("presentation") {
            Self::Presentation
        } else if mime.contains("document") || mime.contains("wordprocessingml") {
            Self::Document
        } else if mime == "application/pdf" {
            Self::Pdf
        } else if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime.contains("zip") || mime.contains("rar") {
            Self::Archive
        } else {
            Self::Other
        }
    }

    /// Returns true for folders.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }

    /// Returns true for Google Workspace native types.
    pub fn is_workspace_native(&self) -> bool {
        matches!(
            self,
            Self::GoogleDoc | Self::GoogleSheet | Self::GoogleSlides | Self::GoogleOther
        )
    }

    /// Returns the glyph used when rendering this kind.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Folder => "📁",
            Self::GoogleSheet | Self::Spreadsheet => "📊",
            Self::GoogleDoc | Self::Document => "📄",
            Self::GoogleSlides | Self::Presentation => "📽️",
            Self::Pdf => "📕",
            Self::Image => "🖼️",
            Self::Video => "🎬",
            Self::Audio => "🎵",
            Self::Archive => "📦",
            Self::GoogleOther | Self::Other => "📎",
        }
    }

    /// Returns a short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::GoogleDoc => "google doc",
            Self::GoogleSheet => "google sheet",
            Self::GoogleSlides => "google slides",
            Self::GoogleOther => "google file",
            Self::Spreadsheet => "spreadsheet",
            Self::Document => "document",
            Self::Presentation => "presentation",
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Archive => "archive",
            Self::Other => "file",
        }
    }
}

/// A file or folder stored in Google Drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    /// Drive file ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Raw MIME type as reported by Drive.
    pub mime_type: String,
    /// Browser link reported by Drive, when requested and available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    /// Parent folder IDs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Creation time, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    /// Classification derived from `mime_type`.
    pub kind: FileKind,
}

impl DriveItem {
    /// Creates a new item, classifying its MIME type.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let mime_type = mime_type.into();
        let kind = FileKind::from_mime(&mime_type);
        Self {
            id: id.into(),
            name: name.into(),
            mime_type,
            web_view_link: None,
            parents: Vec::new(),
            created_time: None,
            kind,
        }
    }

    /// Creates a folder item.
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, FOLDER_MIME_TYPE)
    }

    /// Builder method to set the web view link.
    pub fn with_web_view_link(mut self, link: impl Into<String>) -> Self {
        self.web_view_link = Some(link.into());
        self
    }

    /// Builder method to set the parent folder IDs.
    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    /// Builder method to set the creation time.
    pub fn with_created_time(mut self, created: DateTime<Utc>) -> Self {
        self.created_time = Some(created);
        self
    }

    /// Returns true if this item is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Returns the first parent folder ID, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// Returns the URL that opens this item in the browser.
    pub fn open_url(&self) -> String {
        let id = &self.id;
        match self.kind {
            FileKind::Folder => format!("https://drive.google.com/drive/folders/{id}"),
            FileKind::GoogleDoc => format!("https://docs.google.com/document/d/{id}/edit"),
            FileKind::GoogleSheet => format!("https://docs.google.com/spreadsheets/d/{id}/edit"),
            FileKind::GoogleSlides => {
                format!("https://docs.google.com/presentation/d/{id}/edit")
            }
            FileKind::GoogleOther => self
                .web_view_link
                .clone()
                .unwrap_or_else(|| drive_viewer_url(id)),
            _ => drive_viewer_url(id),
        }
    }
}

fn drive_viewer_url(id: &str) -> String {
    format!("https://drive.google.com/file/d/{id}/view")
}
