//! Drive search query construction.
//!
//! Builds the `q` and `corpora` parameters for `files.list`.

use crate::item::FOLDER_MIME_TYPE;

/// Which children of a folder a listing returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ItemFilter {
    /// Files and folders.
    #[default]
    All,
    /// Everything except folders.
    FilesOnly,
    /// Only folders.
    FoldersOnly,
    /// Folders with exactly this name.
    FolderNamed(String),
}

/// Search scope for `files.list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corpora {
    /// Every drive the user can access.
    AllDrives,
    /// A single shared drive.
    TeamDrive(String),
}

impl Corpora {
    /// Picks the scope from an optional shared drive ID.
    pub fn from_team_drive(team_drive_id: Option<&str>) -> Self {
        match team_drive_id {
            Some(id) if !id.is_empty() => Self::TeamDrive(id.to_string()),
            _ => Self::AllDrives,
        }
    }

    /// Returns the `corpora` query value.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::AllDrives => "allDrives",
            Self::TeamDrive(_) => "teamDrive",
        }
    }

    /// Returns the shared drive ID, if any.
    pub fn team_drive_id(&self) -> Option<&str> {
        match self {
            Self::AllDrives => None,
            Self::TeamDrive(id) => Some(id),
        }
    }
}

/// Escapes a value for use inside a single-quoted Drive query literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the query listing the non-trashed children of `folder_id`.
pub fn children_query(folder_id: &str, filter: &ItemFilter) -> String {
    let mut q = format!(
        "'{}' in parents and trashed = false",
        escape_literal(folder_id)
    );
    match filter {
        ItemFilter::All => {}
        ItemFilter::FilesOnly => {
            q.push_str(&format!(" and mimeType != '{FOLDER_MIME_TYPE}'"));
        }
        ItemFilter::FoldersOnly => {
            q.push_str(&format!(" and mimeType = '{FOLDER_MIME_TYPE}'"));
        }
        ItemFilter::FolderNamed(name) => {
            q.push_str(&format!(
                " and mimeType = '{FOLDER_MIME_TYPE}' and name = '{}'",
                escape_literal(name)
            ));
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_children() {
        assert_eq!(
            children_query("F1", &ItemFilter::All),
            "'F1' in parents and trashed = false"
        );
    }

    #[test]
    fn files_only_excludes_folders() {
        assert_eq!(
            children_query("F1", &ItemFilter::FilesOnly),
            "'F1' in parents and trashed = false and mimeType != 'application/vnd.google-apps.folder'"
        );
    }

    #[test]
    fn folders_only() {
        assert!(
            children_query("F1", &ItemFilter::FoldersOnly)
                .ends_with("mimeType = 'application/vnd.google-apps.folder'")
        );
    }

    #[test]
    fn folder_named_is_escaped() {
        let q = children_query("F1", &ItemFilter::FolderNamed("O'Brien".to_string()));
        assert!(q.ends_with("name = 'O\\'Brien'"));
    }

    #[test]
    fn escape_backslash_before_quote() {
        assert_eq!(escape_literal(r"a\'b"), r"a\\\'b");
    }

    #[test]
    fn corpora_from_team_drive() {
        assert_eq!(Corpora::from_team_drive(None), Corpora::AllDrives);
        assert_eq!(Corpora::from_team_drive(Some("")), Corpora::AllDrives);
        let team = Corpora::from_team_drive(Some("td1"));
        assert_eq!(team.as_param(), "teamDrive");
        assert_eq!(team.team_drive_id(), Some("td1"));
        assert_eq!(Corpora::AllDrives.as_param(), "allDrives");
    }
}
