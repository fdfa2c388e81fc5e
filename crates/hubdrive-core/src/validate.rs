//! Local validation for user-supplied input.

use std::fmt;

use thiserror::Error;

/// Longest folder name accepted before any request is sent.
pub const MAX_NAME_LEN: usize = 255;

/// A validation failure caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The folder name is empty or whitespace only.
    #[error("folder name must not be empty")]
    EmptyFolderName,

    /// The folder name exceeds [`MAX_NAME_LEN`] characters.
    #[error("folder name is too long ({len} characters, max {MAX_NAME_LEN})")]
    NameTooLong { len: usize },

    /// The portal ID is empty.
    #[error("portal ID must not be empty")]
    EmptyPortalId,

    /// A share request named no valid email address.
    #[error("no valid email address given")]
    NoRecipients,
}

/// A trimmed, non-empty folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderName(String);

impl FolderName {
    /// Validates and trims a folder name.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyFolderName);
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong { len });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks that a portal ID is present.
pub fn portal_id(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyPortalId)
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_names_are_rejected() {
        assert_eq!(FolderName::parse(""), Err(ValidationError::EmptyFolderName));
        assert_eq!(FolderName::parse("   "), Err(ValidationError::EmptyFolderName));
        assert_eq!(FolderName::parse("\t\n"), Err(ValidationError::EmptyFolderName));
    }

    #[test]
    fn names_are_trimmed() {
        let name = FolderName::parse("  Contracts 2024 ").unwrap();
        assert_eq!(name.as_str(), "Contracts 2024");
        assert_eq!(name.to_string(), "Contracts 2024");
    }

    #[test]
    fn overlong_names_are_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            FolderName::parse(&long),
            Err(ValidationError::NameTooLong { len: MAX_NAME_LEN + 1 })
        );
        assert!(FolderName::parse(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn portal_id_must_be_present() {
        assert_eq!(portal_id(" 123 "), Ok("123"));
        assert_eq!(portal_id(""), Err(ValidationError::EmptyPortalId));
    }
}
