//! Output formatting for folder listings.
//!
//! This module renders a slice of [`DriveItem`]s in one of three views:
//! - **List**: one item per line with its icon, name and ID
//! - **Grid**: fixed-width cells laid out in a configurable number of columns
//! - **JSON**: machine-readable output
//!
//! # Example
//!
//! ```rust
//! use hubdrive_core::format::{FormatOptions, ListingFormatter, ViewMode};
//! use hubdrive_core::DriveItem;
//!
//! let items = vec![DriveItem::folder("f1", "Reports")];
//! let formatter = ListingFormatter::new(FormatOptions::default().with_view(ViewMode::List));
//! let lines = formatter.format_list(&items);
//! assert_eq!(lines.len(), 1);
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::item::DriveItem;

const DEFAULT_GRID_COLUMNS: usize = 4;
const DEFAULT_CELL_WIDTH: usize = 18;
const DEFAULT_EMPTY_PLACEHOLDER: &str = "This folder is empty.";

/// How a listing is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// One item per line.
    #[default]
    List,
    /// Fixed-width cells in columns.
    Grid,
    /// Machine-readable JSON output.
    Json,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "grid" => Ok(Self::Grid),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// Options controlling listing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Selected view.
    pub view: ViewMode,
    /// Number of cells per row in grid view.
    pub grid_columns: usize,
    /// Maximum name width (in characters) of a grid cell.
    pub cell_width: usize,
    /// Text shown for an empty folder in list and grid views.
    pub empty_placeholder: String,
    /// Show item IDs in list view.
    pub show_ids: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            view: ViewMode::List,
            grid_columns: DEFAULT_GRID_COLUMNS,
            cell_width: DEFAULT_CELL_WIDTH,
            empty_placeholder: DEFAULT_EMPTY_PLACEHOLDER.to_string(),
            show_ids: true,
        }
    }
}

impl FormatOptions {
    /// Sets the view mode.
    #[must_use]
    pub fn with_view(mut self, view: ViewMode) -> Self {
        self.view = view;
        self
    }

    /// Sets the number of grid columns (at least one).
    #[must_use]
    pub fn with_grid_columns(mut self, columns: usize) -> Self {
        self.grid_columns = columns.max(1);
        self
    }

    /// Sets the empty-folder placeholder.
    #[must_use]
    pub fn with_empty_placeholder(mut self, text: impl Into<String>) -> Self {
        self.empty_placeholder = text.into();
        self
    }

    /// Hides or shows IDs in list view.
    #[must_use]
    pub fn with_ids(mut self, show: bool) -> Self {
        self.show_ids = show;
        self
    }
}

/// JSON representation of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct JsonListing<'a> {
    /// Folder that was listed, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<&'a str>,
    /// Number of items.
    pub count: usize,
    /// The items, in listing order.
    pub items: &'a [DriveItem],
}

/// Renders listings according to [`FormatOptions`].
#[derive(Debug, Clone, Default)]
pub struct ListingFormatter {
    options: FormatOptions,
}

impl ListingFormatter {
    /// Creates a formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Returns the formatter options.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Renders `items` in the configured view as a single string.
    ///
    /// # Errors
    ///
    /// Returns an error only if JSON serialization fails.
    pub fn render(&self, folder_id: Option<&str>, items: &[DriveItem]) -> serde_json::Result<String> {
        match self.options.view {
            ViewMode::List => Ok(self.format_list(items).join("\n")),
            ViewMode::Grid => Ok(self.format_grid(items).join("\n")),
            ViewMode::Json => serde_json::to_string_pretty(&self.format_json(folder_id, items)),
        }
    }

    /// Formats items one per line.
    ///
    /// Names are padded to a common width so IDs line up.
    pub fn format_list(&self, items: &[DriveItem]) -> Vec<String> {
        if items.is_empty() {
            return vec![self.options.empty_placeholder.clone()];
        }

        let width = items
            .iter()
            .map(|i| i.name.chars().count())
            .max()
            .unwrap_or(0);

        items
            .iter()
            .map(|item| {
                let icon = item.kind.icon();
                if self.options.show_ids {
                    let pad = width - item.name.chars().count();
                    format!("{icon} {}{}  {}", item.name, " ".repeat(pad), item.id)
                } else {
                    format!("{icon} {}", item.name)
                }
            })
            .collect()
    }

    /// Formats items as rows of fixed-width cells.
    pub fn format_grid(&self, items: &[DriveItem]) -> Vec<String> {
        if items.is_empty() {
            return vec![self.options.empty_placeholder.clone()];
        }

        let width = self.options.cell_width;
        items
            .chunks(self.options.grid_columns.max(1))
            .map(|row| {
                row.iter()
                    .map(|item| {
                        let name = ellipsis(&item.name, width);
                        let pad = width.saturating_sub(name.chars().count());
                        format!("{} {}{}", item.kind.icon(), name, " ".repeat(pad))
                    })
                    .collect::<Vec<_>>()
                    .join("  ")
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    /// Builds the JSON representation of a listing.
    pub fn format_json<'a>(&self, folder_id: Option<&'a str>, items: &'a [DriveItem]) -> JsonListing<'a> {
        JsonListing {
            folder_id,
            count: items.len(),
            items,
        }
    }
}

/// Truncates a string to `max_len` characters, ending with "..." when cut.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}
