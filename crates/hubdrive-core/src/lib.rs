//! Core types: Drive items, ordering, navigation, queries, validation, formatting

pub mod format;
pub mod item;
pub mod navigation;
pub mod order;
pub mod progress;
pub mod query;
pub mod tracing;
pub mod validate;

pub use format::{FormatOptions, JsonListing, ListingFormatter, ViewMode, ellipsis};
pub use item::{DriveItem, FOLDER_MIME_TYPE, FileKind};
pub use navigation::{NavState, NavigationStrategy, Navigator};
pub use order::{collate, compare_items, insert_sorted, sort_items, sorted};
pub use progress::{ProgressTracker, upload_percent};
pub use query::{Corpora, ItemFilter, children_query, escape_literal};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use validate::{FolderName, MAX_NAME_LEN, ValidationError};
