//! Folder navigation state.
//!
//! A [`Navigator`] tracks the folder currently being browsed and how to get
//! back out of it. Two strategies exist:
//!
//! - [`NavigationStrategy::Stack`]: every `enter` pushes the previous folder
//!   onto a history stack and `back` pops it.
//! - [`NavigationStrategy::ParentLookup`]: the caller asks Drive for the
//!   current folder's `parents` and hands the answer to [`Navigator::ascend_to`].
//!   This is what URL-driven entry points need, since they start inside a
//!   folder without any history.
//!
//! The root is the folder the portal was configured with. `back` never moves
//! above it; calling `back` while at the root leaves the state unchanged.
//! A root given as an alias (Drive's `root`) can be taught its real ID with
//! [`Navigator::recognise_root`] so that a parent lookup returning that ID
//! lands on the root instead of passing through it.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the navigator resolves "back".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStrategy {
    /// Pop an explicit history stack.
    #[default]
    Stack,
    /// Look up the current folder's parent in Drive.
    ParentLookup,
}

/// Coarse navigation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    /// Browsing the configured root folder.
    AtRoot,
    /// Browsing a folder below the root.
    InSubfolder {
        /// Known depth below the root (at least 1).
        depth: usize,
    },
}

/// Navigation state for a single browsing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    strategy: NavigationStrategy,
    root: String,
    current: String,
    history: Vec<String>,
    root_aliases: Vec<String>,
}

impl Navigator {
    /// Creates a navigator positioned at the root folder.
    pub fn new(strategy: NavigationStrategy, root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            strategy,
            current: root.clone(),
            root,
            history: Vec::new(),
            root_aliases: Vec::new(),
        }
    }

    /// Creates a navigator already inside `current` (e.g. from a URL).
    pub fn starting_at(
        strategy: NavigationStrategy,
        root: impl Into<String>,
        current: impl Into<String>,
    ) -> Self {
        Self {
            strategy,
            root: root.into(),
            current: current.into(),
            history: Vec::new(),
            root_aliases: Vec::new(),
        }
    }

    /// Returns the navigation strategy.
    pub fn strategy(&self) -> NavigationStrategy {
        self.strategy
    }

    /// Returns the root folder ID.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the current folder ID.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Returns the folders entered before the current one, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Returns true when the current folder is the root.
    pub fn at_root(&self) -> bool {
        self.is_root(&self.current)
    }

    /// Returns true for the root ID or any ID recognised as the root.
    pub fn is_root(&self, folder_id: &str) -> bool {
        folder_id == self.root || self.root_aliases.iter().any(|a| a == folder_id)
    }

    /// Returns true when the root has another recognised ID.
    pub fn root_recognised(&self) -> bool {
        !self.root_aliases.is_empty()
    }

    /// Returns true for the root and for folders on the history stack,
    /// i.e. folders known to be at or below the root.
    pub fn is_known_ancestor(&self, folder_id: &str) -> bool {
        self.is_root(folder_id) || self.history.iter().any(|h| h == folder_id)
    }

    /// Registers `folder_id` as another ID of the root folder.
    pub fn recognise_root(&mut self, folder_id: impl Into<String>) {
        let folder_id = folder_id.into();
        if self.is_root(&folder_id) {
            return;
        }
        if self.current == folder_id {
            self.current = self.root.clone();
            self.history.clear();
        }
        debug!(root = %self.root, alias = %folder_id, "recognised root alias");
        self.root_aliases.push(folder_id);
    }

    /// Returns the coarse navigation state.
    pub fn state(&self) -> NavState {
        if self.at_root() {
            NavState::AtRoot
        } else {
            NavState::InSubfolder {
                depth: self.history.len().max(1),
            }
        }
    }

    /// Moves into `folder_id`, remembering the current folder.
    ///
    /// Entering the current folder again is ignored.
    pub fn enter(&mut self, folder_id: impl Into<String>) {
        let folder_id = folder_id.into();
        if folder_id == self.current {
            return;
        }
        let previous = std::mem::replace(&mut self.current, folder_id);
        self.history.push(previous);
        debug!(current = %self.current, depth = self.history.len(), "entered folder");
    }

    /// Goes back using the history stack.
    ///
    /// Returns false (and changes nothing) at the root. With an empty history
    /// below the root, goes straight to the root.
    pub fn back_from_history(&mut self) -> bool {
        if self.at_root() {
            return false;
        }
        self.current = self.history.pop().unwrap_or_else(|| self.root.clone());
        debug!(current = %self.current, "went back");
        true
    }

    /// Goes back to a parent reported by Drive.
    ///
    /// Returns false (and changes nothing) at the root. A missing parent, or
    /// any recognised root ID, lands on the root. History above the parent
    /// is kept; everything from the parent down is dropped.
    pub fn ascend_to(&mut self, parent: Option<&str>) -> bool {
        if self.at_root() {
            return false;
        }
        match parent.filter(|p| !self.is_root(p)) {
            None => {
                self.current = self.root.clone();
                self.history.clear();
            }
            Some(parent) => {
                if let Some(pos) = self.history.iter().position(|h| h == parent) {
                    self.history.truncate(pos);
                }
                self.current = parent.to_string();
            }
        }
        debug!(current = %self.current, "ascended to parent");
        true
    }
}
