//! The file browser: one folder view over a [`DriveApi`].
//!
//! [`FileBrowser`] owns everything a view needs: the session, navigation,
//! the current listing, loading and error state, upload progress, the
//! pending delete confirmation and a transient notice. Every operation
//! converts remote failures into a [`BrowserError`] and leaves the listing
//! untouched unless the operation succeeded.
//!
//! Listings are requested through [`ListingTicket`]s. Each ticket carries a
//! generation number; applying a ticket older than the latest one is a no-op,
//! so a slow response for a folder the user already left cannot overwrite
//! the newer listing.

use std::time::{Duration, Instant};

use hubdrive_core::{
    DriveItem, FolderName, ItemFilter, NavState, NavigationStrategy, Navigator, ProgressTracker,
    ValidationError, insert_sorted, sorted,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{DriveApi, Permission, ProgressFn, Role, UploadFile, ensure_child_folder, parse_emails};
use crate::error::{ProviderError, ProviderResult};
use crate::session::{DRIVE_ROOT_ALIAS, Session};

/// How long a notice stays visible by default.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Levels a parent lookup climbs to confirm a folder lies below the root.
const MAX_ANCESTRY_DEPTH: usize = 32;

/// Errors surfaced by browser operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// Drive rejected the access token. The token has been cleared.
    #[error("access token expired; please re-authenticate")]
    AuthExpired,

    /// No access token is held, so nothing was attempted.
    #[error("no Drive credentials available for this portal")]
    CredentialsUnavailable,

    /// A remote call failed for another reason.
    #[error("{operation} failed: {message}")]
    OperationFailed {
        /// The operation that failed.
        operation: &'static str,
        /// Error detail.
        message: String,
    },

    /// Input was rejected before any call.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A listing request in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTicket {
    generation: u64,
    folder_id: String,
    filter: ItemFilter,
    token: String,
}

impl ListingTicket {
    /// Returns the generation number.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the folder being listed.
    pub fn folder_id(&self) -> &str {
        &self.folder_id
    }
}

/// What activating an item did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The item was a folder and is now the current folder.
    Entered,
    /// The item is a file; open this URL.
    Open(String),
}

/// Outcome of sharing with one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOutcome {
    /// The invited address.
    pub email: String,
    /// Error message if the invitation failed.
    pub error: Option<String>,
}

impl ShareOutcome {
    /// Returns true if the invitation was accepted by Drive.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    posted_at: Instant,
}

/// A browsing session over one Drive folder tree.
pub struct FileBrowser<A> {
    api: A,
    session: Session,
    navigator: Navigator,
    filter: ItemFilter,
    items: Vec<DriveItem>,
    loading: bool,
    last_error: Option<BrowserError>,
    generation: u64,
    progress: ProgressTracker,
    pending_delete: Option<String>,
    notice: Option<Notice>,
    notice_ttl: Duration,
}

impl<A: DriveApi> FileBrowser<A> {
    /// Creates a browser positioned at the session's root folder.
    pub fn new(api: A, session: Session, strategy: NavigationStrategy) -> Self {
        let navigator = Navigator::new(strategy, session.root_folder_id());
        Self::with_navigator(api, session, navigator)
    }

    /// Creates a browser already inside `folder_id` (e.g. from a link).
    pub fn starting_at(
        api: A,
        session: Session,
        strategy: NavigationStrategy,
        folder_id: impl Into<String>,
    ) -> Self {
        let navigator = Navigator::starting_at(strategy, session.root_folder_id(), folder_id);
        Self::with_navigator(api, session, navigator)
    }

    fn with_navigator(api: A, session: Session, navigator: Navigator) -> Self {
        Self {
            api,
            session,
            navigator,
            filter: ItemFilter::All,
            items: Vec::new(),
            loading: false,
            last_error: None,
            generation: 0,
            progress: ProgressTracker::new(),
            pending_delete: None,
            notice: None,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }

    /// Builder method to set the listing filter.
    pub fn with_filter(mut self, filter: ItemFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Builder method to set how long notices stay visible.
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Returns the Drive API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Supplies a new access token after re-authentication.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.session.set_access_token(token);
    }

    /// Returns the navigator.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Returns the current folder ID.
    pub fn current_folder(&self) -> &str {
        self.navigator.current()
    }

    /// Returns the coarse navigation state.
    pub fn nav_state(&self) -> NavState {
        self.navigator.state()
    }

    /// Returns the listing filter.
    pub fn filter(&self) -> &ItemFilter {
        &self.filter
    }

    /// Changes the listing filter. Takes effect on the next listing.
    pub fn set_filter(&mut self, filter: ItemFilter) {
        self.filter = filter;
    }

    /// Returns the current listing, in display order.
    pub fn items(&self) -> &[DriveItem] {
        &self.items
    }

    /// Returns true while a listing is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the most recent error, cleared by the next successful listing.
    pub fn last_error(&self) -> Option<&BrowserError> {
        self.last_error.as_ref()
    }

    /// Returns the current upload percentage, if an upload is running.
    pub fn upload_progress(&self) -> Option<u8> {
        self.progress.percent()
    }

    /// Returns a handle observing upload progress from another task.
    pub fn progress_handle(&self) -> ProgressTracker {
        self.progress.clone()
    }

    /// Returns the item ID awaiting delete confirmation.
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    /// Returns the notice visible at `now`.
    pub fn active_notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.posted_at) < self.notice_ttl)
            .map(|n| n.message.as_str())
    }

    /// Returns the notice visible right now.
    pub fn notice(&self) -> Option<&str> {
        self.active_notice(Instant::now())
    }

    fn post_notice(&mut self, message: String) {
        self.notice = Some(Notice {
            message,
            posted_at: Instant::now(),
        });
    }

    fn token(&mut self) -> Result<String, BrowserError> {
        match self.session.access_token() {
            Some(token) => Ok(token.to_string()),
            None => {
                debug!("skipping Drive call: no access token");
                Err(self.record(BrowserError::CredentialsUnavailable))
            }
        }
    }

    fn record(&mut self, error: BrowserError) -> BrowserError {
        self.last_error = Some(error.clone());
        error
    }

    /// Converts a remote failure, clearing the token on a 401.
    fn fail(&mut self, operation: &'static str, error: ProviderError) -> BrowserError {
        if error.is_auth_expired() {
            warn!(operation, "access token rejected; clearing it");
            self.session.clear_token();
            return self.record(BrowserError::AuthExpired);
        }
        warn!(operation, error = %error, "Drive operation failed");
        self.record(BrowserError::OperationFailed {
            operation,
            message: error.to_string(),
        })
    }

    /// Starts a listing of the current folder.
    pub fn begin_listing(&mut self) -> Result<ListingTicket, BrowserError> {
        let token = self.token()?;
        self.generation += 1;
        self.loading = true;
        Ok(ListingTicket {
            generation: self.generation,
            folder_id: self.navigator.current().to_string(),
            filter: self.filter.clone(),
            token,
        })
    }

    /// Performs the request described by `ticket`.
    pub async fn fetch_listing(&self, ticket: &ListingTicket) -> ProviderResult<Vec<DriveItem>> {
        self.api
            .list_folder(&ticket.token, &ticket.folder_id, &ticket.filter)
            .await
    }

    /// Applies a listing result.
    ///
    /// Returns `Ok(false)` when the ticket is stale and the result was
    /// discarded. A stale 401 still clears the token.
    pub fn apply_listing(
        &mut self,
        ticket: ListingTicket,
        result: ProviderResult<Vec<DriveItem>>,
    ) -> Result<bool, BrowserError> {
        let current = ticket.generation == self.generation;
        if !current {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding stale listing"
            );
        }

        match result {
            Ok(items) if current => {
                self.items = sorted(items);
                self.loading = false;
                self.last_error = None;
                debug!(folder = %ticket.folder_id, count = self.items.len(), "applied listing");
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) if current || e.is_auth_expired() => {
                if current {
                    self.loading = false;
                }
                Err(self.fail("list folder", e))
            }
            Err(_) => Ok(false),
        }
    }

    /// Lists the current folder and replaces the listing.
    pub async fn refresh(&mut self) -> Result<(), BrowserError> {
        let ticket = self.begin_listing()?;
        let result = self.fetch_listing(&ticket).await;
        self.apply_listing(ticket, result).map(|_| ())
    }

    /// Moves into a folder and lists it.
    ///
    /// If the listing fails the browser stays in the previous folder, so the
    /// items shown always belong to [`Self::current_folder`].
    pub async fn enter(&mut self, folder_id: &str) -> Result<(), BrowserError> {
        self.token()?;
        let previous = self.navigator.clone();
        self.navigator.enter(folder_id);
        self.list_or_restore(previous).await
    }

    async fn list_or_restore(&mut self, previous: Navigator) -> Result<(), BrowserError> {
        if let Err(e) = self.refresh().await {
            debug!(folder = %previous.current(), "listing failed; staying in previous folder");
            self.navigator = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Enters a folder, or returns the URL that opens a file.
    pub async fn activate(&mut self, item: &DriveItem) -> Result<Activation, BrowserError> {
        if item.is_folder() {
            self.enter(&item.id).await?;
            Ok(Activation::Entered)
        } else {
            Ok(Activation::Open(item.open_url()))
        }
    }

    /// Fetches one item's metadata.
    pub async fn item(&mut self, id: &str) -> Result<DriveItem, BrowserError> {
        let token = self.token()?;
        let result = self.api.get_item(&token, id).await;
        result.map_err(|e| self.fail("get item", e))
    }

    /// Goes up one level and lists the new folder.
    ///
    /// Returns `Ok(false)` without any call when already at the root. With
    /// [`NavigationStrategy::ParentLookup`], a parent outside the root's
    /// subtree is replaced by the root.
    pub async fn back(&mut self) -> Result<bool, BrowserError> {
        if self.navigator.at_root() {
            return Ok(false);
        }

        let previous = self.navigator.clone();
        let moved = match self.navigator.strategy() {
            NavigationStrategy::Stack => self.navigator.back_from_history(),
            NavigationStrategy::ParentLookup => {
                let token = self.token()?;
                self.recognise_root_alias(&token).await?;
                if self.navigator.at_root() {
                    return Ok(false);
                }

                let current = self.navigator.current().to_string();
                let lookup = self.api.get_item(&token, &current).await;
                let parent = match lookup {
                    Ok(folder) => folder.parent().map(str::to_string),
                    Err(e) => return Err(self.fail("find parent folder", e)),
                };
                let parent = match parent {
                    Some(p) if !self.navigator.is_known_ancestor(&p) => {
                        if self.below_root(&token, &p).await? {
                            Some(p)
                        } else {
                            warn!(
                                folder = %p,
                                root = %self.navigator.root(),
                                "parent is outside the root folder; going to the root"
                            );
                            None
                        }
                    }
                    other => other,
                };
                self.navigator.ascend_to(parent.as_deref())
            }
        };

        if moved {
            self.list_or_restore(previous).await?;
        }
        Ok(moved)
    }

    /// Learns the real ID behind Drive's `root` alias, once.
    async fn recognise_root_alias(&mut self, token: &str) -> Result<(), BrowserError> {
        if self.navigator.root() != DRIVE_ROOT_ALIAS || self.navigator.root_recognised() {
            return Ok(());
        }
        let result = self.api.get_item(token, DRIVE_ROOT_ALIAS).await;
        match result {
            Ok(root) => self.navigator.recognise_root(root.id),
            Err(e) if e.is_auth_expired() => return Err(self.fail("resolve root folder", e)),
            Err(e) => warn!(error = %e, "could not resolve the root folder alias"),
        }
        Ok(())
    }

    /// Walks up from `folder_id` until the root (true) or the top of the
    /// drive (false). Gives up after [`MAX_ANCESTRY_DEPTH`] levels.
    async fn below_root(&mut self, token: &str, folder_id: &str) -> Result<bool, BrowserError> {
        let mut id = folder_id.to_string();
        for _ in 0..MAX_ANCESTRY_DEPTH {
            let result = self.api.get_item(token, &id).await;
            let folder = result.map_err(|e| self.fail("find parent folder", e))?;
            match folder.parent() {
                Some(parent) if self.navigator.is_known_ancestor(parent) => return Ok(true),
                Some(parent) => id = parent.to_string(),
                None => return Ok(false),
            }
        }
        Ok(false)
    }

    /// Uploads a file into the current folder, then re-lists it.
    ///
    /// Progress is readable through [`Self::upload_progress`] or a
    /// [`Self::progress_handle`] while the transfer runs.
    pub async fn upload(&mut self, file: UploadFile) -> Result<DriveItem, BrowserError> {
        let token = self.token()?;
        let parent = self.navigator.current().to_string();

        self.progress.start(file.len());
        let tracker = self.progress.clone();
        let report: ProgressFn = std::sync::Arc::new(move |sent, total| tracker.record(sent, total));

        let result = self.api.upload(&token, &parent, file, Some(report)).await;
        self.progress.clear();

        let uploaded = result.map_err(|e| self.fail("upload", e))?;
        info!(id = %uploaded.id, name = %uploaded.name, "upload complete");
        self.post_notice(format!("Uploaded {}", uploaded.name));
        self.refresh().await?;
        Ok(uploaded)
    }

    /// Marks an item for deletion. Nothing is deleted until confirmed.
    pub fn request_delete(&mut self, id: impl Into<String>) {
        self.pending_delete = Some(id.into());
    }

    /// Drops the pending deletion, returning the item ID it targeted.
    pub fn cancel_delete(&mut self) -> Option<String> {
        self.pending_delete.take()
    }

    /// Deletes the item marked by [`Self::request_delete`].
    ///
    /// Returns `Ok(None)` when nothing was pending.
    pub async fn confirm_delete(&mut self) -> Result<Option<String>, BrowserError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };
        let token = self.token()?;

        let result = self.api.delete(&token, &id).await;
        result.map_err(|e| self.fail("delete", e))?;

        let name = self
            .items
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| id.clone());
        self.items.retain(|i| i.id != id);
        self.post_notice(format!("Deleted {name}"));
        Ok(Some(id))
    }

    /// Creates a folder in the current folder.
    ///
    /// The name is validated before any call. The new folder is inserted at
    /// its ordered position unless the listing shows files only.
    pub async fn create_folder(&mut self, name: &str) -> Result<DriveItem, BrowserError> {
        let name = FolderName::parse(name).map_err(|e| self.record(e.into()))?;
        let token = self.token()?;
        let parent = self.navigator.current().to_string();

        let result = self.api.create_folder(&token, &parent, &name).await;
        let folder = result.map_err(|e| self.fail("create folder", e))?;

        if self.filter != ItemFilter::FilesOnly {
            insert_sorted(&mut self.items, folder.clone());
        }
        self.post_notice(format!("Created folder {}", folder.name));
        Ok(folder)
    }

    /// Returns the child folder named `name` of the current folder, creating it if needed.
    pub async fn ensure_folder(&mut self, name: &str) -> Result<DriveItem, BrowserError> {
        let name = FolderName::parse(name).map_err(|e| self.record(e.into()))?;
        let token = self.token()?;
        let parent = self.navigator.current().to_string();

        let result = ensure_child_folder(&self.api, &token, &parent, &name).await;
        result.map_err(|e| self.fail("ensure folder", e))
    }

    /// Invites every valid address in a comma-separated list.
    ///
    /// Stops at the first 401; other per-address failures are reported in
    /// the outcomes.
    pub async fn share(
        &mut self,
        file_id: &str,
        emails: &str,
        role: Role,
    ) -> Result<Vec<ShareOutcome>, BrowserError> {
        let recipients = parse_emails(emails);
        if recipients.is_empty() {
            return Err(self.record(ValidationError::NoRecipients.into()));
        }
        let token = self.token()?;

        let mut outcomes = Vec::with_capacity(recipients.len());
        for email in recipients {
            let permission = Permission::user(email.clone(), role);
            let result = self.api.add_permission(&token, file_id, &permission).await;
            match result {
                Ok(()) => outcomes.push(ShareOutcome { email, error: None }),
                Err(e) if e.is_auth_expired() => return Err(self.fail("share", e)),
                Err(e) => {
                    warn!(file_id, email = %email, error = %e, "share failed");
                    outcomes.push(ShareOutcome {
                        email,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let shared = outcomes.iter().filter(|o| o.is_ok()).count();
        self.post_notice(format!("Shared with {shared} of {} addresses", outcomes.len()));
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::testing::{Call, MockDrive};

    fn names(browser: &FileBrowser<MockDrive>) -> Vec<&str> {
        browser.items().iter().map(|i| i.name.as_str()).collect()
    }

    fn sample_drive() -> MockDrive {
        MockDrive::new()
            .with_item("F1", DriveItem::folder("z", "Zeta"))
            .with_item("F1", DriveItem::new("r", "report.pdf", "application/pdf"))
            .with_item("F1", DriveItem::folder("a", "Alpha"))
            .with_item("a", DriveItem::folder("a1", "Inner"))
            .with_item("a1", DriveItem::new("n", "notes.txt", "text/plain"))
    }

    fn browser(strategy: NavigationStrategy) -> FileBrowser<MockDrive> {
        let session = Session::new("123", "F1").with_access_token("T");
        FileBrowser::new(sample_drive(), session, strategy)
    }

    #[tokio::test]
    async fn lists_folders_first_then_files() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();

        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "report.pdf"]);
        assert!(!browser.is_loading());
        assert!(browser.last_error().is_none());
    }

    #[tokio::test]
    async fn listing_twice_is_identical() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();
        let first = browser.items().to_vec();
        browser.refresh().await.unwrap();
        assert_eq!(browser.items(), first.as_slice());
    }

    #[tokio::test]
    async fn no_token_means_no_calls() {
        let session = Session::new("123", "F1");
        let mut browser = FileBrowser::new(sample_drive(), session, NavigationStrategy::Stack);

        assert_eq!(browser.refresh().await, Err(BrowserError::CredentialsUnavailable));
        assert_eq!(browser.enter("a").await, Err(BrowserError::CredentialsUnavailable));
        assert_eq!(browser.api().call_count(), 0);
        assert_eq!(browser.current_folder(), "F1");
    }

    #[tokio::test]
    async fn failed_enter_keeps_previous_folder_and_items() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();
        browser.api().fail("list", ProviderErrorCode::ServerError);

        assert!(matches!(
            browser.enter("a").await,
            Err(BrowserError::OperationFailed { .. })
        ));
        assert_eq!(browser.current_folder(), "F1");
        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "report.pdf"]);
        assert_eq!(browser.nav_state(), NavState::AtRoot);

        browser.api().clear_failures();
        browser.enter("a").await.unwrap();
        assert_eq!(names(&browser), vec!["Inner"]);
    }

    #[tokio::test]
    async fn failed_back_keeps_current_folder_and_items() {
        for strategy in [NavigationStrategy::Stack, NavigationStrategy::ParentLookup] {
            let mut browser = browser(strategy);
            browser.enter("a").await.unwrap();
            browser.enter("a1").await.unwrap();
            browser.api().fail("list", ProviderErrorCode::NetworkError);

            assert!(browser.back().await.is_err(), "{strategy:?}");
            assert_eq!(browser.current_folder(), "a1", "{strategy:?}");
            assert_eq!(names(&browser), vec!["notes.txt"], "{strategy:?}");

            browser.api().clear_failures();
            assert!(browser.back().await.unwrap());
            assert_eq!(browser.current_folder(), "a");
            assert_eq!(names(&browser), vec!["Inner"]);
        }
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_stops_calls() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.api().fail("list", ProviderErrorCode::AuthenticationFailed);

        assert_eq!(browser.refresh().await, Err(BrowserError::AuthExpired));
        assert!(!browser.session().is_authenticated());
        assert_eq!(browser.last_error(), Some(&BrowserError::AuthExpired));
        let calls = browser.api().call_count();

        browser.api().clear_failures();
        assert_eq!(browser.refresh().await, Err(BrowserError::CredentialsUnavailable));
        assert!(browser.create_folder("New").await.is_err());
        assert!(browser.upload(UploadFile::new("a.txt", vec![1])).await.is_err());
        browser.request_delete("r");
        assert!(browser.confirm_delete().await.is_err());
        assert_eq!(browser.api().call_count(), calls);

        browser.set_access_token("T2");
        browser.refresh().await.unwrap();
        assert_eq!(browser.api().call_count(), calls + 1);
    }

    #[tokio::test]
    async fn other_failures_keep_listing_and_token() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();
        browser.api().fail("list", ProviderErrorCode::ServerError);

        let err = browser.refresh().await.unwrap_err();
        assert!(matches!(err, BrowserError::OperationFailed { operation: "list folder", .. }));
        assert!(browser.session().is_authenticated());
        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "report.pdf"]);
        assert!(!browser.is_loading());
    }

    #[tokio::test]
    async fn stale_listing_is_discarded() {
        let mut browser = browser(NavigationStrategy::Stack);
        let old = browser.begin_listing().unwrap();
        browser.navigator.enter("a");
        let new = browser.begin_listing().unwrap();

        let new_result = browser.fetch_listing(&new).await;
        assert_eq!(browser.apply_listing(new, new_result), Ok(true));
        let old_result = browser.fetch_listing(&old).await;
        assert_eq!(browser.apply_listing(old, old_result), Ok(false));

        assert_eq!(names(&browser), vec!["Inner"]);
    }

    #[tokio::test]
    async fn stale_unauthorized_still_clears_token() {
        let mut browser = browser(NavigationStrategy::Stack);
        let old = browser.begin_listing().unwrap();
        let _new = browser.begin_listing().unwrap();

        let result = browser.apply_listing(
            old,
            Err(ProviderError::authentication("expired")),
        );
        assert_eq!(result, Err(BrowserError::AuthExpired));
        assert!(!browser.session().is_authenticated());
    }

    #[tokio::test]
    async fn stack_navigation_round_trip() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.enter("a").await.unwrap();
        browser.enter("a1").await.unwrap();
        assert_eq!(browser.nav_state(), NavState::InSubfolder { depth: 2 });
        assert_eq!(names(&browser), vec!["notes.txt"]);

        assert_eq!(browser.back().await, Ok(true));
        assert_eq!(browser.current_folder(), "a");
        assert_eq!(browser.back().await, Ok(true));
        assert_eq!(browser.nav_state(), NavState::AtRoot);
        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "report.pdf"]);
    }

    #[tokio::test]
    async fn back_at_root_is_noop() {
        for strategy in [NavigationStrategy::Stack, NavigationStrategy::ParentLookup] {
            let mut browser = browser(strategy);
            assert_eq!(browser.back().await, Ok(false));
            assert_eq!(browser.current_folder(), "F1");
            assert_eq!(browser.api().call_count(), 0);
        }
    }

    #[tokio::test]
    async fn parent_lookup_walks_up_from_a_link() {
        let session = Session::new("123", "F1").with_access_token("T");
        let mut browser =
            FileBrowser::starting_at(sample_drive(), session, NavigationStrategy::ParentLookup, "a1");

        assert_eq!(browser.back().await, Ok(true));
        assert_eq!(browser.current_folder(), "a");
        assert_eq!(browser.back().await, Ok(true));
        assert_eq!(browser.current_folder(), "F1");
        assert_eq!(browser.back().await, Ok(false));

        let gets: Vec<_> = browser
            .api()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .collect();
        // a's ancestry is checked once before stepping into it
        assert_eq!(
            gets,
            vec![Call::Get("a1".into()), Call::Get("a".into()), Call::Get("a".into())]
        );
    }

    #[tokio::test]
    async fn parent_lookup_does_not_climb_out_of_the_root() {
        let drive = sample_drive()
            .with_top_level(DriveItem::folder("top", "Other drive"))
            .with_item("top", DriveItem::folder("outside", "Outside"))
            .with_item("outside", DriveItem::folder("x", "Linked"));
        let session = Session::new("123", "F1").with_access_token("T");
        let mut browser =
            FileBrowser::starting_at(drive, session, NavigationStrategy::ParentLookup, "x");

        assert_eq!(browser.back().await, Ok(true));
        assert_eq!(browser.current_folder(), "F1");
        assert_eq!(browser.nav_state(), NavState::AtRoot);
        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "report.pdf"]);
        assert_eq!(browser.back().await, Ok(false));
    }

    #[tokio::test]
    async fn root_alias_is_not_passed_through() {
        let drive = MockDrive::new()
            .with_my_drive("0AMyDrive")
            .with_item("0AMyDrive", DriveItem::folder("a", "Alpha"))
            .with_item("a", DriveItem::folder("a1", "Inner"));
        let session = Session::new("123", DRIVE_ROOT_ALIAS).with_access_token("T");
        let mut browser =
            FileBrowser::starting_at(drive, session, NavigationStrategy::ParentLookup, "a1");

        assert_eq!(browser.back().await, Ok(true));
        assert_eq!(browser.current_folder(), "a");
        assert_eq!(browser.back().await, Ok(true));
        assert_eq!(browser.current_folder(), DRIVE_ROOT_ALIAS);
        assert_eq!(browser.back().await, Ok(false));
        assert_eq!(browser.current_folder(), DRIVE_ROOT_ALIAS);
    }

    #[tokio::test]
    async fn activate_enters_folders_and_opens_files() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();

        let pdf = browser.items()[2].clone();
        assert_eq!(
            browser.activate(&pdf).await,
            Ok(Activation::Open("https://drive.google.com/file/d/r/view".into()))
        );

        let alpha = browser.items()[0].clone();
        assert_eq!(browser.activate(&alpha).await, Ok(Activation::Entered));
        assert_eq!(browser.current_folder(), "a");
    }

    #[tokio::test]
    async fn item_lookup_reports_missing_files() {
        let mut browser = browser(NavigationStrategy::Stack);
        assert_eq!(browser.item("r").await.unwrap().name, "report.pdf");
        assert!(matches!(
            browser.item("missing").await,
            Err(BrowserError::OperationFailed { operation: "get item", .. })
        ));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();
        let calls = browser.api().call_count();

        browser.request_delete("r");
        assert_eq!(browser.pending_delete(), Some("r"));
        assert_eq!(browser.api().call_count(), calls);

        assert_eq!(browser.cancel_delete(), Some("r".to_string()));
        assert_eq!(browser.confirm_delete().await, Ok(None));
        assert_eq!(browser.api().call_count(), calls);

        browser.request_delete("r");
        assert_eq!(browser.confirm_delete().await, Ok(Some("r".to_string())));
        let deletes: Vec<_> = browser
            .api()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Delete(_)))
            .collect();
        assert_eq!(deletes, vec![Call::Delete("r".into())]);
        assert_eq!(names(&browser), vec!["Alpha", "Zeta"]);
        assert_eq!(browser.notice(), Some("Deleted report.pdf"));
        assert!(browser.pending_delete().is_none());
    }

    #[tokio::test]
    async fn failed_delete_keeps_item() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();
        browser.api().fail("delete", ProviderErrorCode::AuthorizationFailed);

        browser.request_delete("r");
        assert!(matches!(
            browser.confirm_delete().await,
            Err(BrowserError::OperationFailed { operation: "delete", .. })
        ));
        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "report.pdf"]);
        assert!(browser.notice().is_none());
    }

    #[tokio::test]
    async fn notice_expires() {
        let mut browser = browser(NavigationStrategy::Stack).with_notice_ttl(Duration::from_secs(3));
        browser.refresh().await.unwrap();
        browser.request_delete("r");
        browser.confirm_delete().await.unwrap();

        let now = Instant::now();
        assert!(browser.active_notice(now).is_some());
        assert!(browser.active_notice(now + Duration::from_secs(4)).is_none());
    }

    #[tokio::test]
    async fn blank_folder_name_makes_no_call() {
        let mut browser = browser(NavigationStrategy::Stack);
        for name in ["", "   "] {
            assert_eq!(
                browser.create_folder(name).await,
                Err(BrowserError::Validation(ValidationError::EmptyFolderName))
            );
        }
        assert_eq!(browser.api().call_count(), 0);
    }

    #[tokio::test]
    async fn created_folder_is_inserted_in_order() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();

        let created = browser.create_folder("  Middle ").await.unwrap();
        assert_eq!(created.name, "Middle");
        assert_eq!(names(&browser), vec!["Alpha", "Middle", "Zeta", "report.pdf"]);
        assert!(
            browser
                .api()
                .calls()
                .contains(&Call::CreateFolder("F1".into(), "Middle".into()))
        );
    }

    #[tokio::test]
    async fn created_folder_hidden_in_files_only_view() {
        let mut browser = browser(NavigationStrategy::Stack).with_filter(ItemFilter::FilesOnly);
        browser.refresh().await.unwrap();
        browser.create_folder("Hidden").await.unwrap();
        assert_eq!(names(&browser), vec!["report.pdf"]);
    }

    #[tokio::test]
    async fn upload_relists_and_clears_progress() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();

        let uploaded = browser
            .upload(UploadFile::new("budget.xlsx", vec![0; 10]))
            .await
            .unwrap();
        assert_eq!(uploaded.name, "budget.xlsx");
        assert_eq!(browser.upload_progress(), None);
        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "budget.xlsx", "report.pdf"]);
        assert!(matches!(browser.api().calls().last(), Some(Call::List(_))));
    }

    #[tokio::test]
    async fn failed_upload_inserts_nothing() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.refresh().await.unwrap();
        browser.api().fail("upload", ProviderErrorCode::ServerError);

        let err = browser.upload(UploadFile::new("x.bin", vec![1, 2])).await;
        assert!(matches!(err, Err(BrowserError::OperationFailed { operation: "upload", .. })));
        assert_eq!(browser.upload_progress(), None);
        assert_eq!(names(&browser), vec!["Alpha", "Zeta", "report.pdf"]);
    }

    #[tokio::test]
    async fn ensure_folder_reuses_existing() {
        let mut browser = browser(NavigationStrategy::Stack);
        let found = browser.ensure_folder("Alpha").await.unwrap();
        assert_eq!(found.id, "a");

        let created = browser.ensure_folder("Deals").await.unwrap();
        assert_eq!(created.name, "Deals");
        assert!(browser.api().contains(&created.id));
        assert!(
            browser
                .api()
                .calls()
                .contains(&Call::CreateFolder("F1".into(), "Deals".into()))
        );
    }

    #[tokio::test]
    async fn share_reports_each_address() {
        let mut browser = browser(NavigationStrategy::Stack);
        let outcomes = browser
            .share("r", "a@example.com, bogus, b@example.com", Role::Writer)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(ShareOutcome::is_ok));
        assert_eq!(browser.notice(), Some("Shared with 2 of 2 addresses"));
    }

    #[tokio::test]
    async fn share_without_valid_addresses_is_rejected() {
        let mut browser = browser(NavigationStrategy::Stack);
        assert_eq!(
            browser.share("r", "nobody, ,", Role::Reader).await,
            Err(BrowserError::Validation(ValidationError::NoRecipients))
        );
        assert_eq!(browser.api().call_count(), 0);
    }

    #[tokio::test]
    async fn share_failures_are_per_address() {
        let mut browser = browser(NavigationStrategy::Stack);
        browser.api().fail("share", ProviderErrorCode::BadRequest);
        let outcomes = browser.share("r", "a@example.com", Role::Reader).await.unwrap();
        assert!(!outcomes[0].is_ok());

        browser.api().fail("share", ProviderErrorCode::AuthenticationFailed);
        assert_eq!(
            browser.share("r", "a@example.com", Role::Reader).await,
            Err(BrowserError::AuthExpired)
        );
    }
}
