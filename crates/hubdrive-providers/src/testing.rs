//! In-memory doubles for the HTTP seams.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use hubdrive_core::{DriveItem, FolderName, ItemFilter};

use crate::api::{BoxFuture, DriveApi, Permission, ProgressFn, UploadFile};
use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::google::{RefreshedToken, TokenAuthority, TokenInfo};
use crate::portal::{ConnectRequest, CredentialStore, PortalCredentials};

/// A recorded Drive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Get(String),
    CreateFolder(String, String),
    Upload(String, String),
    Delete(String),
    Share(String, String),
}

#[derive(Default)]
struct DriveState {
    items: Vec<DriveItem>,
    calls: Vec<Call>,
    failures: HashMap<&'static str, ProviderErrorCode>,
    next_id: usize,
    my_drive: Option<String>,
}

/// A Drive held in memory. Items live in a flat list keyed by parent.
#[derive(Default)]
pub struct MockDrive {
    state: Mutex<DriveState>,
}

impl MockDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item under `parent`.
    pub fn with_item(self, parent: &str, item: DriveItem) -> Self {
        let item = item.with_parents(vec![parent.to_string()]);
        self.state.lock().unwrap().items.push(item);
        self
    }

    /// Adds an item without parents, like the top of a drive.
    pub fn with_top_level(self, item: DriveItem) -> Self {
        self.state.lock().unwrap().items.push(item.with_parents(Vec::new()));
        self
    }

    /// Adds the user's My Drive folder, reachable through the `root` alias.
    pub fn with_my_drive(self, id: &str) -> Self {
        let drive = self.with_top_level(DriveItem::folder(id, "My Drive"));
        drive.state.lock().unwrap().my_drive = Some(id.to_string());
        drive
    }

    /// Makes every call of `op` fail with `code` until cleared.
    pub fn fail(&self, op: &'static str, code: ProviderErrorCode) {
        self.state.lock().unwrap().failures.insert(op, code);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.lock().unwrap().items.iter().any(|i| i.id == id)
    }

    fn record(&self, op: &'static str, call: Call) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(op) {
            Some(code) => Err(ProviderError::new(*code, format!("{op} failed"))),
            None => Ok(()),
        }
    }

    fn children(&self, folder_id: &str, filter: &ItemFilter) -> Vec<DriveItem> {
        let state = self.state.lock().unwrap();
        state
            .items
            .iter()
            .filter(|i| i.parent() == Some(folder_id))
            .filter(|i| match filter {
                ItemFilter::All => true,
                ItemFilter::FilesOnly => !i.is_folder(),
                ItemFilter::FoldersOnly => i.is_folder(),
                ItemFilter::FolderNamed(name) => i.is_folder() && &i.name == name,
            })
            .cloned()
            .collect()
    }

    fn insert(&self, parent: &str, name: &str, mime: &str) -> DriveItem {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let item = DriveItem::new(format!("new-{}", state.next_id), name, mime)
            .with_parents(vec![parent.to_string()]);
        state.items.push(item.clone());
        item
    }
}

impl DriveApi for MockDrive {
    fn list_folder<'a>(
        &'a self,
        _token: &'a str,
        folder_id: &'a str,
        filter: &'a ItemFilter,
    ) -> BoxFuture<'a, ProviderResult<Vec<DriveItem>>> {
        Box::pin(async move {
            self.record("list", Call::List(folder_id.to_string()))?;
            // Reverse so callers cannot rely on insertion order.
            let mut items = self.children(folder_id, filter);
            items.reverse();
            Ok(items)
        })
    }

    fn get_item<'a>(
        &'a self,
        _token: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        Box::pin(async move {
            self.record("get", Call::Get(id.to_string()))?;
            let state = self.state.lock().unwrap();
            let id = match (&state.my_drive, id) {
                (Some(real), crate::session::DRIVE_ROOT_ALIAS) => real.as_str(),
                _ => id,
            };
            state
                .items
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or_else(|| ProviderError::not_found("file not found"))
        })
    }

    fn create_folder<'a>(
        &'a self,
        _token: &'a str,
        parent_id: &'a str,
        name: &'a FolderName,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        Box::pin(async move {
            self.record(
                "create_folder",
                Call::CreateFolder(parent_id.to_string(), name.as_str().to_string()),
            )?;
            Ok(self.insert(parent_id, name.as_str(), hubdrive_core::FOLDER_MIME_TYPE))
        })
    }

    fn upload<'a>(
        &'a self,
        _token: &'a str,
        parent_id: &'a str,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> BoxFuture<'a, ProviderResult<DriveItem>> {
        Box::pin(async move {
            let total = file.len();
            if let Some(report) = &progress {
                report(total / 2, total);
            }
            self.record(
                "upload",
                Call::Upload(parent_id.to_string(), file.name.clone()),
            )?;
            if let Some(report) = &progress {
                report(total, total);
            }
            Ok(self.insert(parent_id, &file.name, &file.mime_type))
        })
    }

    fn delete<'a>(&'a self, _token: &'a str, id: &'a str) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.record("delete", Call::Delete(id.to_string()))?;
            self.state.lock().unwrap().items.retain(|i| i.id != id);
            Ok(())
        })
    }

    fn add_permission<'a>(
        &'a self,
        _token: &'a str,
        file_id: &'a str,
        permission: &'a Permission,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            self.record(
                "share",
                Call::Share(file_id.to_string(), permission.email_address.clone()),
            )
        })
    }
}

/// Credentials service double answering from a queue.
///
/// When the queue runs dry the last answer is repeated.
#[derive(Default)]
pub struct MockStore {
    answers: Mutex<VecDeque<Result<PortalCredentials, ProviderErrorCode>>>,
    last: Mutex<Option<Result<PortalCredentials, ProviderErrorCode>>>,
    fetches: Mutex<usize>,
    connected: Mutex<Vec<ConnectRequest>>,
    saved_tokens: Mutex<Vec<ConnectRequest>>,
    save_fails: Mutex<bool>,
}

impl MockStore {
    pub fn answering(answers: Vec<Result<PortalCredentials, ProviderErrorCode>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    pub fn failing_saves(self) -> Self {
        *self.save_fails.lock().unwrap() = true;
        self
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    pub fn connected(&self) -> Vec<ConnectRequest> {
        self.connected.lock().unwrap().clone()
    }

    pub fn saved_tokens(&self) -> Vec<ConnectRequest> {
        self.saved_tokens.lock().unwrap().clone()
    }

    fn write(&self, log: &Mutex<Vec<ConnectRequest>>, request: &ConnectRequest) -> ProviderResult<()> {
        if *self.save_fails.lock().unwrap() {
            return Err(ProviderError::server("save failed"));
        }
        log.lock().unwrap().push(request.clone());
        Ok(())
    }
}

impl CredentialStore for MockStore {
    fn fetch<'a>(&'a self, _portal_id: &'a str) -> BoxFuture<'a, ProviderResult<PortalCredentials>> {
        Box::pin(async move {
            *self.fetches.lock().unwrap() += 1;
            let next = self.answers.lock().unwrap().pop_front();
            let answer = match next {
                Some(answer) => {
                    *self.last.lock().unwrap() = Some(answer.clone());
                    answer
                }
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or(Err(ProviderErrorCode::NotFound)),
            };
            answer.map_err(|code| ProviderError::new(code, "credentials service failed"))
        })
    }

    fn connect<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move { self.write(&self.connected, request) })
    }

    fn save_token<'a>(&'a self, request: &'a ConnectRequest) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move { self.write(&self.saved_tokens, request) })
    }
}

/// Token authority double: a fixed set of valid tokens and one refresh answer.
#[derive(Default)]
pub struct MockAuthority {
    valid: HashSet<String>,
    refreshed: Option<String>,
    tokeninfo_down: bool,
    checks: Mutex<usize>,
    refreshes: Mutex<usize>,
}

impl MockAuthority {
    pub fn accepting(tokens: &[&str]) -> Self {
        Self {
            valid: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Every tokeninfo call fails with a network error.
    pub fn with_unreachable_tokeninfo(mut self) -> Self {
        self.tokeninfo_down = true;
        self
    }

    pub fn refreshing_to(mut self, token: &str) -> Self {
        self.refreshed = Some(token.to_string());
        self
    }

    pub fn checks(&self) -> usize {
        *self.checks.lock().unwrap()
    }

    pub fn refreshes(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }
}

impl TokenAuthority for MockAuthority {
    fn token_info<'a>(&'a self, access_token: &'a str) -> BoxFuture<'a, ProviderResult<TokenInfo>> {
        Box::pin(async move {
            *self.checks.lock().unwrap() += 1;
            if self.tokeninfo_down {
                Err(ProviderError::network("connection refused"))
            } else if self.valid.contains(access_token) {
                Ok(TokenInfo::default())
            } else {
                Err(ProviderError::authentication("invalid_token"))
            }
        })
    }

    fn refresh<'a>(
        &'a self,
        _refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<RefreshedToken>> {
        Box::pin(async move {
            *self.refreshes.lock().unwrap() += 1;
            self.refreshed
                .clone()
                .map(|access_token| RefreshedToken {
                    access_token,
                    expires_in: Some(3600),
                })
                .ok_or_else(|| ProviderError::authentication("invalid_grant"))
        })
    }
}
