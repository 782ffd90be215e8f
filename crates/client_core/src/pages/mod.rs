//! Per-screen controllers. Each owns the state a screen renders from and the
//! calls that move it between `Idle`, `Loading`, `Loaded` and `Error`.

mod auth;
mod content_detail;
mod dashboard;
mod module_detail;
mod modules;
mod schedule;
mod users;

use std::{collections::HashSet, future::Future, hash::Hash, time::Duration};

use shared::{
    domain::{ContentId, ModuleId, UserId},
    protocol::{Content, Module, Page, User},
};
use tokio::time::Instant;
use tracing::{error, warn};

use crate::{error::ClientError, error::ClientResult, resources::ListQuery};

pub use auth::{LoginPage, ProfilePage, RegisterPage};
pub use content_detail::ContentDetailPage;
pub use dashboard::{DashboardPage, ModuleCard};
pub use module_detail::ModuleDetailPage;
pub use modules::ModulesPage;
pub use schedule::{CalendarDay, SchedulePage};
pub use users::UsersPage;

/// Search boxes commit a term once typing pauses this long.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

const SAVE_FAILED: &str = "Failed to save";

/// Logs a failure the way pages do: local validation and 401s are already
/// handled elsewhere and stay quiet.
pub(crate) fn log_failure(context: &str, err: &ClientError) {
    match err {
        ClientError::Validation(_) | ClientError::Unauthorized => {}
        ClientError::Api { .. } => warn!(context, error = %err, "request rejected"),
        _ => error!(context, error = %err, "request failed"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Idle,
    /// `stale` keeps the previous data visible while a refresh is in flight.
    Loading { stale: Option<T> },
    Loaded(T),
    Error(String),
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> PageState<T> {
    pub fn start_loading(&mut self) {
        let stale = match std::mem::take(self) {
            PageState::Loaded(data) => Some(data),
            PageState::Loading { stale } => stale,
            PageState::Idle | PageState::Error(_) => None,
        };
        *self = PageState::Loading { stale };
    }

    /// Settles a load. A failed refresh keeps previously loaded data.
    pub fn finish(&mut self, context: &str, result: ClientResult<T>) {
        let stale = match std::mem::take(self) {
            PageState::Loaded(data) => Some(data),
            PageState::Loading { stale } => stale,
            PageState::Idle | PageState::Error(_) => None,
        };
        *self = match (result, stale) {
            (Ok(data), _) => PageState::Loaded(data),
            (Err(err), Some(stale)) => {
                log_failure(context, &err);
                PageState::Loaded(stale)
            }
            (Err(err), None) => {
                log_failure(context, &err);
                PageState::Error(err.page_message())
            }
        };
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            PageState::Loaded(data) => Some(data),
            PageState::Loading { stale } => stale.as_ref(),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PageState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Items with a stable server id, used to keep appended pages duplicate-free.
pub trait Identified {
    type Id: Copy + Eq + Hash;

    fn id(&self) -> Self::Id;
}

impl Identified for Module {
    type Id = ModuleId;

    fn id(&self) -> ModuleId {
        self.id
    }
}

impl Identified for Content {
    type Id = ContentId;

    fn id(&self) -> ContentId {
        self.id
    }
}

impl Identified for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

/// Accumulates pages of a searchable list.
#[derive(Debug, Clone)]
pub struct PaginatedList<T> {
    items: Vec<T>,
    search: String,
    page: u32,
    has_more: bool,
    status: ListStatus,
    error: Option<String>,
}

impl<T> Default for PaginatedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            search: String::new(),
            page: 0,
            has_more: true,
            status: ListStatus::Idle,
            error: None,
        }
    }
}

impl<T: Identified> PaginatedList<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn status(&self) -> ListStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Drops accumulated pages and returns the query for page 1 of `search`.
    pub fn reset(&mut self, search: &str) -> ListQuery {
        self.items.clear();
        self.search = search.trim().to_string();
        self.page = 0;
        self.has_more = true;
        self.status = ListStatus::Loading;
        self.error = None;
        ListQuery::first_page(&self.search)
    }

    /// Query for the next page of the current search, if there is one.
    pub fn next_query(&mut self) -> Option<ListQuery> {
        if !self.has_more || self.status == ListStatus::Loading || self.page == 0 {
            return None;
        }
        self.status = ListStatus::Loading;
        Some(ListQuery::page(&self.search, self.page + 1))
    }

    /// Applies the response to `query`. Responses for a search term that is
    /// no longer current are discarded.
    pub fn apply(&mut self, query: &ListQuery, result: ClientResult<Page<T>>) {
        if query.search.as_deref().unwrap_or("") != self.search {
            return;
        }
        match result {
            Ok(page) => {
                if query.page <= 1 {
                    self.items = page.data;
                } else {
                    let mut seen: HashSet<T::Id> = self.items.iter().map(Identified::id).collect();
                    self.items
                        .extend(page.data.into_iter().filter(|item| seen.insert(item.id())));
                }
                self.page = query.page;
                self.has_more = query.page < page.last_page;
                self.status = ListStatus::Loaded;
                self.error = None;
            }
            Err(err) => {
                log_failure("list page", &err);
                if query.page <= 1 {
                    self.items.clear();
                }
                self.status = ListStatus::Error;
                self.error = Some(err.page_message());
            }
        }
    }
}

/// Commits a search term only after input has been quiet for the delay.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    committed: String,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            committed: String::new(),
        }
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Commits `term` immediately, discarding any pending input.
    pub fn commit(&mut self, term: &str) {
        self.pending = None;
        self.committed = term.trim().to_string();
    }

    pub fn input(&mut self, term: impl Into<String>) {
        self.pending = Some((term.into(), Instant::now() + self.delay));
    }

    /// Returns the newly committed term once the deadline has passed and it
    /// differs from the last committed one.
    pub fn poll(&mut self) -> Option<String> {
        let (_, deadline) = self.pending.as_ref()?;
        if Instant::now() < *deadline {
            return None;
        }
        let (term, _) = self.pending.take()?;
        let term = term.trim().to_string();
        if term == self.committed {
            return None;
        }
        self.committed = term.clone();
        Some(term)
    }

    /// Waits out the pending deadline, then behaves like [`Self::poll`].
    pub async fn settled(&mut self) -> Option<String> {
        let deadline = self.pending.as_ref()?.1;
        tokio::time::sleep_until(deadline).await;
        self.poll()
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

/// Create/edit modal. `Id` is set while editing an existing record.
#[derive(Debug, Clone)]
pub struct FormDialog<F, Id> {
    open: bool,
    saving: bool,
    editing: Option<Id>,
    pub form: F,
    error: Option<String>,
}

impl<F: Clone, Id: Copy> FormDialog<F, Id> {
    pub fn new(form: F) -> Self {
        Self {
            open: false,
            saving: false,
            editing: None,
            form,
            error: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn editing(&self) -> Option<Id> {
        self.editing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_create(&mut self, form: F) {
        self.editing = None;
        self.form = form;
        self.error = None;
        self.open = true;
    }

    pub fn open_edit(&mut self, id: Id, form: F) {
        self.editing = Some(id);
        self.form = form;
        self.error = None;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.saving = false;
        self.error = None;
    }

    /// Runs `save` with the current form. On success the dialog closes and
    /// `true` is returned so the caller re-fetches; on failure the dialog
    /// stays open showing the error.
    pub async fn submit<S, Fut>(&mut self, save: S) -> bool
    where
        S: FnOnce(Option<Id>, F) -> Fut,
        Fut: Future<Output = ClientResult<()>>,
    {
        self.saving = true;
        self.error = None;
        let result = save(self.editing, self.form.clone()).await;
        self.saving = false;
        match result {
            Ok(()) => {
                self.close();
                true
            }
            Err(err) => {
                log_failure("save dialog", &err);
                self.error = Some(err.dialog_message(SAVE_FAILED));
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/pages_tests.rs"]
mod tests;
