//! Per-screen list controller.
//!
//! `ListController` owns the loaded page, the committed search, filters, sort,
//! pagination, selection and busy state for one resource. Handles are cheap to
//! clone and share one state; the lock is never held across an `.await`.
//!
//! Every fetch takes a fresh request generation. A response is applied only if
//! its generation is still the newest one and the controller is still mounted,
//! so a slow older request can never overwrite the result of a newer one.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use secrecy::SecretString;
use tokio::sync::broadcast;

use crate::auth::CredentialProvider;
use crate::error::{DeskError, Result};
use crate::notify::Notifier;
use crate::remote::{CollectionEndpoint, ListQuery, Page, Transition};
use crate::resources::{FilterSet, Resource, Sort};

use super::debounce::Debouncer;
use super::fetch::Fetcher;
use super::mutation::{BusyGuard, BusyKey, BusySet, Collection};
use super::pagination::Pagination;
use super::selection::{DialogKind, Selection};

const EVENT_CAPACITY: usize = 64;

/// Primary fetch state. Mutations never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
}

/// Change notifications for presentation layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// A fetch settled and its page was applied
    Loaded { page: u32, count: u64 },
    /// A mutation patched the loaded page in place
    Patched,
    SelectionChanged,
}

/// Read-only copy of the controller state.
pub struct ListSnapshot<R: Resource> {
    pub items: Vec<R::Item>,
    pub count: u64,
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
    pub search: String,
    pub filters: R::Filters,
    pub sort: Sort,
    pub is_loading: bool,
    pub selected: Option<R::Item>,
    pub dialog: Option<DialogKind>,
    pub busy: Vec<BusyKey>,
}

impl<R: Resource> ListSnapshot<R> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

struct ListState<R: Resource> {
    collection: Collection<R::Item>,
    pagination: Pagination,
    search: String,
    filters: R::Filters,
    sort: Sort,
    load_state: LoadState,
    selection: Selection<R::Item>,
    generation: u64,
    mounted: bool,
}

impl<R: Resource> ListState<R> {
    fn new(page_size: u32) -> Self {
        Self {
            collection: Collection::default(),
            pagination: Pagination::new(page_size),
            search: String::new(),
            filters: R::Filters::default(),
            sort: R::default_sort(),
            load_state: LoadState::Idle,
            selection: Selection::default(),
            generation: 0,
            mounted: false,
        }
    }

    fn query(&self) -> ListQuery {
        ListQuery {
            search: (!self.search.is_empty()).then(|| self.search.clone()),
            filters: self.filters.to_params(),
            ordering: self.sort.ordering(),
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
        }
    }

    /// Close the dialog if it is about `id`. Returns true if it closed.
    fn release_selection(&mut self, id: &str) -> bool {
        if self.selection.references(id) {
            self.selection.close();
            true
        } else {
            false
        }
    }
}

/// What happened to a settled fetch
enum Settled {
    Stale,
    Applied { page: u32, count: u64 },
    Clamped,
    Failed(DeskError),
}

struct Inner<R: Resource> {
    fetcher: Fetcher<R>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ListState<R>>,
    busy: Arc<Mutex<BusySet>>,
    events: broadcast::Sender<ListEvent>,
}

/// List management controller for resource `R`.
pub struct ListController<R: Resource> {
    inner: Arc<Inner<R>>,
}

impl<R: Resource> Clone for ListController<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Resource> ListController<R> {
    pub fn new(
        endpoint: Arc<dyn CollectionEndpoint<R>>,
        credentials: Arc<dyn CredentialProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_page_size(endpoint, credentials, notifier, R::PAGE_SIZE)
    }

    pub fn with_page_size(
        endpoint: Arc<dyn CollectionEndpoint<R>>,
        credentials: Arc<dyn CredentialProvider>,
        notifier: Arc<dyn Notifier>,
        page_size: u32,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                fetcher: Fetcher::new(endpoint, credentials),
                notifier,
                state: Mutex::new(ListState::new(page_size)),
                busy: Arc::new(Mutex::new(BusySet::default())),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: ListEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    /// Surface an error to the user and hand it back to the caller.
    fn report(&self, err: DeskError) -> DeskError {
        if err.is_client_side() {
            tracing::debug!(resource = R::NAME, "blocked before any request: {err}");
        } else {
            tracing::warn!(resource = R::NAME, "request failed: {err}");
        }
        self.inner.notifier.notify_error(&err.user_message());
        err
    }

    fn token(&self) -> Result<SecretString> {
        self.inner.fetcher.token().map_err(|e| self.report(e))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Attach the controller and load the first page.
    ///
    /// Without a credential nothing is fetched and the user is told they are
    /// not signed in.
    pub async fn mount(&self) -> Result<()> {
        self.inner.state.lock().mounted = true;
        self.token()?;
        self.refresh().await
    }

    /// Detach the controller. In-flight results are dropped from now on.
    pub fn unmount(&self) {
        let mut state = self.inner.state.lock();
        state.mounted = false;
        state.generation += 1;
        state.load_state = LoadState::Idle;
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.state.lock().mounted
    }

    /// Fetch the page the current state describes.
    ///
    /// A no-op until the controller is mounted. If the result shows the
    /// current page is past the end, the page is clamped and fetched again.
    pub async fn refresh(&self) -> Result<()> {
        loop {
            let Some((generation, query)) = self.begin_fetch() else {
                return Ok(());
            };

            let result = self.inner.fetcher.fetch(&query).await;

            match self.settle(generation, result) {
                Settled::Stale => {
                    tracing::debug!(resource = R::NAME, generation, "dropping stale response");
                    return Ok(());
                }
                Settled::Clamped => {
                    tracing::debug!(resource = R::NAME, "page out of range, refetching");
                    continue;
                }
                Settled::Applied { page, count } => {
                    self.emit(ListEvent::Loaded { page, count });
                    return Ok(());
                }
                Settled::Failed(err) => return Err(self.report(err)),
            }
        }
    }

    fn begin_fetch(&self) -> Option<(u64, ListQuery)> {
        let mut state = self.inner.state.lock();
        if !state.mounted {
            return None;
        }
        state.generation += 1;
        state.load_state = LoadState::Loading;
        Some((state.generation, state.query()))
    }

    fn settle(&self, generation: u64, result: Result<Page<R::Item>>) -> Settled {
        let mut state = self.inner.state.lock();
        if !state.mounted || state.generation != generation {
            return Settled::Stale;
        }
        state.load_state = LoadState::Idle;

        match result {
            Ok(page) => {
                let count = page.count;
                state.collection.replace_all(page);
                if state.pagination.set_total(count) {
                    Settled::Clamped
                } else {
                    Settled::Applied {
                        page: state.pagination.page(),
                        count,
                    }
                }
            }
            Err(err) => Settled::Failed(err),
        }
    }

    // ========================================================================
    // Query changes
    // ========================================================================

    /// Apply a debounced search value. Refetches from page 1 when it changed.
    ///
    /// Surrounding whitespace is ignored, so a blank value clears the search.
    pub async fn commit_search(&self, value: impl Into<String>) -> Result<()> {
        let value = value.into().trim().to_string();
        {
            let mut state = self.inner.state.lock();
            if state.search == value {
                return Ok(());
            }
            state.search = value;
            state.pagination.reset();
        }
        self.refresh().await
    }

    /// Debouncer whose commits feed [`ListController::commit_search`].
    pub fn search_debouncer(&self, delay: Duration) -> Debouncer {
        let controller = self.clone();
        Debouncer::spawn(delay, move |value| {
            let controller = controller.clone();
            async move {
                // Failures are already reported through the notifier
                let _ = controller.commit_search(value).await;
            }
            .boxed()
        })
    }

    /// Replace the filter set wholesale. Refetches from page 1 when it changed.
    pub async fn on_filters_change(&self, next: R::Filters) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            if state.filters == next {
                return Ok(());
            }
            state.filters = next;
            state.pagination.reset();
        }
        self.refresh().await
    }

    /// Set one filter criterion from a `key=value` pair.
    pub async fn set_filter(&self, key: &str, value: &str) -> Result<()> {
        let mut next = self.inner.state.lock().filters.clone();
        next.set(key, value).map_err(|e| self.report(e))?;
        self.on_filters_change(next).await
    }

    /// Change ordering. Refetches from page 1 when it changed.
    pub async fn on_sort_change(&self, sort: Sort) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            if state.sort == sort {
                return Ok(());
            }
            state.sort = sort;
            state.pagination.reset();
        }
        self.refresh().await
    }

    /// Restore default search, filters and sort on page 1, then refetch.
    pub async fn on_reset(&self) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            state.search.clear();
            state.filters = R::Filters::default();
            state.sort = R::default_sort();
            state.pagination.reset();
        }
        self.refresh().await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<()> {
        let changed = self.inner.state.lock().pagination.go_to(page);
        if changed {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    /// Start the next fetch at `page` without fetching now.
    ///
    /// Meant for use before `mount()`: the first fetch asks for `page`
    /// directly and is clamped and refetched only if it is past the end.
    pub fn seek_page(&self, page: u32) {
        self.inner.state.lock().pagination.seek(page);
    }

    pub async fn next_page(&self) -> Result<()> {
        let changed = self.inner.state.lock().pagination.next();
        if changed {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    pub async fn previous_page(&self) -> Result<()> {
        let changed = self.inner.state.lock().pagination.previous();
        if changed {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn open_create(&self) {
        self.inner
            .state
            .lock()
            .selection
            .open(DialogKind::Create, None);
        self.emit(ListEvent::SelectionChanged);
    }

    /// Open a row dialog for a loaded item.
    pub fn open_dialog(&self, kind: DialogKind, id: &str) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            let item = state
                .collection
                .find(id)
                .cloned()
                .ok_or_else(|| DeskError::NotFound(id.to_string()))?;
            state.selection.open(kind, Some(item));
        }
        self.emit(ListEvent::SelectionChanged);
        Ok(())
    }

    pub fn close_dialog(&self) {
        self.inner.state.lock().selection.close();
        self.emit(ListEvent::SelectionChanged);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create an item and put the server's copy on top of the loaded page.
    pub async fn create(&self, draft: R::Draft) -> Result<R::Item> {
        R::validate_draft(&draft).map_err(|e| self.report(e))?;
        let _busy = BusyGuard::claim(&self.inner.busy, BusyKey::Creating)
            .map_err(|e| self.report(e))?;
        let token = self.token()?;

        let item = self
            .inner
            .fetcher
            .endpoint()
            .create(&token, &draft)
            .await
            .map_err(|e| self.report(e))?;

        let applied = {
            let mut state = self.inner.state.lock();
            if state.mounted {
                state.collection.prepend(item.clone());
                let count = state.collection.count;
                state.pagination.set_total(count);
                if state.selection.dialog == Some(DialogKind::Create) {
                    state.selection.close();
                }
            }
            state.mounted
        };

        if applied {
            self.emit(ListEvent::Patched);
        }
        self.inner
            .notifier
            .notify_success(&format!("{} '{}' created", R::LABEL, R::title(&item)));
        Ok(item)
    }

    /// Update an item and replace the loaded copy by id.
    pub async fn update(&self, id: &str, patch: R::Patch) -> Result<R::Item> {
        R::validate_patch(&patch).map_err(|e| self.report(e))?;
        let _busy = BusyGuard::claim(&self.inner.busy, BusyKey::Item(id.to_string()))
            .map_err(|e| self.report(e))?;
        let token = self.token()?;

        let item = self
            .inner
            .fetcher
            .endpoint()
            .update(&token, id, &patch)
            .await
            .map_err(|e| self.report(e))?;

        self.apply_replacement(id, &item);
        self.inner
            .notifier
            .notify_success(&format!("{} '{}' updated", R::LABEL, R::title(&item)));
        Ok(item)
    }

    /// Move an item through a status transition and replace it by id.
    ///
    /// Rejections need a non-blank reason, checked before any request.
    pub async fn transition(&self, id: &str, transition: Transition) -> Result<R::Item> {
        if !R::supports(&transition) {
            return Err(self.report(DeskError::UnsupportedTransition {
                resource: R::NAME,
                action: transition.action(),
            }));
        }
        if transition.reason().is_some_and(|r| r.trim().is_empty()) {
            return Err(self.report(DeskError::required("reason")));
        }
        let _busy = BusyGuard::claim(&self.inner.busy, BusyKey::Item(id.to_string()))
            .map_err(|e| self.report(e))?;
        let token = self.token()?;

        let item = self
            .inner
            .fetcher
            .endpoint()
            .transition(&token, id, &transition)
            .await
            .map_err(|e| self.report(e))?;

        self.apply_replacement(id, &item);
        self.inner.notifier.notify_success(&format!(
            "{} '{}' {}",
            R::LABEL,
            R::title(&item),
            transition.past_tense()
        ));
        Ok(item)
    }

    /// Patch a confirmed item into the loaded page. Skipped once unmounted.
    fn apply_replacement(&self, id: &str, item: &R::Item) {
        let selection_changed = {
            let mut state = self.inner.state.lock();
            if !state.mounted {
                return;
            }
            state.collection.replace(item.clone());
            state.release_selection(id)
        };
        self.emit(ListEvent::Patched);
        if selection_changed {
            self.emit(ListEvent::SelectionChanged);
        }
    }

    /// Delete an item and drop it from the loaded page.
    ///
    /// If the shrunken total leaves the current page past the end, the page
    /// is clamped and refetched.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _busy = BusyGuard::claim(&self.inner.busy, BusyKey::Item(id.to_string()))
            .map_err(|e| self.report(e))?;
        let token = self.token()?;

        self.inner
            .fetcher
            .endpoint()
            .delete(&token, id)
            .await
            .map_err(|e| self.report(e))?;

        let outcome = {
            let mut state = self.inner.state.lock();
            if state.mounted {
                state.collection.remove(id);
                let count = state.collection.count;
                let clamped = state.pagination.set_total(count);
                let selection_changed = state.release_selection(id);
                Some((clamped, selection_changed))
            } else {
                None
            }
        };

        self.inner
            .notifier
            .notify_success(&format!("{} deleted", R::LABEL));
        let Some((clamped, selection_changed)) = outcome else {
            return Ok(());
        };
        self.emit(ListEvent::Patched);
        if selection_changed {
            self.emit(ListEvent::SelectionChanged);
        }

        if clamped {
            // The delete itself succeeded; a failed refetch is already reported
            let _ = self.refresh().await;
        }
        Ok(())
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn snapshot(&self) -> ListSnapshot<R> {
        let state = self.inner.state.lock();
        let busy = self.inner.busy.lock().keys();
        ListSnapshot {
            items: state.collection.items.clone(),
            count: state.collection.count,
            page: state.pagination.page(),
            total_pages: state.pagination.total_pages(),
            page_size: state.pagination.page_size(),
            search: state.search.clone(),
            filters: state.filters.clone(),
            sort: state.sort.clone(),
            is_loading: state.load_state == LoadState::Loading,
            selected: state.selection.selected.clone(),
            dialog: state.selection.dialog,
            busy,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.state.lock().load_state
    }

    pub fn is_busy(&self, key: &BusyKey) -> bool {
        self.inner.busy.lock().is_busy(key)
    }

    /// A loaded item by id
    pub fn find(&self, id: &str) -> Option<R::Item> {
        self.inner.state.lock().collection.find(id).cloned()
    }
}
