use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use crate::{
    PageError, PageEvent, PagerOptions, PaginationState, Paginator, SubscriptionId,
    events::{Events, PageEventVariant},
    subscriptions::Subscriptions,
    utils::{Dedupe, OnDrop},
};

/// What a [`Pager::load_next`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<Key> {
    /// A page arrived and was appended.
    Loaded {
        /// Items actually appended, after dedup.
        new_items: usize,
        /// The cursor the following load will request.
        next_key: Key,
        /// Whether this was the last page.
        end_reached: bool,
    },
    /// The request failed, the cursor wasn't advanced.
    Failed(PageError),
    /// No request was made.
    Skipped(SkipReason),
}

/// Why [`Pager::load_next`] didn't make a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The source has already reported its last page.
    EndReached,
    /// Another load is in flight on this pager.
    AlreadyLoading,
}

/// An infinitely scrolling list backed by a [`Paginator`].
///
/// Owns everything the paginator leaves to its caller: the [`PaginationState`], the accumulated
/// items, the single-flight guard, optional dedup and a short event history.
///
/// Cheap to clone, clones share the same list.
///
/// ```rust,ignore
/// let pager = Pager::new_indexed(|page| async move {
///     api::chat_history(chat_id, page).await.map_err(PageError::fetch)
/// })
/// .with_dedupe_by(|message: &Message| message.id);
///
/// // On scroll to the bottom:
/// if pager.state().can_load_more() {
///     pager.load_next().await;
/// }
/// ```
pub struct Pager<Key, Item> {
    inner: Arc<PagerInner<Key, Item>>,
}

struct PagerInner<Key, Item> {
    // Held across the request await, serialising loads and resets:
    paginator: futures::lock::Mutex<Paginator<Key, Item, PageError>>,
    shared: Arc<Shared<Key, Item>>,
}

struct Shared<Key, Item> {
    initial_key: Key,
    options: PagerOptions,
    data: parking_lot::Mutex<Data<Key, Item>>,
    events: parking_lot::Mutex<Events>,
    subscriptions: Subscriptions<Key, Item>,
}

struct Data<Key, Item> {
    state: PaginationState<Key>,
    items: Vec<Item>,
    dedupe: Option<Dedupe<Item>>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    // Written by the paginator callbacks, taken once the load returns:
    outcome: Option<LoadOutcome<Key>>,
}

impl<Key, Item> Clone for Pager<Key, Item> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Item> Pager<usize, Item>
where
    Item: Clone + Send + Sync + 'static,
{
    /// A pager over numbered pages, starting at page `0` and moving forward by one.
    pub fn new_indexed<Fut>(getter: impl Fn(usize) -> Fut + Send + Sync + 'static) -> Self
    where
        Fut: Future<Output = Result<Vec<Item>, PageError>> + Send + 'static,
    {
        Self::new(0, getter, |page: &usize, _: &[Item]| page + 1)
    }
}

impl<Key, Item> Pager<Key, Item>
where
    Key: Clone + Debug + Send + Sync + 'static,
    Item: Clone + Send + Sync + 'static,
{
    /// Create a pager with default [`PagerOptions`].
    ///
    /// - `getter` fetches the page at a cursor, it should catch its own failures and return them as [`PageError`].
    /// - `next_key` computes the cursor following `current`, given the page just fetched.
    pub fn new<Fut>(
        initial_key: Key,
        getter: impl Fn(Key) -> Fut + Send + Sync + 'static,
        next_key: impl Fn(&Key, &[Item]) -> Key + Send + Sync + 'static,
    ) -> Self
    where
        Fut: Future<Output = Result<Vec<Item>, PageError>> + Send + 'static,
    {
        Self::new_with_options(initial_key, PagerOptions::default(), getter, next_key)
    }

    /// Create a pager with custom [`PagerOptions`].
    pub fn new_with_options<Fut>(
        initial_key: Key,
        options: PagerOptions,
        getter: impl Fn(Key) -> Fut + Send + Sync + 'static,
        next_key: impl Fn(&Key, &[Item]) -> Key + Send + Sync + 'static,
    ) -> Self
    where
        Fut: Future<Output = Result<Vec<Item>, PageError>> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            initial_key: initial_key.clone(),
            options,
            data: parking_lot::Mutex::new(Data {
                state: PaginationState::new(initial_key.clone()),
                items: vec![],
                dedupe: None,
                started_at: None,
                outcome: None,
            }),
            events: parking_lot::Mutex::new(Events::new(options.event_history())),
            subscriptions: Subscriptions::new(),
        });

        let paginator = Paginator::new(
            initial_key,
            {
                let shared = shared.clone();
                move |loading| shared.set_loading(loading)
            },
            getter,
            {
                let shared = shared.clone();
                move |items: &[Item]| {
                    let current = shared.data.lock().state.page.clone();
                    next_key(&current, items)
                }
            },
            {
                let shared = shared.clone();
                move |err| shared.record_failure(err)
            },
            {
                let shared = shared.clone();
                move |items, next_key| shared.record_success(items, next_key)
            },
        );

        Self {
            inner: Arc::new(PagerInner {
                paginator: futures::lock::Mutex::new(paginator),
                shared,
            }),
        }
    }

    /// Drop items whose identity, as returned by `identify`, has been seen before.
    ///
    /// Guards against the same item arriving on two pages, e.g. when new items shift an offset based backend.
    pub fn with_dedupe_by<K: Hash>(
        self,
        identify: impl Fn(&Item) -> K + Send + Sync + 'static,
    ) -> Self {
        self.inner.shared.data.lock().dedupe = Some(Dedupe::new(identify));
        self
    }

    /// Load the next page, unless the end was reached or a load is already running.
    ///
    /// Dropping the returned future cancels the request: the cursor stays where it was and
    /// `is_loading` is cleared.
    pub async fn load_next(&self) -> LoadOutcome<Key> {
        if self.inner.shared.data.lock().state.end_reached {
            tracing::trace!("end reached, skipping load");
            return LoadOutcome::Skipped(SkipReason::EndReached);
        }

        let Some(mut paginator) = self.inner.paginator.try_lock() else {
            tracing::trace!("load already in flight, skipping");
            return LoadOutcome::Skipped(SkipReason::AlreadyLoading);
        };

        // The load that held the guard may have just hit the end:
        if self.inner.shared.data.lock().state.end_reached {
            return LoadOutcome::Skipped(SkipReason::EndReached);
        }

        let _cancel_guard = OnDrop::new({
            let shared = self.inner.shared.clone();
            move || shared.clear_abandoned_load()
        });

        paginator.load_next_items().await;

        let outcome = self.inner.shared.data.lock().outcome.take();
        outcome.unwrap_or(LoadOutcome::Failed(PageError::Aborted))
    }

    /// Clear the list and return to the initial cursor.
    ///
    /// Waits for any in-flight load to finish first, so its page can't land in the fresh list.
    /// Resets the cursor, [`PaginationState`], items and dedup memory together.
    pub async fn reset(&self) {
        let mut paginator = self.inner.paginator.lock().await;
        paginator.reset();

        let shared = &self.inner.shared;
        {
            let mut data = shared.data.lock();
            data.state = PaginationState::new(shared.initial_key.clone());
            data.items.clear();
            if let Some(dedupe) = &mut data.dedupe {
                dedupe.clear();
            }
            data.started_at = None;
            data.outcome = None;
        }
        shared.events.lock().push(PageEventVariant::Reset);
        tracing::debug!("pager reset");
        shared.notify();
    }

    /// Snapshot of the current [`PaginationState`].
    pub fn state(&self) -> PaginationState<Key> {
        self.inner.shared.data.lock().state.clone()
    }

    /// Snapshot of all loaded items.
    pub fn items(&self) -> Vec<Item> {
        self.inner.shared.data.lock().items.clone()
    }

    /// Access the loaded items without cloning.
    ///
    /// Don't call back into the pager from `f`, the list is locked whilst it runs.
    pub fn with_items<T>(&self, f: impl FnOnce(&[Item]) -> T) -> T {
        f(&self.inner.shared.data.lock().items)
    }

    /// Number of loaded items.
    pub fn len(&self) -> usize {
        self.inner.shared.data.lock().items.len()
    }

    /// Whether no items are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The retained event history, oldest first.
    pub fn events(&self) -> Vec<PageEvent> {
        self.inner.shared.events.lock().to_vec()
    }

    /// The options this pager was created with.
    pub fn options(&self) -> &PagerOptions {
        &self.inner.shared.options
    }

    /// Call `listener` with the latest state and items after every change.
    ///
    /// Runs synchronously on whichever task made the change, outside the pager's locks.
    pub fn subscribe(
        &self,
        listener: impl Fn(&PaginationState<Key>, &[Item]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.inner.shared.subscriptions.add(listener)
    }

    /// Stop a listener added with [`Self::subscribe`], returns false if it was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.shared.subscriptions.remove(id)
    }

    /// Unsubscribes `id` once the returned guard drops, without keeping the pager alive.
    #[cfg(feature = "leptos")]
    pub(crate) fn unsubscribe_on_drop(
        &self,
        id: SubscriptionId,
    ) -> OnDrop<Box<dyn FnOnce() + Send + Sync>> {
        let shared = Arc::downgrade(&self.inner.shared);
        OnDrop::new(Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.subscriptions.remove(id);
            }
        }))
    }
}

impl<Key, Item> Shared<Key, Item>
where
    Key: Clone + Debug,
    Item: Clone,
{
    fn set_loading(&self, loading: bool) {
        {
            let mut data = self.data.lock();
            data.state.is_loading = loading;
            if loading {
                data.started_at = Some(chrono::Utc::now());
                data.outcome = None;
            }
        }
        self.notify();
    }

    fn record_success(&self, items: Vec<Item>, next_key: Key) {
        let item_count = items.len();
        let end_reached = self.options.is_last_page(item_count);

        let (elapsed_ms, new_items) = {
            let mut data = self.data.lock();
            let elapsed_ms = elapsed_ms(data.started_at);
            let items = match &mut data.dedupe {
                Some(dedupe) => dedupe.retain_unseen(items),
                None => items,
            };
            let new_items = items.len();
            data.items.extend(items);
            if let Some(max_items) = self.options.max_items() {
                let excess = data.items.len().saturating_sub(max_items);
                data.items.drain(..excess);
            }
            data.state.page = next_key.clone();
            data.state.error = None;
            if end_reached {
                data.state.end_reached = true;
            }
            data.outcome = Some(LoadOutcome::Loaded {
                new_items,
                next_key: next_key.clone(),
                end_reached,
            });
            (elapsed_ms, new_items)
        };

        {
            let mut events = self.events.lock();
            events.push(PageEventVariant::Fetched {
                item_count,
                elapsed_ms,
            });
            if end_reached {
                events.push(PageEventVariant::EndReached);
            }
        }
        tracing::debug!(
            item_count,
            new_items,
            ?next_key,
            end_reached,
            elapsed_ms,
            "page appended"
        );
        self.notify();
    }

    fn record_failure(&self, err: PageError) {
        let elapsed_ms = {
            let mut data = self.data.lock();
            data.state.error = Some(err.to_string());
            data.outcome = Some(LoadOutcome::Failed(err.clone()));
            elapsed_ms(data.started_at)
        };
        self.events
            .lock()
            .push(PageEventVariant::FetchFailed { elapsed_ms });
        tracing::warn!(page = ?self.data.lock().state.page, %err, "page request failed");
        self.notify();
    }

    /// No-op after a normal completion, which already cleared `is_loading`.
    fn clear_abandoned_load(&self) {
        let was_loading = {
            let mut data = self.data.lock();
            let was_loading = data.state.is_loading;
            data.state.is_loading = false;
            data.outcome = None;
            was_loading
        };
        if was_loading {
            tracing::debug!("load cancelled before completion");
            self.notify();
        }
    }

    fn notify(&self) {
        if self.subscriptions.is_empty() {
            return;
        }
        let (state, items) = {
            let data = self.data.lock();
            (data.state.clone(), data.items.clone())
        };
        self.subscriptions.notify(&state, &items);
    }
}

fn elapsed_ms(started_at: Option<chrono::DateTime<chrono::Utc>>) -> i64 {
    started_at
        .map(|started_at| (chrono::Utc::now() - started_at).num_milliseconds())
        .unwrap_or(0)
}

impl<Key: Debug, Item> Debug for Pager<Key, Item> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("state", &self.inner.shared.data.lock().state)
            .field("options", &self.inner.shared.options)
            .finish_non_exhaustive()
    }
}
