use std::fmt::{self, Debug};
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;

type RequestFn<Key, Item, Err> =
    Box<dyn Fn(Key) -> BoxFuture<'static, Result<Vec<Item>, Err>> + Send + Sync>;

/// Forward-only, cursor-driven page loader.
///
/// Decouples *when* to fetch (scroll driven, the caller decides), *how* to fetch (`on_request`)
/// and *what changed* (the success/error/loading callbacks). The paginator only tracks the cursor,
/// all other state (loading flags, accumulated items, errors) belongs to the caller.
///
/// `load_next_items` takes `&mut self`, so a single paginator can never have two requests in flight.
/// To share one between tasks, use [`crate::Pager`] which handles the guarding and state keeping.
pub struct Paginator<Key, Item, Err> {
    initial_key: Key,
    current_key: Key,
    on_load_updated: Box<dyn FnMut(bool) + Send>,
    on_request: RequestFn<Key, Item, Err>,
    get_next_key: Box<dyn FnMut(&[Item]) -> Key + Send>,
    on_error: Box<dyn FnMut(Err) + Send>,
    on_success: Box<dyn FnMut(Vec<Item>, Key) + Send>,
}

impl<Key, Item, Err> Paginator<Key, Item, Err>
where
    Key: Clone + Debug + Send + 'static,
    Item: Send + 'static,
    Err: Send + 'static,
{
    /// Create a new paginator starting at `initial_key`.
    ///
    /// # Arguments
    ///
    /// - `on_load_updated` - called with `true` before each request, `false` once it completes, whatever the outcome.
    /// - `on_request` - the actual fetch for a cursor, failures should be returned as `Err`, not panicked.
    /// - `get_next_key` - computes the following cursor from the page just fetched.
    /// - `on_error` - called with the error of a failed request, the cursor is left as is so a retry re-requests the same page.
    /// - `on_success` - called with the fetched items and the already-advanced next cursor.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut paginator = Paginator::new(
    ///     0_usize,
    ///     move |loading| state.lock().is_loading = loading,
    ///     |page| async move { api::messages(page).await },
    ///     move |_items| page + 1,
    ///     move |err| state.lock().error = Some(err.to_string()),
    ///     move |items, next_page| messages.lock().extend(items),
    /// );
    /// paginator.load_next_items().await;
    /// ```
    pub fn new<Fut>(
        initial_key: Key,
        on_load_updated: impl FnMut(bool) + Send + 'static,
        on_request: impl Fn(Key) -> Fut + Send + Sync + 'static,
        get_next_key: impl FnMut(&[Item]) -> Key + Send + 'static,
        on_error: impl FnMut(Err) + Send + 'static,
        on_success: impl FnMut(Vec<Item>, Key) + Send + 'static,
    ) -> Self
    where
        Fut: Future<Output = Result<Vec<Item>, Err>> + Send + 'static,
    {
        Self {
            current_key: initial_key.clone(),
            initial_key,
            on_load_updated: Box::new(on_load_updated),
            on_request: Box::new(move |key| on_request(key).boxed()),
            get_next_key: Box::new(get_next_key),
            on_error: Box::new(on_error),
            on_success: Box::new(on_success),
        }
    }

    /// Request the page at the current cursor.
    ///
    /// Exactly one of `on_success` or `on_error` fires per call. A failed request is absorbed here
    /// and reported through `on_error`, it never surfaces as a return value.
    ///
    /// If the returned future is dropped whilst the request is pending, nothing after the request
    /// runs: the cursor stays put and `on_load_updated(false)` is not called for that attempt.
    pub async fn load_next_items(&mut self) {
        (self.on_load_updated)(true);

        let key = self.current_key.clone();
        tracing::debug!(?key, "requesting page");
        let result = (self.on_request)(key).await;

        match result {
            Ok(items) => {
                let next_key = (self.get_next_key)(&items);
                tracing::debug!(item_count = items.len(), ?next_key, "page loaded");
                (self.on_success)(items, next_key.clone());
                self.current_key = next_key;
            }
            Err(err) => {
                tracing::debug!(key = ?self.current_key, "page request failed, cursor not advanced");
                (self.on_error)(err);
            }
        }

        (self.on_load_updated)(false);
    }

    /// Move the cursor back to the initial key.
    ///
    /// Caller-held state (items, flags) isn't touched, it must be reset alongside.
    /// [`crate::Pager::reset`] does both together.
    pub fn reset(&mut self) {
        tracing::debug!(initial_key = ?self.initial_key, "paginator reset");
        self.current_key = self.initial_key.clone();
    }

    /// The cursor the next [`Self::load_next_items`] call will request.
    pub fn current_key(&self) -> &Key {
        &self.current_key
    }

    /// The cursor the paginator was created with, and returns to on [`Self::reset`].
    pub fn initial_key(&self) -> &Key {
        &self.initial_key
    }
}

impl<Key: Debug, Item, Err> Debug for Paginator<Key, Item, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("initial_key", &self.initial_key)
            .field("current_key", &self.current_key)
            .finish_non_exhaustive()
    }
}
