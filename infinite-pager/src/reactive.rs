use std::fmt::Debug;

use leptos::prelude::{ArcReadSignal, ArcRwSignal, Set};

use crate::{Pager, PaginationState, utils::OnDrop};

/// Reactive views of a [`Pager`], updated whenever the pager changes.
///
/// The pager is only weakly referenced, dropping this stops the updates.
pub struct PagerSignals<Key, Item>
where
    Key: Send + Sync + 'static,
    Item: Send + Sync + 'static,
{
    /// The latest [`PaginationState`], drive spinners and "load more" triggers off this.
    pub state: ArcReadSignal<PaginationState<Key>>,
    /// All loaded items.
    pub items: ArcReadSignal<Vec<Item>>,
    _unsubscribe: OnDrop<Box<dyn FnOnce() + Send + Sync>>,
}

impl<Key, Item> Pager<Key, Item>
where
    Key: Clone + Debug + Send + Sync + 'static,
    Item: Clone + Send + Sync + 'static,
{
    /// Mirror this pager's state and items into leptos signals.
    ///
    /// ```rust,ignore
    /// let signals = pager.signals();
    /// view! {
    ///     <For each=move || signals.items.get() key=|msg| msg.id let:msg>
    ///         <Message msg />
    ///     </For>
    ///     <Show when=move || signals.state.get().is_loading>
    ///         <Spinner />
    ///     </Show>
    /// }
    /// ```
    pub fn signals(&self) -> PagerSignals<Key, Item> {
        let state = ArcRwSignal::new(self.state());
        let items = ArcRwSignal::new(self.items());

        let id = self.subscribe({
            let state = state.clone();
            let items = items.clone();
            move |new_state, new_items| {
                state.set(new_state.clone());
                items.set(new_items.to_vec());
            }
        });

        PagerSignals {
            state: state.read_only(),
            items: items.read_only(),
            _unsubscribe: self.unsubscribe_on_drop(id),
        }
    }
}

impl<Key, Item> Debug for PagerSignals<Key, Item>
where
    Key: Send + Sync + 'static,
    Item: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerSignals").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use leptos::prelude::GetUntracked;

    use crate::{PageError, Pager};

    #[tokio::test]
    async fn test_signals_follow_pager() {
        crate::test::identify_parking_lot_deadlocks();
        let pager = Pager::new_indexed(|page| async move {
            match page {
                0 => Ok(vec!["a", "b"]),
                1 => Err(PageError::fetch("offline")),
                _ => unreachable!(),
            }
        });

        let signals = pager.signals();
        assert_eq!(signals.items.get_untracked(), Vec::<&str>::new());
        assert!(!signals.state.get_untracked().is_loading);

        pager.load_next().await;
        assert_eq!(signals.items.get_untracked(), vec!["a", "b"]);
        assert_eq!(signals.state.get_untracked().page, 1);

        pager.load_next().await;
        assert_eq!(
            signals.state.get_untracked().error.as_deref(),
            Some("fetch failed: offline")
        );
        assert_eq!(signals.state.get_untracked().page, 1);

        pager.reset().await;
        assert_eq!(signals.items.get_untracked(), Vec::<&str>::new());
        assert_eq!(signals.state.get_untracked(), crate::PaginationState::new(0));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pager = Pager::new_indexed({
            let calls = calls.clone();
            move |_page| {
                calls.fetch_add(1, Ordering::Relaxed);
                async move { Ok(vec![1_u32]) }
            }
        });

        let signals = pager.signals();
        let items = signals.items.clone();
        drop(signals);

        // The load still works, but the detached signal no longer follows it:
        pager.load_next().await;
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(pager.items(), vec![1]);
        assert_eq!(items.get_untracked(), Vec::<u32>::new());
    }
}
