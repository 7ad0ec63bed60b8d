use std::sync::Arc;

use crate::{PaginationState, utils::new_subscription_id};

type Listener<Key, Item> = Arc<dyn Fn(&PaginationState<Key>, &[Item]) + Send + Sync>;

/// Handle returned by [`crate::Pager::subscribe`], pass to [`crate::Pager::unsubscribe`] to stop receiving updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) struct Subscriptions<Key, Item> {
    subs: parking_lot::Mutex<Vec<(SubscriptionId, Listener<Key, Item>)>>,
}

impl<Key, Item> Subscriptions<Key, Item> {
    pub fn new() -> Self {
        Self {
            subs: parking_lot::Mutex::new(vec![]),
        }
    }

    pub fn add(
        &self,
        listener: impl Fn(&PaginationState<Key>, &[Item]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(new_subscription_id());
        self.subs.lock().push((id, Arc::new(listener)));
        id
    }

    /// Returns false if the subscription didn't exist.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subs.lock();
        let len_before = subs.len();
        subs.retain(|(sub_id, _)| *sub_id != id);
        subs.len() != len_before
    }

    pub fn is_empty(&self) -> bool {
        self.subs.lock().is_empty()
    }

    pub fn notify(&self, state: &PaginationState<Key>, items: &[Item]) {
        // Not holding the lock whilst calling out, listeners are allowed to (un)subscribe:
        let listeners = self
            .subs
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect::<Vec<_>>();
        for listener in listeners {
            listener(state, items);
        }
    }
}

impl<Key, Item> std::fmt::Debug for Subscriptions<Key, Item> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("nb_subs", &self.subs.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_add_remove_notify() {
        let subs = Subscriptions::<usize, char>::new();
        assert!(subs.is_empty());

        let calls = Arc::new(AtomicUsize::new(0));
        let id = subs.add({
            let calls = calls.clone();
            move |state, items| {
                assert_eq!(state.page, 2);
                assert_eq!(items, &['a']);
                calls.fetch_add(1, Ordering::Relaxed);
            }
        });

        subs.notify(&PaginationState::new(2), &['a']);
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        assert!(subs.remove(id));
        assert!(!subs.remove(id));
        subs.notify(&PaginationState::new(2), &['a']);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
