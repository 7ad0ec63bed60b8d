use std::{
    collections::HashSet,
    hash::{DefaultHasher, Hash, Hasher},
    sync::atomic::AtomicU64,
};

macro_rules! defined_id_gen {
    ($name:ident) => {
        pub(crate) fn $name() -> u64 {
            static COUNTER: AtomicU64 = AtomicU64::new(0);
            COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
        }
    };
}

defined_id_gen!(new_subscription_id);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KeyHash(u64);

impl KeyHash {
    pub fn new<K: Hash>(key: &K) -> Self {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl Hash for KeyHash {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Remembers the identity of every item seen, so repeated items can be dropped.
pub(crate) struct Dedupe<Item> {
    identify: Box<dyn Fn(&Item) -> KeyHash + Send + Sync>,
    seen: HashSet<KeyHash>,
}

impl<Item> Dedupe<Item> {
    pub fn new<K: Hash>(identify: impl Fn(&Item) -> K + Send + Sync + 'static) -> Self {
        Self {
            identify: Box::new(move |item| KeyHash::new(&identify(item))),
            seen: HashSet::new(),
        }
    }

    /// Drops items already seen, including repeats within `items` itself.
    pub fn retain_unseen(&mut self, items: Vec<Item>) -> Vec<Item> {
        items
            .into_iter()
            .filter(|item| self.seen.insert((self.identify)(item)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

impl<Item> std::fmt::Debug for Dedupe<Item> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dedupe")
            .field("seen", &self.seen.len())
            .finish_non_exhaustive()
    }
}

pub(crate) struct OnDrop<F>
where
    F: FnOnce(),
{
    f: Option<F>,
}

impl<F> OnDrop<F>
where
    F: FnOnce(),
{
    pub fn new(f: F) -> Self {
        Self { f: Some(f) }
    }
}

impl<F> Drop for OnDrop<F>
where
    F: FnOnce(),
{
    fn drop(&mut self) {
        if let Some(f) = self.f.take() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe() {
        let mut dedupe = Dedupe::new(|item: &(u32, char)| item.0);
        assert_eq!(
            dedupe.retain_unseen(vec![(1, 'a'), (2, 'b'), (1, 'z')]),
            vec![(1, 'a'), (2, 'b')]
        );
        assert_eq!(dedupe.retain_unseen(vec![(2, 'b'), (3, 'c')]), vec![(3, 'c')]);

        dedupe.clear();
        assert_eq!(dedupe.retain_unseen(vec![(1, 'a')]), vec![(1, 'a')]);
    }

    #[test]
    fn test_on_drop() {
        let dropped = std::sync::atomic::AtomicBool::new(false);
        {
            let _guard = OnDrop::new(|| dropped.store(true, std::sync::atomic::Ordering::Relaxed));
            assert!(!dropped.load(std::sync::atomic::Ordering::Relaxed));
        }
        assert!(dropped.load(std::sync::atomic::Ordering::Relaxed));
    }

    #[test]
    fn test_subscription_ids_unique() {
        assert_ne!(new_subscription_id(), new_subscription_id());
    }
}
