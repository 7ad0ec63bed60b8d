use core::fmt;
use std::collections::VecDeque;

/// Bounded history of what happened to a [`crate::Pager`], oldest first.
#[derive(Debug)]
pub(crate) struct Events {
    capacity: usize,
    events: VecDeque<PageEvent>,
}

impl Events {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    pub fn push(&mut self, variant: PageEventVariant) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(PageEvent::new(variant));
    }

    pub fn to_vec(&self) -> Vec<PageEvent> {
        self.events.iter().copied().collect()
    }
}

/// A single recorded occurrence on a [`crate::Pager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageEvent {
    /// When the event happened.
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    /// What happened.
    pub variant: PageEventVariant,
}

impl PageEvent {
    pub(crate) fn new(variant: PageEventVariant) -> Self {
        Self {
            recorded_at: chrono::Utc::now(),
            variant,
        }
    }
}

impl fmt::Display for PageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.recorded_at.format("%H:%M:%S%.3f"), self.variant)
    }
}

/// The kinds of [`PageEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEventVariant {
    /// A page arrived, `item_count` is before dedup.
    Fetched {
        /// Items in the page as returned by the source.
        item_count: usize,
        /// Request duration.
        elapsed_ms: i64,
    },
    /// A page request failed.
    FetchFailed {
        /// Request duration.
        elapsed_ms: i64,
    },
    /// The source reported no more pages.
    EndReached,
    /// The pager was reset to its initial cursor.
    Reset,
}

impl fmt::Display for PageEventVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageEventVariant::Fetched {
                item_count,
                elapsed_ms,
            } => write!(f, "fetched {} items in {}ms", item_count, elapsed_ms),
            PageEventVariant::FetchFailed { elapsed_ms } => {
                write!(f, "fetch failed after {}ms", elapsed_ms)
            }
            PageEventVariant::EndReached => write!(f, "end reached"),
            PageEventVariant::Reset => write!(f, "reset"),
        }
    }
}
