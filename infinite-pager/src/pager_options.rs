pub(crate) const DEFAULT_EVENT_HISTORY: usize = 50;

/// Configuration for a [`crate::Pager`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PagerOptions {
    page_size: Option<usize>,
    end_on_empty_page: Option<bool>,
    event_history: Option<usize>,
    max_items: Option<usize>,
}

impl PagerOptions {
    /// Create new [`PagerOptions`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of items a full page contains.
    ///
    /// When set, a page returning fewer items than this marks the end of the list, saving a final request that would come back empty.
    ///
    /// Default: not set, only an empty page marks the end.
    #[track_caller]
    pub fn set_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set whether an empty page marks the end of the list.
    ///
    /// Disable for sources that can return empty pages mid-stream, e.g. when server side filtering removes a whole page.
    ///
    /// Default: `true`
    #[track_caller]
    pub fn set_end_on_empty_page(mut self, end_on_empty_page: bool) -> Self {
        self.end_on_empty_page = Some(end_on_empty_page);
        self
    }

    /// Set how many [`crate::PageEvent`]s are retained, the oldest are dropped first.
    ///
    /// Default: `50`
    #[track_caller]
    pub fn set_event_history(mut self, event_history: usize) -> Self {
        self.event_history = Some(event_history);
        self
    }

    /// Set the maximum number of items held, the oldest are dropped first when exceeded.
    ///
    /// Dropped items stay in the dedup set, so they won't be re-added if they show up again.
    ///
    /// Default: unbounded
    #[track_caller]
    pub fn set_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// The number of items a full page contains, if known.
    ///
    /// Default: not set
    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    /// Whether an empty page marks the end of the list.
    ///
    /// Default: `true`
    pub fn end_on_empty_page(&self) -> bool {
        self.end_on_empty_page.unwrap_or(true)
    }

    /// How many [`crate::PageEvent`]s are retained.
    ///
    /// Default: `50`
    pub fn event_history(&self) -> usize {
        self.event_history.unwrap_or(DEFAULT_EVENT_HISTORY)
    }

    /// The maximum number of items held, if capped.
    ///
    /// Default: unbounded
    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// Whether a page of `nb_items` items is the last one.
    pub(crate) fn is_last_page(&self, nb_items: usize) -> bool {
        if nb_items == 0 {
            return self.end_on_empty_page();
        }
        match self.page_size {
            Some(page_size) => nb_items < page_size,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[test]
    fn test_defaults() {
        let options = PagerOptions::new();
        assert_eq!(options.page_size(), None);
        assert!(options.end_on_empty_page());
        assert_eq!(options.event_history(), DEFAULT_EVENT_HISTORY);
        assert_eq!(options.max_items(), None);
    }

    #[rstest]
    #[case(PagerOptions::new(), 0, true)]
    #[case(PagerOptions::new(), 3, false)]
    #[case(PagerOptions::new().set_end_on_empty_page(false), 0, false)]
    #[case(PagerOptions::new().set_page_size(20), 20, false)]
    #[case(PagerOptions::new().set_page_size(20), 19, true)]
    #[case(PagerOptions::new().set_page_size(20).set_end_on_empty_page(false), 0, false)]
    fn test_is_last_page(
        #[case] options: PagerOptions,
        #[case] nb_items: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(options.is_last_page(nb_items), expected);
    }
}
