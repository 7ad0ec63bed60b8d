/// The caller-visible state of a paginated list.
///
/// Only mutated through paginator callbacks, read by the UI layer to decide whether to request
/// more data, or to show a spinner or error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PaginationState<Key> {
    /// The cursor of the next page to request.
    pub page: Key,
    /// True whilst a page request is in flight.
    pub is_loading: bool,
    /// True once the source has no more pages.
    pub end_reached: bool,
    /// The message of the most recent failed request, cleared on the next success.
    pub error: Option<String>,
}

impl<Key> PaginationState<Key> {
    /// Fresh state pointing at `initial_key`.
    pub fn new(initial_key: Key) -> Self {
        Self {
            page: initial_key,
            is_loading: false,
            end_reached: false,
            error: None,
        }
    }

    /// Whether another page may be requested right now.
    ///
    /// Callers driving a [`crate::Paginator`] directly should check this before every
    /// [`crate::Paginator::load_next_items`] call, the paginator doesn't guard itself.
    pub fn can_load_more(&self) -> bool {
        !self.is_loading && !self.end_reached
    }
}
