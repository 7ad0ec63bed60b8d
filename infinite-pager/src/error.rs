/// Why a page request failed.
///
/// Getters passed to [`crate::Pager`] should catch their own failures and wrap them here,
/// the pager records the message in [`crate::PaginationState::error`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The page source returned an error, e.g. the network or backend failed.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// The request was given up on before a response arrived.
    #[error("request aborted")]
    Aborted,
}

impl PageError {
    /// Wrap any displayable error as a [`PageError::Fetch`].
    pub fn fetch(err: impl std::fmt::Display) -> Self {
        Self::Fetch(err.to_string())
    }
}
