use crate::error::TransportError;

/// Lifecycle of a paginated fetch.
///
/// Replaces paired `loading`/`no_more` booleans: only the load operation
/// itself transitions this state, so a request cannot be re-issued while one
/// is outstanding or after the final page was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    /// A page came back short or empty; there is nothing more to fetch.
    Exhausted,
    /// The last attempt failed; a manual retry may fetch again.
    Failed(TransportError),
}

impl FetchState {
    /// Whether a new fetch may be issued from this state.
    pub fn can_fetch(&self) -> bool {
        matches!(self, FetchState::Idle | FetchState::Failed(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, FetchState::Exhausted)
    }
}
