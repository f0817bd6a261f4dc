//! Render-side view of a section's fetch state

use serde::Serialize;

use super::{FetchState, Shape};

/// What a section shows: exactly one of four states.
///
/// An error always wins over data, and settled-but-empty data is `Empty`,
/// never `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SectionView<T> {
    Loading,
    Failed(String),
    Empty,
    Ready(T),
}

impl<T: Shape> From<FetchState<T>> for SectionView<T> {
    fn from(state: FetchState<T>) -> Self {
        if state.loading {
            SectionView::Loading
        } else if let Some(error) = state.error {
            SectionView::Failed(error.message)
        } else if state.data.is_empty() {
            SectionView::Empty
        } else {
            SectionView::Ready(state.data)
        }
    }
}

impl<T> SectionView<T> {
    pub fn map<U, F>(self, f: F) -> SectionView<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            SectionView::Loading => SectionView::Loading,
            SectionView::Failed(message) => SectionView::Failed(message),
            SectionView::Empty => SectionView::Empty,
            SectionView::Ready(data) => SectionView::Ready(f(data)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SectionView::Loading)
    }
}

impl<T> SectionView<Vec<T>> {
    /// Demote a list that arrangement emptied out to `Empty`
    pub fn non_empty(self) -> Self {
        match self {
            SectionView::Ready(items) if items.is_empty() => SectionView::Empty,
            other => other,
        }
    }
}

impl<T> SectionView<Option<T>> {
    /// Unwrap a singleton; a settled `None` is `Empty`
    pub fn present(self) -> SectionView<T> {
        match self {
            SectionView::Loading => SectionView::Loading,
            SectionView::Failed(message) => SectionView::Failed(message),
            SectionView::Empty | SectionView::Ready(None) => SectionView::Empty,
            SectionView::Ready(Some(data)) => SectionView::Ready(data),
        }
    }
}
