use pagefeed::{FeedError, PageNumber, PageResult, Query};

/// The rendering side of a feed.
///
/// Implementations append items, show empty/error states, and measure whether the content
/// still leaves part of the viewport empty. Every method except `page_ready` defaults to a
/// no-op so simple renderers stay small.
pub trait Renderer<T> {
    /// A new query was committed: drop everything rendered so far.
    fn reset(&mut self, query: &Query) {
        let _ = query;
    }

    /// Append one page. Called at most once per page per committed query.
    fn page_ready(&mut self, page: PageNumber, result: &PageResult<T>);

    fn empty(&mut self, query: &Query) {
        let _ = query;
    }

    fn error(&mut self, error: &FeedError) {
        let _ = error;
    }

    /// The host must perform a full navigation for `query`.
    fn navigate(&mut self, query: &Query) {
        let _ = query;
    }

    /// `true` when the rendered content does not fill the visible area.
    fn is_underflowing(&self) -> bool {
        false
    }
}
