use alloc::sync::Arc;

use crate::Query;

/// Decides whether a raw filter value must bypass live filtering.
///
/// Queries that depend on pure server-side semantics (for example a similarity-search
/// directive) cannot be served by an in-place reset. When this returns `true` the feed emits
/// [`crate::FeedEvent::Navigate`] and drops any pending debounce instead.
pub type NavigationPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Configuration for [`crate::Feed`].
///
/// Cheap to clone: the only closure is stored in an `Arc`.
#[derive(Clone)]
pub struct FeedOptions {
    /// Query committed by `Feed::start`.
    pub initial_query: Query,
    /// Items per page. Clamped to at least 1.
    pub page_size: u32,
    /// How many pages ahead of the displayed page the scheduler keeps fetched.
    pub prefetch_window: u32,
    /// Maximum prefetches in flight at once. `1` drains the queue strictly sequentially.
    pub prefetch_concurrency: usize,
    /// Quiet period before a raw filter change commits.
    pub debounce_ms: u64,
    /// Scroll proximity threshold as a percentage of the scrollable extent.
    pub scroll_threshold_percent: u8,
    pub navigation_predicate: Option<NavigationPredicate>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self::new(50)
    }
}

impl FeedOptions {
    pub fn new(page_size: u32) -> Self {
        Self {
            initial_query: Query::default(),
            page_size: page_size.max(1),
            prefetch_window: 3,
            prefetch_concurrency: 1,
            debounce_ms: 300,
            scroll_threshold_percent: 80,
            navigation_predicate: None,
        }
    }

    pub fn with_initial_query(mut self, query: impl Into<Query>) -> Self {
        self.initial_query = query.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_prefetch_window(mut self, window: u32) -> Self {
        self.prefetch_window = window;
        self
    }

    /// Allows up to `concurrency` prefetches in flight. Values below 1 are treated as 1.
    pub fn with_prefetch_concurrency(mut self, concurrency: usize) -> Self {
        self.prefetch_concurrency = concurrency.max(1);
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_scroll_threshold_percent(mut self, percent: u8) -> Self {
        self.scroll_threshold_percent = percent.min(100);
        self
    }

    pub fn with_navigation_predicate(
        mut self,
        predicate: Option<impl Fn(&str) -> bool + Send + Sync + 'static>,
    ) -> Self {
        self.navigation_predicate = predicate.map(|f| Arc::new(f) as _);
        self
    }

    pub(crate) fn requires_navigation(&self, raw: &str) -> bool {
        self.navigation_predicate
            .as_ref()
            .is_some_and(|predicate| predicate(raw))
    }
}

impl core::fmt::Debug for FeedOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FeedOptions")
            .field("initial_query", &self.initial_query)
            .field("page_size", &self.page_size)
            .field("prefetch_window", &self.prefetch_window)
            .field("prefetch_concurrency", &self.prefetch_concurrency)
            .field("debounce_ms", &self.debounce_ms)
            .field("scroll_threshold_percent", &self.scroll_threshold_percent)
            .field(
                "navigation_predicate",
                &self.navigation_predicate.as_ref().map(|_| ".."),
            )
            .finish()
    }
}
