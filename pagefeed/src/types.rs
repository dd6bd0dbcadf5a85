use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{FeedError, FetchError};

/// 1-based page number within the active query's result set.
pub type PageNumber = u32;

/// An opaque filter string identifying the active result set.
///
/// Equality is exact string equality; the empty string is a valid query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Query(String);

impl Query {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Self(String::from(value))
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag of one committed query lifetime.
///
/// Bumped on every reset. Generation `0` means "nothing committed yet".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Generation(u64);

impl Generation {
    pub const NONE: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// One fetched page. Immutable once stored in the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub total_count: Option<u64>,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, has_more: bool) -> Self {
        Self {
            items,
            has_more,
            total_count: None,
        }
    }

    pub fn with_total_count(mut self, total_count: u64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Why a fetch was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchKind {
    /// The user is waiting on this page (cursor is `Loading`).
    Direct,
    /// Issued by the prefetch worker.
    Prefetch,
}

/// Identity of one outstanding fetch. Hand it back to [`crate::Feed::complete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchTicket {
    pub generation: Generation,
    pub page: PageNumber,
    pub kind: FetchKind,
}

/// A request for one network round trip: `(query, page, page_size)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub query: Query,
    pub page_size: u32,
}

impl FetchRequest {
    pub fn page(&self) -> PageNumber {
        self.ticket.page
    }

    pub fn kind(&self) -> FetchKind {
        self.ticket.kind
    }
}

/// Outbox entries produced by [`crate::Feed`]. Drain them in order.
#[derive(Clone, Debug)]
pub enum FeedEvent<T> {
    /// A new query was committed; previously rendered content must be discarded.
    Reset {
        query: Query,
        generation: Generation,
    },
    /// Perform this fetch and report back via `Feed::complete`.
    Fetch(FetchRequest),
    /// Append this page. Emitted at most once per page per generation.
    PageReady {
        page: PageNumber,
        result: Arc<PageResult<T>>,
    },
    /// The committed query has no items.
    Empty { query: Query },
    /// Content was appended; re-measure and call `on_viewport_underflow` if it does not fill.
    CheckUnderflow,
    /// A user-waited fetch failed.
    Error(FeedError),
    /// A prefetch failed. Reported only; the feed keeps going.
    PrefetchFailed { page: PageNumber, error: FetchError },
    /// The query must be served by a full navigation instead of an in-place reset.
    Navigate { query: Query },
}

/// Outcome of [`crate::Feed::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The next page was cached and has been rendered.
    Rendered(PageNumber),
    /// A direct fetch was issued for the next page.
    Fetching(PageNumber),
    /// The next page's prefetch is in flight; the cursor waits on it.
    Awaiting(PageNumber),
    /// Nothing to do: no more pages, already loading, or not started.
    Idle,
}

/// Outcome of [`crate::Feed::complete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The page was rendered (it was the one the cursor waited for).
    Rendered,
    /// The page was cached ahead of display.
    Cached,
    /// The fetch belonged to a query that is no longer active and was discarded.
    Stale,
    /// The fetch failed.
    Failed,
    /// The ticket does not match any outstanding fetch of the active generation.
    Dropped,
}

/// Outcome of [`crate::Feed::on_filter_changed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterChange {
    /// The debounce timer was (re)started and commits at `deadline_ms` unless superseded.
    Scheduled { deadline_ms: u64 },
    /// The value bypasses live filtering; a [`FeedEvent::Navigate`] was emitted.
    Navigate,
}
