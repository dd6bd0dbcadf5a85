use alloc::string::String;

use crate::{Generation, PageNumber, Phase};

/// The cursor triple exposed to hosts.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CursorState {
    pub displayed_page: PageNumber,
    pub has_more: bool,
    pub loading: bool,
}

/// A lightweight, serializable snapshot of the whole feed.
///
/// Hosts typically mirror `query` and `displayed_page` into a URL for deep links. The feed
/// never reads it back on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedSnapshot {
    pub query: String,
    pub generation: Generation,
    pub phase: Phase,
    pub cursor: CursorState,
    pub total_count: Option<u64>,
    pub cached_pages: usize,
    pub pending_filter: Option<String>,
}
