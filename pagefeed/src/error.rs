use alloc::string::String;

use crate::{Generation, PageNumber, Query};

/// Coarse classification used by UI layers to pick a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Transport failure or non-success response.
    Network,
    /// A result for a query that is no longer active. Never user-visible.
    Stale,
}

/// A failed page fetch. Every variant is a network error from the feed's point of view.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server responded with status {0}")]
    Status(u16),

    /// The response body could not be decoded into a page.
    #[error("malformed page payload: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Network
    }
}

/// A cache write tagged with a generation other than the cache's own.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("stale result for page {page}: issued under {issued}, active is {active}")]
pub struct StaleResult {
    pub page: PageNumber,
    pub issued: Generation,
    pub active: Generation,
}

/// Errors surfaced to the renderer.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FeedError {
    #[error("loading page {page} of '{query}' failed: {source}")]
    Network {
        query: Query,
        page: PageNumber,
        source: FetchError,
    },

    #[error(transparent)]
    Stale(#[from] StaleResult),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Stale(_) => ErrorKind::Stale,
        }
    }

    pub fn page(&self) -> PageNumber {
        match self {
            Self::Network { page, .. } => *page,
            Self::Stale(stale) => stale.page,
        }
    }
}
