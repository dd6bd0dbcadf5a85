//! A headless paginated feed engine.
//!
//! For adapter-level utilities (renderer glue, an async driver, an HTTP fetcher), see the
//! `pagefeed-adapter` crate.
//!
//! This crate focuses on the state and ordering rules needed to scroll through a large,
//! server-paginated collection: a page cache scoped to one query, a bounded prefetch window
//! that never fetches a page twice at once, a display cursor that only moves forward, and a
//! debounced re-query that atomically discards every older result.
//!
//! It is UI-agnostic and performs no I/O. A host is expected to provide:
//! - the outcome of every requested fetch
//! - the current time in milliseconds (for debouncing)
//! - scroll proximity / viewport underflow signals
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cache;
mod cursor;
mod error;
mod feed;
mod filter;
mod key;
mod options;
mod scheduler;
mod scroll;
mod state;
mod types;


pub use cache::{PageCache, Put};
pub use cursor::{DisplayCursor, Phase};
pub use error::{ErrorKind, FeedError, FetchError, StaleResult};
pub use feed::Feed;
pub use filter::FilterController;
pub use options::{FeedOptions, NavigationPredicate};
pub use scheduler::PrefetchScheduler;
pub use scroll::ScrollMetrics;
pub use state::{CursorState, FeedSnapshot};
pub use types::{
    Advance, Completion, FeedEvent, FetchKind, FetchRequest, FetchTicket, FilterChange,
    Generation, PageNumber, PageResult, Query,
};
