//! Adapter utilities for the `pagefeed` crate.
//!
//! The `pagefeed` crate is a sans-IO state machine. This crate provides the pieces an
//! application usually needs around it:
//!
//! - A [`Renderer`] trait and a [`Controller`] that routes feed events to it and answers
//!   underflow checks
//! - A [`PageFetcher`] trait for the network side (plus [`fetch_fn`] for closures)
//! - A tokio driver ([`spawn`], [`Driver`]) that runs fetches concurrently and commits
//!   debounced filters on time (feature `tokio`, on by default)
//! - An HTTP/JSON fetcher built on reqwest (feature `http`)
#![forbid(unsafe_code)]

mod controller;
mod fetcher;
mod renderer;

#[cfg(feature = "tokio")]
mod driver;
#[cfg(feature = "http")]
mod http;

#[cfg(test)]
mod tests;

pub use controller::Controller;
pub use fetcher::{FnFetcher, PageFetcher, fetch_fn};
pub use renderer::Renderer;

#[cfg(feature = "tokio")]
pub use driver::{Driver, DriverError, FeedHandle, Signal, spawn};
#[cfg(feature = "http")]
pub use http::HttpPageFetcher;
