use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use pagefeed::{FetchError, PageNumber, PageResult, Query};

/// One network round trip for `(query, page, page_size)`.
///
/// Implementations must not retry: a failure is reported once and the feed decides what to
/// do with it. Calls for different pages may run concurrently.
#[async_trait]
pub trait PageFetcher<T: Send + 'static>: Send + Sync + 'static {
    async fn fetch(
        &self,
        query: &Query,
        page: PageNumber,
        page_size: u32,
    ) -> Result<PageResult<T>, FetchError>;
}

#[async_trait]
impl<T, F> PageFetcher<T> for Arc<F>
where
    T: Send + 'static,
    F: PageFetcher<T> + ?Sized,
{
    async fn fetch(
        &self,
        query: &Query,
        page: PageNumber,
        page_size: u32,
    ) -> Result<PageResult<T>, FetchError> {
        (**self).fetch(query, page, page_size).await
    }
}

/// A [`PageFetcher`] backed by an async closure.
///
/// Build one with [`fetch_fn`].
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnFetcher(..)")
    }
}

/// Wraps `f(query, page, page_size)` as a [`PageFetcher`].
pub fn fetch_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher { f }
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(Query, PageNumber, u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageResult<T>, FetchError>> + Send + 'static,
{
    async fn fetch(
        &self,
        query: &Query,
        page: PageNumber,
        page_size: u32,
    ) -> Result<PageResult<T>, FetchError> {
        (self.f)(query.clone(), page, page_size).await
    }
}
