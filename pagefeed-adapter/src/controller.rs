use pagefeed::{
    Completion, Feed, FeedEvent, FeedOptions, FetchError, FetchRequest, FetchTicket, PageResult,
    ScrollMetrics,
};

use crate::Renderer;

/// A framework-neutral controller that wraps a `pagefeed::Feed` and a [`Renderer`].
///
/// Every entry point drains the feed's outbox, forwards render events to the renderer, and
/// returns the fetches the host must now perform. `CheckUnderflow` is answered here: when the
/// renderer reports that the content still does not fill the viewport, the next page is
/// requested immediately, which is what keeps a tall viewport filling itself page by page.
///
/// This type performs no I/O. Pair it with a [`crate::PageFetcher`] (or use the tokio driver)
/// to run fetches.
#[derive(Debug)]
pub struct Controller<T, R> {
    feed: Feed<T>,
    renderer: R,
}

impl<T, R: Renderer<T>> Controller<T, R> {
    pub fn new(options: FeedOptions, renderer: R) -> Self {
        Self {
            feed: Feed::new(options),
            renderer,
        }
    }

    pub fn from_feed(feed: Feed<T>, renderer: R) -> Self {
        Self { feed, renderer }
    }

    pub fn feed(&self) -> &Feed<T> {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut Feed<T> {
        &mut self.feed
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn into_parts(self) -> (Feed<T>, R) {
        (self.feed, self.renderer)
    }

    pub fn start(&mut self) -> Vec<FetchRequest> {
        self.feed.start();
        self.dispatch()
    }

    /// Starts with a first page that was already delivered with the host view.
    pub fn start_seeded(&mut self, first_page: PageResult<T>) -> Vec<FetchRequest> {
        self.feed.start_seeded(first_page);
        self.dispatch()
    }

    pub fn refresh(&mut self) -> Vec<FetchRequest> {
        self.feed.refresh();
        self.dispatch()
    }

    pub fn on_filter_changed(&mut self, raw: impl Into<String>, now_ms: u64) -> Vec<FetchRequest> {
        self.feed.on_filter_changed(raw.into(), now_ms);
        self.dispatch()
    }

    /// Earliest time (in the host's `now_ms` clock) at which [`Self::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        self.feed.next_deadline()
    }

    pub fn tick(&mut self, now_ms: u64) -> Vec<FetchRequest> {
        self.feed.tick(now_ms);
        self.dispatch()
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Vec<FetchRequest> {
        self.feed.on_scroll(metrics);
        self.dispatch()
    }

    pub fn on_viewport(&mut self, metrics: ScrollMetrics) -> Vec<FetchRequest> {
        self.feed.on_viewport(metrics);
        self.dispatch()
    }

    pub fn on_scroll_proximity(&mut self) -> Vec<FetchRequest> {
        self.feed.on_scroll_proximity();
        self.dispatch()
    }

    pub fn on_viewport_underflow(&mut self) -> Vec<FetchRequest> {
        self.feed.on_viewport_underflow();
        self.dispatch()
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<PageResult<T>, FetchError>,
    ) -> Vec<FetchRequest> {
        let completion = self.feed.complete(ticket, outcome);
        if completion == Completion::Stale {
            tracing::debug!(page = ticket.page, generation = %ticket.generation, "dropped stale page");
        }
        self.dispatch()
    }

    fn dispatch(&mut self) -> Vec<FetchRequest> {
        let mut fetches = Vec::new();
        while let Some(event) = self.feed.poll_event() {
            match event {
                FeedEvent::Reset { query, generation } => {
                    tracing::debug!(query = %query, %generation, "feed reset");
                    self.renderer.reset(&query);
                }
                FeedEvent::Fetch(request) => fetches.push(request),
                FeedEvent::PageReady { page, result } => self.renderer.page_ready(page, &result),
                FeedEvent::Empty { query } => self.renderer.empty(&query),
                FeedEvent::CheckUnderflow => {
                    if self.renderer.is_underflowing() {
                        self.feed.on_viewport_underflow();
                    }
                }
                FeedEvent::Error(error) => {
                    tracing::warn!(%error, "page load failed");
                    self.renderer.error(&error);
                }
                FeedEvent::PrefetchFailed { page, error } => {
                    tracing::warn!(page, %error, "prefetch failed");
                }
                FeedEvent::Navigate { query } => self.renderer.navigate(&query),
            }
        }
        fetches
    }
}
