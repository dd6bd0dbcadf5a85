use alloc::collections::VecDeque;
use alloc::sync::Arc;

use crate::cache::Put;
use crate::{
    Advance, Completion, CursorState, DisplayCursor, FeedError, FeedEvent, FeedOptions,
    FeedSnapshot, FetchError, FetchKind, FetchRequest, FetchTicket, FilterChange,
    FilterController, Generation, PageCache, PageNumber, PageResult, Phase, PrefetchScheduler,
    Query, ScrollMetrics,
};

/// A headless paginated feed.
///
/// `Feed` owns the active query together with its page cache, display cursor and prefetch
/// plan, and replaces all of them at once whenever a new query commits. It performs no I/O
/// and reads no clock:
/// - fetches are requested through [`FeedEvent::Fetch`] and completed with [`Feed::complete`],
/// - time is passed in as `now_ms` (`on_filter_changed`, `tick`),
/// - rendering instructions are queued as [`FeedEvent`]s; drain them after every call.
///
/// Every completion carries the [`Generation`] it was issued under. Completions from an older
/// generation are discarded before they can touch the cache or the cursor.
///
/// For a channel-driven runtime and renderer glue, see the `pagefeed-adapter` crate.
#[derive(Debug)]
pub struct Feed<T> {
    options: FeedOptions,
    query: Query,
    generation: Generation,
    cache: PageCache<T>,
    scheduler: PrefetchScheduler,
    cursor: DisplayCursor,
    filter: FilterController,
    total_count: Option<u64>,
    events: VecDeque<FeedEvent<T>>,
}

impl<T> Feed<T> {
    pub fn new(options: FeedOptions) -> Self {
        pdebug!(
            page_size = options.page_size,
            prefetch_window = options.prefetch_window,
            debounce_ms = options.debounce_ms,
            "Feed::new"
        );
        Self {
            query: options.initial_query.clone(),
            generation: Generation::NONE,
            cache: PageCache::new(),
            scheduler: PrefetchScheduler::new(
                options.prefetch_window,
                options.prefetch_concurrency,
            ),
            cursor: DisplayCursor::new(),
            filter: FilterController::new(options.debounce_ms),
            total_count: None,
            events: VecDeque::new(),
            options,
        }
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_started(&self) -> bool {
        self.generation != Generation::NONE
    }

    pub fn cache(&self) -> &PageCache<T> {
        &self.cache
    }

    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }

    pub fn cursor(&self) -> &DisplayCursor {
        &self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.cursor.phase()
    }

    pub fn displayed_page(&self) -> PageNumber {
        self.cursor.displayed_page()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.cursor.is_loading()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            query: self.query.as_str().into(),
            generation: self.generation,
            phase: self.cursor.phase(),
            cursor: self.cursor.state(),
            total_count: self.total_count,
            cached_pages: self.cache.len(),
            pending_filter: self.filter.pending().map(|q| q.as_str().into()),
        }
    }

    /// Pops the oldest queued event.
    pub fn poll_event(&mut self) -> Option<FeedEvent<T>> {
        self.events.pop_front()
    }

    /// Drains every queued event in emission order.
    pub fn drain_events(&mut self) -> impl Iterator<Item = FeedEvent<T>> + '_ {
        self.events.drain(..)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Commits the configured initial query and requests its first page.
    pub fn start(&mut self) {
        let query = self.options.initial_query.clone();
        self.filter.cancel();
        self.reset(query);
    }

    /// Commits the configured initial query with a first page the host already rendered.
    ///
    /// No fetch is issued for page 1; prefetching starts right away.
    pub fn start_seeded(&mut self, first_page: PageResult<T>) {
        let query = self.options.initial_query.clone();
        self.filter.cancel();
        self.commit(query);
        let first_page = Arc::new(first_page);
        if let Err(_stale) = self.cache.put(self.generation, 1, Arc::clone(&first_page)) {
            pwarn!("seeded first page rejected: {}", _stale);
            return;
        }
        self.land(1, first_page);
    }

    /// Re-runs the active query from page 1, dropping everything cached for it.
    ///
    /// This is the explicit retry path; the feed never retries on its own.
    pub fn refresh(&mut self) {
        self.filter.cancel();
        let query = self.query.clone();
        self.reset(query);
    }

    /// Feeds a raw (not yet debounced) filter value.
    pub fn on_filter_changed(&mut self, raw: impl Into<Query>, now_ms: u64) -> FilterChange {
        let query = raw.into();
        if self.options.requires_navigation(query.as_str()) {
            pdebug!(query = query.as_str(), "filter requires navigation");
            self.filter.cancel();
            self.events.push_back(FeedEvent::Navigate { query });
            return FilterChange::Navigate;
        }
        self.filter.on_change(query, now_ms);
        let deadline_ms = now_ms.saturating_add(self.filter.debounce_ms());
        FilterChange::Scheduled { deadline_ms }
    }

    /// When the debounce timer is armed, the time at which `tick` will commit.
    pub fn next_deadline(&self) -> Option<u64> {
        self.filter.deadline_ms()
    }

    /// Fires the debounce timer if it is due. Returns `true` when a reset was committed.
    ///
    /// A debounced value equal to the active query keeps the current results, unless the
    /// feed is `Idle` (never started, or its first page failed).
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(query) = self.filter.poll(now_ms) else {
            return false;
        };
        if self.is_started() && query == self.query && self.cursor.phase() != Phase::Idle {
            pdebug!(query = query.as_str(), "filter unchanged");
            return false;
        }
        self.reset(query);
        true
    }

    /// Scroll-proximity trigger.
    pub fn on_scroll_proximity(&mut self) -> Advance {
        self.advance()
    }

    /// Viewport-underflow trigger.
    pub fn on_viewport_underflow(&mut self) -> Advance {
        self.advance()
    }

    /// Advances if the viewport has scrolled past the configured threshold.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Advance {
        if !metrics.is_near_end(self.options.scroll_threshold_percent) {
            return Advance::Idle;
        }
        self.advance()
    }

    /// Advances if the rendered content does not fill the viewport.
    pub fn on_viewport(&mut self, metrics: ScrollMetrics) -> Advance {
        if !metrics.is_underflowing() {
            return Advance::Idle;
        }
        self.advance()
    }

    /// Shows the page after the displayed one.
    ///
    /// A cached page renders immediately. Otherwise the cursor enters `Loading`: if the page's
    /// prefetch is already in flight the cursor waits on it, else a direct fetch is requested.
    /// No-op while loading, before the first page, or once the last page is shown.
    pub fn advance(&mut self) -> Advance {
        let Some(target) = self.cursor.next_target() else {
            ptrace!(
                displayed = self.cursor.displayed_page(),
                has_more = self.cursor.has_more(),
                "Feed::advance: idle"
            );
            return Advance::Idle;
        };

        if let Some(result) = self.cache.get(target).map(Arc::clone) {
            self.land(target, result);
            return Advance::Rendered(target);
        }

        if self.scheduler.is_in_flight(target) {
            ptrace!(page = target, "Feed::advance: awaiting prefetch");
            self.cursor.begin_loading(target);
            return Advance::Awaiting(target);
        }

        self.issue_direct(target);
        Advance::Fetching(target)
    }

    /// Applies the outcome of a fetch previously requested through [`FeedEvent::Fetch`].
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<PageResult<T>, FetchError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            pdebug!(
                page = ticket.page,
                issued = ticket.generation.get(),
                active = self.generation.get(),
                "discarding stale completion"
            );
            return Completion::Stale;
        }

        let page = ticket.page;
        let released = match (ticket.kind, &outcome) {
            (FetchKind::Direct, _) => self.scheduler.finish_direct(page),
            (FetchKind::Prefetch, Ok(_)) => self.scheduler.finish(page),
            (FetchKind::Prefetch, Err(_)) => self.scheduler.fail(page),
        };
        if !released {
            pwarn!(page, kind = ?ticket.kind, "completion for a fetch that is not outstanding");
            return Completion::Dropped;
        }

        let completion = match outcome {
            Ok(result) => self.accept(ticket, result),
            Err(error) => self.reject(ticket, error),
        };
        self.pump();
        completion
    }

    fn accept(&mut self, ticket: FetchTicket, result: PageResult<T>) -> Completion {
        let page = ticket.page;
        let result = Arc::new(result);
        let stored = match self.cache.put(ticket.generation, page, Arc::clone(&result)) {
            Ok(Put::Inserted) => result,
            Ok(Put::AlreadyCached) => self.cache.get(page).map(Arc::clone).unwrap_or(result),
            Err(_stale) => {
                pwarn!(page, "cache rejected completion: {}", _stale);
                return Completion::Stale;
            }
        };

        if self.cursor.awaits(page) {
            self.land(page, stored);
            return Completion::Rendered;
        }

        let displayed = self.cursor.displayed_page();
        let cache = &self.cache;
        self.scheduler
            .walk_forward(page, stored.has_more, displayed, |p| cache.contains(p));
        Completion::Cached
    }

    fn reject(&mut self, ticket: FetchTicket, error: FetchError) -> Completion {
        let page = ticket.page;
        if ticket.kind == FetchKind::Prefetch {
            pwarn!(page, error = %error, "prefetch failed");
            self.events.push_back(FeedEvent::PrefetchFailed {
                page,
                error: error.clone(),
            });
        }
        if self.cursor.awaits(page) {
            self.cursor.fail(page);
            self.events.push_back(FeedEvent::Error(FeedError::Network {
                query: self.query.clone(),
                page,
                source: error,
            }));
        }
        Completion::Failed
    }

    /// Replaces the query and every piece of state derived from it.
    fn commit(&mut self, query: Query) {
        self.generation = self.generation.next();
        self.cache.clear(self.generation);
        self.scheduler.clear();
        self.cursor.reset_loading_first();
        self.total_count = None;
        self.query = query;
        pdebug!(
            query = self.query.as_str(),
            generation = self.generation.get(),
            "query committed"
        );
        self.events.push_back(FeedEvent::Reset {
            query: self.query.clone(),
            generation: self.generation,
        });
    }

    fn reset(&mut self, query: Query) {
        self.commit(query);
        self.issue_direct(1);
    }

    fn request(&self, page: PageNumber, kind: FetchKind) -> FetchRequest {
        FetchRequest {
            ticket: FetchTicket {
                generation: self.generation,
                page,
                kind,
            },
            query: self.query.clone(),
            page_size: self.options.page_size,
        }
    }

    fn issue_direct(&mut self, page: PageNumber) {
        self.scheduler.begin_direct(page);
        self.cursor.begin_loading(page);
        let request = self.request(page, FetchKind::Direct);
        self.events.push_back(FeedEvent::Fetch(request));
    }

    /// Starts queued prefetches up to the concurrency cap.
    fn pump(&mut self) {
        while let Some(page) = self.scheduler.next_fetch() {
            let request = self.request(page, FetchKind::Prefetch);
            self.events.push_back(FeedEvent::Fetch(request));
        }
    }

    fn land(&mut self, page: PageNumber, result: Arc<PageResult<T>>) {
        self.cursor.land(page, result.has_more);
        if result.total_count.is_some() {
            self.total_count = result.total_count;
        }
        if !result.has_more {
            self.scheduler.mark_end(page);
        }

        let has_more = result.has_more;
        if page == 1 && result.is_empty() {
            self.events.push_back(FeedEvent::Empty {
                query: self.query.clone(),
            });
        } else {
            self.events.push_back(FeedEvent::PageReady { page, result });
        }

        if has_more {
            let displayed = self.cursor.displayed_page();
            let cache = &self.cache;
            self.scheduler.top_up(displayed, |p| cache.contains(p));
            self.pump();
            self.events.push_back(FeedEvent::CheckUnderflow);
        }
    }
}
