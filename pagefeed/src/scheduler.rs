use alloc::collections::{BTreeSet, VecDeque};

use crate::PageNumber;

/// Plans prefetches for a bounded window ahead of the displayed page.
///
/// Bookkeeping for one generation:
/// - `queue`: pages awaiting fetch, drained FIFO.
/// - `in_flight`: prefetches issued and not yet completed.
/// - `direct`: the page a user-waited fetch is loading, if any.
/// - `failed`: pages whose prefetch failed; never re-planned.
/// - `end_page`: the last page, once a result with `has_more = false` was seen.
///
/// A page is in at most one of `queue`, `in_flight` and `direct`, and never enters any of them
/// while cached.
#[derive(Clone, Debug)]
pub struct PrefetchScheduler {
    window: u32,
    concurrency: usize,
    queue: VecDeque<PageNumber>,
    in_flight: BTreeSet<PageNumber>,
    direct: Option<PageNumber>,
    failed: BTreeSet<PageNumber>,
    end_page: Option<PageNumber>,
}

impl PrefetchScheduler {
    pub fn new(window: u32, concurrency: usize) -> Self {
        Self {
            window,
            concurrency: concurrency.max(1),
            queue: VecDeque::new(),
            in_flight: BTreeSet::new(),
            direct: None,
            failed: BTreeSet::new(),
            end_page: None,
        }
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn end_page(&self) -> Option<PageNumber> {
        self.end_page
    }

    pub fn queued(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.queue.iter().copied()
    }

    pub fn in_flight(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.in_flight.iter().copied()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn direct(&self) -> Option<PageNumber> {
        self.direct
    }

    pub fn is_queued(&self, page: PageNumber) -> bool {
        self.queue.contains(&page)
    }

    pub fn is_in_flight(&self, page: PageNumber) -> bool {
        self.in_flight.contains(&page)
    }

    /// Queued, prefetching, or loading directly.
    pub fn is_pending(&self, page: PageNumber) -> bool {
        self.direct == Some(page) || self.is_in_flight(page) || self.is_queued(page)
    }

    fn is_plannable(&self, page: PageNumber, is_cached: &impl Fn(PageNumber) -> bool) -> bool {
        if self.end_page.is_some_and(|end| page > end) {
            return false;
        }
        !is_cached(page) && !self.is_pending(page) && !self.failed.contains(&page)
    }

    /// Enqueues every page in `displayed + 1 ..= displayed + window` that is not cached,
    /// pending, known to fail, or past the end. Returns how many pages were enqueued.
    pub fn top_up(
        &mut self,
        displayed: PageNumber,
        is_cached: impl Fn(PageNumber) -> bool,
    ) -> usize {
        let mut added = 0;
        for i in 1..=self.window {
            let page = displayed.saturating_add(i);
            if self.end_page.is_some_and(|end| page > end) {
                break;
            }
            if self.is_plannable(page, &is_cached) {
                self.queue.push_back(page);
                added += 1;
            }
        }
        if added > 0 {
            ptrace!(displayed, added, "PrefetchScheduler::top_up");
        }
        added
    }

    /// Lets the window walk forward from a completed page without an explicit `top_up`.
    ///
    /// Returns `true` when `completed + 1` was enqueued.
    pub fn walk_forward(
        &mut self,
        completed: PageNumber,
        has_more: bool,
        displayed: PageNumber,
        is_cached: impl Fn(PageNumber) -> bool,
    ) -> bool {
        if !has_more {
            self.mark_end(completed);
            return false;
        }
        let next = completed.saturating_add(1);
        if next > displayed.saturating_add(self.window) || !self.is_plannable(next, &is_cached) {
            return false;
        }
        self.queue.push_back(next);
        true
    }

    /// Records that `page` is the last page; queued pages beyond it are dropped.
    pub fn mark_end(&mut self, page: PageNumber) {
        let end = self.end_page.map_or(page, |end| end.min(page));
        self.end_page = Some(end);
        self.queue.retain(|&queued| queued <= end);
    }

    /// Pops the next queued page if the concurrency cap allows and marks it in flight.
    pub fn next_fetch(&mut self) -> Option<PageNumber> {
        if self.in_flight.len() >= self.concurrency {
            return None;
        }
        let page = self.queue.pop_front()?;
        self.in_flight.insert(page);
        Some(page)
    }

    /// Marks a prefetch as completed. Returns `false` if it was not in flight.
    pub fn finish(&mut self, page: PageNumber) -> bool {
        self.in_flight.remove(&page)
    }

    /// Marks a prefetch as failed: it leaves the in-flight set and is never planned again.
    pub fn fail(&mut self, page: PageNumber) -> bool {
        let was_in_flight = self.in_flight.remove(&page);
        self.failed.insert(page);
        was_in_flight
    }

    /// Claims `page` for a user-waited fetch, taking it out of the queue.
    pub fn begin_direct(&mut self, page: PageNumber) {
        debug_assert!(
            !self.in_flight.contains(&page),
            "PrefetchScheduler::begin_direct: page {page} already in flight"
        );
        debug_assert!(
            self.direct.is_none(),
            "PrefetchScheduler::begin_direct: direct fetch already outstanding"
        );
        self.queue.retain(|&queued| queued != page);
        self.direct = Some(page);
    }

    /// Releases the direct claim. Returns `false` if `page` was not the direct page.
    pub fn finish_direct(&mut self, page: PageNumber) -> bool {
        if self.direct == Some(page) {
            self.direct = None;
            true
        } else {
            false
        }
    }

    /// Forgets all bookkeeping. In-flight fetches are not cancelled; their completions are
    /// expected to be rejected by generation.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.in_flight.clear();
        self.direct = None;
        self.failed.clear();
        self.end_page = None;
    }
}
