use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::PageMap;
use crate::{Generation, PageNumber, PageResult, StaleResult};

/// Outcome of a successful [`PageCache::put`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Put {
    Inserted,
    /// The page was already cached; the stored result is kept as is.
    AlreadyCached,
}

/// Fetched pages of exactly one query lifetime.
///
/// The cache is tagged with the [`Generation`] it serves. The tag only moves through
/// [`PageCache::clear`], so entries of two generations can never coexist, and writes carrying
/// any other tag are rejected as [`StaleResult`]. There is no eviction: pages live until the
/// next clear.
#[derive(Clone, Debug)]
pub struct PageCache<T> {
    generation: Generation,
    pages: PageMap<Arc<PageResult<T>>>,
}

impl<T> Default for PageCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageCache<T> {
    pub fn new() -> Self {
        Self {
            generation: Generation::NONE,
            pages: PageMap::new(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn get(&self, page: PageNumber) -> Option<&Arc<PageResult<T>>> {
        self.pages.get(&page)
    }

    pub fn contains(&self, page: PageNumber) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Cached page numbers in ascending order.
    pub fn pages(&self) -> Vec<PageNumber> {
        let mut pages: Vec<PageNumber> = self.pages.keys().copied().collect();
        pages.sort_unstable();
        pages
    }

    /// Stores `result` for `page` if `generation` is the one this cache serves.
    ///
    /// Stored results are immutable: writing a page twice keeps the first result and reports
    /// [`Put::AlreadyCached`].
    pub fn put(
        &mut self,
        generation: Generation,
        page: PageNumber,
        result: Arc<PageResult<T>>,
    ) -> Result<Put, StaleResult> {
        if generation != self.generation {
            return Err(StaleResult {
                page,
                issued: generation,
                active: self.generation,
            });
        }
        if self.pages.contains_key(&page) {
            ptrace!(page, "PageCache::put: already cached");
            return Ok(Put::AlreadyCached);
        }
        self.pages.insert(page, result);
        Ok(Put::Inserted)
    }

    /// Drops every entry and rescopes the cache to `next`.
    pub fn clear(&mut self, next: Generation) {
        debug_assert!(
            next > self.generation,
            "PageCache::clear: generation must advance ({} -> {})",
            self.generation,
            next
        );
        self.pages.clear();
        self.generation = next;
    }
}
