use crate::*;

use std::collections::VecDeque;

use pagefeed::{
    ErrorKind, FeedError, FeedOptions, FetchError, FetchRequest, PageNumber, PageResult, Query,
};

fn serve(page: PageNumber, page_size: u32, total: u32) -> PageResult<u32> {
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    PageResult::new((start.min(end)..end).collect(), end < total).with_total_count(total as u64)
}

/// Records what would have been drawn. `capacity` is how many items fit on screen.
#[derive(Debug, Default)]
struct Screen {
    query: String,
    capacity: usize,
    items: usize,
    resets: usize,
    empties: usize,
    pages: Vec<(String, PageNumber)>,
    errors: Vec<FeedError>,
    navigations: Vec<String>,
}

impl Screen {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

impl Renderer<u32> for Screen {
    fn reset(&mut self, query: &Query) {
        self.query = query.to_string();
        self.items = 0;
        self.resets += 1;
    }

    fn page_ready(&mut self, page: PageNumber, result: &PageResult<u32>) {
        self.pages.push((self.query.clone(), page));
        self.items += result.len();
    }

    fn empty(&mut self, _query: &Query) {
        self.empties += 1;
    }

    fn error(&mut self, error: &FeedError) {
        self.errors.push(error.clone());
    }

    fn navigate(&mut self, query: &Query) {
        self.navigations.push(query.to_string());
    }

    fn is_underflowing(&self) -> bool {
        self.items < self.capacity
    }
}

fn resolve_all(controller: &mut Controller<u32, Screen>, first: Vec<FetchRequest>, total: u32) {
    let mut pending: VecDeque<FetchRequest> = first.into();
    while let Some(request) = pending.pop_front() {
        let result = serve(request.page(), request.page_size, total);
        pending.extend(controller.complete(request.ticket, Ok(result)));
    }
}

fn pages(screen: &Screen) -> Vec<PageNumber> {
    screen.pages.iter().map(|(_, p)| *p).collect()
}

#[test]
fn controller_fills_an_underflowing_viewport() {
    let options = FeedOptions::new(10).with_prefetch_window(2);
    let mut c = Controller::new(options, Screen::with_capacity(25));

    let first = c.start();
    assert_eq!(first.len(), 1);
    resolve_all(&mut c, first, 100);

    assert_eq!(pages(c.renderer()), vec![1, 2, 3]);
    assert_eq!(c.feed().displayed_page(), 3);
    assert_eq!(c.feed().cache().pages(), vec![1, 2, 3, 4, 5]);
    assert!(!c.feed().is_loading());
}

#[test]
fn controller_stops_filling_at_the_last_page() {
    let options = FeedOptions::new(10).with_prefetch_window(2);
    let mut c = Controller::new(options, Screen::with_capacity(1_000));

    let first = c.start();
    resolve_all(&mut c, first, 24);

    assert_eq!(pages(c.renderer()), vec![1, 2, 3]);
    assert_eq!(c.renderer().items, 24);
    assert!(!c.feed().has_more());
    assert_eq!(c.feed().total_count(), Some(24));
}

#[test]
fn controller_without_underflow_renders_only_the_first_page() {
    let mut c = Controller::new(FeedOptions::new(10), Screen::with_capacity(0));
    let first = c.start();
    resolve_all(&mut c, first, 100);

    assert_eq!(pages(c.renderer()), vec![1]);
    // Prefetch filled the window behind the first page.
    assert_eq!(c.feed().cache().pages(), vec![1, 2, 3, 4]);

    let more = c.on_scroll_proximity();
    assert!(more.iter().all(|r| r.page() > 4));
    assert_eq!(pages(c.renderer()), vec![1, 2]);
}

#[test]
fn controller_reports_empty_results() {
    let mut c = Controller::new(FeedOptions::new(10), Screen::default());
    let first = c.start();
    resolve_all(&mut c, first, 0);

    assert_eq!(c.renderer().empties, 1);
    assert!(c.renderer().pages.is_empty());
    assert!(!c.feed().has_more());
}

#[test]
fn controller_routes_navigation_and_errors() {
    let options =
        FeedOptions::new(10).with_navigation_predicate(Some(|q: &str| q.starts_with('/')));
    let mut c = Controller::new(options, Screen::default());

    let first = c.start();
    assert!(c.on_filter_changed("/settings", 0).is_empty());
    assert_eq!(c.renderer().navigations, vec!["/settings".to_owned()]);
    assert_eq!(c.next_deadline(), None);

    let request = first.into_iter().next().unwrap();
    let follow_up = c.complete(request.ticket, Err(FetchError::Status(500)));
    assert!(follow_up.is_empty());

    let errors = &c.renderer().errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::Network);
    assert_eq!(errors[0].page(), 1);
    assert!(!c.feed().has_more());

    // An explicit refresh is the retry path.
    let retry = c.refresh();
    assert_eq!(retry.len(), 1);
    resolve_all(&mut c, retry, 5);
    assert_eq!(pages(c.renderer()), vec![1]);
    assert_eq!(c.renderer().resets, 2);
}

#[test]
fn controller_discards_pages_of_a_replaced_query() {
    let options = FeedOptions::new(10)
        .with_initial_query("cat")
        .with_prefetch_window(1);
    let mut c = Controller::new(options, Screen::default());

    let first = c.start();
    let cat_page_1 = first.into_iter().next().unwrap();
    let prefetch = c.complete(cat_page_1.ticket, Ok(serve(1, 10, 100)));
    let cat_page_2 = prefetch.into_iter().next().unwrap();
    assert_eq!(cat_page_2.page(), 2);

    assert!(c.on_filter_changed("dog", 1_000).is_empty());
    assert!(c.tick(1_299).is_empty());
    let dog = c.tick(1_300);
    assert_eq!(dog.len(), 1);
    assert_eq!(dog[0].query, Query::from("dog"));

    // The old prefetch lands late and must not be drawn or cached.
    assert!(c.complete(cat_page_2.ticket, Ok(serve(2, 10, 100))).is_empty());
    resolve_all(&mut c, dog, 100);

    assert_eq!(
        c.renderer().pages,
        vec![("cat".to_owned(), 1), ("dog".to_owned(), 1)]
    );
    assert_eq!(c.renderer().resets, 2);
    assert_eq!(c.feed().cache().pages(), vec![1, 2]);
}

#[test]
fn into_parts_returns_feed_and_renderer() {
    let mut c = Controller::new(FeedOptions::new(10), Screen::default());
    let first = c.start();
    resolve_all(&mut c, first, 3);

    let (feed, screen) = c.into_parts();
    assert_eq!(feed.displayed_page(), 1);
    assert_eq!(screen.items, 3);
}

#[cfg(feature = "tokio")]
mod driver {
    use super::*;

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::time::sleep;

    type FetchLog = Arc<Mutex<Vec<(String, PageNumber)>>>;

    struct Backend {
        total: u32,
        delay_ms: u64,
        slow: Option<(&'static str, PageNumber, u64)>,
        log: FetchLog,
    }

    impl Backend {
        fn new(total: u32, delay_ms: u64) -> Self {
            Self {
                total,
                delay_ms,
                slow: None,
                log: FetchLog::default(),
            }
        }

        fn with_slow_page(mut self, query: &'static str, page: PageNumber, delay_ms: u64) -> Self {
            self.slow = Some((query, page, delay_ms));
            self
        }
    }

    #[async_trait::async_trait]
    impl PageFetcher<u32> for Backend {
        async fn fetch(
            &self,
            query: &Query,
            page: PageNumber,
            page_size: u32,
        ) -> Result<PageResult<u32>, FetchError> {
            self.log.lock().unwrap().push((query.to_string(), page));
            let delay = match self.slow {
                Some((q, p, ms)) if q == query.as_str() && p == page => ms,
                _ => self.delay_ms,
            };
            sleep(Duration::from_millis(delay)).await;
            Ok(serve(page, page_size, self.total))
        }
    }

    fn fetched(log: &FetchLog) -> Vec<(String, PageNumber)> {
        log.lock().unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_commits_only_the_last_keystroke() {
        let backend = Backend::new(40, 10);
        let log = Arc::clone(&backend.log);
        let (handle, task) = spawn(FeedOptions::new(10), backend, Screen::default());

        sleep(Duration::from_millis(50)).await;
        handle.filter_changed("a").unwrap();
        sleep(Duration::from_millis(100)).await;
        handle.filter_changed("ab").unwrap();
        sleep(Duration::from_millis(100)).await;
        handle.filter_changed("abc").unwrap();
        sleep(Duration::from_millis(299)).await;
        assert!(fetched(&log).iter().all(|(q, _)| q.is_empty()));

        sleep(Duration::from_millis(200)).await;
        handle.shutdown().unwrap();
        let screen = task.await.unwrap();

        let log = fetched(&log);
        assert!(log.iter().all(|(q, _)| q.is_empty() || q == "abc"));
        assert!(log.contains(&("abc".to_owned(), 1)));
        assert_eq!(screen.resets, 2);
        assert_eq!(screen.query, "abc");
        assert_eq!(screen.pages.last(), Some(&("abc".to_owned(), 1)));
    }

    #[tokio::test(start_paused = true)]
    async fn scrolling_to_the_end_fetches_each_page_once() {
        let backend = Backend::new(35, 10);
        let log = Arc::clone(&backend.log);
        let (handle, task) = spawn(FeedOptions::new(10), backend, Screen::default());

        for _ in 0..10 {
            sleep(Duration::from_millis(50)).await;
            handle.scroll_proximity().unwrap();
        }
        sleep(Duration::from_millis(100)).await;
        handle.shutdown().unwrap();
        let screen = task.await.unwrap();

        assert_eq!(pages(&screen), vec![1, 2, 3, 4]);
        assert_eq!(screen.items, 35);

        let mut fetched_pages: Vec<PageNumber> = fetched(&log).into_iter().map(|(_, p)| p).collect();
        let total = fetched_pages.len();
        fetched_pages.sort_unstable();
        fetched_pages.dedup();
        assert_eq!(fetched_pages.len(), total, "a page was fetched twice");
        assert_eq!(fetched_pages, vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn late_prefetch_of_a_replaced_query_is_never_drawn() {
        let backend = Backend::new(100, 10).with_slow_page("cat", 2, 1_000);
        let log = Arc::clone(&backend.log);
        let options = FeedOptions::new(10)
            .with_initial_query("cat")
            .with_prefetch_window(1);
        let (handle, task) = spawn(options, backend, Screen::default());

        sleep(Duration::from_millis(50)).await;
        handle.filter_changed("dog").unwrap();
        sleep(Duration::from_millis(2_000)).await;
        handle.shutdown().unwrap();
        let screen = task.await.unwrap();

        assert!(fetched(&log).contains(&("cat".to_owned(), 2)));
        assert_eq!(
            screen.pages,
            vec![("cat".to_owned(), 1), ("dog".to_owned(), 1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_driver_skips_the_first_fetch() {
        let log = FetchLog::default();
        let seen = Arc::clone(&log);
        let fetcher = fetch_fn(move |query: Query, page: PageNumber, page_size: u32| {
            seen.lock().unwrap().push((query.to_string(), page));
            async move { Ok::<_, FetchError>(serve(page, page_size, 35)) }
        });

        let (handle, driver) = Driver::new(FeedOptions::new(10), fetcher, Screen::default());
        let task = tokio::spawn(driver.seeded(serve(1, 10, 35)).run());

        sleep(Duration::from_millis(100)).await;
        handle.shutdown().unwrap();
        let screen = task.await.unwrap();

        assert_eq!(pages(&screen), vec![1]);
        let log = fetched(&log);
        assert!(!log.iter().any(|(_, p)| *p == 1));
        assert_eq!(log.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_reports_closed_after_shutdown() {
        let (handle, task) = spawn(FeedOptions::new(10), Backend::new(5, 1), Screen::default());
        handle.shutdown().unwrap();
        task.await.unwrap();

        assert!(handle.is_closed());
        assert_eq!(handle.refresh(), Err(DriverError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_handle_stops_the_driver() {
        let (handle, task) = spawn(FeedOptions::new(10), Backend::new(5, 1), Screen::default());
        drop(handle);
        let screen = task.await.unwrap();
        assert_eq!(screen.resets, 1);
    }
}
