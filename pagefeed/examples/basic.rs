// Example: drive a feed by hand against an in-memory "server".
use pagefeed::{Feed, FeedEvent, FeedOptions, FetchRequest, PageResult, ScrollMetrics};

const ROW_HEIGHT: u64 = 20;

fn serve(request: &FetchRequest, total: u32) -> PageResult<String> {
    let start = (request.page() - 1) * request.page_size;
    let end = (start + request.page_size).min(total);
    let items = (start.min(end)..end)
        .map(|i| format!("{}#{i}", request.query))
        .collect();
    PageResult::new(items, end < total).with_total_count(total as u64)
}

fn main() {
    let mut feed = Feed::new(FeedOptions::new(25).with_initial_query("cats"));
    feed.start();

    let mut rendered = 0u64;
    let mut pending: Vec<FetchRequest> = Vec::new();

    for frame in 0..12u64 {
        for event in feed.drain_events() {
            match event {
                FeedEvent::Reset { query, generation } => {
                    rendered = 0;
                    println!("reset query={query:?} generation={generation}");
                }
                FeedEvent::Fetch(request) => pending.push(request),
                FeedEvent::PageReady { page, result } => {
                    rendered += result.len() as u64;
                    println!("page {page}: {} items (rendered={rendered})", result.len());
                }
                FeedEvent::Empty { query } => println!("no results for {query:?}"),
                FeedEvent::Error(error) => println!("error: {error}"),
                FeedEvent::PrefetchFailed { page, error } => {
                    println!("prefetch of page {page} failed: {error}")
                }
                FeedEvent::CheckUnderflow | FeedEvent::Navigate { .. } => {}
            }
        }

        // The "network" answers one request per frame.
        if !pending.is_empty() {
            let request = pending.remove(0);
            let result = serve(&request, 130);
            let completion = feed.complete(request.ticket, Ok(result));
            println!("  {:?} page {} -> {completion:?}", request.kind(), request.page());
        }

        // The user scrolls a 400px viewport steadily down the content.
        let metrics = ScrollMetrics::new(frame * 150, 400, rendered * ROW_HEIGHT);
        feed.on_scroll(metrics);
    }

    println!("final: {:?}", feed.snapshot());
}
