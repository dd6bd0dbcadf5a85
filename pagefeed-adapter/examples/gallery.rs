use std::time::Duration;

use pagefeed::{FeedError, FeedOptions, FetchError, PageNumber, PageResult, Query};
use pagefeed_adapter::{Renderer, fetch_fn, spawn};

// Example: a photo gallery whose search box filters live and whose grid keeps loading as the
// user scrolls. The "server" is an in-memory catalogue with a little latency.

const CATALOGUE: &[&str] = &[
    "red fox", "red panda", "red kite", "arctic fox", "fennec fox", "snow owl", "barn owl",
    "tawny owl", "grey wolf", "red deer", "roe deer", "sika deer", "moose", "elk", "bison",
    "ibex", "chamois", "lynx", "wildcat", "otter", "badger", "stoat", "weasel", "pine marten",
];

async fn search(query: Query, page: PageNumber, page_size: u32) -> Result<PageResult<String>, FetchError> {
    tokio::time::sleep(Duration::from_millis(40)).await;
    let matches: Vec<&str> = CATALOGUE
        .iter()
        .copied()
        .filter(|name| name.contains(query.as_str()))
        .collect();
    let start = ((page - 1) * page_size) as usize;
    let end = (start + page_size as usize).min(matches.len());
    let items = matches[start.min(end)..end]
        .iter()
        .map(|s| s.to_string())
        .collect();
    Ok(PageResult::new(items, end < matches.len()).with_total_count(matches.len() as u64))
}

#[derive(Default)]
struct Grid {
    tiles: Vec<String>,
}

impl Renderer<String> for Grid {
    fn reset(&mut self, query: &Query) {
        self.tiles.clear();
        println!("-- results for {query:?}");
    }

    fn page_ready(&mut self, page: PageNumber, result: &PageResult<String>) {
        self.tiles.extend(result.items.iter().cloned());
        println!("   page {page}: {:?}", result.items);
    }

    fn empty(&mut self, query: &Query) {
        println!("   nothing matches {query:?}");
    }

    fn error(&mut self, error: &FeedError) {
        println!("   {error}");
    }

    fn is_underflowing(&self) -> bool {
        // Room for eight tiles on screen.
        self.tiles.len() < 8
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let options = FeedOptions::new(4).with_prefetch_window(2);
    let (handle, task) = spawn(options, fetch_fn(search), Grid::default());

    tokio::time::sleep(Duration::from_millis(500)).await;
    for _ in 0..3 {
        let _ = handle.scroll_proximity();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // Typing "fox" one key at a time commits a single query.
    for typed in ["f", "fo", "fox"] {
        let _ = handle.filter_changed(typed);
        tokio::time::sleep(Duration::from_millis(80)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    let _ = handle.filter_changed("unicorn");
    tokio::time::sleep(Duration::from_millis(600)).await;

    let _ = handle.shutdown();
    if let Ok(grid) = task.await {
        println!("final grid: {} tiles", grid.tiles.len());
    }
}
