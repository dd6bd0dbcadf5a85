use std::sync::Arc;
use std::time::Duration;

use pagefeed::{FeedOptions, FetchError, FetchRequest, FetchTicket, PageResult, ScrollMetrics};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::{Controller, PageFetcher, Renderer};

/// Input accepted by a running driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The filter input changed (every keystroke).
    FilterChanged(String),
    /// The user scrolled close to the end of the rendered content.
    ScrollProximity,
    /// The rendered content does not fill the viewport.
    ViewportUnderflow,
    /// Raw scroll metrics; proximity is derived from the configured threshold.
    Scroll(ScrollMetrics),
    /// Raw viewport metrics after a render or resize.
    Viewport(ScrollMetrics),
    /// Re-run the active query from page 1.
    Refresh,
    /// Stop the driver. In-flight fetches are left to finish and their results are dropped.
    Shutdown,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    #[error("feed driver has shut down")]
    Closed,
}

/// Cloneable sender side of a running [`Driver`].
#[derive(Clone, Debug)]
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<Signal>,
}

impl FeedHandle {
    pub fn send(&self, signal: Signal) -> Result<(), DriverError> {
        self.tx.send(signal).map_err(|_| DriverError::Closed)
    }

    pub fn filter_changed(&self, raw: impl Into<String>) -> Result<(), DriverError> {
        self.send(Signal::FilterChanged(raw.into()))
    }

    pub fn scroll_proximity(&self) -> Result<(), DriverError> {
        self.send(Signal::ScrollProximity)
    }

    pub fn viewport_underflow(&self) -> Result<(), DriverError> {
        self.send(Signal::ViewportUnderflow)
    }

    pub fn scroll(&self, metrics: ScrollMetrics) -> Result<(), DriverError> {
        self.send(Signal::Scroll(metrics))
    }

    pub fn viewport(&self, metrics: ScrollMetrics) -> Result<(), DriverError> {
        self.send(Signal::Viewport(metrics))
    }

    pub fn refresh(&self) -> Result<(), DriverError> {
        self.send(Signal::Refresh)
    }

    pub fn shutdown(&self) -> Result<(), DriverError> {
        self.send(Signal::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

struct Completed<T> {
    ticket: FetchTicket,
    outcome: Result<PageResult<T>, FetchError>,
}

/// Runs a [`Controller`] on a tokio runtime.
///
/// The driver owns the feed and the renderer. It reads [`Signal`]s from its [`FeedHandle`],
/// runs every requested fetch as its own task, applies completions in arrival order, and
/// commits debounced filters when their deadline passes. All feed state is touched from this
/// one task, so the feed itself needs no locking.
pub struct Driver<T, F, R> {
    controller: Controller<T, R>,
    fetcher: Arc<F>,
    signals: mpsc::UnboundedReceiver<Signal>,
    seed: Option<PageResult<T>>,
}

impl<T, F, R> Driver<T, F, R>
where
    T: Send + Sync + 'static,
    F: PageFetcher<T>,
    R: Renderer<T> + Send + 'static,
{
    pub fn new(options: FeedOptions, fetcher: F, renderer: R) -> (FeedHandle, Self) {
        let (tx, signals) = mpsc::unbounded_channel();
        let driver = Self {
            controller: Controller::new(options, renderer),
            fetcher: Arc::new(fetcher),
            signals,
            seed: None,
        };
        (FeedHandle { tx }, driver)
    }

    /// Starts from a first page delivered with the host view instead of fetching it.
    pub fn seeded(mut self, first_page: PageResult<T>) -> Self {
        self.seed = Some(first_page);
        self
    }

    /// Runs until [`Signal::Shutdown`] or until every [`FeedHandle`] is dropped, then hands the
    /// renderer back.
    pub async fn run(self) -> R {
        let Self {
            mut controller,
            fetcher,
            mut signals,
            seed,
        } = self;
        let clock = Instant::now();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed<T>>();

        let requests = match seed {
            Some(first_page) => controller.start_seeded(first_page),
            None => controller.start(),
        };
        spawn_fetches(&fetcher, &done_tx, requests);

        loop {
            let deadline = controller
                .next_deadline()
                .map(|ms| clock + Duration::from_millis(ms));

            tokio::select! {
                signal = signals.recv() => {
                    let Some(signal) = signal else {
                        tracing::debug!("all feed handles dropped");
                        break;
                    };
                    let now_ms = elapsed_ms(clock);
                    let requests = match signal {
                        Signal::FilterChanged(raw) => controller.on_filter_changed(raw, now_ms),
                        Signal::ScrollProximity => controller.on_scroll_proximity(),
                        Signal::ViewportUnderflow => controller.on_viewport_underflow(),
                        Signal::Scroll(metrics) => controller.on_scroll(metrics),
                        Signal::Viewport(metrics) => controller.on_viewport(metrics),
                        Signal::Refresh => controller.refresh(),
                        Signal::Shutdown => break,
                    };
                    spawn_fetches(&fetcher, &done_tx, requests);
                }
                Some(done) = done_rx.recv() => {
                    let requests = controller.complete(done.ticket, done.outcome);
                    spawn_fetches(&fetcher, &done_tx, requests);
                }
                _ = sleep_until(deadline) => {
                    let requests = controller.tick(elapsed_ms(clock));
                    spawn_fetches(&fetcher, &done_tx, requests);
                }
            }
        }

        tracing::debug!(generation = %controller.feed().generation(), "feed driver stopped");
        controller.into_renderer()
    }
}

/// Spawns a [`Driver`] onto the current tokio runtime.
pub fn spawn<T, F, R>(options: FeedOptions, fetcher: F, renderer: R) -> (FeedHandle, JoinHandle<R>)
where
    T: Send + Sync + 'static,
    F: PageFetcher<T>,
    R: Renderer<T> + Send + 'static,
{
    let (handle, driver) = Driver::new(options, fetcher, renderer);
    (handle, tokio::spawn(driver.run()))
}

fn spawn_fetches<T, F>(
    fetcher: &Arc<F>,
    done: &mpsc::UnboundedSender<Completed<T>>,
    requests: Vec<FetchRequest>,
) where
    T: Send + 'static,
    F: PageFetcher<T>,
{
    for request in requests {
        tracing::trace!(
            query = %request.query,
            page = request.page(),
            kind = ?request.kind(),
            "spawning fetch"
        );
        let fetcher = Arc::clone(fetcher);
        let done = done.clone();
        tokio::spawn(async move {
            let outcome = fetcher
                .fetch(&request.query, request.page(), request.page_size)
                .await;
            // The driver may already have stopped; the result has nowhere to go.
            let _ = done.send(Completed {
                ticket: request.ticket,
                outcome,
            });
        });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn elapsed_ms(clock: Instant) -> u64 {
    u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX)
}
