use crate::Query;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Pending {
    query: Query,
    deadline_ms: u64,
}

/// Collapses bursts of raw filter changes into one committed query.
///
/// Time is injected by the caller (`now_ms`), the same clock for every call.
#[derive(Clone, Debug)]
pub struct FilterController {
    debounce_ms: u64,
    pending: Option<Pending>,
}

impl FilterController {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            pending: None,
        }
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// Records a raw change and restarts the timer.
    pub fn on_change(&mut self, query: Query, now_ms: u64) {
        let deadline_ms = now_ms.saturating_add(self.debounce_ms);
        self.pending = Some(Pending { query, deadline_ms });
    }

    pub fn cancel(&mut self) -> Option<Query> {
        self.pending.take().map(|p| p.query)
    }

    pub fn pending(&self) -> Option<&Query> {
        self.pending.as_ref().map(|p| &p.query)
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    /// Returns the pending query once its deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<Query> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now_ms >= p.deadline_ms);
        if !due {
            return None;
        }
        self.cancel()
    }
}
