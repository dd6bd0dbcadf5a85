use crate::{CursorState, PageNumber};

/// Where the display cursor is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Nothing is displayed: not started, or the first page failed.
    Idle,
    /// At least the first page is on screen and no load is outstanding.
    Displaying,
    /// The user waits on `page`.
    Loading { page: PageNumber },
}

/// Tracks which page is shown and whether the user is waiting on the next one.
///
/// `displayed_page` never decreases between two resets.
#[derive(Clone, Debug)]
pub struct DisplayCursor {
    displayed_page: PageNumber,
    has_more: bool,
    phase: Phase,
}

impl Default for DisplayCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayCursor {
    pub fn new() -> Self {
        Self {
            displayed_page: 1,
            has_more: true,
            phase: Phase::Idle,
        }
    }

    pub fn displayed_page(&self) -> PageNumber {
        self.displayed_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn awaits(&self, page: PageNumber) -> bool {
        self.phase == Phase::Loading { page }
    }

    pub fn state(&self) -> CursorState {
        CursorState {
            displayed_page: self.displayed_page,
            has_more: self.has_more,
            loading: self.is_loading(),
        }
    }

    /// The page `advance` would show next, or `None` when advancing is a no-op.
    pub fn next_target(&self) -> Option<PageNumber> {
        if self.phase != Phase::Displaying || !self.has_more {
            return None;
        }
        Some(self.displayed_page.saturating_add(1))
    }

    /// Back to page 1 with more expected, waiting on the first page.
    pub(crate) fn reset_loading_first(&mut self) {
        self.displayed_page = 1;
        self.has_more = true;
        self.phase = Phase::Loading { page: 1 };
    }

    pub(crate) fn begin_loading(&mut self, page: PageNumber) {
        debug_assert!(
            page >= self.displayed_page,
            "DisplayCursor::begin_loading: page {page} behind displayed {}",
            self.displayed_page
        );
        self.phase = Phase::Loading { page };
    }

    /// Shows `page` and records whether more pages follow it.
    pub(crate) fn land(&mut self, page: PageNumber, has_more: bool) {
        debug_assert!(
            page >= self.displayed_page,
            "DisplayCursor::land: page {page} behind displayed {}",
            self.displayed_page
        );
        self.displayed_page = self.displayed_page.max(page);
        self.has_more = has_more;
        self.phase = Phase::Displaying;
    }

    /// Gives up on the awaited page and stays on the last good one.
    ///
    /// Failing the first page leaves nothing on screen, so the cursor goes `Idle` with no
    /// more pages to show until the next reset.
    pub(crate) fn fail(&mut self, page: PageNumber) {
        if page <= 1 {
            self.phase = Phase::Idle;
            self.has_more = false;
        } else {
            self.phase = Phase::Displaying;
        }
    }
}
