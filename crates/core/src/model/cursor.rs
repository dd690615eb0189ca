//
// ─── NAVIGATION CURSOR ─────────────────────────────────────────────────────────
//

/// Bounded index into an exam's ordered question list.
///
/// Navigation is independent of answer state: moving on never requires the
/// current question to be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationCursor {
    index: usize,
    total: usize,
}

impl NavigationCursor {
    /// Cursor at position 0 over `total` questions.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    /// Cursor restored at `index`, clamped into bounds.
    #[must_use]
    pub fn restored(index: usize, total: usize) -> Self {
        let index = if total == 0 { 0 } else { index.min(total - 1) };
        Self { index, total }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Jump to `index`; out-of-bounds targets are ignored.
    pub fn go_to(&mut self, index: usize) {
        if index < self.total {
            self.index = index;
        }
    }

    /// Advance by one; no-op at the last index.
    pub fn next(&mut self) {
        if self.index + 1 < self.total {
            self.index += 1;
        }
    }

    /// Step back by one; no-op at index 0.
    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
