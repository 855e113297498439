//! Push-style delivery of traversal pages.

use std::collections::BTreeSet;

use crate::types::PageResult;

/// Forwards each page to a callback at most once per page number.
///
/// A page whose number was already delivered is dropped. The engine never
/// emits duplicates on its own; the guard protects consumers that feed the
/// same sink from a re-entrant or restarted traversal.
pub struct PageSink<F> {
    seen: BTreeSet<u32>,
    on_page: F,
}

impl<F> PageSink<F>
where
    F: FnMut(PageResult),
{
    pub fn new(on_page: F) -> Self {
        Self {
            seen: BTreeSet::new(),
            on_page,
        }
    }

    /// Delivers `page` unless its number was seen before. Returns whether the
    /// callback ran.
    pub fn accept(&mut self, page: PageResult) -> bool {
        if !self.seen.insert(page.page_number) {
            tracing::debug!(page_number = page.page_number, "dropping duplicate page");
            return false;
        }
        (self.on_page)(page);
        true
    }

    #[must_use]
    pub fn delivered(&self) -> usize {
        self.seen.len()
    }
}
