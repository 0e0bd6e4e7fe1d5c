//! Rotation cursor over the tracked-account set.
//!
//! Ephemeral engine state: the cached account list is rebuilt from the
//! account store whenever it is empty, and invalidated whenever tracked
//! membership changes so the rotation always reflects the current set.
//! Invariant: `0 <= next_index <= accounts.len()`, wrapping to 0 at the
//! end.

use crate::tracker::types::TrackedAccount;

#[derive(Debug, Default)]
pub struct RotationState {
    accounts: Vec<TrackedAccount>,
    next_index: usize,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the cache needs a rebuild from the store.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Replace the cached account list, restarting the cursor.
    pub fn fill(&mut self, accounts: Vec<TrackedAccount>) {
        self.accounts = accounts;
        self.next_index = 0;
    }

    /// Drop the cache so the next cycle rebuilds it.
    pub fn invalidate(&mut self) {
        self.accounts.clear();
    }

    /// Restart the cursor and drop the cache.
    pub fn reset(&mut self) {
        self.accounts.clear();
        self.next_index = 0;
    }

    pub fn cursor(&self) -> usize {
        self.next_index
    }

    /// Select the account at the cursor and advance, wrapping to 0 after
    /// the last entry. Returns None while the cache is empty.
    pub fn advance(&mut self) -> Option<&TrackedAccount> {
        if self.accounts.is_empty() {
            return None;
        }
        if self.next_index >= self.accounts.len() {
            self.next_index = 0;
        }
        let account = &self.accounts[self.next_index];
        self.next_index += 1;
        Some(account)
    }
}
