// Pending update queue fed by parser callbacks and drained by the refresher.

use parking_lot::{Mutex, MutexGuard};

/// A key/value pair staged for the next refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub key: String,
    pub value: String,
}

impl PendingUpdate {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<(String, String)> for PendingUpdate {
    fn from((key, value): (String, String)) -> Self {
        Self { key, value }
    }
}

/// Unbounded FIFO buffer of pending updates.
///
/// Producers only hold the lock for a `Vec::push`; the drain swaps the
/// whole buffer out, so a push lands either in the returned batch or in
/// the next one.
pub struct PendingUpdateQueue {
    mu: Mutex<Vec<PendingUpdate>>,
}

impl PendingUpdateQueue {
    pub fn new() -> Self {
        Self {
            mu: Mutex::new(Vec::new()),
        }
    }

    /// Appends an update to the tail.
    pub fn push(&self, update: PendingUpdate) {
        self.mu.lock().push(update);
    }

    /// Removes and returns everything queued so far, oldest first.
    pub fn drain_all(&self) -> Vec<PendingUpdate> {
        std::mem::take(&mut *self.mu.lock())
    }

    pub fn len(&self) -> usize {
        self.mu.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mu.lock().is_empty()
    }

    /// Copy of the staged updates.
    pub fn snapshot(&self) -> Vec<PendingUpdate> {
        self.mu.lock().clone()
    }

    /// Mutable view over the staged updates for administrative use.
    ///
    /// Holding the guard blocks producers and the refresher; keep it short.
    pub fn lock(&self) -> MutexGuard<'_, Vec<PendingUpdate>> {
        self.mu.lock()
    }
}

impl Default for PendingUpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}
