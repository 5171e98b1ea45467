use std::sync::atomic::{AtomicUsize, Ordering};

/// Browser session history as seen by page behavior. Hosts without history
/// support pass no implementation at all.
pub trait SessionHistory: Send + Sync {
    fn back(&self);
}

/// History that only counts how many times the page stepped back.
#[derive(Debug, Default)]
pub struct RecordedHistory {
    back_steps: AtomicUsize,
}

impl RecordedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn back_steps(&self) -> usize {
        self.back_steps.load(Ordering::SeqCst)
    }
}

impl SessionHistory for RecordedHistory {
    fn back(&self) {
        self.back_steps.fetch_add(1, Ordering::SeqCst);
    }
}
