use std::sync::atomic::{AtomicUsize, Ordering};

/// A counter shared between worker threads.
#[derive(Debug, Default)]
pub struct SyncCounter {
    count: AtomicUsize
}

impl SyncCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self) -> usize {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incr() {
        let c = SyncCounter::new();
        assert_eq!(c.count(), 0);
        assert_eq!(c.incr(), 1);
        assert_eq!(c.incr(), 2);
        assert_eq!(c.count(), 2);
    }
}
