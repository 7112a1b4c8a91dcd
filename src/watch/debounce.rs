use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Coalesces file events per path. A path becomes ready once `window` has
/// passed since its most recent event.
#[derive(Debug)]
pub struct DebounceQueue {
    window: Duration,
    pending: BTreeMap<PathBuf, Instant>,
}

impl DebounceQueue {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
        }
    }

    /// Record an event. A repeated path restarts its window.
    pub fn push(&mut self, path: PathBuf, at: Instant) {
        self.pending.insert(path, at);
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Time until the earliest pending path becomes ready.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.pending
            .values()
            .map(|last| (*last + self.window).saturating_duration_since(now))
            .min()
    }

    /// Remove and return every path whose window has elapsed.
    pub fn drain_ready(&mut self, now: Instant) -> Vec<PathBuf> {
        let window = self.window;
        let ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, last)| now.saturating_duration_since(**last) >= window)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &ready {
            self.pending.remove(path);
        }
        ready
    }

    /// Remove and return everything, ready or not.
    pub fn drain_all(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.pending).into_keys().collect()
    }
}
