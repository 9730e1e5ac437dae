//! In-memory search telemetry behind trending suggestions.
//!
//! Tracks which queries users actually run so the recommendation engine can
//! surface "popular" suggestions. State is process-wide and best-effort; the
//! history is capped, and a query's popularity count is decremented when its
//! oldest occurrence ages out, so counts always describe the retained window.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::defaults::SEARCH_HISTORY_CAP;
use crate::traits::SearchTelemetry;

#[derive(Debug, Default)]
struct TelemetryState {
    /// Executed queries, oldest first.
    history: VecDeque<String>,
    /// Query frequency within the retained history, insertion-ordered so
    /// equal counts rank by first occurrence.
    counts: Vec<(String, u32)>,
}

/// Bounded process-wide search history with frequency counts.
///
/// The lock is held only for short, non-blocking bookkeeping; no await point
/// ever sits inside it.
#[derive(Debug)]
pub struct InMemoryTelemetry {
    state: Mutex<TelemetryState>,
    capacity: usize,
}

impl InMemoryTelemetry {
    pub fn new() -> Self {
        Self::with_capacity(SEARCH_HISTORY_CAP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(TelemetryState::default()),
            capacity,
        }
    }
}

impl Default for InMemoryTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTelemetry for InMemoryTelemetry {
    fn record_search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            // A poisoned lock means a panic elsewhere; drop the sample.
            return;
        };

        state.history.push_back(query.to_string());
        match state.counts.iter_mut().find(|(q, _)| q == query) {
            Some((_, n)) => *n += 1,
            None => state.counts.push((query.to_string(), 1)),
        }

        while state.history.len() > self.capacity {
            if let Some(evicted) = state.history.pop_front() {
                if let Some(pos) = state.counts.iter().position(|(q, _)| q == &evicted) {
                    state.counts[pos].1 = state.counts[pos].1.saturating_sub(1);
                    if state.counts[pos].1 == 0 {
                        state.counts.remove(pos);
                    }
                }
            }
        }
    }

    fn popular_queries(&self, limit: usize) -> Vec<(String, u32)> {
        let Ok(state) = self.state.lock() else {
            return Vec::new();
        };
        let mut ranked = state.counts.clone();
        // Stable sort keeps first-recorded queries ahead on count ties.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }

    fn history_len(&self) -> usize {
        self.state.lock().map(|s| s.history.len()).unwrap_or(0)
    }
}
