// ── Bounded incremental feed ──
//
// A newest-first, id-deduplicated, capacity-bounded series of readings for
// one channel, plus the last-seen watermark that drives incremental merges.
// Pure data structure: fetching lives in `FeedSynchronizer`.

use std::sync::Arc;

use crate::model::Reading;

/// What a replace or merge did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    /// Readings newly placed at the head of the feed.
    pub added: usize,
    /// Readings that fell off the tail (or were replaced).
    pub dropped: usize,
    /// Watermark after the operation.
    pub watermark: u64,
}

impl MergeOutcome {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.dropped == 0
    }
}

/// Newest-first feed of one channel.
///
/// Invariants after every operation:
/// - `len() <= capacity()`
/// - ids strictly decrease from index 0
/// - every id is `<= watermark()`
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    readings: Arc<Vec<Reading>>,
    watermark: u64,
    capacity: usize,
}

impl ChannelFeed {
    /// Create an empty feed. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: Arc::new(Vec::new()),
            watermark: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Highest id incorporated so far; 0 before any data arrived.
    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Shared snapshot of the current contents. Unchanged by a no-op merge.
    pub fn snapshot(&self) -> Arc<Vec<Reading>> {
        Arc::clone(&self.readings)
    }

    /// Replace the contents wholesale with an initial-load response.
    ///
    /// The batch is sorted newest-first, deduplicated by id and truncated
    /// to capacity. The watermark becomes the newest id in the batch; an
    /// empty batch leaves it where it was.
    pub fn replace(&mut self, batch: Vec<Reading>) -> MergeOutcome {
        let mut batch = batch;
        normalize(&mut batch);
        batch.truncate(self.capacity);

        let dropped = self.readings.len();
        if let Some(newest) = batch.first() {
            self.watermark = newest.id;
        }
        let added = batch.len();
        self.readings = Arc::new(batch);

        MergeOutcome {
            added,
            dropped,
            watermark: self.watermark,
        }
    }

    /// Merge an incremental poll response.
    ///
    /// Only readings with `id > watermark` are kept. They go to the head,
    /// the tail is cut back to capacity and the watermark advances to the
    /// newest new id. When nothing is new the feed, its snapshot `Arc` and
    /// the watermark stay exactly as they were.
    pub fn merge(&mut self, batch: Vec<Reading>) -> MergeOutcome {
        let watermark = self.watermark;
        let mut fresh: Vec<Reading> = batch.into_iter().filter(|r| r.id > watermark).collect();
        if fresh.is_empty() {
            return MergeOutcome {
                added: 0,
                dropped: 0,
                watermark,
            };
        }

        normalize(&mut fresh);
        fresh.truncate(self.capacity);
        let added = fresh.len();
        if let Some(newest) = fresh.first() {
            self.watermark = newest.id;
        }

        let keep = self.capacity - added;
        let dropped = self.readings.len().saturating_sub(keep);
        fresh.extend(self.readings.iter().take(keep).cloned());
        self.readings = Arc::new(fresh);

        MergeOutcome {
            added,
            dropped,
            watermark: self.watermark,
        }
    }
}

/// Sort newest-first and drop repeated ids.
fn normalize(batch: &mut Vec<Reading>) {
    batch.sort_by(|a, b| b.id.cmp(&a.id));
    batch.dedup_by_key(|r| r.id);
}
