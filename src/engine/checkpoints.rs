use std::collections::BTreeMap;

use crate::raster::PixelBuffer;

/// Cached buffers keyed by history position, bounded by a byte budget.
///
/// Position `p` stores the result of the first `p` timeline entries folded
/// over the document source. Position 0 is never stored; the source itself
/// plays that role.
#[derive(Debug, Clone)]
pub(super) struct CheckpointCache {
    entries: BTreeMap<usize, PixelBuffer>,
    budget_bytes: u64,
    used_bytes: u64,
}

impl CheckpointCache {
    pub(super) const fn new(budget_bytes: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            budget_bytes,
            used_bytes: 0,
        }
    }

    /// Closest cached buffer at or below `position`. Key 0 is never stored,
    /// so position 0 always misses and falls back to the source.
    pub(super) fn nearest_at_or_below(&self, position: usize) -> Option<(usize, &PixelBuffer)> {
        self.entries
            .range(..=position)
            .next_back()
            .map(|(&key, buffer)| (key, buffer))
    }

    /// Cache `buffer` for `position`, then evict entries farthest from
    /// `current` until the budget holds again.
    pub(super) fn store(&mut self, position: usize, buffer: &PixelBuffer, current: usize) {
        let size = buffer.byte_len() as u64;
        if position == 0 || size > self.budget_bytes {
            return;
        }
        if let Some(old) = self.entries.insert(position, buffer.clone()) {
            self.used_bytes -= old.byte_len() as u64;
        }
        self.used_bytes += size;
        while self.used_bytes > self.budget_bytes {
            let Some(victim) = self
                .entries
                .keys()
                .copied()
                .filter(|&key| key != position)
                .max_by_key(|&key| (key.abs_diff(current), key))
            else {
                break;
            };
            self.remove(victim);
        }
    }

    /// Drop every entry at or above `position` (a new edit replaced that branch).
    pub(super) fn truncate_from(&mut self, position: usize) {
        let stale = self.entries.split_off(&position);
        let freed: u64 = stale.values().map(|b| b.byte_len() as u64).sum();
        self.used_bytes -= freed;
    }

    /// Re-key after the oldest history entry was folded into the source.
    ///
    /// Returns the buffer cached for position 1, which is exactly the new
    /// source, so the caller can skip recomputing it.
    pub(super) fn shift_down(&mut self) -> Option<PixelBuffer> {
        let promoted = self.remove(1);
        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .map(|(key, buffer)| (key - 1, buffer))
            .collect();
        promoted
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) const fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    fn remove(&mut self, position: usize) -> Option<PixelBuffer> {
        let removed = self.entries.remove(&position)?;
        self.used_bytes -= removed.byte_len() as u64;
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelLayout;

    fn buffer(tag: u8) -> PixelBuffer {
        PixelBuffer::new(2, 2, PixelLayout::Rgb8, vec![tag; 12]).expect("valid")
    }

    fn keys(cache: &CheckpointCache) -> Vec<usize> {
        cache.entries.keys().copied().collect()
    }

    #[test]
    fn nearest_lookup_ignores_higher_positions() {
        let mut cache = CheckpointCache::new(1024);
        cache.store(2, &buffer(2), 2);
        cache.store(5, &buffer(5), 5);
        assert_eq!(cache.nearest_at_or_below(4).map(|(k, _)| k), Some(2));
        assert_eq!(cache.nearest_at_or_below(5).map(|(k, _)| k), Some(5));
        assert!(cache.nearest_at_or_below(1).is_none());
    }

    #[test]
    fn position_zero_misses_a_filled_cache() {
        let mut cache = CheckpointCache::new(1024);
        cache.store(1, &buffer(1), 1);
        cache.store(3, &buffer(3), 3);
        assert!(cache.nearest_at_or_below(0).is_none());
        assert_eq!(cache.nearest_at_or_below(2).map(|(k, _)| k), Some(1));
    }

    #[test]
    fn budget_evicts_farthest_from_current() {
        let mut cache = CheckpointCache::new(36);
        cache.store(1, &buffer(1), 1);
        cache.store(2, &buffer(2), 2);
        cache.store(3, &buffer(3), 3);
        cache.store(4, &buffer(4), 4);
        assert_eq!(keys(&cache), vec![2, 3, 4]);
        assert_eq!(cache.used_bytes(), 36);
        cache.store(1, &buffer(1), 1);
        assert_eq!(keys(&cache), vec![1, 2, 3]);
    }

    #[test]
    fn oversized_buffers_and_position_zero_are_skipped() {
        let mut cache = CheckpointCache::new(8);
        cache.store(1, &buffer(1), 1);
        let mut roomy = CheckpointCache::new(1024);
        roomy.store(0, &buffer(0), 0);
        assert_eq!(cache.len(), 0);
        assert_eq!(roomy.len(), 0);
    }

    #[test]
    fn truncate_and_shift_keep_accounting() {
        let mut cache = CheckpointCache::new(1024);
        for p in 1..=4 {
            cache.store(p, &buffer(u8::try_from(p).expect("small")), p);
        }
        cache.truncate_from(3);
        assert_eq!(keys(&cache), vec![1, 2]);
        assert_eq!(cache.used_bytes(), 24);

        let promoted = cache.shift_down().expect("position 1 cached");
        assert_eq!(promoted, buffer(1));
        assert_eq!(keys(&cache), vec![1]);
        assert_eq!(cache.used_bytes(), 12);
        assert_eq!(cache.nearest_at_or_below(1).map(|(_, b)| b.clone()), Some(buffer(2)));
    }
}
